use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub protocol_version: &'static str,
    pub resources: Vec<ResourceInfo>,
    pub templates: Vec<TemplateInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceInfo {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorObj {
    pub code: String,
    pub message: String,
}
