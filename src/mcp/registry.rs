use crate::{config::Config, errors::AppError, session::SessionHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::types::{ErrorObj, ResourceInfo, TemplateInfo};

pub type DynResource = Arc<dyn Resource + Send + Sync + 'static>;

// a fixed URI, or a template whose single trailing placeholder captures the
// rest of the request URI
#[derive(Debug, Clone)]
pub enum Descriptor {
    Static(ResourceInfo),
    Template(TemplateInfo),
}

#[async_trait]
pub trait Resource {
    fn describe(&self) -> Descriptor;
    // arg is the extracted placeholder value for templates, None for statics
    async fn read(&self, arg: Option<&str>) -> Result<serde_json::Value, AppError>;
}

#[derive(Clone)]
pub struct ResourceRegistry {
    entries: Vec<DynResource>,
}

impl ResourceRegistry {
    pub fn new(cfg: &Config, session: SessionHandle) -> Self {
        use crate::resources::{config::ConfigResource, files::FilesResource};
        let mut entries: Vec<DynResource> = vec![
            Arc::new(ConfigResource::new(cfg, session.clone())),
            Arc::new(FilesResource::new(cfg, session)),
        ];
        entries.sort_by_key(|r| match r.describe() {
            Descriptor::Static(info) => info.uri,
            Descriptor::Template(t) => t.uri_template,
        });
        Self { entries }
    }

    // statics match by equality, templates by prefix; the remainder is
    // extracted verbatim and may be empty
    pub fn match_uri(&self, uri: &str) -> Option<(DynResource, Option<String>)> {
        for entry in &self.entries {
            match entry.describe() {
                Descriptor::Static(info) => {
                    if info.uri == uri {
                        return Some((entry.clone(), None));
                    }
                }
                Descriptor::Template(t) => {
                    let prefix = t.uri_template.split('{').next().unwrap_or("");
                    if !prefix.is_empty() {
                        if let Some(rest) = uri.strip_prefix(prefix) {
                            return Some((entry.clone(), Some(rest.to_string())));
                        }
                    }
                }
            }
        }
        None
    }

    pub fn catalog(&self) -> (Vec<ResourceInfo>, Vec<TemplateInfo>) {
        let mut resources = Vec::new();
        let mut templates = Vec::new();
        for entry in &self.entries {
            match entry.describe() {
                Descriptor::Static(info) => resources.push(info),
                Descriptor::Template(t) => templates.push(t),
            }
        }
        (resources, templates)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub id: String,
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObj>,
}
