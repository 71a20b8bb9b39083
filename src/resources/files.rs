use crate::{
    config::Config,
    errors::AppError,
    mcp::registry::{Descriptor, Resource},
    mcp::types::TemplateInfo,
    resolve,
    resources::read_text,
    session::SessionHandle,
};
use async_trait::async_trait;
use serde_json::json;

pub const FILES_TEMPLATE: &str = "files://{path}";

pub struct FilesResource {
    session: SessionHandle,
    max_file_kb: usize,
}

impl FilesResource {
    pub fn new(cfg: &Config, session: SessionHandle) -> Self {
        Self {
            session,
            max_file_kb: cfg.limits.max_file_kb,
        }
    }
}

#[async_trait]
impl Resource for FilesResource {
    fn describe(&self) -> Descriptor {
        Descriptor::Template(TemplateInfo {
            uri_template: FILES_TEMPLATE.to_string(),
            name: "Project file".to_string(),
            description: "Text content of a file addressed relative to the project root"
                .to_string(),
            mime_type: "text/plain; charset=utf-8".to_string(),
        })
    }

    async fn read(&self, arg: Option<&str>) -> Result<serde_json::Value, AppError> {
        // Session gate comes first, before the raw string is inspected.
        let project = self.session.project()?;
        let raw = arg.ok_or_else(|| AppError::ResourceError("missing path argument".into()))?;
        let full = resolve::resolve_under_root(&project.root, raw)?;
        let text = read_text(&full, self.max_file_kb)?;
        Ok(json!({
            "uri": format!("files://{raw}"),
            "mime_type": "text/plain; charset=utf-8",
            "text": text,
        }))
    }
}
