use crate::{
    config::{Config, Limits, Server},
    errors::AppError,
    mcp::registry::{Descriptor, Resource},
    mcp::types::ResourceInfo,
    session::{Session, SessionHandle},
};
use async_trait::async_trait;
use serde_json::json;

pub const CONFIG_URI: &str = "config://project";

pub struct ConfigResource {
    session: SessionHandle,
    server: Server,
    limits: Limits,
}

impl ConfigResource {
    pub fn new(cfg: &Config, session: SessionHandle) -> Self {
        Self {
            session,
            server: cfg.server.clone(),
            limits: cfg.limits.clone(),
        }
    }
}

#[async_trait]
impl Resource for ConfigResource {
    fn describe(&self) -> Descriptor {
        Descriptor::Static(ResourceInfo {
            uri: CONFIG_URI.to_string(),
            name: "Project configuration".to_string(),
            description: "Session and server configuration metadata".to_string(),
            mime_type: "application/json".to_string(),
        })
    }

    async fn read(&self, _arg: Option<&str>) -> Result<serde_json::Value, AppError> {
        // Readable with or without an active session; absence is reported,
        // not an error.
        let mut data = match self.session.snapshot() {
            Session::Active(project) => json!({
                "configured": true,
                "root": project.root.display().to_string(),
                "name": project.name,
            }),
            Session::Unconfigured => json!({ "configured": false }),
        };
        data["server"] = json!({
            "bind_addr": self.server.bind_addr,
            "port": self.server.port,
            "base_path": self.server.base_path,
        });
        data["limits"] = json!({
            "max_request_kb": self.limits.max_request_kb,
            "max_file_kb": self.limits.max_file_kb,
        });
        let text =
            serde_json::to_string_pretty(&data).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(json!({
            "uri": CONFIG_URI,
            "mime_type": "application/json",
            "text": text,
        }))
    }
}
