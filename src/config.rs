use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectCfg,
    pub server: Server,
    pub auth: Auth,
    pub limits: Limits,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProjectCfg {
    // absent means the session starts unconfigured until the project endpoint
    pub root_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    pub bind_addr: String,
    pub port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}
fn default_base_path() -> String {
    "/mcp".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    pub bearer_token: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    pub max_request_kb: usize,
    pub max_file_kb: usize,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(root) = &self.project.root_dir {
            if !root.is_dir() {
                anyhow::bail!(
                    "root_dir does not exist or is not a directory: {}",
                    root.display()
                );
            }
        }
        if self.auth.bearer_token.trim().is_empty() {
            anyhow::bail!("bearer_token must not be empty");
        }
        if self.auth.allowed_origins.is_empty() {
            anyhow::bail!("allowed_origins must not be empty");
        }
        if self.limits.max_request_kb == 0 {
            anyhow::bail!("max_request_kb must be > 0");
        }
        if self.limits.max_file_kb == 0 {
            anyhow::bail!("max_file_kb must be > 0");
        }
        Ok(())
    }
}
