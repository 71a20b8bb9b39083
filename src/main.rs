mod config;
mod errors;
mod logging;
mod mcp;
mod resolve;
mod resources;
mod security;
mod server;
mod session;

use crate::config::Config;
use crate::session::SessionHandle;
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path = PathBuf::from("curator.toml");
    let mut root_override: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--config requires a path");
                    std::process::exit(2);
                }
                config_path = PathBuf::from(&args[i]);
            }
            "--root" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("--root requires a path");
                    std::process::exit(2);
                }
                root_override = Some(PathBuf::from(&args[i]));
            }
            _ => {}
        }
        i += 1;
    }

    let cfg = Config::load(&config_path).context("loading config")?;
    cfg.validate().context("validating config")?;

    let root = root_override.or_else(|| cfg.project.root_dir.clone());
    let session = match &root {
        Some(root) => SessionHandle::with_root(root).context("establishing project root")?,
        None => SessionHandle::unconfigured(),
    };

    let registry = mcp::registry::ResourceRegistry::new(&cfg, session.clone());

    let addr = format!("{}:{}", cfg.server.bind_addr, cfg.server.port);
    info!(addr = %addr, base_path = %cfg.server.base_path, root = ?root, "curator ready");
    println!(
        "curator ready addr={} base_path={} root={}",
        addr,
        cfg.server.base_path,
        root.as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unconfigured>".into()),
    );

    server::serve(cfg, registry, session).await
}
