use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::api;
use crate::core::AppConfig;

pub async fn run(host: String, port: String, config_file: PathBuf) -> Result<()> {
    start(host, port, env::var("ANTHROPIC_API_KEY").ok(), &config_file).await
}

/// Load config and serve. Config errors return before anything binds.
pub async fn start(
    host: String,
    port: String,
    api_key: Option<String>,
    config_file: &Path,
) -> Result<()> {
    let config = AppConfig::load(api_key, config_file)?;
    api::serve(host, port, config).await
}
