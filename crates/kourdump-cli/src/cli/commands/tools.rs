//! `kourdump tools` – provision Cpp2IL and WABT without running anything.

use anyhow::{Context, Result};
use kourdump_core::config::KourdumpConfig;
use kourdump_core::http::HttpOptions;
use kourdump_core::pipeline;
use kourdump_core::platform::{Platform, Tool};

pub async fn run_tools(cfg: KourdumpConfig) -> Result<()> {
    let paths = tokio::task::spawn_blocking(move || {
        let platform = Platform::current()?;
        pipeline::ensure_tools(&cfg, platform, &HttpOptions::default())
    })
    .await
    .context("tool provisioning task failed")??;

    for (tool, path) in Tool::ALL.iter().zip(paths.iter()) {
        println!("{:<8} {}", tool, path.display());
    }
    Ok(())
}
