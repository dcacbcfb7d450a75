//! `kourdump run` – one full fetch-and-decompile run.

use anyhow::{Context, Result};
use kourdump_core::config::KourdumpConfig;
use kourdump_core::downloader::LocalAssets;
use kourdump_core::http::HttpOptions;
use kourdump_core::logging::LogTarget;
use kourdump_core::pipeline;
use std::path::PathBuf;

/// Command-line values that replace loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    pub cpp2il_dir: Option<PathBuf>,
    pub wabt_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub origin: Option<String>,
    pub parallel: bool,
}

impl Overrides {
    pub fn apply(self, cfg: &mut KourdumpConfig) {
        if let Some(dir) = self.cpp2il_dir {
            cfg.cpp2il.install_dir = dir;
        }
        if let Some(dir) = self.wabt_dir {
            cfg.wabt.install_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_root = dir;
        }
        if let Some(origin) = self.origin {
            cfg.origin = origin;
        }
        if self.parallel {
            cfg.parallel_downloads = true;
        }
    }
}

pub async fn run_pipeline(
    cfg: KourdumpConfig,
    local: LocalAssets,
    log_target: &LogTarget,
) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || {
        pipeline::run(&cfg, &local, &HttpOptions::default(), &|line| println!("{}", line))
    })
    .await
    .context("pipeline task failed")??;

    let failed = report.manifest.failed_steps();
    if failed > 0 {
        println!("{} step(s) failed; details in {}", failed, log_target);
    }
    tracing::info!(manifest = %report.manifest_path.display(), failed, "run finished");
    println!("Done. Output in {}", report.ctx.output_dir.display());
    Ok(())
}
