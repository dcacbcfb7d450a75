//! `manifest.json`: what a run fetched and how each tool step went.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::downloader::StoredAsset;
use crate::run_context::RunContext;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub version: String,
    pub uid: String,
    pub origin: String,
    pub build_url: String,
    pub assets: Vec<StoredAsset>,
    pub steps: Vec<StepRecord>,
}

impl Manifest {
    /// Write as pretty JSON into the run directory.
    pub fn write(&self, ctx: &RunContext) -> Result<PathBuf> {
        let path = ctx.path(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn failed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { .. }))
            .count()
    }
}
