//! Per-run bookkeeping: version, random run id and the run directory.

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Length of the random run identifier.
pub const UID_LEN: usize = 5;

/// Where one invocation's artifacts land. Built once, passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub version: String,
    pub uid: String,
    pub output_dir: PathBuf,
}

/// Fresh upper-case alphanumeric run id.
pub fn random_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

/// `v<version> (<uid>)`.
pub fn run_dir_name(version: &str, uid: &str) -> String {
    format!("v{} ({})", version, uid)
}

impl RunContext {
    /// Context with a fresh uid. Fails if `version` is empty.
    pub fn new(output_root: &Path, version: &str) -> Result<Self> {
        Self::with_uid(output_root, version, &random_uid())
    }

    pub fn with_uid(output_root: &Path, version: &str, uid: &str) -> Result<Self> {
        let version = version.trim();
        if version.is_empty() {
            return Err(Error::ResourceNotFound("version").into());
        }
        Ok(Self {
            version: version.to_string(),
            uid: uid.to_string(),
            output_dir: output_root.join(run_dir_name(version, uid)),
        })
    }

    /// Create the run directory. Pre-existing is not an error.
    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create {}", self.output_dir.display()))
    }

    /// Path of a file or directory inside the run directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}
