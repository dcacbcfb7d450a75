//! `kourdump checksum` – SHA-256 of files, in `sha256sum` output format.

use anyhow::Result;
use kourdump_core::checksum;
use std::path::PathBuf;

/// Print `<digest>  <path>` per file. Stops at the first unreadable file.
pub async fn run_checksum(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let digest = checksum::sha256_path(path)?;
        println!("{}  {}", digest, path.display());
    }
    Ok(())
}
