//! `kourdump split-mappings` – run the module splitter on an existing file.

use anyhow::Result;
use kourdump_core::mappings;
use std::path::Path;

pub async fn run_split_mappings(input: &Path, out_dir: &Path) -> Result<()> {
    let written = mappings::split_file(input, out_dir)?;
    if written.is_empty() {
        println!("No modules found in {}.", input.display());
    } else {
        println!("Wrote {} module file(s) to {}", written.len(), out_dir.display());
    }
    Ok(())
}
