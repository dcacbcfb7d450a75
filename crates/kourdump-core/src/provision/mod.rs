//! On-demand installation of the external toolchains.
//!
//! A tool counts as installed when its main binary exists in the install
//! directory. Otherwise the latest GitHub release is queried, the asset for
//! this platform is downloaded, and its binaries are moved into place.

pub mod extract;
pub mod release;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::http::{self, HttpOptions};
use crate::platform::{Platform, Tool};

/// Where a tool lives and where to get it from.
#[derive(Debug, Clone)]
pub struct ToolSource {
    pub tool: Tool,
    pub install_dir: PathBuf,
    pub release_api: String,
}

impl ToolSource {
    /// Path of `binary` inside the install directory for `platform`.
    pub fn binary_path(&self, binary: &str, platform: Platform) -> PathBuf {
        self.install_dir
            .join(Tool::executable_name(binary, platform))
    }

    /// Path of the tool's main binary.
    pub fn main_binary_path(&self, platform: Platform) -> PathBuf {
        self.binary_path(self.tool.main_binary(), platform)
    }
}

/// Ensure `source.tool` is installed for the current platform; returns the main binary path.
pub fn ensure(source: &ToolSource, opts: &HttpOptions) -> Result<PathBuf> {
    let platform = Platform::current()?;
    ensure_for(source, platform, opts)
}

/// Like [`ensure`] with an explicit platform.
pub fn ensure_for(source: &ToolSource, platform: Platform, opts: &HttpOptions) -> Result<PathBuf> {
    let exe = source.main_binary_path(platform);
    if exe.is_file() {
        tracing::debug!(tool = %source.tool, path = %exe.display(), "already installed");
        return Ok(exe);
    }

    tracing::info!(tool = %source.tool, dir = %source.install_dir.display(), "installing");
    let listing = release::fetch_listing(&source.release_api, opts)
        .with_context(|| format!("{} release listing", source.tool))?;

    let fragment = source.tool.asset_fragment(platform);
    let asset = listing.select_asset(fragment).ok_or_else(|| Error::ToolUnavailable {
        tool: source.tool.name().to_string(),
        reason: format!(
            "no release asset matching \"{}\" in {} {}",
            fragment, source.tool, listing.tag_name
        ),
    })?;
    tracing::info!(tool = %source.tool, asset = %asset.name, "downloading release asset");
    let bytes = http::get(&asset.browser_download_url, opts)?;

    let exe_name = Tool::executable_name(source.tool.main_binary(), platform);
    if extract::is_tar_gz(&asset.name) {
        install_archive(&bytes, &source.install_dir, &exe_name)?;
    } else {
        fs::create_dir_all(&source.install_dir)
            .with_context(|| format!("create {}", source.install_dir.display()))?;
        fs::write(&exe, &bytes).with_context(|| format!("write {}", exe.display()))?;
    }

    if platform.needs_chmod() {
        extract::mark_executable(&source.install_dir)?;
    }

    if !exe.is_file() {
        anyhow::bail!("{} install finished but {} is missing", source.tool, exe.display());
    }
    tracing::info!(tool = %source.tool, path = %exe.display(), "installed");
    Ok(exe)
}

/// Extract into a scratch dir next to `install_dir`, then move the directory
/// holding `exe_name` into `install_dir`.
fn install_archive(bytes: &[u8], install_dir: &Path, exe_name: &str) -> Result<()> {
    let parent = install_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let scratch = tempfile::Builder::new()
        .prefix(".kourdump-extract-")
        .tempdir_in(parent)
        .context("create extraction dir")?;

    let bin_dir = extract::extract_archive(bytes, scratch.path(), exe_name)?;
    extract::relocate_contents(&bin_dir, install_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_binary_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let source = ToolSource {
            tool: Tool::Wabt,
            install_dir: dir.path().to_path_buf(),
            // Unroutable: reaching the network would fail the test.
            release_api: "http://127.0.0.1:1/releases/latest".to_string(),
        };
        fs::write(dir.path().join("wasm2wat"), b"x").unwrap();
        let exe = ensure_for(&source, Platform::Linux, &HttpOptions::default()).unwrap();
        assert_eq!(exe, dir.path().join("wasm2wat"));
    }

    #[test]
    fn binary_paths_follow_platform_suffix() {
        let source = ToolSource {
            tool: Tool::Wabt,
            install_dir: PathBuf::from("resources/wabt"),
            release_api: String::new(),
        };
        assert_eq!(
            source.binary_path("wasm-decompile", Platform::Windows),
            PathBuf::from("resources/wabt/wasm-decompile.exe")
        );
        assert_eq!(
            source.main_binary_path(Platform::Linux),
            PathBuf::from("resources/wabt/wasm2wat")
        );
    }

    #[test]
    fn install_archive_places_bin_contents() {
        let root = tempfile::tempdir().unwrap();
        let install = root.path().join("resources").join("wabt");
        install_archive(&extract::tests::wabt_archive(), &install, "wasm2wat").unwrap();
        assert!(install.join("wasm2wat").is_file());
        assert!(install.join("wasm-decompile").is_file());
        assert!(!install.join("README").exists());
        // Scratch dir is cleaned up.
        let leftovers: Vec<_> = fs::read_dir(root.path().join("resources"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("wabt")]);
    }
}
