//! Asset download into the run directory.
//!
//! Each asset is one GET whose body is written byte-for-byte to a `.part`
//! file and renamed into place. Assets the user already has locally are
//! copied instead of downloaded.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::http::{self, HttpOptions};
use crate::page::{AssetKind, PageInfo};
use crate::run_context::RunContext;

/// User-supplied local copies of assets, by kind.
#[derive(Debug, Clone, Default)]
pub struct LocalAssets {
    pub framework: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub wasm: Option<PathBuf>,
}

impl LocalAssets {
    /// The override for `kind`, if one was given and exists on disk.
    /// A path that does not exist is ignored (with a warning).
    pub fn existing(&self, kind: AssetKind) -> Option<&Path> {
        let p = match kind {
            AssetKind::Framework => self.framework.as_deref(),
            AssetKind::Data => self.data.as_deref(),
            AssetKind::Wasm => self.wasm.as_deref(),
        }?;
        if p.exists() {
            Some(p)
        } else {
            tracing::warn!(
                "local {} file {} does not exist; downloading instead",
                kind.field_name(),
                p.display()
            );
            None
        }
    }
}

/// One asset as it now exists in the run directory.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAsset {
    #[serde(serialize_with = "serialize_kind")]
    pub kind: AssetKind,
    /// URL it was downloaded from, or the local path it was copied from.
    pub source: String,
    pub file: String,
    pub bytes: u64,
    pub sha256: String,
}

fn serialize_kind<S: serde::Serializer>(kind: &AssetKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.field_name())
}

/// Path for the temp file: appends `.part` (e.g. `game.wasm` → `game.wasm.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// GET `url` and return the body. Non-2xx fails with `Error::Transfer`.
pub fn download(url: &str, opts: &HttpOptions) -> Result<Vec<u8>> {
    tracing::info!(url, "downloading asset");
    http::get(url, opts)
}

/// Write `bytes` to `<run dir>/<file name of kind>`, creating the run directory.
pub fn write_asset(ctx: &RunContext, kind: AssetKind, bytes: &[u8]) -> Result<PathBuf> {
    ctx.create_dirs()?;
    let final_path = ctx.path(kind.file_name());
    let temp = temp_path(&final_path);
    fs::write(&temp, bytes).with_context(|| format!("write {}", temp.display()))?;
    fs::rename(&temp, &final_path)
        .with_context(|| format!("rename {} to {}", temp.display(), final_path.display()))?;
    Ok(final_path)
}

/// Download (or copy from `local`) one asset into the run directory.
pub fn acquire(
    ctx: &RunContext,
    page: &PageInfo,
    origin: &str,
    kind: AssetKind,
    local: &LocalAssets,
    opts: &HttpOptions,
) -> Result<StoredAsset> {
    let (source, bytes) = match local.existing(kind) {
        Some(path) => {
            tracing::info!("using local {} file {}", kind.field_name(), path.display());
            let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
            (path.display().to_string(), bytes)
        }
        None => {
            let url = page.asset_url(origin, kind)?;
            let bytes = download(&url, opts)?;
            (url, bytes)
        }
    };

    let path = write_asset(ctx, kind, &bytes)?;
    tracing::debug!(file = %path.display(), bytes = bytes.len(), "asset stored");
    Ok(StoredAsset {
        kind,
        source,
        file: kind.file_name().to_string(),
        bytes: bytes.len() as u64,
        sha256: checksum::sha256_bytes(&bytes),
    })
}

/// Acquire all three assets, in [`AssetKind::ALL`] order.
///
/// With `parallel` the three transfers run on scoped threads; the first error
/// (in kind order) is returned either way.
pub fn acquire_all(
    ctx: &RunContext,
    page: &PageInfo,
    origin: &str,
    local: &LocalAssets,
    opts: &HttpOptions,
    parallel: bool,
) -> Result<Vec<StoredAsset>> {
    if !parallel {
        return AssetKind::ALL
            .iter()
            .map(|&kind| acquire(ctx, page, origin, kind, local, opts))
            .collect();
    }

    std::thread::scope(|s| {
        let handles: Vec<_> = AssetKind::ALL
            .iter()
            .map(|&kind| s.spawn(move || acquire(ctx, page, origin, kind, local, opts)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("download thread panicked")))
            })
            .collect()
    })
}
