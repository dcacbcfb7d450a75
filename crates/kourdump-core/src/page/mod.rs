//! Landing page fetch and asset reference extraction.
//!
//! One GET of the origin; the page text goes through [`parse::extract`] and
//! the resulting relative paths are resolved into absolute asset URLs.

pub mod parse;

use anyhow::{Context, Result};
use url::Url;

use crate::error::Error;
use crate::http::{self, HttpOptions};

/// The three build assets a Unity WebGL loader references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Framework,
    Data,
    Wasm,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Framework, AssetKind::Data, AssetKind::Wasm];

    /// File name inside the run directory.
    pub fn file_name(self) -> &'static str {
        match self {
            AssetKind::Framework => "framework.js",
            AssetKind::Data => "web.data",
            AssetKind::Wasm => "game.wasm",
        }
    }

    /// Name used in `ResourceNotFound` and progress output.
    pub fn field_name(self) -> &'static str {
        match self {
            AssetKind::Framework => "framework",
            AssetKind::Data => "data",
            AssetKind::Wasm => "code",
        }
    }
}

/// An asset path as it appears in the page, relative to the build URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub kind: AssetKind,
    pub relative_path: String,
}

impl AssetReference {
    pub fn new(kind: AssetKind, relative_path: impl Into<String>) -> Self {
        Self {
            kind,
            relative_path: relative_path.into(),
        }
    }
}

/// Everything extracted from the landing page.
#[derive(Debug, Clone)]
pub struct PageInfo {
    pub version: String,
    /// As written in the page: absolute, or relative to the origin.
    pub build_url: String,
    /// Indexed in [`AssetKind::ALL`] order.
    pub assets: [AssetReference; 3],
}

impl PageInfo {
    pub fn asset(&self, kind: AssetKind) -> &AssetReference {
        match kind {
            AssetKind::Framework => &self.assets[0],
            AssetKind::Data => &self.assets[1],
            AssetKind::Wasm => &self.assets[2],
        }
    }

    /// Absolute build URL, resolved against `origin` when relative.
    pub fn build_base(&self, origin: &str) -> Result<String> {
        if let Ok(abs) = Url::parse(&self.build_url) {
            return Ok(abs.to_string());
        }
        let mut base = Url::parse(origin).with_context(|| format!("invalid origin {}", origin))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let joined = base
            .join(&self.build_url)
            .with_context(|| format!("cannot join {} onto {}", self.build_url, origin))?;
        Ok(joined.to_string())
    }

    /// Absolute URL for one asset: build URL and relative path joined by exactly one `/`.
    pub fn asset_url(&self, origin: &str, kind: AssetKind) -> Result<String> {
        let base = self.build_base(origin)?;
        let rel = &self.asset(kind).relative_path;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            rel.trim_start_matches('/')
        ))
    }
}

/// Field reported when the landing page itself answers with an error status.
pub const PAGE_FIELD: &str = "build description";

/// Fetch the landing page at `origin` and extract the build description.
///
/// A non-2xx page and a missing pattern both fail with
/// `Error::ResourceNotFound`: the build description could not be found.
/// The field names the pattern, or [`PAGE_FIELD`] for an error status.
/// Neither is retried.
pub fn fetch(origin: &str, opts: &HttpOptions) -> Result<PageInfo> {
    tracing::info!(origin, "fetching landing page");
    let html = match http::get_text(origin, opts) {
        Ok(html) => html,
        Err(e) => {
            if let Some(Error::Transfer { status, .. }) = e.downcast_ref::<Error>() {
                tracing::warn!(origin, status = *status, "landing page returned an error status");
                return Err(Error::ResourceNotFound(PAGE_FIELD).into());
            }
            return Err(e);
        }
    };
    let info = parse::extract(&html)?;
    tracing::info!(
        version = %info.version,
        build_url = %info.build_url,
        "extracted build description"
    );
    Ok(info)
}
