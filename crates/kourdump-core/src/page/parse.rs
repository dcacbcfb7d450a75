//! Pattern extraction from the landing page's inline Unity loader script.
//!
//! This is the only place that knows what the page looks like; when the
//! script layout drifts, the patterns here are what change.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{AssetKind, AssetReference, PageInfo};
use crate::error::Error;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"productVersion: ?"([0-9.]+)"#).expect("version pattern"));

// Desktop branch of `buildUrl = isMobile ? "<mobile>" : "<desktop>"`.
static BUILD_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"buildUrl ?= ?[a-zA-Z +?]+"[a-zA-Z:/\-. ]+" ?: ?"([a-zA-Z:/\-. ]+)"#)
        .expect("build URL pattern")
});

static FRAMEWORK_RE: Lazy<Regex> = Lazy::new(|| asset_pattern("frameworkUrl"));
static DATA_RE: Lazy<Regex> = Lazy::new(|| asset_pattern("dataUrl"));
static CODE_RE: Lazy<Regex> = Lazy::new(|| asset_pattern("codeUrl"));

fn asset_pattern(key: &str) -> Regex {
    Regex::new(&format!(
        r#"{}: ?buildUrl ?\+ ?"([a-zA-Z0-9./]+)""#,
        regex::escape(key)
    ))
    .expect("asset pattern")
}

/// First capture of `re` in `html`, or `ResourceNotFound(field)` if there is
/// no match or the capture is empty.
fn capture(re: &Regex, html: &str, field: &'static str) -> Result<String> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::ResourceNotFound(field).into())
}

/// Extract version, build URL and the three asset paths from page text.
pub fn extract(html: &str) -> Result<PageInfo> {
    let version = capture(&VERSION_RE, html, "version")?;
    let build_url = capture(&BUILD_URL_RE, html, "build URL")?;

    let framework = capture(&FRAMEWORK_RE, html, AssetKind::Framework.field_name())?;
    let data = capture(&DATA_RE, html, AssetKind::Data.field_name())?;
    let code = capture(&CODE_RE, html, AssetKind::Wasm.field_name())?;

    Ok(PageInfo {
        version,
        build_url,
        assets: [
            AssetReference::new(AssetKind::Framework, framework),
            AssetReference::new(AssetKind::Data, data),
            AssetReference::new(AssetKind::Wasm, code),
        ],
    })
}
