//! GitHub release listing and platform asset selection.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::http::{self, HttpOptions};

/// Suffixes of checksum-only release artifacts.
const CHECKSUM_SUFFIXES: &[&str] = &[".sha256", ".sha512", ".md5", ".sha256sum"];

/// Archive formats [`super::extract`] cannot unpack. Writing one of these as
/// the executable would install a broken binary.
const UNHANDLED_ARCHIVE_SUFFIXES: &[&str] = &[
    ".zip", ".7z", ".rar", ".tar.xz", ".txz", ".tar.bz2", ".tbz2", ".tar.zst", ".dmg", ".pkg",
    ".msi", ".deb", ".rpm",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

pub fn is_checksum_artifact(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CHECKSUM_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

pub fn is_unhandled_archive(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    UNHANDLED_ARCHIVE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// `releases/latest` returns one release; `releases` returns a list, newest
/// first, that also includes pre-releases.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    One(Release),
    Many(Vec<Release>),
}

impl Release {
    /// Parse either listing shape. For a list, the first (newest) release wins.
    pub fn parse(json: &[u8]) -> Result<Self> {
        let listing: Listing = serde_json::from_slice(json).context("parse release listing")?;
        match listing {
            Listing::One(release) => Ok(release),
            Listing::Many(releases) => releases
                .into_iter()
                .next()
                .context("release listing is empty"),
        }
    }

    /// First asset whose name contains `fragment` and that is neither a
    /// checksum file nor an archive format that cannot be installed.
    pub fn select_asset(&self, fragment: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| {
            a.name.contains(fragment)
                && !is_checksum_artifact(&a.name)
                && !is_unhandled_archive(&a.name)
        })
    }
}

/// GET and parse a release endpoint (`releases/latest` or `releases`).
pub fn fetch_listing(release_api: &str, opts: &HttpOptions) -> Result<Release> {
    let opts = opts.with_header("Accept", "application/vnd.github+json");
    let body = http::get(release_api, &opts)?;
    let release = Release::parse(&body)?;
    tracing::debug!(
        tag = %release.tag_name,
        assets = release.assets.len(),
        "fetched release listing"
    );
    Ok(release)
}
