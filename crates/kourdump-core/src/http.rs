//! Blocking HTTP GET over libcurl.
//!
//! Every network call in a run (landing page, assets, release listings,
//! release archives) goes through [`get`]. Bodies are collected as raw bytes.

use crate::error::Error;
use anyhow::{Context, Result};
use std::time::Duration;

/// GitHub's API rejects requests without a User-Agent.
pub const USER_AGENT: &str = concat!("kourdump/", env!("CARGO_PKG_VERSION"));

/// Per-request transfer settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Extra headers as `(name, value)`.
    pub headers: Vec<(String, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(30),
            headers: Vec::new(),
        }
    }
}

impl HttpOptions {
    /// Copy of these options with one more request header.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut opts = self.clone();
        opts.headers.push((name.to_string(), value.to_string()));
        opts
    }
}

/// Performs a GET and returns the response body.
///
/// Follows redirects. Non-2xx responses fail with [`Error::Transfer`].
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn get(url: &str, opts: &HttpOptions) -> Result<Vec<u8>> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&opts.user_agent)?;
    easy.connect_timeout(opts.connect_timeout)?;
    // Let libcurl undo transfer encodings (gzip/br) so the bytes on disk are the payload.
    easy.accept_encoding("")?;

    let mut list = curl::easy::List::new();
    for (k, v) in &opts.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !opts.headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("GET {} failed", url))?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        return Err(Error::Transfer {
            url: url.to_string(),
            status: code,
        }
        .into());
    }

    tracing::debug!(url, bytes = body.len(), "GET complete");
    Ok(body)
}

/// GET and decode the body as UTF-8 (lossy).
pub fn get_text(url: &str, opts: &HttpOptions) -> Result<String> {
    let bytes = get(url, opts)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
