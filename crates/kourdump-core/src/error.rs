//! Error taxonomy for a kourdump run.
//!
//! Most code returns `anyhow::Result`; these variants are raised where callers
//! (the pipeline, tests) need to tell failure kinds apart via `downcast_ref`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An expected pattern was absent from the landing page. Usually means the
    /// page's script layout changed.
    #[error("could not find {0} in page")]
    ResourceNotFound(&'static str),

    /// Non-2xx HTTP response.
    #[error("GET {url} returned HTTP {status}")]
    Transfer { url: String, status: u32 },

    /// No release asset for this platform, or the platform itself is unsupported.
    #[error("{tool} unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// External tool exited nonzero (or could not be started).
    #[error("{tool} failed ({}){}", exit_label(.exit_code), tail_label(.stderr_tail))]
    ToolExecution {
        tool: String,
        exit_code: Option<i32>,
        stderr_tail: Vec<String>,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "no exit code".to_string(),
    }
}

fn tail_label(tail: &[String]) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!(":\n{}", tail.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_not_found_names_field() {
        let e = Error::ResourceNotFound("build URL");
        assert_eq!(e.to_string(), "could not find build URL in page");
    }

    #[test]
    fn transfer_carries_url_and_status() {
        let e = Error::Transfer {
            url: "https://example.com/a.wasm".to_string(),
            status: 404,
        };
        assert_eq!(e.to_string(), "GET https://example.com/a.wasm returned HTTP 404");
    }

    #[test]
    fn tool_execution_includes_tail() {
        let e = Error::ToolExecution {
            tool: "wasm2wat".to_string(),
            exit_code: Some(1),
            stderr_tail: vec!["bad magic".to_string()],
        };
        assert_eq!(e.to_string(), "wasm2wat failed (exit code 1):\nbad magic");

        let e = Error::ToolExecution {
            tool: "Cpp2IL".to_string(),
            exit_code: None,
            stderr_tail: Vec::new(),
        };
        assert_eq!(e.to_string(), "Cpp2IL failed (no exit code)");
    }
}
