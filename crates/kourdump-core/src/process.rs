//! Blocking invocation of external tools.
//!
//! stderr is captured so a failing step can report its last lines; stdout is
//! either written to a log file or discarded. A nonzero exit is returned as
//! data, not as an error, so the caller decides whether it is fatal.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::Error;

/// One external tool call.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Step name used in logs and errors (e.g. `wasm2wat`).
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// File that receives the tool's stdout.
    pub stdout_redirect: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            stdout_redirect: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_redirect = Some(path.into());
        self
    }
}

/// Exit status and the end of stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stderr_tail: Vec<String>,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// `Err(Error::ToolExecution)` unless the tool exited 0.
    pub fn into_result(self, tool: &str) -> Result<(), Error> {
        if self.success() {
            return Ok(());
        }
        Err(Error::ToolExecution {
            tool: tool.to_string(),
            exit_code: self.exit_code,
            stderr_tail: self.stderr_tail,
        })
    }
}

/// Last `n` non-empty lines of `text`.
pub fn tail_lines(text: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| l.to_string()).collect()
}

/// Run `inv` to completion. Fails only when the process cannot be started
/// (`Error::ToolExecution` with no exit code) or the redirect file cannot be
/// created.
pub fn run(inv: &ToolInvocation, keep_lines: usize) -> Result<ToolOutcome> {
    let mut cmd = Command::new(&inv.program);
    cmd.args(&inv.args).stdin(Stdio::null()).stderr(Stdio::piped());

    match &inv.stdout_redirect {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            cmd.stdout(Stdio::from(file));
        }
        None => {
            cmd.stdout(Stdio::null());
        }
    }

    tracing::info!(step = %inv.label, program = %inv.program.display(), args = ?inv.args, "running tool");
    let output = cmd.output().map_err(|e| Error::ToolExecution {
        tool: inv.label.clone(),
        exit_code: None,
        stderr_tail: vec![format!("failed to start {}: {}", inv.program.display(), e)],
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let outcome = ToolOutcome {
        exit_code: output.status.code(),
        stderr_tail: tail_lines(&stderr, keep_lines),
    };
    tracing::debug!(step = %inv.label, exit_code = ?outcome.exit_code, "tool finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_last_non_empty_lines() {
        let text = "one\ntwo\n\nthree\nfour\n\n";
        assert_eq!(tail_lines(text, 2), vec!["three", "four"]);
        assert_eq!(tail_lines(text, 10), vec!["one", "two", "three", "four"]);
        assert!(tail_lines(text, 0).is_empty());
        assert!(tail_lines("", 3).is_empty());
    }

    #[test]
    fn builder_collects_args() {
        let inv = ToolInvocation::new("wasm2wat", "/opt/wabt/wasm2wat")
            .arg("game.wasm")
            .args(["-o", "game.wat"])
            .stdout_to("logs/wasm2wat.log");
        assert_eq!(inv.args, vec!["game.wasm", "-o", "game.wat"]);
        assert_eq!(inv.stdout_redirect, Some(PathBuf::from("logs/wasm2wat.log")));
    }

    #[test]
    fn outcome_into_result() {
        let ok = ToolOutcome {
            exit_code: Some(0),
            stderr_tail: Vec::new(),
        };
        assert!(ok.into_result("x").is_ok());

        let failed = ToolOutcome {
            exit_code: Some(3),
            stderr_tail: vec!["boom".to_string()],
        };
        match failed.into_result("Cpp2IL") {
            Err(Error::ToolExecution {
                tool,
                exit_code,
                stderr_tail,
            }) => {
                assert_eq!(tool, "Cpp2IL");
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr_tail, vec!["boom"]);
            }
            other => panic!("expected ToolExecution, got {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_tool_execution_error() {
        let inv = ToolInvocation::new("ghost", "/nonexistent/kourdump-test-tool");
        let err = run(&inv, 5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ToolExecution { exit_code: None, .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_returned_with_stderr_tail() {
        let inv = ToolInvocation::new("sh", "sh")
            .arg("-c")
            .arg("echo a >&2; echo b >&2; echo c >&2; exit 7");
        let outcome = run(&inv, 2).unwrap();
        assert_eq!(outcome.exit_code, Some(7));
        assert_eq!(outcome.stderr_tail, vec!["b", "c"]);
        assert!(!outcome.success());
    }

    #[cfg(unix)]
    #[test]
    fn stdout_goes_to_redirect_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs").join("step.log");
        let inv = ToolInvocation::new("sh", "sh")
            .args(["-c", "echo hello"])
            .stdout_to(&log);
        let outcome = run(&inv, 5).unwrap();
        assert!(outcome.success());
        assert_eq!(fs::read_to_string(&log).unwrap(), "hello\n");
    }
}
