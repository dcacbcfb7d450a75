//! External WebData unpacker. The data blob format belongs to the engine and
//! is not parsed here; the configured program does the work.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{LOGS_DIR, WEBDATA_DIR};
use crate::config::UnpackerConfig;
use crate::page::AssetKind;
use crate::process::ToolInvocation;
use crate::run_context::RunContext;

pub const LABEL: &str = "unpack";

pub fn output_dir(ctx: &RunContext) -> PathBuf {
    ctx.path(WEBDATA_DIR)
}

/// Expand `{input}`/`{output}` placeholders in the configured argument list.
pub fn expand_args(template: &[String], input: &Path, output: &Path) -> Vec<OsString> {
    template
        .iter()
        .map(|arg| match arg.as_str() {
            "{input}" => input.as_os_str().to_owned(),
            "{output}" => output.as_os_str().to_owned(),
            other => OsString::from(
                other
                    .replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy()),
            ),
        })
        .collect()
}

pub fn invocation(cfg: &UnpackerConfig, ctx: &RunContext) -> ToolInvocation {
    let input = ctx.path(AssetKind::Data.file_name());
    let output = output_dir(ctx);
    ToolInvocation::new(LABEL, &cfg.program)
        .args(expand_args(&cfg.args, &input, &output))
        .stdout_to(ctx.path(LOGS_DIR).join(format!("{}.log", LABEL)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let ctx = RunContext::with_uid(Path::new("/out"), "1.0", "UUUUU").unwrap();
        let cfg = UnpackerConfig {
            program: PathBuf::from("/usr/bin/unpack"),
            args: vec![
                "extract".to_string(),
                "{input}".to_string(),
                "--dest={output}".to_string(),
            ],
        };
        let inv = invocation(&cfg, &ctx);
        assert_eq!(inv.program, PathBuf::from("/usr/bin/unpack"));
        assert_eq!(inv.args[0], OsString::from("extract"));
        assert_eq!(inv.args[1], OsString::from("/out/v1.0 (UUUUU)/web.data"));
        assert_eq!(inv.args[2], OsString::from("--dest=/out/v1.0 (UUUUU)/WebData"));
    }
}
