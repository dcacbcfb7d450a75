use std::path::{Path, PathBuf};

use super::LOGS_DIR;
use crate::page::AssetKind;
use crate::process::ToolInvocation;
use crate::run_context::RunContext;

/// The two WABT steps a run performs on the code blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WabtStep {
    /// `wasm2wat`: text format.
    ToWat,
    /// `wasm-decompile`: C-like pseudo code.
    Decompile,
}

impl WabtStep {
    pub const ALL: [WabtStep; 2] = [WabtStep::ToWat, WabtStep::Decompile];

    pub fn binary(self) -> &'static str {
        match self {
            WabtStep::ToWat => "wasm2wat",
            WabtStep::Decompile => "wasm-decompile",
        }
    }

    pub fn output_file(self) -> &'static str {
        match self {
            WabtStep::ToWat => "game.wat",
            WabtStep::Decompile => "game.dcmp",
        }
    }
}

pub fn output_path(ctx: &RunContext, step: WabtStep) -> PathBuf {
    ctx.path(step.output_file())
}

/// `<binary> <run>/game.wasm -o <run>/<output>`.
pub fn invocation(exe: &Path, ctx: &RunContext, step: WabtStep) -> ToolInvocation {
    ToolInvocation::new(step.binary(), exe)
        .arg(ctx.path(AssetKind::Wasm.file_name()))
        .arg("-o")
        .arg(output_path(ctx, step))
        .stdout_to(ctx.path(LOGS_DIR).join(format!("{}.log", step.binary())))
}
