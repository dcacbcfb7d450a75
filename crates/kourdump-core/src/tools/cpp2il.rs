use std::path::{Path, PathBuf};

use super::{CPP2IL_DIR, LOGS_DIR, WEBDATA_DIR};
use crate::config::Cpp2IlConfig;
use crate::page::AssetKind;
use crate::process::ToolInvocation;
use crate::run_context::RunContext;

/// Metadata file Cpp2IL needs, relative to the unpacked WebData tree.
pub const METADATA_REL: &[&str] = &["Il2CppData", "Metadata", "global-metadata.dat"];

/// Cpp2IL output selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    DiffableCs,
    WasmMappings,
}

impl OutputKind {
    pub fn label(self) -> &'static str {
        match self {
            OutputKind::DiffableCs => "cpp2il-diffable-cs",
            OutputKind::WasmMappings => "cpp2il-wasm-mappings",
        }
    }

    fn format_id(self, cfg: &Cpp2IlConfig) -> &str {
        match self {
            OutputKind::DiffableCs => &cfg.diffable_format,
            OutputKind::WasmMappings => &cfg.mappings_format,
        }
    }
}

pub fn metadata_path(ctx: &RunContext) -> PathBuf {
    METADATA_REL
        .iter()
        .fold(ctx.path(WEBDATA_DIR), |p, part| p.join(part))
}

pub fn output_dir(ctx: &RunContext) -> PathBuf {
    ctx.path(CPP2IL_DIR)
}

/// The flat mappings file the WASM mappings step produces.
pub fn mappings_file(ctx: &RunContext, cfg: &Cpp2IlConfig) -> PathBuf {
    output_dir(ctx).join(&cfg.mappings_file)
}

/// Full Cpp2IL command line for one output kind.
pub fn invocation(
    exe: &Path,
    ctx: &RunContext,
    cfg: &Cpp2IlConfig,
    unity_version: &str,
    kind: OutputKind,
) -> ToolInvocation {
    ToolInvocation::new(kind.label(), exe)
        .arg("--verbose")
        .arg("--use-processor")
        .arg(cfg.processors.join(","))
        .arg("--wasm-framework-file")
        .arg(ctx.path(AssetKind::Framework.file_name()))
        .arg("--force-binary-path")
        .arg(ctx.path(AssetKind::Wasm.file_name()))
        .arg("--force-metadata-path")
        .arg(metadata_path(ctx))
        .arg("--force-unity-version")
        .arg(unity_version)
        .arg("--output-to")
        .arg(output_dir(ctx))
        .arg("--output-as")
        .arg(kind.format_id(cfg))
        .stdout_to(ctx.path(LOGS_DIR).join(format!("{}.log", kind.label())))
}
