//! One end-to-end run: page → assets → unpack → tools → decompile steps.
//!
//! Everything up to and including tool provisioning is fatal. Each tool step
//! after that is isolated: a failure is logged with the tool's stderr tail,
//! recorded in the manifest, and the next step still runs.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::KourdumpConfig;
use crate::downloader::{self, LocalAssets};
use crate::http::HttpOptions;
use crate::manifest::{Manifest, StepRecord, StepStatus};
use crate::mappings;
use crate::page;
use crate::platform::{Platform, Tool};
use crate::process::{self, ToolInvocation};
use crate::provision::{self, ToolSource};
use crate::run_context::RunContext;
use crate::tools::cpp2il::{self, OutputKind};
use crate::tools::wabt::{self, WabtStep};
use crate::tools::{unpacker, MAPPINGS_DIR};

/// A named unit of post-download work whose failure does not end the run.
pub struct Step<'a> {
    pub name: String,
    action: Box<dyn FnOnce() -> Result<StepStatus> + 'a>,
}

impl<'a> Step<'a> {
    pub fn new(name: impl Into<String>, action: impl FnOnce() -> Result<StepStatus> + 'a) -> Self {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }
}

/// Run one step, turning an error into a `Failed` record.
pub fn run_step(step: Step<'_>) -> StepRecord {
    let Step { name, action } = step;
    let status = match action() {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(step = %name, "{:#}", e);
            StepStatus::Failed {
                error: format!("{:#}", e),
            }
        }
    };
    if let StepStatus::Skipped { reason } = &status {
        tracing::warn!(step = %name, "skipped: {}", reason);
    }
    StepRecord { name, status }
}

/// Run every step in order regardless of earlier failures.
pub fn run_steps(steps: Vec<Step<'_>>) -> Vec<StepRecord> {
    steps.into_iter().map(run_step).collect()
}

/// Run an invocation and treat a nonzero exit as a step failure.
fn run_tool(inv: &ToolInvocation, tail: usize) -> Result<StepStatus> {
    process::run(inv, tail)?.into_result(&inv.label)?;
    Ok(StepStatus::Ok)
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub ctx: RunContext,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

/// Install locations for both toolchains, from config.
pub fn tool_sources(cfg: &KourdumpConfig) -> [ToolSource; 2] {
    [
        ToolSource {
            tool: Tool::Cpp2Il,
            install_dir: cfg.cpp2il.install_dir.clone(),
            release_api: cfg.cpp2il.release_api.clone(),
        },
        ToolSource {
            tool: Tool::Wabt,
            install_dir: cfg.wabt.install_dir.clone(),
            release_api: cfg.wabt.release_api.clone(),
        },
    ]
}

/// Provision both toolchains. Returns the main binary paths in [`Tool::ALL`] order.
pub fn ensure_tools(
    cfg: &KourdumpConfig,
    platform: Platform,
    http: &HttpOptions,
) -> Result<[PathBuf; 2]> {
    let [cpp2il_src, wabt_src] = tool_sources(cfg);
    let cpp2il = provision::ensure_for(&cpp2il_src, platform, http)?;
    let wabt = provision::ensure_for(&wabt_src, platform, http)?;
    Ok([cpp2il, wabt])
}

fn unpack_step<'a>(cfg: &'a KourdumpConfig, ctx: &'a RunContext) -> Step<'a> {
    Step::new(unpacker::LABEL, move || match &cfg.unpacker {
        None => Ok(StepStatus::Skipped {
            reason: "no [unpacker] configured".to_string(),
        }),
        Some(u) => run_tool(&unpacker::invocation(u, ctx), cfg.stderr_tail_lines),
    })
}

fn cpp2il_steps<'a>(cfg: &'a KourdumpConfig, ctx: &'a RunContext, exe: &'a Path) -> Vec<Step<'a>> {
    let tail = cfg.stderr_tail_lines;
    let diffable = Step::new(OutputKind::DiffableCs.label(), move || {
        let inv = cpp2il::invocation(exe, ctx, &cfg.cpp2il, &cfg.unity_version, OutputKind::DiffableCs);
        run_tool(&inv, tail)
    });
    let mappings = Step::new(OutputKind::WasmMappings.label(), move || {
        let inv = cpp2il::invocation(exe, ctx, &cfg.cpp2il, &cfg.unity_version, OutputKind::WasmMappings);
        run_tool(&inv, tail)?;
        let flat = cpp2il::mappings_file(ctx, &cfg.cpp2il);
        let written = mappings::split_file(&flat, &cpp2il::output_dir(ctx).join(MAPPINGS_DIR))
            .context("split mappings output")?;
        tracing::info!(files = written.len(), "wrote per-module mappings");
        Ok(StepStatus::Ok)
    });
    vec![diffable, mappings]
}

fn wabt_steps<'a>(
    cfg: &'a KourdumpConfig,
    ctx: &'a RunContext,
    source: &'a ToolSource,
    platform: Platform,
) -> Vec<Step<'a>> {
    let tail = cfg.stderr_tail_lines;
    WabtStep::ALL
        .iter()
        .map(move |&step| {
            Step::new(step.binary(), move || {
                let exe = source.binary_path(step.binary(), platform);
                run_tool(&wabt::invocation(&exe, ctx, step), tail)
            })
        })
        .collect()
}

/// Remove a run directory whose assets could not all be acquired.
fn discard_run_dir(ctx: &RunContext) {
    if !ctx.output_dir.exists() {
        return;
    }
    match fs::remove_dir_all(&ctx.output_dir) {
        Ok(()) => tracing::debug!(dir = %ctx.output_dir.display(), "removed incomplete run directory"),
        Err(e) => tracing::warn!(
            dir = %ctx.output_dir.display(),
            "could not remove incomplete run directory: {}",
            e
        ),
    }
}

/// Execute a full run with `cfg`, using `local` copies where supplied.
///
/// `progress` receives one line per stage for the console.
pub fn run(
    cfg: &KourdumpConfig,
    local: &LocalAssets,
    http: &HttpOptions,
    progress: &dyn Fn(&str),
) -> Result<RunReport> {
    let platform = Platform::current()?;

    progress(&format!("Fetching {}", cfg.origin));
    let page = page::fetch(&cfg.origin, http)?;
    progress(&format!("Version {} (build URL {})", page.version, page.build_url));

    let ctx = RunContext::new(&cfg.output_root, &page.version)?;
    tracing::info!(dir = %ctx.output_dir.display(), uid = %ctx.uid, "run directory chosen");

    progress("Downloading assets");
    let assets = match downloader::acquire_all(
        &ctx,
        &page,
        &cfg.origin,
        local,
        http,
        cfg.parallel_downloads,
    ) {
        Ok(assets) => assets,
        Err(e) => {
            discard_run_dir(&ctx);
            return Err(e);
        }
    };
    for a in &assets {
        progress(&format!("  {} ({} bytes, sha256 {})", a.file, a.bytes, a.sha256));
    }

    progress("Unpacking data blob");
    let mut steps = vec![run_step(unpack_step(cfg, &ctx))];

    progress("Checking external tools");
    let [cpp2il_exe, _] = ensure_tools(cfg, platform, http)?;
    let [_, wabt_src] = tool_sources(cfg);

    progress("Running decompilers");
    let mut work = cpp2il_steps(cfg, &ctx, &cpp2il_exe);
    work.extend(wabt_steps(cfg, &ctx, &wabt_src, platform));
    for record in run_steps(work) {
        let line = match &record.status {
            StepStatus::Ok => format!("  {}: ok", record.name),
            StepStatus::Skipped { reason } => format!("  {}: skipped ({})", record.name, reason),
            StepStatus::Failed { .. } => format!("  {}: failed (see log)", record.name),
        };
        progress(&line);
        steps.push(record);
    }

    let manifest = Manifest {
        version: ctx.version.clone(),
        uid: ctx.uid.clone(),
        origin: cfg.origin.clone(),
        build_url: page.build_url.clone(),
        assets,
        steps,
    };
    let manifest_path = manifest.write(&ctx)?;

    Ok(RunReport {
        ctx,
        manifest,
        manifest_path,
    })
}
