//! CLI for kourdump.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use kourdump_core::config;
use kourdump_core::logging::LogTarget;
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_pipeline, run_split_mappings, run_tools, Overrides,
};

/// Top-level CLI for kourdump.
#[derive(Debug, Parser)]
#[command(name = "kourdump")]
#[command(about = "Fetch the live Kour.io WebGL build and decompile it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the current build and run every decompilation step.
    Run {
        /// Use this framework.js instead of downloading it.
        #[arg(long, value_name = "PATH")]
        framework_path: Option<PathBuf>,
        /// Use this web.data instead of downloading it.
        #[arg(long, value_name = "PATH")]
        data_path: Option<PathBuf>,
        /// Use this game.wasm instead of downloading it.
        #[arg(long, value_name = "PATH")]
        wasm_path: Option<PathBuf>,
        /// Cpp2IL install directory (overrides config).
        #[arg(long, value_name = "DIR")]
        cpp2il_dir: Option<PathBuf>,
        /// WABT install directory (overrides config).
        #[arg(long, value_name = "DIR")]
        wabt_dir: Option<PathBuf>,
        /// Root directory for run folders (overrides config).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Site to fetch the build from (overrides config).
        #[arg(long, value_name = "URL")]
        origin: Option<String>,
        /// Download the three assets concurrently.
        #[arg(long)]
        parallel: bool,
    },

    /// Install Cpp2IL and WABT if missing, then exit.
    Tools {
        /// Cpp2IL install directory (overrides config).
        #[arg(long, value_name = "DIR")]
        cpp2il_dir: Option<PathBuf>,
        /// WABT install directory (overrides config).
        #[arg(long, value_name = "DIR")]
        wabt_dir: Option<PathBuf>,
    },

    /// Split a flat WASM mappings file into one file per module.
    SplitMappings {
        /// Flat mappings file written by Cpp2IL.
        input: PathBuf,
        /// Directory that receives `<module>.txt` files.
        out_dir: PathBuf,
    },

    /// Compute SHA-256 of one or more files (e.g. assets from a run directory).
    Checksum {
        /// Files to hash.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args(log_target: &LogTarget) -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                framework_path,
                data_path,
                wasm_path,
                cpp2il_dir,
                wabt_dir,
                output_dir,
                origin,
                parallel,
            } => {
                let mut cfg = config::load_or_init()?;
                Overrides {
                    cpp2il_dir,
                    wabt_dir,
                    output_dir,
                    origin,
                    parallel,
                }
                .apply(&mut cfg);
                tracing::debug!("effective config: {:?}", cfg);
                let local = kourdump_core::downloader::LocalAssets {
                    framework: framework_path,
                    data: data_path,
                    wasm: wasm_path,
                };
                run_pipeline(cfg, local, log_target).await?;
            }
            CliCommand::Tools {
                cpp2il_dir,
                wabt_dir,
            } => {
                let mut cfg = config::load_or_init()?;
                Overrides {
                    cpp2il_dir,
                    wabt_dir,
                    ..Overrides::default()
                }
                .apply(&mut cfg);
                run_tools(cfg).await?;
            }
            CliCommand::SplitMappings { input, out_dir } => {
                run_split_mappings(&input, &out_dir).await?
            }
            CliCommand::Checksum { paths } => run_checksum(&paths).await?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
