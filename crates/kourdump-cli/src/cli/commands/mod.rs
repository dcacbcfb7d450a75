//! CLI command handlers, one file per command.

mod checksum;
mod completions;
mod run;
mod split;
mod tools;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use run::{run_pipeline, Overrides};
pub use split::run_split_mappings;
pub use tools::run_tools;
