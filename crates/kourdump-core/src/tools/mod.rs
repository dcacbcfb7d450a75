//! Argument lists for the external tools a run invokes.
//!
//! Builders only; nothing here spawns a process. See [`crate::process`].

pub mod cpp2il;
pub mod unpacker;
pub mod wabt;

/// Unpacked WebData tree inside the run directory.
pub const WEBDATA_DIR: &str = "WebData";
/// Cpp2IL output directory inside the run directory.
pub const CPP2IL_DIR: &str = "CPP2IL";
/// Per-module mapping files, inside [`CPP2IL_DIR`].
pub const MAPPINGS_DIR: &str = "WASM Mappings";
/// Tool stdout logs inside the run directory.
pub const LOGS_DIR: &str = "logs";
