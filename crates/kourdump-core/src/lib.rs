pub mod config;
pub mod error;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod fs_names;
pub mod http;
pub mod manifest;
pub mod mappings;
pub mod page;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod provision;
pub mod run_context;
pub mod tools;

pub use error::Error;
