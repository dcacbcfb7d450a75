//! Platform capability lookup for provisioned tools.
//!
//! Adding a platform means one more [`Platform`] variant and one more column
//! in [`Tool::asset_fragment`].

use std::fmt;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// The platform this binary was built for, if supported.
    pub fn current() -> Result<Self, Error> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self, Error> {
        match os {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(Error::ToolUnavailable {
                tool: "external tools".to_string(),
                reason: format!("unsupported platform {}", other),
            }),
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Linux => "",
            Platform::Windows => ".exe",
        }
    }

    /// Whether extracted binaries need their executable bit set.
    pub fn needs_chmod(self) -> bool {
        !matches!(self, Platform::Windows)
    }
}

/// Externally provisioned toolchains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Cpp2Il,
    Wabt,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Cpp2Il, Tool::Wabt];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Cpp2Il => "Cpp2IL",
            Tool::Wabt => "WABT",
        }
    }

    /// Substring that identifies this platform's asset in a release listing.
    pub fn asset_fragment(self, platform: Platform) -> &'static str {
        match (self, platform) {
            (Tool::Cpp2Il, Platform::Linux) => "Linux",
            (Tool::Cpp2Il, Platform::Windows) => "Windows",
            (Tool::Wabt, Platform::Linux) => "ubuntu",
            (Tool::Wabt, Platform::Windows) => "windows",
        }
    }

    /// Binary whose presence means the tool is installed.
    pub fn main_binary(self) -> &'static str {
        match self {
            Tool::Cpp2Il => "Cpp2IL",
            Tool::Wabt => "wasm2wat",
        }
    }

    /// File name of `binary` on `platform` (adds `.exe` on Windows).
    pub fn executable_name(binary: &str, platform: Platform) -> String {
        format!("{}{}", binary, platform.exe_suffix())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
