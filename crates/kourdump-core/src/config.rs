use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cpp2IL install location, release source and output selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpp2IlConfig {
    /// Directory holding the Cpp2IL executable; populated on first use.
    pub install_dir: PathBuf,
    /// GitHub release endpoint used when the executable is missing. Either
    /// `releases/latest` or a `releases` list (newest entry is used).
    pub release_api: String,
    /// Processing layers passed to `--use-processor`.
    pub processors: Vec<String>,
    /// `--output-as` id for the diffable C# step.
    pub diffable_format: String,
    /// `--output-as` id for the WASM mappings step.
    pub mappings_format: String,
    /// Flat mappings file the tool writes inside its output directory.
    pub mappings_file: String,
}

impl Default for Cpp2IlConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("resources/cpp2il"),
            release_api: "https://api.github.com/repos/SamboyCoding/Cpp2IL/releases".to_string(),
            processors: vec![
                "attributeanalyzer".to_string(),
                "attributeinjector".to_string(),
                "callanalyzer".to_string(),
                "nativemethoddetector".to_string(),
            ],
            diffable_format: "diffable-cs".to_string(),
            mappings_format: "wasmmappings".to_string(),
            mappings_file: "wasm_mappings.txt".to_string(),
        }
    }
}

/// WABT install location and release source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WabtConfig {
    pub install_dir: PathBuf,
    pub release_api: String,
}

impl Default for WabtConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("resources/wabt"),
            release_api: "https://api.github.com/repos/WebAssembly/wabt/releases/latest"
                .to_string(),
        }
    }
}

/// External WebData unpacker. `{input}` and `{output}` in `args` are replaced
/// with the data blob path and the target directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnpackerConfig {
    pub program: PathBuf,
    #[serde(default = "default_unpacker_args")]
    pub args: Vec<String>,
}

fn default_unpacker_args() -> Vec<String> {
    vec!["{input}".to_string(), "{output}".to_string()]
}

/// Global configuration loaded from `~/.config/kourdump/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KourdumpConfig {
    /// Landing page that embeds the Unity loader config.
    pub origin: String,
    /// Parent of all `v<version> (<uid>)` run directories.
    pub output_root: PathBuf,
    /// Value for Cpp2IL's `--force-unity-version`.
    pub unity_version: String,
    /// Download the three assets on scoped threads instead of one after another.
    #[serde(default)]
    pub parallel_downloads: bool,
    /// How many trailing stderr lines to keep when a tool fails.
    #[serde(default = "default_stderr_tail_lines")]
    pub stderr_tail_lines: usize,
    #[serde(default)]
    pub cpp2il: Cpp2IlConfig,
    #[serde(default)]
    pub wabt: WabtConfig,
    /// Optional; without it the unpack step is skipped.
    #[serde(default)]
    pub unpacker: Option<UnpackerConfig>,
}

fn default_stderr_tail_lines() -> usize {
    20
}

impl Default for KourdumpConfig {
    fn default() -> Self {
        Self {
            origin: "https://kour.io".to_string(),
            output_root: PathBuf::from("output"),
            unity_version: "2022.2.5".to_string(),
            parallel_downloads: false,
            stderr_tail_lines: default_stderr_tail_lines(),
            cpp2il: Cpp2IlConfig::default(),
            wabt: WabtConfig::default(),
            unpacker: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("kourdump")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KourdumpConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KourdumpConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Read and parse a config file. Errors name the file.
pub fn load_from_path(path: &Path) -> Result<KourdumpConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: KourdumpConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = KourdumpConfig::default();
        assert_eq!(cfg.origin, "https://kour.io");
        assert_eq!(cfg.output_root, PathBuf::from("output"));
        assert_eq!(cfg.unity_version, "2022.2.5");
        assert!(!cfg.parallel_downloads);
        assert_eq!(cfg.stderr_tail_lines, 20);
        assert_eq!(cfg.cpp2il.processors.len(), 4);
        assert!(cfg.unpacker.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = KourdumpConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: KourdumpConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.origin, cfg.origin);
        assert_eq!(parsed.output_root, cfg.output_root);
        assert_eq!(parsed.cpp2il.release_api, cfg.cpp2il.release_api);
        assert_eq!(parsed.wabt.install_dir, cfg.wabt.install_dir);
    }

    #[test]
    fn config_toml_minimal_uses_section_defaults() {
        let toml = r#"
            origin = "http://127.0.0.1:8080"
            output_root = "/tmp/dumps"
            unity_version = "2021.3.1"
        "#;
        let cfg: KourdumpConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.origin, "http://127.0.0.1:8080");
        assert_eq!(cfg.output_root, PathBuf::from("/tmp/dumps"));
        assert_eq!(cfg.unity_version, "2021.3.1");
        assert_eq!(cfg.stderr_tail_lines, 20);
        assert_eq!(cfg.cpp2il.diffable_format, "diffable-cs");
        assert_eq!(cfg.wabt.install_dir, PathBuf::from("resources/wabt"));
    }

    #[test]
    fn cpp2il_default_lists_all_releases() {
        let cfg = KourdumpConfig::default();
        assert!(cfg.cpp2il.release_api.ends_with("/Cpp2IL/releases"));
        assert!(cfg.wabt.release_api.ends_with("/releases/latest"));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kourdump.toml");
        fs::write(
            &path,
            "origin = \"http://127.0.0.1:9\"\noutput_root = \"out\"\nunity_version = \"2022.2.5\"\n",
        )
        .unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.origin, "http://127.0.0.1:9");
    }

    #[test]
    fn invalid_toml_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kourdump.toml");
        fs::write(&path, "origin = [unterminated\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("parse config"), "{}", msg);
        assert!(msg.contains(&path.display().to_string()), "{}", msg);
    }

    #[test]
    fn missing_file_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let msg = format!("{:#}", load_from_path(&path).unwrap_err());
        assert!(msg.contains("read config"), "{}", msg);
        assert!(msg.contains("absent.toml"), "{}", msg);
    }

    #[test]
    fn config_toml_unpacker_section() {
        let toml = r#"
            origin = "https://kour.io"
            output_root = "output"
            unity_version = "2022.2.5"
            parallel_downloads = true

            [unpacker]
            program = "/usr/local/bin/webdata-unpack"
        "#;
        let cfg: KourdumpConfig = toml::from_str(toml).unwrap();
        assert!(cfg.parallel_downloads);
        let unpacker = cfg.unpacker.as_ref().unwrap();
        assert_eq!(unpacker.program, PathBuf::from("/usr/local/bin/webdata-unpack"));
        assert_eq!(unpacker.args, vec!["{input}", "{output}"]);
    }
}
