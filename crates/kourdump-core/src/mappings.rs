//! Split Cpp2IL's flat WASM mappings file into one file per module.
//!
//! The flat file is a sequence of sections separated by two blank lines.
//! Each section starts with a `<Module>.dll` header line followed by the
//! mapping lines for that module.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fs_names::sanitize_file_stem;

/// Two consecutive blank lines.
const SECTION_DELIMITER: &str = "\n\n\n";
const HEADER_SUFFIX: &str = ".dll";

/// Module name → mapping body. Header-only sections and sections whose
/// header is not a `.dll` name are dropped. A repeated header replaces the
/// earlier body (with a warning).
pub fn split_modules(text: &str) -> BTreeMap<String, String> {
    let text = text.replace("\r\n", "\n");
    let mut modules = BTreeMap::new();

    for section in text.split(SECTION_DELIMITER) {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }
        let (header, body) = section.split_once('\n').unwrap_or((section, ""));
        let Some(name) = header.trim().strip_suffix(HEADER_SUFFIX) else {
            tracing::debug!(header, "skipping section without .dll header");
            continue;
        };
        let body = body.trim();
        if name.is_empty() || body.is_empty() {
            continue;
        }
        if modules.insert(name.to_string(), body.to_string()).is_some() {
            tracing::warn!(module = name, "duplicate module header; keeping the later section");
        }
    }

    modules
}

/// Write each module to `<dir>/<module>.txt`. Returns the written paths.
/// When two module names sanitize to the same file name, the first in
/// sorted order is written and the rest are skipped with a warning.
pub fn write_modules(modules: &BTreeMap<String, String>, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::with_capacity(modules.len());
    let mut stems = HashSet::new();
    for (name, body) in modules {
        let stem = sanitize_file_stem(name);
        if stem.is_empty() {
            tracing::warn!(module = %name, "module name sanitizes to nothing; skipped");
            continue;
        }
        if !stems.insert(stem.clone()) {
            tracing::warn!(module = %name, file = %stem, "file name already used by another module; skipped");
            continue;
        }
        let path = dir.join(format!("{}.txt", stem));
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Read `flat_file`, split it, and write the per-module files into `dir`.
pub fn split_file(flat_file: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
    let text = fs::read_to_string(flat_file)
        .with_context(|| format!("read {}", flat_file.display()))?;
    let modules = split_modules(&text);
    tracing::info!(
        modules = modules.len(),
        file = %flat_file.display(),
        "split mappings file"
    );
    write_modules(&modules, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_modules() {
        let m = split_modules("A.dll\nfoo\nbar\n\n\nB.dll\nbaz\n");
        assert_eq!(m.len(), 2);
        assert_eq!(m["A"], "foo\nbar");
        assert_eq!(m["B"], "baz");
    }

    #[test]
    fn header_only_section_is_skipped() {
        let m = split_modules("A.dll\n\n\nB.dll\nbaz\n\n\nC.dll");
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn single_blank_line_stays_in_body() {
        let m = split_modules("A.dll\nfoo\n\nbar\n");
        assert_eq!(m["A"], "foo\n\nbar");
    }

    #[test]
    fn crlf_input() {
        let m = split_modules("A.dll\r\nfoo\r\n\r\n\r\nB.dll\r\nbaz\r\n");
        assert_eq!(m["A"], "foo");
        assert_eq!(m["B"], "baz");
    }

    #[test]
    fn non_dll_header_is_skipped() {
        let m = split_modules("Total functions: 12\n\n\nA.dll\nfoo");
        assert_eq!(m.len(), 1);
        assert_eq!(m["A"], "foo");
    }

    #[test]
    fn extra_blank_lines_between_sections() {
        let m = split_modules("A.dll\nfoo\n\n\n\n\nB.dll\nbaz");
        assert_eq!(m["A"], "foo");
        assert_eq!(m["B"], "baz");
    }

    #[test]
    fn repeated_header_keeps_later_section() {
        let m = split_modules("A.dll\nfirst\n\n\nB.dll\nbaz\n\n\nA.dll\nsecond\n");
        assert_eq!(m.len(), 2);
        assert_eq!(m["A"], "second");
    }

    #[test]
    fn colliding_file_names_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut modules = BTreeMap::new();
        modules.insert("A:B".to_string(), "colon".to_string());
        modules.insert("A_B".to_string(), "underscore".to_string());
        modules.insert("C".to_string(), "c".to_string());

        let written = write_modules(&modules, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("A_B.txt")).unwrap(), "colon");
        assert_eq!(fs::read_to_string(dir.path().join("C.txt")).unwrap(), "c");
    }

    #[test]
    fn empty_input() {
        assert!(split_modules("").is_empty());
    }

    #[test]
    fn split_file_writes_txt_per_module() {
        let dir = tempfile::tempdir().unwrap();
        let flat = dir.path().join("wasm_mappings.txt");
        fs::write(&flat, "A.dll\nfoo\nbar\n\n\nB.dll\nbaz\n\n\nEmpty.dll\n").unwrap();
        let out = dir.path().join("WASM Mappings");

        let written = split_file(&flat, &out).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(out.join("A.txt")).unwrap(), "foo\nbar");
        assert_eq!(fs::read_to_string(out.join("B.txt")).unwrap(), "baz");
        assert!(!out.join("Empty.txt").exists());
    }
}
