//! Release archive extraction and relocation into the install directory.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether a release asset name denotes a gzip'd tarball.
pub fn is_tar_gz(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".tar.gz") || lower.ends_with(".tgz")
}

/// Unpack a `.tar.gz` held in memory into `dest`.
pub fn unpack_tar_gz(bytes: &[u8], dest: &Path) -> io::Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive.unpack(dest)
}

/// Unpack, tolerating an extraction error as long as `exe_name` made it out.
///
/// Some upstream archives fail partway through with a read error even though
/// every file has been written; that failure is logged and ignored. Returns
/// the directory that contains `exe_name`.
pub fn extract_archive(bytes: &[u8], dest: &Path, exe_name: &str) -> Result<PathBuf> {
    let unpacked = unpack_tar_gz(bytes, dest);
    let found = find_file_dir(dest, exe_name)?;
    match (unpacked, found) {
        (Ok(()), Some(dir)) => Ok(dir),
        (Err(e), Some(dir)) => {
            tracing::warn!("ignoring archive extraction error after {} was extracted: {}", exe_name, e);
            Ok(dir)
        }
        (Ok(()), None) => anyhow::bail!("archive does not contain {}", exe_name),
        (Err(e), None) => Err(e).context("extract release archive"),
    }
}

/// Depth-first search under `root` for a file named `name`; returns its parent.
pub fn find_file_dir(root: &Path, name: &str) -> Result<Option<PathBuf>> {
    if !root.is_dir() {
        return Ok(None);
    }
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if entry.file_name() == name {
            return Ok(Some(root.to_path_buf()));
        }
    }
    subdirs.sort();
    for dir in subdirs {
        if let Some(found) = find_file_dir(&dir, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Move every entry of `src` into `dst` (created if needed). Falls back to
/// copying when a rename crosses filesystems.
pub fn relocate_contents(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("read {}", src.display()))? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if fs::rename(&from, &to).is_ok() {
            continue;
        }
        if from.is_dir() {
            relocate_contents(&from, &to)?;
        } else {
            fs::copy(&from, &to)
                .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
        }
    }
    Ok(())
}

/// Set 0o755 on every regular file directly inside `dir`.
#[cfg(unix)]
pub fn mark_executable(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() {
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn mark_executable(_dir: &Path) -> Result<()> {
    Ok(())
}
