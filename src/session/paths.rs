//! Working directory and script path resolution
//!
//! Absolute paths are used verbatim. Relative paths are joined to the
//! project directory when there is one, else to the first workspace root,
//! then `.` and `..` segments are folded lexically. A leading `~/` expands
//! to the home directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Directory relative paths are joined to
pub fn anchor<'a>(base_path: Option<&'a Path>, roots: &'a [PathBuf]) -> Option<&'a Path> {
    base_path.or_else(|| roots.first().map(PathBuf::as_path))
}

/// Resolve a configured path
///
/// # Errors
/// `PathResolution` when the path is relative and there is neither a base
/// path nor a workspace root
pub fn resolve(path: &Path, base_path: Option<&Path>, roots: &[PathBuf]) -> Result<PathBuf> {
    if let Some(expanded) = expand_home(path) {
        return Ok(expanded);
    }

    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    anchor(base_path, roots)
        .map(|dir| normalize(&dir.join(path)))
        .ok_or_else(|| Error::PathResolution {
            path: path.display().to_string(),
        })
}

/// Resolve a terminal's `cwd`; absent means the anchor directory, or the
/// host default when there is none
pub fn resolve_cwd(
    cwd: Option<&Path>,
    base_path: Option<&Path>,
    roots: &[PathBuf],
) -> Result<Option<PathBuf>> {
    match cwd.filter(|c| !c.as_os_str().is_empty()) {
        Some(cwd) => resolve(cwd, base_path, roots).map(Some),
        None => Ok(anchor(base_path, roots).map(Path::to_path_buf)),
    }
}

fn expand_home(path: &Path) -> Option<PathBuf> {
    let rest = path.strip_prefix("~").ok()?;
    dirs::home_dir().map(|home| normalize(&home.join(rest)))
}

/// Fold `.` and `..` without touching the file system. `..` never climbs
/// above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
