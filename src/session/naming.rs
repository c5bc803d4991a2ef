//! Session naming: project prefix and collision renames

use std::collections::HashSet;
use std::path::Path;

/// `"[project] name"` when launched for a project directory, else `name`
pub fn effective_name(name: &str, base_path: Option<&Path>) -> String {
    match base_path {
        Some(base) => format!("[{}] {}", project_label(base), name),
        None => name.to_string(),
    }
}

/// Last path component of the project directory
pub fn project_label(base: &Path) -> String {
    base.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| base.display().to_string())
}

/// Smallest `"name (N)"` with `N >= 2` that is neither live nor reserved
/// by the current batch
pub fn next_free_name(name: &str, live: &HashSet<String>, reserved: &HashSet<String>) -> String {
    (2u32..)
        .map(|n| format!("{} ({})", name, n))
        .find(|candidate| !live.contains(candidate) && !reserved.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}
