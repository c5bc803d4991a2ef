//! Command surface
//!
//! The user-facing operations built on the loader and the orchestrator:
//! launch the current project, launch every project, write a starter
//! config, and watch for new config files.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::loader::{ConfigCandidate, ConfigFormat, ConfigLoader};
use crate::config::watcher::ConfigWatcher;
use crate::error::{Error, Result};
use crate::models::{
    LaunchOutcome, RequestFailure, TerminalColor, TerminalConfig, TerminalLauncherConfig,
};
use crate::session::{Orchestrator, PromptProvider};

/// Launch one project's terminals without a name prefix.
///
/// An explicit `config_path` wins over discovery. With several discovered
/// configs the user picks one. The workspace root holding the chosen config
/// becomes the first root for relative paths.
///
/// # Errors
/// `NoWorkspace` when there is no workspace root and no explicit config;
/// otherwise only host listing failures
pub async fn launch_current_project(
    orchestrator: &mut Orchestrator,
    prompt: &dyn PromptProvider,
    loader: &ConfigLoader,
    config_path: Option<&Path>,
) -> Result<LaunchOutcome> {
    let roots = loader.search_paths();

    let chosen = match config_path {
        Some(path) => explicit_candidate(path, roots),
        None => {
            if roots.is_empty() {
                return Err(Error::NoWorkspace);
            }

            let mut candidates = loader.discover();
            match candidates.len() {
                0 => return Ok(LaunchOutcome::NoConfigFound),
                1 => candidates.remove(0),
                _ => {
                    let paths: Vec<PathBuf> = candidates.iter().map(|c| c.path.clone()).collect();
                    match prompt.select_config(&paths) {
                        Some(index) if index < candidates.len() => candidates.remove(index),
                        _ => return Ok(LaunchOutcome::UserCancelled),
                    }
                }
            }
        }
    };

    let config = match ConfigLoader::load_file(&chosen.path) {
        Ok(config) => config,
        Err(e) => return Ok(LaunchOutcome::ParseError(e.to_string())),
    };

    orchestrator.set_workspace_roots(roots_with_first(roots, &chosen.root));
    orchestrator.launch(&config, None).await
}

/// Launch every discovered project, each under its `"[project] "` prefix.
///
/// Per-project parse and host listing failures are recorded as failures
/// named after the config path; a cancelled project is skipped.
///
/// # Errors
/// `NoWorkspace` without workspace roots
pub async fn launch_all_projects(
    orchestrator: &mut Orchestrator,
    prompt: &dyn PromptProvider,
    loader: &ConfigLoader,
    assume_yes: bool,
) -> Result<LaunchOutcome> {
    let roots = loader.search_paths();
    if roots.is_empty() {
        return Err(Error::NoWorkspace);
    }

    let candidates = loader.discover();
    if candidates.is_empty() {
        return Ok(LaunchOutcome::NoConfigFound);
    }

    let question = format!(
        "Launch terminals for {} project{}?",
        candidates.len(),
        if candidates.len() == 1 { "" } else { "s" }
    );
    if !assume_yes && !prompt.confirm(&question) {
        return Ok(LaunchOutcome::UserCancelled);
    }

    orchestrator.set_workspace_roots(roots.to_vec());

    let mut created = 0;
    let mut failures = Vec::new();

    for candidate in &candidates {
        let config = match ConfigLoader::load_file(&candidate.path) {
            Ok(config) => config,
            Err(error) => {
                warn!("Skipping {}: {}", candidate.path.display(), error);
                failures.push(RequestFailure {
                    name: candidate.path.display().to_string(),
                    error,
                });
                continue;
            }
        };

        match orchestrator.launch(&config, Some(candidate.project_dir())).await {
            Ok(LaunchOutcome::Success { created: n }) => created += n,
            Ok(LaunchOutcome::PartialFailure {
                created: n,
                failures: mut project_failures,
            }) => {
                created += n;
                failures.append(&mut project_failures);
            }
            Ok(LaunchOutcome::UserCancelled) => {
                info!("Skipped {}", candidate.project_dir().display());
            }
            Ok(other) => debug!("{}: {}", candidate.path.display(), other.summary()),
            Err(error) => {
                warn!("Could not launch {}: {}", candidate.path.display(), error);
                failures.push(RequestFailure {
                    name: candidate.path.display().to_string(),
                    error,
                });
            }
        }
    }

    Ok(LaunchOutcome::from_batch(created, failures))
}

/// Write a starter config into the first workspace root
///
/// # Errors
/// `NoWorkspace` without roots, `ConfigExists` if the target file is present
pub fn init_config(loader: &ConfigLoader, format: ConfigFormat) -> Result<PathBuf> {
    let root = loader.search_paths().first().ok_or(Error::NoWorkspace)?;

    let file_name = loader
        .file_names()
        .iter()
        .find(|name| ConfigFormat::for_path(Path::new(name.as_str())) == format)
        .cloned()
        .unwrap_or_else(|| match format {
            ConfigFormat::Json => ".termlaunch.json".to_string(),
            ConfigFormat::Text => ".termlaunch".to_string(),
        });

    let path = root.join(file_name);
    if path.exists() {
        return Err(Error::ConfigExists { path });
    }

    ConfigLoader::save_to_path(&starter_config(), &path, format)?;
    info!("Wrote starter configuration to {}", path.display());
    Ok(path)
}

/// Watch the workspace roots for config files being created
pub fn watch_workspace(loader: &ConfigLoader) -> Result<ConfigWatcher> {
    if loader.search_paths().is_empty() {
        return Err(Error::NoWorkspace);
    }
    ConfigWatcher::new(
        loader.search_paths(),
        loader.file_names().to_vec(),
        loader.max_depth() > 1,
    )
}

/// Two terminals showing the common fields
pub fn starter_config() -> TerminalLauncherConfig {
    let mut shell = TerminalConfig::named("shell");
    shell.color = Some(TerminalColor::Green);

    let mut status = TerminalConfig::named("status");
    status.cwd = Some(PathBuf::from("."));
    status.commands = Some(vec!["git status".to_string(), "ls".to_string()]);
    status.color = Some(TerminalColor::Blue);

    let mut config = TerminalLauncherConfig::from_terminals(vec![shell, status]);
    config.version = Some("1.0".to_string());
    config
}

fn explicit_candidate(path: &Path, roots: &[PathBuf]) -> ConfigCandidate {
    let root = roots
        .iter()
        .find(|root| path.starts_with(root))
        .cloned()
        .or_else(|| path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    ConfigCandidate {
        path: path.to_path_buf(),
        root,
    }
}

/// `first` followed by the remaining roots in their original order
fn roots_with_first(roots: &[PathBuf], first: &Path) -> Vec<PathBuf> {
    let mut ordered = vec![first.to_path_buf()];
    ordered.extend(roots.iter().filter(|r| r.as_path() != first).cloned());
    ordered
}
