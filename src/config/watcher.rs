//! Configuration File Watcher
//!
//! Reports launcher config files as they appear under the workspace roots.
//! Appearance is informational only; nothing is launched from here.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Watches workspace roots for newly created config files
pub struct ConfigWatcher {
    /// File names that count as launcher configs
    file_names: Vec<String>,
    /// File system watcher
    _watcher: RecommendedWatcher,
    /// Receiver for file system events
    event_rx: Receiver<notify::Result<Event>>,
    /// Cleared when the event channel closes or `stop` is called
    is_watching: Arc<AtomicBool>,
}

impl ConfigWatcher {
    /// Create a watcher over the given roots
    ///
    /// # Errors
    /// Returns `WatchFailed` if the watcher cannot be created or a root
    /// cannot be watched
    pub fn new(roots: &[PathBuf], file_names: Vec<String>, recursive: bool) -> Result<Self> {
        let (event_tx, event_rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = event_tx.send(res) {
                error!("Failed to send file watch event: {}", e);
            }
        })
        .map_err(|e| Error::WatchFailed {
            reason: format!("Failed to create watcher: {}", e),
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        for root in roots {
            watcher.watch(root, mode).map_err(|e| Error::WatchFailed {
                reason: format!("Failed to watch {}: {}", root.display(), e),
            })?;
            info!("Watching {} for config files", root.display());
        }

        Ok(Self {
            file_names,
            _watcher: watcher,
            event_rx,
            is_watching: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Drain pending events and return config files that were created
    pub fn poll_created(&mut self) -> Vec<PathBuf> {
        let mut created = Vec::new();

        loop {
            match self.event_rx.try_recv() {
                Ok(Ok(event)) => {
                    if !matches!(event.kind, EventKind::Create(_)) {
                        continue;
                    }
                    for path in event.paths {
                        if self.is_config_path(&path) && !created.contains(&path) {
                            debug!("Config file created: {}", path.display());
                            created.push(path);
                        }
                    }
                }
                Ok(Err(e)) => {
                    error!("File watch error: {}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("File watch channel disconnected");
                    self.is_watching.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }

        created
    }

    fn is_config_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| self.file_names.iter().any(|f| f == name))
            .unwrap_or(false)
    }

    /// Poll in the background, invoking `on_created` for every new config file
    pub fn start_background_watch(
        mut self,
        on_created: impl Fn(PathBuf) + Send + 'static,
    ) -> WatchHandle {
        let is_watching = Arc::clone(&self.is_watching);
        let task = tokio::spawn(async move {
            loop {
                for path in self.poll_created() {
                    on_created(path);
                }

                if !self.is_watching() {
                    warn!("Config watcher stopped");
                    break;
                }

                sleep(POLL_INTERVAL).await;
            }
        });

        WatchHandle { task, is_watching }
    }

    /// Stop watching
    pub fn stop(&mut self) {
        self.is_watching.store(false, Ordering::SeqCst);
    }

    /// Check if the watcher is still active
    pub fn is_watching(&self) -> bool {
        self.is_watching.load(Ordering::SeqCst)
    }
}

/// Control over a watcher polling in the background
pub struct WatchHandle {
    task: JoinHandle<()>,
    is_watching: Arc<AtomicBool>,
}

impl WatchHandle {
    /// Ask the polling task to exit after its current pass
    pub fn stop(&self) {
        self.is_watching.store(false, Ordering::SeqCst);
    }

    pub fn is_watching(&self) -> bool {
        self.is_watching.load(Ordering::SeqCst)
    }

    /// Resolve once watching has ended, by `stop` or a closed event channel
    pub async fn stopped(&self) {
        while self.is_watching() {
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for the polling task to exit
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Config watcher task failed: {}", e);
        }
    }
}
