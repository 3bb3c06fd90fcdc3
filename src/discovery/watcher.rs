//! Project source watcher for development rebuilds.
//!
//! Only the `watch` command uses this. Resolving workers never watch
//! sources; a rebuild is always an explicit, single-writer bootstrap.

use std::path::PathBuf;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A change under one of the project directories.
#[derive(Debug, Clone)]
pub struct SourceChange {
    pub paths: Vec<PathBuf>,
}

/// A watcher that monitors the project directories for source changes.
pub struct SourceWatcher {
    dirs: Vec<PathBuf>,
    source_extension: String,
    change_tx: mpsc::UnboundedSender<SourceChange>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher.
    ///
    /// Returns the watcher and a receiver for change notifications.
    pub fn new(dirs: &[PathBuf], source_extension: &str) -> (Self, mpsc::UnboundedReceiver<SourceChange>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (Self {
            dirs: dirs.to_vec(),
            source_extension: source_extension.to_string(),
            change_tx,
        }, change_rx)
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();
        let extension = self.source_extension.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        return;
                    }
                    let paths: Vec<PathBuf> = event
                        .paths
                        .into_iter()
                        .filter(|p| p.extension().is_some_and(|ext| ext == extension.as_str()))
                        .collect();
                    if !paths.is_empty() {
                        tracing::debug!(?paths, "Source change detected");
                        let _ = tx.send(SourceChange { paths });
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        for dir in &self.dirs {
            watcher.watch(dir, RecursiveMode::Recursive)?;
        }

        tracing::info!(dirs = ?self.dirs, "Source watcher started");
        Ok(watcher)
    }
}
