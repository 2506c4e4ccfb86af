//! Feature params file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_feature_params;
use crate::features::FeatureParams;

/// Monitors the feature params file and emits freshly parsed params.
pub struct ParamsWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<Vec<FeatureParams>>,
}

impl ParamsWatcher {
    /// Create a new ParamsWatcher.
    ///
    /// Returns the watcher and a receiver for parsed params.
    pub fn new(
        path: &Path,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Vec<FeatureParams>>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    ///
    /// The parent directory is watched so editors that replace the file
    /// through a rename are still picked up.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_relevant(&event, &path) {
                        return;
                    }
                    tracing::info!(path = %path.display(), "Feature params changed, reloading");
                    match load_feature_params(&path) {
                        Ok(params) => {
                            let _ = tx.send(params);
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Failed to reload feature params, keeping current fragments"
                            );
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        let target = watch_target(&self.path);
        watcher.watch(&target, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Feature params watcher started");
        Ok(watcher)
    }
}

fn watch_target(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Content-changing event touching the watched file.
fn is_relevant(event: &Event, path: &Path) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p == path || p.file_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevant_events() {
        let watched = Path::new("/etc/composer/features.json");

        assert!(is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/composer/features.json"),
            watched
        ));
        assert!(is_relevant(
            &event(EventKind::Create(CreateKind::File), "/etc/composer/features.json"),
            watched
        ));
        assert!(!is_relevant(
            &event(EventKind::Modify(ModifyKind::Any), "/etc/composer/skeleton.json"),
            watched
        ));
        assert!(!is_relevant(
            &event(EventKind::Remove(RemoveKind::File), "/etc/composer/features.json"),
            watched
        ));
    }

    #[test]
    fn test_watch_target_is_parent() {
        assert_eq!(watch_target(Path::new("/a/b/features.json")), PathBuf::from("/a/b"));
        assert_eq!(watch_target(Path::new("features.json")), PathBuf::from("."));
    }
}
