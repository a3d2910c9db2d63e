//! The single source of truth for the currently selected location.
//!
//! [`SelectionStore`] wraps a `tokio::sync::watch` channel: every update
//! replaces the whole value, and readers borrow a complete snapshot, so a
//! half-written [`Location`] is never observable. Writes happen on the main
//! event loop, which makes "last write wins" follow call order.
//!
//! When a persistence path is configured the store reloads the previous
//! selection at startup and rewrites the file after each change.

use crate::error::Result;
use crate::models::Location;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct SelectionStore {
    tx: Arc<watch::Sender<Option<Location>>>,
    persist_path: Option<PathBuf>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    /// An in-memory store that starts with nothing selected.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            persist_path: None,
        }
    }

    /// A store that restores and saves the selection at `path`.
    ///
    /// A missing or unreadable file starts the session with no selection.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match read_selection(&path) {
            Ok(loc) => {
                if let Some(ref l) = loc {
                    info!("Restored selection '{}' from {}", l.label, path.display());
                }
                loc
            }
            Err(e) => {
                warn!("Could not restore selection from {}: {}", path.display(), e);
                None
            }
        };

        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            persist_path: Some(path),
        }
    }

    pub fn get(&self) -> Option<Location> {
        self.tx.borrow().clone()
    }

    /// Replaces the selection.
    pub fn update(&self, location: Location) {
        debug!("Selection updated to '{}'", location.label);
        self.replace(Some(location));
    }

    pub fn clear(&self) {
        debug!("Selection cleared");
        self.replace(None);
    }

    /// A receiver that is notified on every replace.
    pub fn subscribe(&self) -> watch::Receiver<Option<Location>> {
        self.tx.subscribe()
    }

    fn replace(&self, value: Option<Location>) {
        self.tx.send_replace(value);

        if let Some(path) = &self.persist_path {
            let snapshot = self.tx.borrow().clone();
            if let Err(e) = write_selection(path, snapshot.as_ref()) {
                warn!("Failed to persist selection to {}: {}", path.display(), e);
            }
        }
    }
}

fn read_selection(path: &Path) -> Result<Option<Location>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_selection(path: &Path, location: Option<&Location>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&location)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(SelectionStore::new().get(), None);
    }

    #[test]
    fn update_replaces_whole_record() {
        let store = SelectionStore::new();
        let mut first = Location::new(103.851, 1.285, "Maybank");
        first.raw = serde_json::json!({ "place_id": 1 });
        store.update(first);

        let second = Location::new(103.852, 1.293, "City Hall");
        store.update(second.clone());

        // No field of the first record survives.
        assert_eq!(store.get(), Some(second));
    }

    #[test]
    fn clones_share_state_and_last_write_wins() {
        let store = SelectionStore::new();
        let other = store.clone();

        store.update(Location::new(1.0, 1.0, "a"));
        other.update(Location::new(2.0, 2.0, "b"));

        assert_eq!(store.get().map(|l| l.label), Some("b".to_string()));
        other.clear();
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn subscribers_see_the_latest_value() {
        let store = SelectionStore::new();
        let mut rx = store.subscribe();

        let loc = Location::new(103.852, 1.293, "City Hall");
        store.update(loc.clone());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(loc));
    }

    #[test]
    fn persisted_selection_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("selection.json");

        let store = SelectionStore::with_persistence(&path);
        assert_eq!(store.get(), None);
        store.update(Location::new(103.852, 1.293, "City Hall"));

        let restored = SelectionStore::with_persistence(&path);
        assert_eq!(restored.get().map(|l| l.label), Some("City Hall".to_string()));

        restored.clear();
        assert_eq!(SelectionStore::with_persistence(&path).get(), None);
    }

    #[test]
    fn corrupt_persistence_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(SelectionStore::with_persistence(&path).get(), None);
    }
}
