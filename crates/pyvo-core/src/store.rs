//! The currently served data, replaced wholesale on reload.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::LoadError;
use crate::load_root;
use crate::root::Root;

/// Holds the installed [`Root`] and swaps in a new one on reload.
///
/// Readers take an `Arc` snapshot and keep it for as long as they need;
/// a reload builds the replacement off to the side and installs it with a
/// single pointer swap, so a reader sees either the old graph or the new
/// one. Reloads are serialized.
#[derive(Debug)]
pub struct DataStore {
    data_dir: PathBuf,
    current: RwLock<Arc<Root>>,
    reload_lock: Mutex<()>,
}

impl DataStore {
    /// Load the tree at `data_dir`. Fails if the initial load fails.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let data_dir = data_dir.into();
        let root = load_root(&data_dir)?;
        Ok(Self {
            data_dir,
            current: RwLock::new(Arc::new(root)),
            reload_lock: Mutex::new(()),
        })
    }

    /// Wrap an already built root, e.g. in tests.
    pub fn from_root(data_dir: impl Into<PathBuf>, root: Root) -> Self {
        Self {
            data_dir: data_dir.into(),
            current: RwLock::new(Arc::new(root)),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Snapshot of the installed root.
    pub fn current(&self) -> Arc<Root> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuild from disk and install the result.
    ///
    /// On failure the previously installed root stays in place and the
    /// error is returned.
    pub fn reload(&self) -> Result<Arc<Root>, LoadError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let root = match load_root(&self.data_dir) {
            Ok(root) => Arc::new(root),
            Err(e) => {
                tracing::warn!("Reload of {} rejected: {}", self.data_dir.display(), e);
                return Err(e);
            }
        };

        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&root);
        tracing::info!("Reloaded data from {}", self.data_dir.display());
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{write_sample, write_tree};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_snapshot() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());

        let store = DataStore::open(dir.path()).unwrap();
        assert_eq!(store.current().events().len(), 3);
        assert_eq!(store.data_dir(), dir.path());
    }

    #[test]
    fn test_open_fails_on_bad_tree() {
        let dir = tempdir().unwrap();
        write_tree(dir.path(), &[("meta.yaml", "version: 3\n")]);

        assert!(DataStore::open(dir.path()).is_err());
    }

    #[test]
    fn test_reload_swaps_in_new_data() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let store = DataStore::open(dir.path()).unwrap();
        let before = store.current();

        write_tree(
            dir.path(),
            &[(
                "series/praha-pyvo/events/2024-07-17.yaml",
                "name: Pražské Pyvo\ncity: praha\nstart: 2024-07-17\n",
            )],
        );
        let after = store.reload().unwrap();

        assert_eq!(after.events().len(), 4);
        assert_eq!(store.current().events().len(), 4);
        // Old snapshots are unaffected.
        assert_eq!(before.events().len(), 3);
    }

    #[test]
    fn test_failed_reload_keeps_previous_root() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let store = DataStore::open(dir.path()).unwrap();

        fs::write(
            dir.path().join("series/praha-pyvo/events/2024-06-19.yaml"),
            "name: Pražské Pyvo\nstart: 2024-06-19\n",
        )
        .unwrap();

        let err = store.reload().unwrap_err();
        assert!(matches!(err, LoadError::MissingField { .. }));
        let current = store.current();
        assert_eq!(current.events().len(), 3);
        assert!(current.event_in_series("praha-pyvo", "2024-06").is_some());
    }

    #[test]
    fn test_concurrent_readers_see_whole_roots() {
        let dir = tempdir().unwrap();
        write_sample(dir.path());
        let store = Arc::new(DataStore::open(dir.path()).unwrap());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let root = store.current();
                        let total: usize =
                            root.all_series().iter().map(|s| s.events.len()).sum();
                        assert_eq!(total, root.events().len());
                    }
                })
            })
            .collect();
        for _ in 0..5 {
            store.reload().unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
