use std::path::PathBuf;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::state;
use crate::io::storage::{Storage, StorageError};
use crate::model::tree::Tree;

/// Where the mounted tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountSource {
    /// Loaded from storage
    Persisted,
    /// Nothing stored (or storage unreadable); fallback tree in use
    Fallback,
    /// Stored data failed validation; fallback tree in use
    Rejected,
}

/// Holds the canonical tree for a session.
///
/// A store only exists once mounted, so the tree it exposes is always the
/// final startup tree, never a default that is later swapped out. Every
/// change replaces the whole tree and writes it to storage; a failed write
/// leaves the in-memory tree authoritative.
pub struct TreeStore {
    tree: Tree,
    storage: Box<dyn Storage>,
    recovery_dir: Option<PathBuf>,
    source: MountSource,
    last_save_ok: bool,
}

impl TreeStore {
    /// Load the persisted tree, or build one with `fallback` when nothing
    /// usable is stored. Rejected data is copied to the recovery log in
    /// `recovery_dir` before the fallback takes over, unless the newest
    /// rejected entry already holds the same data.
    pub fn mount<E>(
        storage: Box<dyn Storage>,
        recovery_dir: Option<PathBuf>,
        fallback: impl FnOnce() -> Result<Tree, E>,
    ) -> Result<Self, E> {
        let (tree, source) = match state::try_load_tree(storage.as_ref()) {
            Ok(Some(tree)) => {
                tracing::debug!(topics = tree.topics.len(), "mounted saved tree");
                (tree, MountSource::Persisted)
            }
            Ok(None) => (fallback()?, MountSource::Fallback),
            Err(e @ (StorageError::Malformed(_) | StorageError::Invalid(_))) => {
                tracing::warn!(error = %e, "saved tree rejected, starting from dataset");
                if let (Some(dir), Some(raw)) = (&recovery_dir, state::read_raw(storage.as_ref())) {
                    // The blob stays stored until the next write; keep one copy
                    if recovery::latest_body_matches(dir, RecoveryCategory::Rejected, &raw) {
                        tracing::debug!("rejected tree already in recovery log");
                    } else {
                        recovery::log_recovery(
                            dir,
                            RecoveryEntry::now(RecoveryCategory::Rejected, e.to_string(), raw),
                        );
                    }
                }
                (fallback()?, MountSource::Rejected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "storage unreadable, starting from dataset");
                (fallback()?, MountSource::Fallback)
            }
        };

        Ok(TreeStore {
            tree,
            storage,
            recovery_dir,
            source,
            last_save_ok: true,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn source(&self) -> MountSource {
        self.source
    }

    /// Whether the most recent write reached storage
    pub fn last_save_ok(&self) -> bool {
        self.last_save_ok
    }

    /// Run a tree operation. When it changes the tree, the result replaces
    /// the current tree and is persisted. Returns whether anything changed.
    pub fn apply(&mut self, op: impl FnOnce(&Tree) -> Tree) -> bool {
        let next = op(&self.tree);
        self.replace(next)
    }

    /// Install `tree` as the current tree and persist it if it differs
    pub fn replace(&mut self, tree: Tree) -> bool {
        if tree == self.tree {
            tracing::debug!("tree unchanged, nothing to save");
            return false;
        }
        self.tree = tree;
        self.persist();
        true
    }

    /// Forget the saved tree and start over from `fallback`
    pub fn reset(&mut self, fallback: Tree) {
        state::clear_tree(self.storage.as_mut());
        self.tree = fallback;
        self.source = MountSource::Fallback;
    }

    fn persist(&mut self) {
        self.last_save_ok = state::save_tree(self.storage.as_mut(), &self.tree);
        if self.last_save_ok {
            return;
        }
        if let Some(dir) = &self.recovery_dir
            && let Ok(json) = serde_json::to_string_pretty(&self.tree)
        {
            recovery::log_recovery(
                dir,
                RecoveryEntry::now(RecoveryCategory::Write, "tree not saved", json),
            );
        }
    }

    /// Give back the storage backend, consuming the store
    pub fn into_storage(self) -> Box<dyn Storage> {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::io::state::{STORAGE_KEY, load_tree, save_tree};
    use crate::io::storage::MemoryStorage;
    use crate::model::tree::Topic;
    use crate::ops::tree_ops;
    use std::convert::Infallible;
    use tempfile::TempDir;

    fn dataset_tree() -> Tree {
        Tree::new(vec![Topic {
            id: "arrays".into(),
            title: "Arrays".into(),
            subtopics: vec![],
        }])
    }

    fn mount(storage: MemoryStorage, dir: Option<PathBuf>) -> TreeStore {
        TreeStore::mount(Box::new(storage), dir, || Ok::<_, Infallible>(dataset_tree())).unwrap()
    }

    #[test]
    fn mounts_fallback_when_nothing_saved() {
        let store = mount(MemoryStorage::new(), None);
        assert_eq!(store.source(), MountSource::Fallback);
        assert_eq!(store.tree(), &dataset_tree());
    }

    #[test]
    fn saved_tree_wins_over_fallback() {
        let mut storage = MemoryStorage::new();
        let saved = tree_ops::add_topic_with_id(&Tree::default(), "graphs", "Graphs");
        save_tree(&mut storage, &saved);

        let mut called = false;
        let store = TreeStore::mount(Box::new(storage), None, || {
            called = true;
            Ok::<_, Infallible>(dataset_tree())
        })
        .unwrap();
        assert!(!called);
        assert_eq!(store.source(), MountSource::Persisted);
        assert_eq!(store.tree(), &saved);
    }

    #[test]
    fn fallback_error_propagates() {
        let result = TreeStore::mount(Box::new(MemoryStorage::new()), None, || Err("no dataset"));
        assert_eq!(result.err(), Some("no dataset"));
    }

    #[test]
    fn apply_persists_changes() {
        let mut store = mount(MemoryStorage::new(), None);
        assert!(store.apply(|t| tree_ops::rename_topic(t, "arrays", "Arrays & Hashing")));
        assert!(store.last_save_ok());

        let storage = store.into_storage();
        let saved = load_tree(storage.as_ref()).unwrap();
        assert_eq!(saved.topics[0].title, "Arrays & Hashing");
    }

    #[test]
    fn noop_does_not_write() {
        let mut store = mount(MemoryStorage::new(), None);
        assert!(!store.apply(|t| tree_ops::delete_topic(t, "missing")));
        let storage = store.into_storage();
        assert!(storage.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn failed_write_keeps_memory_state_and_records_recovery() {
        let tmp = TempDir::new().unwrap();
        let mut store = mount(MemoryStorage::with_quota(10), Some(tmp.path().to_path_buf()));

        assert!(store.apply(|t| tree_ops::add_topic_with_id(t, "graphs", "Graphs")));
        assert!(!store.last_save_ok());
        assert!(store.tree().topic("graphs").is_some());

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("\"graphs\""));
    }

    #[test]
    fn disabled_storage_still_runs_session() {
        let mut store = mount(MemoryStorage::disabled(), None);
        assert_eq!(store.source(), MountSource::Fallback);
        assert!(store.apply(|t| tree_ops::add_topic_with_id(t, "x", "X")));
        assert!(!store.last_save_ok());
        assert_eq!(store.tree().topics.len(), 2);
    }

    #[test]
    fn rejected_data_falls_back_and_is_preserved() {
        let tmp = TempDir::new().unwrap();
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "{\"version\": 2}").unwrap();

        let store = mount(storage, Some(tmp.path().to_path_buf()));
        assert_eq!(store.source(), MountSource::Rejected);
        assert_eq!(store.tree(), &dataset_tree());

        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Rejected);
        assert_eq!(entries[0].body, "{\"version\": 2}");
    }

    #[test]
    fn same_rejected_data_is_preserved_once() {
        let tmp = TempDir::new().unwrap();
        let rejected = |raw: &str| {
            let mut storage = MemoryStorage::new();
            storage.set(STORAGE_KEY, raw).unwrap();
            mount(storage, Some(tmp.path().to_path_buf())).source()
        };

        assert_eq!(rejected("{\"version\": 2}"), MountSource::Rejected);
        assert_eq!(rejected("{\"version\": 2}"), MountSource::Rejected);
        assert_eq!(read_recovery_entries(tmp.path(), None).len(), 1);

        rejected("[{\"id\": 1}]");
        let entries = read_recovery_entries(tmp.path(), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "[{\"id\": 1}]");
    }

    #[test]
    fn reset_clears_storage() {
        let mut store = mount(MemoryStorage::new(), None);
        store.apply(|t| tree_ops::add_topic_with_id(t, "x", "X"));
        store.reset(dataset_tree());
        assert_eq!(store.tree(), &dataset_tree());
        let storage = store.into_storage();
        assert!(load_tree(storage.as_ref()).is_none());
    }
}
