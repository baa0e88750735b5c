use crate::io::storage::{Storage, StorageError};
use crate::model::tree::Tree;
use crate::ops::check::check_tree;

/// Storage key holding the serialized tree
pub const STORAGE_KEY: &str = "question-tracker-state";

/// Read and validate the persisted tree. `Ok(None)` when nothing is stored.
pub fn try_load_tree(storage: &dyn Storage) -> Result<Option<Tree>, StorageError> {
    let Some(raw) = storage.get(STORAGE_KEY)? else {
        return Ok(None);
    };
    let tree: Tree = serde_json::from_str(&raw).map_err(StorageError::Malformed)?;
    let issues = check_tree(&tree);
    if let Some(first) = issues.first() {
        return Err(StorageError::Invalid(format!(
            "{} ({} issue{})",
            first,
            issues.len(),
            if issues.len() == 1 { "" } else { "s" }
        )));
    }
    Ok(Some(tree))
}

/// Serialize and store the tree, replacing whatever was there
pub fn try_save_tree(storage: &mut dyn Storage, tree: &Tree) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(tree).map_err(StorageError::Encode)?;
    storage.set(STORAGE_KEY, &json)
}

/// Raw stored value, for preserving data that failed to load
pub fn read_raw(storage: &dyn Storage) -> Option<String> {
    storage.get(STORAGE_KEY).ok().flatten()
}

/// Load the persisted tree, logging and returning `None` on any failure
pub fn load_tree(storage: &dyn Storage) -> Option<Tree> {
    match try_load_tree(storage) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load saved tree");
            None
        }
    }
}

/// Persist the tree, logging on failure. Returns whether it was stored.
pub fn save_tree(storage: &mut dyn Storage, tree: &Tree) -> bool {
    match try_save_tree(storage, tree) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "failed to save tree");
            false
        }
    }
}

/// Remove the persisted tree, logging on failure
pub fn clear_tree(storage: &mut dyn Storage) {
    if let Err(e) = storage.remove(STORAGE_KEY) {
        tracing::warn!(error = %e, "failed to clear saved tree");
    }
}
