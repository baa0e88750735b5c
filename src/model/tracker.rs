use std::path::PathBuf;

use super::config::TrackerConfig;
use crate::ops::store::TreeStore;

/// A fully loaded tracker directory with its mounted tree
pub struct Tracker {
    /// Directory containing `tracker/`
    pub root: PathBuf,
    /// Path to the `tracker/` directory
    pub tracker_dir: PathBuf,
    /// Parsed tracker.toml
    pub config: TrackerConfig,
    /// Canonical in-memory tree, persisted on every change
    pub store: TreeStore,
}

impl Tracker {
    /// Resolve the configured dataset file, if any
    pub fn dataset_path(&self) -> Option<PathBuf> {
        self.config
            .dataset
            .file
            .as_ref()
            .map(|f| self.tracker_dir.join(f))
    }
}
