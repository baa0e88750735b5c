use std::path::{Path, PathBuf};

use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::dataset_io::{self, DatasetError};
use crate::io::storage::FileStorage;
use crate::model::config::TrackerConfig;
use crate::model::tracker::Tracker;
use crate::model::tree::Tree;
use crate::ops::store::TreeStore;
use crate::ops::transform::transform_dataset;

pub const TRACKER_DIR: &str = "tracker";

/// Error type for tracker directory operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("not a question tracker: no tracker/ directory found")]
    NotATracker,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse tracker.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse tracker.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `tracker/tracker.toml`.
/// Returns the directory that contains `tracker/`.
pub fn discover_tracker(start: &Path) -> Result<PathBuf, TrackerError> {
    let mut current = start.to_path_buf();
    loop {
        let tracker_dir = current.join(TRACKER_DIR);
        if tracker_dir.is_dir() && tracker_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(TrackerError::NotATracker);
        }
    }
}

/// File storage configured for a tracker directory
pub fn storage_for(tracker_dir: &Path, config: &TrackerConfig) -> FileStorage {
    FileStorage::new(tracker_dir.join(&config.storage.dir))
}

/// Build the initial tree from the configured dataset, or an empty tree
/// when none is configured.
pub fn dataset_tree(tracker_dir: &Path, config: &TrackerConfig) -> Result<Tree, TrackerError> {
    match &config.dataset.file {
        Some(file) => {
            let dataset = dataset_io::read_dataset(&tracker_dir.join(file))?;
            Ok(transform_dataset(&dataset))
        }
        None => Ok(Tree::default()),
    }
}

/// What to mount when nothing usable is saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The configured dataset; an unreadable dataset fails the load
    Dataset,
    /// The configured dataset, or an empty tree when it cannot be read.
    /// For commands that replace the tree anyway.
    DatasetOrEmpty,
}

/// Load config and mount the tree for the tracker rooted at `root`.
pub fn load_tracker(root: &Path) -> Result<Tracker, TrackerError> {
    load_tracker_with(root, Fallback::Dataset)
}

pub fn load_tracker_with(root: &Path, fallback: Fallback) -> Result<Tracker, TrackerError> {
    let tracker_dir = root.join(TRACKER_DIR);
    if !tracker_dir.is_dir() {
        return Err(TrackerError::NotATracker);
    }

    let (config, _doc) = config_io::read_config(&tracker_dir)?;
    let storage = storage_for(&tracker_dir, &config);
    let store = TreeStore::mount(Box::new(storage), Some(tracker_dir.clone()), || {
        match (dataset_tree(&tracker_dir, &config), fallback) {
            (Err(e), Fallback::DatasetOrEmpty) => {
                tracing::warn!(error = %e, "dataset unavailable, starting from an empty tree");
                Ok(Tree::default())
            }
            (result, _) => result,
        }
    })?;
    tracing::debug!(
        root = %root.display(),
        source = ?store.source(),
        "tracker loaded"
    );

    Ok(Tracker {
        root: root.to_path_buf(),
        tracker_dir,
        config,
        store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::{STORAGE_KEY, save_tree};
    use crate::ops::store::MountSource;
    use crate::ops::tree_ops;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = r#"{"data":{"sheet":{"name":"Mini","description":""},"questions":[
        {"_id":"q1","questionId":{"name":"Two Sum","difficulty":"Easy","platform":"leetcode",
          "problemUrl":"https://leetcode.com/problems/two-sum/","topics":["Arrays"]},
         "topic":"Arrays","subTopic":"Easy","resource":"","isSolved":false}]}}"#;

    fn setup(root: &Path, dataset: bool) {
        let dir = root.join(TRACKER_DIR);
        fs::create_dir_all(&dir).unwrap();
        let mut config = String::from("[tracker]\nname = \"Mini\"\n");
        if dataset {
            fs::write(dir.join("sheet.json"), DATASET).unwrap();
            config.push_str("\n[dataset]\nfile = \"sheet.json\"\n");
        }
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
    }

    #[test]
    fn discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        setup(tmp.path(), false);
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_tracker(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn discover_fails_outside_tracker() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(discover_tracker(tmp.path()), Err(TrackerError::NotATracker)));
    }

    #[test]
    fn load_uses_dataset_until_saved() {
        let tmp = TempDir::new().unwrap();
        setup(tmp.path(), true);

        let mut tracker = load_tracker(tmp.path()).unwrap();
        assert_eq!(tracker.store.source(), MountSource::Fallback);
        assert_eq!(tracker.store.tree().topics[0].id, "arrays");

        tracker
            .store
            .apply(|t| tree_ops::toggle_question_status(t, "arrays", "easy", "q1"));
        assert!(
            tmp.path()
                .join("tracker/storage")
                .join(format!("{}.json", STORAGE_KEY))
                .exists()
        );

        let reloaded = load_tracker(tmp.path()).unwrap();
        assert_eq!(reloaded.store.source(), MountSource::Persisted);
        assert!(reloaded.store.tree().find_question("q1").unwrap().2.is_completed());
    }

    #[test]
    fn no_dataset_means_empty_tree() {
        let tmp = TempDir::new().unwrap();
        setup(tmp.path(), false);
        let tracker = load_tracker(tmp.path()).unwrap();
        assert!(tracker.store.tree().is_empty());
        assert!(tracker.dataset_path().is_none());
    }

    #[test]
    fn missing_dataset_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        setup(tmp.path(), true);
        fs::remove_file(tmp.path().join("tracker/sheet.json")).unwrap();
        assert!(matches!(load_tracker(tmp.path()), Err(TrackerError::Dataset(_))));

        let tracker = load_tracker_with(tmp.path(), Fallback::DatasetOrEmpty).unwrap();
        assert_eq!(tracker.store.source(), MountSource::Fallback);
        assert!(tracker.store.tree().is_empty());
    }

    #[test]
    fn saved_state_does_not_need_dataset() {
        let tmp = TempDir::new().unwrap();
        setup(tmp.path(), true);
        let tracker_dir = tmp.path().join(TRACKER_DIR);
        let (config, _) = config_io::read_config(&tracker_dir).unwrap();
        let mut storage = storage_for(&tracker_dir, &config);
        save_tree(&mut storage, &tree_ops::add_topic_with_id(&Tree::default(), "t", "T"));
        fs::remove_file(tracker_dir.join("sheet.json")).unwrap();

        let tracker = load_tracker(tmp.path()).unwrap();
        assert_eq!(tracker.store.tree().topics[0].id, "t");
    }
}
