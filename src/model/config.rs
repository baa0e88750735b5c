use serde::{Deserialize, Serialize};

/// Configuration from tracker.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub tracker: TrackerInfo,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding persisted state, relative to the tracker directory
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> String {
    "storage".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Sheet export used as the initial tree, relative to the tracker directory
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing level used when no -v flag is given ("warn" if absent)
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Question titles longer than this many terminal cells are truncated in listings
    #[serde(default = "default_title_width")]
    pub title_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            title_width: default_title_width(),
        }
    }
}

fn default_title_width() -> usize {
    60
}
