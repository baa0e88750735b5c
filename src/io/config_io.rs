use std::fs;
use std::path::Path;

use crate::io::tracker_io::TrackerError;
use crate::model::config::TrackerConfig;

pub const CONFIG_FILE: &str = "tracker.toml";

/// Read the tracker config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(tracker_dir: &Path) -> Result<(TrackerConfig, toml_edit::DocumentMut), TrackerError> {
    let config_path = tracker_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| TrackerError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: TrackerConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(tracker_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), TrackerError> {
    let config_path = tracker_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| TrackerError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

fn ensure_table(doc: &mut toml_edit::DocumentMut, name: &str) {
    if !doc.contains_key(name) {
        doc[name] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

/// Set `[tracker] name` and `description`
pub fn set_tracker_info(doc: &mut toml_edit::DocumentMut, name: &str, description: &str) {
    ensure_table(doc, "tracker");
    doc["tracker"]["name"] = toml_edit::value(name);
    doc["tracker"]["description"] = toml_edit::value(description);
}

/// Set `[dataset] file`
pub fn set_dataset_file(doc: &mut toml_edit::DocumentMut, file: &str) {
    ensure_table(doc, "dataset");
    doc["dataset"]["file"] = toml_edit::value(file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# Question tracker settings
[tracker]
name = "SDE Sheet"
description = ""

[storage]
dir = "storage" # persisted state

[log]
level = "info"
"#
    }

    #[test]
    fn round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), sample_config()).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.tracker.name, "SDE Sheet");
        assert_eq!(config.log.level.as_deref(), Some("info"));
        write_config(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn set_dataset_adds_missing_table() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_dataset_file(&mut doc, "a2z.json");
        let config: TrackerConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.dataset.file.as_deref(), Some("a2z.json"));
        // Comments elsewhere survive
        assert!(doc.to_string().contains("# persisted state"));
    }

    #[test]
    fn set_tracker_info_overwrites_name() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_tracker_info(&mut doc, "A2Z Sheet", "Beginner to advanced");
        let config: TrackerConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.tracker.name, "A2Z Sheet");
        assert_eq!(config.tracker.description, "Beginner to advanced");
    }

    #[test]
    fn missing_config_is_read_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(read_config(tmp.path()), Err(TrackerError::ReadError { .. })));
    }
}
