use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::dataset_io;
use crate::io::tracker_io::{self, TRACKER_DIR};
use crate::model::dataset::Dataset;
use crate::ops::transform::transform_dataset;

const TRACKER_TOML_TEMPLATE: &str = r##"[tracker]
name = ""
description = ""

[storage]
# Saved progress, relative to this directory
dir = "storage"

# --- Dataset ---
# Sheet export used as the starting tree and by `qt reset`.
# Set by `qt init --dataset` and `qt import`.

[log]
# Used when no -v flag is given. RUST_LOG overrides both.
# level = "info"

[ui]
# Question titles wider than this are truncated in `qt list`
title_width = 60
"##;

/// Infer a tracker name from a directory name: hyphens and underscores
/// become spaces, words are title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render tracker.toml for `name`, recording `dataset_file` when given
fn render_tracker_toml(
    name: &str,
    description: &str,
    dataset_file: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut doc: toml_edit::DocumentMut = TRACKER_TOML_TEMPLATE.parse()?;
    config_io::set_tracker_info(&mut doc, name, description);
    if let Some(file) = dataset_file {
        config_io::set_dataset_file(&mut doc, file);
    }
    Ok(doc.to_string())
}

pub fn cmd_init(args: InitArgs, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tracker_dir = dir.join(TRACKER_DIR);
    if tracker_dir.join(CONFIG_FILE).exists() {
        return Err(format!("tracker already exists in {}/", tracker_dir.display()).into());
    }

    if let Some(parent) = dir.parent()
        && let Ok(parent_root) = tracker_io::discover_tracker(parent)
    {
        eprintln!(
            "Note: parent tracker found at {}/",
            parent_root.join(TRACKER_DIR).display()
        );
    }

    // Validate the dataset before creating anything
    let dataset: Option<(PathBuf, Dataset)> = match &args.dataset {
        Some(file) => {
            let path = PathBuf::from(file);
            let dataset = dataset_io::read_dataset(&path)?;
            Some((path, dataset))
        }
        None => None,
    };

    let sheet = dataset.as_ref().map(|(_, d)| &d.sheet);
    let name = args
        .name
        .clone()
        .or_else(|| sheet.map(|s| s.name.clone()).filter(|n| !n.trim().is_empty()))
        .unwrap_or_else(|| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .map(infer_name)
                .unwrap_or_else(|| "Untitled".to_string())
        });
    let description = sheet.map(|s| s.description.clone()).unwrap_or_default();

    fs::create_dir_all(&tracker_dir)?;

    let dataset_file = match &dataset {
        Some((path, _)) => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| format!("not a file: {}", path.display()))?
                .to_string();
            fs::copy(path, tracker_dir.join(&file_name))?;
            Some(file_name)
        }
        None => None,
    };

    let toml = render_tracker_toml(&name, &description, dataset_file.as_deref())?;
    fs::write(tracker_dir.join(CONFIG_FILE), toml)?;
    tracing::info!(path = %tracker_dir.display(), "tracker created");

    println!("Initialized tracker: {}", name);
    if let (Some((_, dataset)), Some(file)) = (&dataset, &dataset_file) {
        let tree = transform_dataset(dataset);
        println!(
            "  dataset: {} ({} questions in {} topics)",
            file,
            dataset.questions.len(),
            tree.topics.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::TrackerConfig;

    #[test]
    fn infer_name_title_cases_words() {
        assert_eq!(infer_name("sde-sheet"), "Sde Sheet");
        assert_eq!(infer_name("dsa_practice"), "Dsa Practice");
        assert_eq!(infer_name("prep"), "Prep");
    }

    #[test]
    fn template_without_dataset() {
        let text = render_tracker_toml("My \"Prep\"", "", None).unwrap();
        let config: TrackerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.tracker.name, "My \"Prep\"");
        assert_eq!(config.storage.dir, "storage");
        assert_eq!(config.ui.title_width, 60);
        assert!(config.dataset.file.is_none());
        assert!(config.log.level.is_none());
    }

    #[test]
    fn template_with_dataset() {
        let text = render_tracker_toml("SDE Sheet", "Top problems", Some("sde.json")).unwrap();
        let config: TrackerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.dataset.file.as_deref(), Some("sde.json"));
        assert_eq!(config.tracker.description, "Top problems");
        assert!(text.contains("# Saved progress"));
    }
}
