use std::fs;
use std::path::{Path, PathBuf};

use crate::model::dataset::{Dataset, DatasetFile};

/// Error type for reading a sheet export
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("could not read dataset {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse dataset {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Parse a sheet export from its JSON text
pub fn parse_dataset(text: &str) -> Result<Dataset, serde_json::Error> {
    let file: DatasetFile = serde_json::from_str(text)?;
    Ok(file.data)
}

/// Read and parse a sheet export from disk
pub fn read_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|e| DatasetError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let dataset = parse_dataset(&text).map_err(|e| DatasetError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        path = %path.display(),
        questions = dataset.questions.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Difficulty;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "data": {
    "sheet": { "name": "SDE Sheet", "description": "Top interview problems" },
    "questions": [
      {
        "_id": "64f1",
        "questionId": {
          "name": "Set Matrix Zeroes",
          "difficulty": "Medium",
          "platform": "leetcode",
          "problemUrl": "https://leetcode.com/problems/set-matrix-zeroes/",
          "topics": ["Arrays", "Matrix"]
        },
        "topic": "Arrays",
        "subTopic": "Medium",
        "resource": "https://youtu.be/N0MgLvceX7M",
        "isSolved": true
      },
      {
        "_id": "64f2",
        "questionId": {
          "name": "Pascal's Triangle",
          "difficulty": "easy",
          "platform": "leetcode",
          "problemUrl": "https://leetcode.com/problems/pascals-triangle/",
          "topics": []
        },
        "topic": "Arrays",
        "subTopic": "Easy",
        "resource": ""
      }
    ]
  }
}"#;

    #[test]
    fn parses_sheet_export() {
        let dataset = parse_dataset(SAMPLE).unwrap();
        assert_eq!(dataset.sheet.name, "SDE Sheet");
        assert_eq!(dataset.questions.len(), 2);

        let first = &dataset.questions[0];
        assert_eq!(first.id, "64f1");
        assert_eq!(first.question.difficulty, Difficulty::Medium);
        assert_eq!(first.question.topics, vec!["Arrays", "Matrix"]);
        assert!(first.is_solved);

        let second = &dataset.questions[1];
        assert_eq!(second.question.difficulty, Difficulty::Easy);
        assert!(!second.is_solved);
    }

    #[test]
    fn unknown_difficulty_is_an_error() {
        let text = SAMPLE.replace("\"Medium\",", "\"Insane\",");
        assert!(parse_dataset(&text).is_err());
    }

    #[test]
    fn read_reports_path_on_failure() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.json");
        let err = read_dataset(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));

        let bad = tmp.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(read_dataset(&bad), Err(DatasetError::ParseError { .. })));
    }
}
