use serde::{Deserialize, Serialize};

use crate::model::question::Difficulty;

/// Top-level shape of a sheet export: `{ "data": { "sheet": ..., "questions": [...] } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub data: Dataset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sheet: Sheet,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

/// Sheet metadata shown as the tracker header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One flat question row from the sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "questionId")]
    pub question: ProblemRecord,
    pub topic: String,
    #[serde(rename = "subTopic")]
    pub sub_topic: String,
    /// Tutorial URL; the export uses an empty string for none
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(rename = "isSolved", default)]
    pub is_solved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub platform: String,
    #[serde(rename = "problemUrl", default)]
    pub problem_url: String,
    #[serde(default)]
    pub topics: Vec<String>,
}
