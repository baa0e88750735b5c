use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Completion state of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Pending,
}

impl Status {
    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            Status::Completed => 'x',
            Status::Pending => ' ',
        }
    }

    pub fn toggled(self) -> Status {
        match self {
            Status::Completed => Status::Pending,
            Status::Pending => Status::Completed,
        }
    }

    pub fn from_solved(solved: bool) -> Status {
        if solved {
            Status::Completed
        } else {
            Status::Pending
        }
    }
}

/// Problem difficulty as shown on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "basic", alias = "BASIC")]
    Basic,
    #[serde(alias = "easy", alias = "EASY")]
    Easy,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Basic,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown difficulty '{}' (expected: basic, easy, medium, hard)",
                    s
                )
            })
    }
}

/// Platforms offered when adding or editing a question by hand.
/// Imported questions may carry any platform name.
pub const KNOWN_PLATFORMS: [&str; 3] = ["LeetCode", "GeeksForGeeks", "CodeStudio"];

/// Resolve a user-supplied platform name against [`KNOWN_PLATFORMS`],
/// ignoring case. Returns the canonical spelling.
pub fn known_platform(name: &str) -> Option<&'static str> {
    KNOWN_PLATFORMS
        .into_iter()
        .find(|p| p.eq_ignore_ascii_case(name.trim()))
}

/// A single trackable practice problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub difficulty: Difficulty,
    pub platform: String,
    pub link: String,
    /// Tutorial or editorial URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Free-text tags, in sheet order
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub starred: bool,
}

impl Question {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Scalar fields collected by the question form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFields {
    pub title: String,
    pub difficulty: Difficulty,
    pub platform: String,
    pub link: String,
    pub resource: Option<String>,
    /// Sub-topic the question should live in
    pub sub_topic_id: String,
}
