use std::fmt;

use crate::model::tree::{SubTopic, Topic, Tree};

/// Completed/total counts for a subtree. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage in `0.0..=100.0`; zero when there are no questions
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.completed as f64 / self.total as f64
        }
    }

    fn combine(self, other: Progress) -> Progress {
        Progress {
            completed: self.completed + other.completed,
            total: self.total + other.total,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.completed, self.total)
    }
}

pub fn sub_topic_progress(sub_topic: &SubTopic) -> Progress {
    Progress {
        completed: sub_topic
            .questions
            .iter()
            .filter(|q| q.is_completed())
            .count(),
        total: sub_topic.questions.len(),
    }
}

pub fn topic_progress(topic: &Topic) -> Progress {
    topic
        .subtopics
        .iter()
        .map(sub_topic_progress)
        .fold(Progress::default(), Progress::combine)
}

/// Progress across every topic in the tree
pub fn tree_progress(tree: &Tree) -> Progress {
    tree.topics
        .iter()
        .map(topic_progress)
        .fold(Progress::default(), Progress::combine)
}
