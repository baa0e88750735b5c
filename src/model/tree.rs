use serde::{Deserialize, Serialize};

use crate::model::question::Question;

/// An entity addressable by id within its sibling list
pub trait Node {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
}

impl Node for Topic {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl Node for SubTopic {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
}

impl Node for Question {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
}

/// A grouping within a topic, typically by difficulty or sub-theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTopic {
    /// Unique within the parent topic; never recomputed on rename
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Top-level grouping of related questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtopics: Vec<SubTopic>,
}

impl Topic {
    pub fn sub_topic(&self, sub_topic_id: &str) -> Option<&SubTopic> {
        self.subtopics.iter().find(|s| s.id == sub_topic_id)
    }

    pub fn question_count(&self) -> usize {
        self.subtopics.iter().map(|s| s.questions.len()).sum()
    }
}

/// The full ordered Topic → SubTopic → Question structure.
///
/// Serializes as a bare JSON array of topics. Every mutation produces a new
/// `Tree` value (see `ops::tree_ops`); nothing edits a shared tree in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub topics: Vec<Topic>,
}

impl Tree {
    pub fn new(topics: Vec<Topic>) -> Self {
        Tree { topics }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    pub fn sub_topic(&self, topic_id: &str, sub_topic_id: &str) -> Option<&SubTopic> {
        self.topic(topic_id)?.sub_topic(sub_topic_id)
    }

    pub fn question(
        &self,
        topic_id: &str,
        sub_topic_id: &str,
        question_id: &str,
    ) -> Option<&Question> {
        self.sub_topic(topic_id, sub_topic_id)?
            .questions
            .iter()
            .find(|q| q.id == question_id)
    }

    /// Locate a question anywhere in the tree by its id.
    /// Returns `(topic, sub_topic, question)`.
    pub fn find_question(&self, question_id: &str) -> Option<(&Topic, &SubTopic, &Question)> {
        self.topics.iter().find_map(|topic| {
            topic.subtopics.iter().find_map(|sub| {
                sub.questions
                    .iter()
                    .find(|q| q.id == question_id)
                    .map(|q| (topic, sub, q))
            })
        })
    }

    /// Iterate every question with its ancestors, in display order
    pub fn questions(&self) -> impl Iterator<Item = (&Topic, &SubTopic, &Question)> {
        self.topics.iter().flat_map(|topic| {
            topic.subtopics.iter().flat_map(move |sub| {
                sub.questions.iter().map(move |q| (topic, sub, q))
            })
        })
    }
}
