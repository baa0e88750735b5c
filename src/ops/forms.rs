//! Input collection for create/rename/edit/delete actions.
//!
//! Forms hold the ephemeral field values; nothing here touches storage. A
//! form that fails validation yields `None` from `submit` and the caller
//! keeps the dialog open.

use crate::model::question::{Difficulty, KNOWN_PLATFORMS, Question, QuestionFields, known_platform};
use crate::model::tree::{SubTopic, Tree};
use crate::ops::tree_ops;

// ---------------------------------------------------------------------------
// Name form (topics and sub-topics)
// ---------------------------------------------------------------------------

/// What a submitted name is applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTarget {
    NewTopic,
    RenameTopic { topic_id: String },
    NewSubTopic { topic_id: String },
    RenameSubTopic { topic_id: String, sub_topic_id: String },
}

#[derive(Debug, Clone)]
pub struct NameForm {
    pub target: NameTarget,
    pub name: String,
}

impl NameForm {
    pub fn new(target: NameTarget, default_name: &str) -> Self {
        NameForm {
            target,
            name: default_name.to_string(),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.target {
            NameTarget::NewTopic => "Add New Topic",
            NameTarget::RenameTopic { .. } => "Rename Topic",
            NameTarget::NewSubTopic { .. } => "Add New Sub-topic",
            NameTarget::RenameSubTopic { .. } => "Rename Sub-topic",
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Apply the trimmed name to the tree. `None` while the name is blank.
    pub fn submit(&self, tree: &Tree) -> Option<Tree> {
        if !self.can_submit() {
            return None;
        }
        let name = self.name.trim();
        Some(match &self.target {
            NameTarget::NewTopic => tree_ops::add_topic(tree, name),
            NameTarget::RenameTopic { topic_id } => tree_ops::rename_topic(tree, topic_id, name),
            NameTarget::NewSubTopic { topic_id } => tree_ops::add_sub_topic(tree, topic_id, name),
            NameTarget::RenameSubTopic {
                topic_id,
                sub_topic_id,
            } => tree_ops::rename_sub_topic(tree, topic_id, sub_topic_id, name),
        })
    }
}

// ---------------------------------------------------------------------------
// Question form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionMode {
    Add,
    Edit {
        question_id: String,
        current_sub_topic_id: String,
    },
}

/// Fields a question form refuses to submit without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    Link,
    SubTopic,
}

impl MissingField {
    pub fn label(self) -> &'static str {
        match self {
            MissingField::Title => "title",
            MissingField::Link => "link",
            MissingField::SubTopic => "sub-topic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuestionForm {
    pub mode: QuestionMode,
    pub title: String,
    pub difficulty: Difficulty,
    pub platform: String,
    pub link: String,
    pub resource: String,
    pub sub_topic_id: String,
    /// Sub-topics of the owning topic, in display order
    sub_topic_choices: Vec<String>,
}

impl QuestionForm {
    /// Blank form for a new question. Selects `preferred_sub` when it is one
    /// of `sub_topics`, else the first sub-topic.
    pub fn for_add(sub_topics: &[SubTopic], preferred_sub: Option<&str>) -> Self {
        let choices: Vec<String> = sub_topics.iter().map(|s| s.id.clone()).collect();
        let sub_topic_id = preferred_sub
            .filter(|p| choices.iter().any(|c| c == *p))
            .map(str::to_string)
            .or_else(|| choices.first().cloned())
            .unwrap_or_default();
        QuestionForm {
            mode: QuestionMode::Add,
            title: String::new(),
            difficulty: Difficulty::Easy,
            platform: KNOWN_PLATFORMS[0].to_string(),
            link: String::new(),
            resource: String::new(),
            sub_topic_id,
            sub_topic_choices: choices,
        }
    }

    /// Form pre-populated from an existing question in `current_sub_topic_id`
    pub fn for_edit(question: &Question, current_sub_topic_id: &str, sub_topics: &[SubTopic]) -> Self {
        QuestionForm {
            mode: QuestionMode::Edit {
                question_id: question.id.clone(),
                current_sub_topic_id: current_sub_topic_id.to_string(),
            },
            title: question.title.clone(),
            difficulty: question.difficulty,
            platform: question.platform.clone(),
            link: question.link.clone(),
            resource: question.resource.clone().unwrap_or_default(),
            sub_topic_id: current_sub_topic_id.to_string(),
            sub_topic_choices: sub_topics.iter().map(|s| s.id.clone()).collect(),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            QuestionMode::Add => "Add New Question",
            QuestionMode::Edit { .. } => "Edit Question",
        }
    }

    /// Choose a platform from [`KNOWN_PLATFORMS`]
    pub fn set_platform(&mut self, name: &str) -> Result<(), String> {
        let platform = known_platform(name).ok_or_else(|| {
            format!(
                "unknown platform '{}' (expected: {})",
                name,
                KNOWN_PLATFORMS.join(", ")
            )
        })?;
        self.platform = platform.to_string();
        Ok(())
    }

    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push(MissingField::Title);
        }
        if self.link.trim().is_empty() {
            missing.push(MissingField::Link);
        }
        if !self.sub_topic_choices.contains(&self.sub_topic_id) {
            missing.push(MissingField::SubTopic);
        }
        missing
    }

    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Trimmed field values, or `None` while a required field is missing
    pub fn fields(&self) -> Option<QuestionFields> {
        if !self.can_submit() {
            return None;
        }
        let resource = self.resource.trim();
        Some(QuestionFields {
            title: self.title.trim().to_string(),
            difficulty: self.difficulty,
            platform: self.platform.clone(),
            link: self.link.trim().to_string(),
            resource: (!resource.is_empty()).then(|| resource.to_string()),
            sub_topic_id: self.sub_topic_id.clone(),
        })
    }

    /// Add or edit the question under `topic_id`
    pub fn submit(&self, tree: &Tree, topic_id: &str) -> Option<Tree> {
        let fields = self.fields()?;
        Some(match &self.mode {
            QuestionMode::Add => {
                tree_ops::add_question(tree, topic_id, &fields.sub_topic_id, &fields)
            }
            QuestionMode::Edit {
                question_id,
                current_sub_topic_id,
            } => tree_ops::edit_question(tree, topic_id, question_id, current_sub_topic_id, &fields),
        })
    }
}

// ---------------------------------------------------------------------------
// Delete confirmation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Topic {
        topic_id: String,
    },
    SubTopic {
        topic_id: String,
        sub_topic_id: String,
    },
    Question {
        topic_id: String,
        sub_topic_id: String,
        question_id: String,
    },
}

impl DeleteTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            DeleteTarget::Topic { .. } => "topic",
            DeleteTarget::SubTopic { .. } => "sub-topic",
            DeleteTarget::Question { .. } => "question",
        }
    }
}

/// Descendants removed along with a delete target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cascade {
    pub sub_topics: usize,
    pub questions: usize,
}

#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    pub target: DeleteTarget,
    pub name: String,
    pub cascade: Cascade,
}

impl DeleteConfirmation {
    /// Resolve `target` against the tree. `None` if it does not exist.
    pub fn new(tree: &Tree, target: DeleteTarget) -> Option<Self> {
        let (name, cascade) = match &target {
            DeleteTarget::Topic { topic_id } => {
                let topic = tree.topic(topic_id)?;
                (
                    topic.title.clone(),
                    Cascade {
                        sub_topics: topic.subtopics.len(),
                        questions: topic.question_count(),
                    },
                )
            }
            DeleteTarget::SubTopic {
                topic_id,
                sub_topic_id,
            } => {
                let sub = tree.sub_topic(topic_id, sub_topic_id)?;
                (
                    sub.title.clone(),
                    Cascade {
                        sub_topics: 0,
                        questions: sub.questions.len(),
                    },
                )
            }
            DeleteTarget::Question {
                topic_id,
                sub_topic_id,
                question_id,
            } => {
                let q = tree.question(topic_id, sub_topic_id, question_id)?;
                (q.title.clone(), Cascade::default())
            }
        };
        Some(DeleteConfirmation {
            target,
            name,
            cascade,
        })
    }

    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if self.cascade.sub_topics > 0 {
            parts.push(plural(self.cascade.sub_topics, "sub-topic"));
        }
        if self.cascade.questions > 0 {
            parts.push(plural(self.cascade.questions, "question"));
        }
        let cascade = if parts.is_empty() {
            String::new()
        } else {
            format!(" This will also delete {}.", parts.join(" and "))
        };
        format!(
            "Are you sure you want to delete {} \"{}\"?{} This action cannot be undone.",
            self.target.kind(),
            self.name,
            cascade
        )
    }

    /// Perform the delete
    pub fn confirm(self, tree: &Tree) -> Tree {
        match &self.target {
            DeleteTarget::Topic { topic_id } => tree_ops::delete_topic(tree, topic_id),
            DeleteTarget::SubTopic {
                topic_id,
                sub_topic_id,
            } => tree_ops::delete_sub_topic(tree, topic_id, sub_topic_id),
            DeleteTarget::Question {
                topic_id,
                sub_topic_id,
                question_id,
            } => tree_ops::delete_question(tree, topic_id, sub_topic_id, question_id),
        }
    }

    /// Dismiss without deleting
    pub fn cancel(self) {}
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
