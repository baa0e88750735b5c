//! Pure tree mutations.
//!
//! Every operation takes the current [`Tree`] by reference and returns the
//! next one. When an id does not resolve the returned tree equals the input;
//! callers detect "nothing happened" by comparing the two.

use crate::model::question::{Question, QuestionFields, Status};
use crate::model::tree::{Node, SubTopic, Topic, Tree};
use crate::ops::ids::{IdKind, generate_id};

/// Which sibling list a reorder applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderScope {
    Topics,
    SubTopics { topic_id: String },
    Questions { topic_id: String, sub_topic_id: String },
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

fn index_of<T: Node>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

fn topic_mut<'a>(tree: &'a mut Tree, topic_id: &str) -> Option<&'a mut Topic> {
    tree.topics.iter_mut().find(|t| t.id == topic_id)
}

fn sub_topic_mut<'a>(
    tree: &'a mut Tree,
    topic_id: &str,
    sub_topic_id: &str,
) -> Option<&'a mut SubTopic> {
    topic_mut(tree, topic_id)?
        .subtopics
        .iter_mut()
        .find(|s| s.id == sub_topic_id)
}

fn question_mut<'a>(
    tree: &'a mut Tree,
    topic_id: &str,
    sub_topic_id: &str,
    question_id: &str,
) -> Option<&'a mut Question> {
    sub_topic_mut(tree, topic_id, sub_topic_id)?
        .questions
        .iter_mut()
        .find(|q| q.id == question_id)
}

/// Copy the tree and apply `f` to the copy
fn rebuild(tree: &Tree, f: impl FnOnce(&mut Tree)) -> Tree {
    let mut next = tree.clone();
    f(&mut next);
    next
}

// ---------------------------------------------------------------------------
// Question state
// ---------------------------------------------------------------------------

/// Flip completed ⇄ pending on one question
pub fn toggle_question_status(
    tree: &Tree,
    topic_id: &str,
    sub_topic_id: &str,
    question_id: &str,
) -> Tree {
    rebuild(tree, |next| {
        if let Some(q) = question_mut(next, topic_id, sub_topic_id, question_id) {
            q.status = q.status.toggled();
        }
    })
}

/// Flip the starred flag on one question
pub fn toggle_star(tree: &Tree, topic_id: &str, sub_topic_id: &str, question_id: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(q) = question_mut(next, topic_id, sub_topic_id, question_id) {
            q.starred = !q.starred;
        }
    })
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Append a topic with a freshly generated id and no sub-topics
pub fn add_topic(tree: &Tree, title: &str) -> Tree {
    add_topic_with_id(tree, &generate_id(IdKind::Topic), title)
}

/// Append a topic with a caller-chosen id. No-op if the id is already taken.
pub fn add_topic_with_id(tree: &Tree, topic_id: &str, title: &str) -> Tree {
    rebuild(tree, |next| {
        if index_of(&next.topics, topic_id).is_none() {
            next.topics.push(Topic {
                id: topic_id.to_string(),
                title: title.to_string(),
                subtopics: Vec::new(),
            });
        }
    })
}

pub fn rename_topic(tree: &Tree, topic_id: &str, title: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(topic) = topic_mut(next, topic_id) {
            topic.title = title.to_string();
        }
    })
}

/// Remove a topic with all its sub-topics and questions
pub fn delete_topic(tree: &Tree, topic_id: &str) -> Tree {
    rebuild(tree, |next| next.topics.retain(|t| t.id != topic_id))
}

// ---------------------------------------------------------------------------
// Sub-topics
// ---------------------------------------------------------------------------

pub fn add_sub_topic(tree: &Tree, topic_id: &str, title: &str) -> Tree {
    add_sub_topic_with_id(tree, topic_id, &generate_id(IdKind::SubTopic), title)
}

/// Append a sub-topic with a caller-chosen id. No-op if the topic is missing
/// or already has a sub-topic with that id.
pub fn add_sub_topic_with_id(tree: &Tree, topic_id: &str, sub_topic_id: &str, title: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(topic) = topic_mut(next, topic_id)
            && index_of(&topic.subtopics, sub_topic_id).is_none()
        {
            topic.subtopics.push(SubTopic {
                id: sub_topic_id.to_string(),
                title: title.to_string(),
                questions: Vec::new(),
            });
        }
    })
}

pub fn rename_sub_topic(tree: &Tree, topic_id: &str, sub_topic_id: &str, title: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(sub) = sub_topic_mut(next, topic_id, sub_topic_id) {
            sub.title = title.to_string();
        }
    })
}

/// Remove a sub-topic and its questions
pub fn delete_sub_topic(tree: &Tree, topic_id: &str, sub_topic_id: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(topic) = topic_mut(next, topic_id) {
            topic.subtopics.retain(|s| s.id != sub_topic_id);
        }
    })
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Append a pending, unstarred, untagged question to `sub_topic_id`.
/// `fields.sub_topic_id` is not consulted.
pub fn add_question(
    tree: &Tree,
    topic_id: &str,
    sub_topic_id: &str,
    fields: &QuestionFields,
) -> Tree {
    add_question_with_id(tree, topic_id, sub_topic_id, &generate_id(IdKind::Question), fields)
}

/// Like [`add_question`] with a caller-chosen id. No-op if the id already
/// exists anywhere in the tree.
pub fn add_question_with_id(
    tree: &Tree,
    topic_id: &str,
    sub_topic_id: &str,
    question_id: &str,
    fields: &QuestionFields,
) -> Tree {
    if tree.find_question(question_id).is_some() {
        return tree.clone();
    }
    rebuild(tree, |next| {
        if let Some(sub) = sub_topic_mut(next, topic_id, sub_topic_id) {
            sub.questions.push(Question {
                id: question_id.to_string(),
                title: fields.title.clone(),
                status: Status::Pending,
                difficulty: fields.difficulty,
                platform: fields.platform.clone(),
                link: fields.link.clone(),
                resource: fields.resource.clone(),
                topics: Vec::new(),
                starred: false,
            });
        }
    })
}

/// Update a question's scalar fields. When `fields.sub_topic_id` names a
/// different sub-topic of the same topic, the question moves to the end of
/// that sub-topic. An unknown destination makes the whole edit a no-op.
pub fn edit_question(
    tree: &Tree,
    topic_id: &str,
    question_id: &str,
    current_sub_topic_id: &str,
    fields: &QuestionFields,
) -> Tree {
    rebuild(tree, |next| {
        let Some(topic) = topic_mut(next, topic_id) else {
            return;
        };
        let Some(src) = index_of(&topic.subtopics, current_sub_topic_id) else {
            return;
        };
        let Some(q_idx) = index_of(&topic.subtopics[src].questions, question_id) else {
            return;
        };

        if fields.sub_topic_id == current_sub_topic_id {
            apply_fields(&mut topic.subtopics[src].questions[q_idx], fields);
            return;
        }

        let Some(dst) = index_of(&topic.subtopics, &fields.sub_topic_id) else {
            return;
        };
        let mut question = topic.subtopics[src].questions.remove(q_idx);
        apply_fields(&mut question, fields);
        topic.subtopics[dst].questions.push(question);
    })
}

fn apply_fields(question: &mut Question, fields: &QuestionFields) {
    question.title = fields.title.clone();
    question.difficulty = fields.difficulty;
    question.platform = fields.platform.clone();
    question.link = fields.link.clone();
    question.resource = fields.resource.clone();
}

pub fn delete_question(tree: &Tree, topic_id: &str, sub_topic_id: &str, question_id: &str) -> Tree {
    rebuild(tree, |next| {
        if let Some(sub) = sub_topic_mut(next, topic_id, sub_topic_id) {
            sub.questions.retain(|q| q.id != question_id);
        }
    })
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Remove the element at `from` and insert it at `to`, shifting the
/// elements in between by one. Out-of-range indices leave the list as is.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

fn move_by_id<T: Node>(items: &mut Vec<T>, from_id: &str, to_id: &str) {
    if let (Some(from), Some(to)) = (index_of(items, from_id), index_of(items, to_id)) {
        array_move(items, from, to);
    }
}

/// Move the item `from_id` to the position currently held by `to_id`
/// within the sibling list named by `scope`.
pub fn reorder(tree: &Tree, scope: &ReorderScope, from_id: &str, to_id: &str) -> Tree {
    if from_id == to_id {
        return tree.clone();
    }
    rebuild(tree, |next| match scope {
        ReorderScope::Topics => move_by_id(&mut next.topics, from_id, to_id),
        ReorderScope::SubTopics { topic_id } => {
            if let Some(topic) = topic_mut(next, topic_id) {
                move_by_id(&mut topic.subtopics, from_id, to_id);
            }
        }
        ReorderScope::Questions {
            topic_id,
            sub_topic_id,
        } => {
            if let Some(sub) = sub_topic_mut(next, topic_id, sub_topic_id) {
                move_by_id(&mut sub.questions, from_id, to_id);
            }
        }
    })
}

/// Ids of the sibling list named by `scope`, in order. `None` if the parent
/// does not resolve.
pub fn sibling_ids(tree: &Tree, scope: &ReorderScope) -> Option<Vec<String>> {
    fn ids<T: Node>(items: &[T]) -> Vec<String> {
        items.iter().map(|i| i.id().to_string()).collect()
    }
    match scope {
        ReorderScope::Topics => Some(ids(&tree.topics)),
        ReorderScope::SubTopics { topic_id } => tree.topic(topic_id).map(|t| ids(&t.subtopics)),
        ReorderScope::Questions {
            topic_id,
            sub_topic_id,
        } => tree
            .sub_topic(topic_id, sub_topic_id)
            .map(|s| ids(&s.questions)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
