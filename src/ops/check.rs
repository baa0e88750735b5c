use std::collections::HashSet;
use std::fmt;

use crate::model::tree::Tree;

/// A structural problem in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckIssue {
    DuplicateTopicId(String),
    DuplicateSubTopicId { topic_id: String, sub_topic_id: String },
    DuplicateQuestionId(String),
    EmptyId { path: String },
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckIssue::DuplicateTopicId(id) => write!(f, "duplicate topic id '{}'", id),
            CheckIssue::DuplicateSubTopicId {
                topic_id,
                sub_topic_id,
            } => write!(
                f,
                "duplicate sub-topic id '{}' in topic '{}'",
                sub_topic_id, topic_id
            ),
            CheckIssue::DuplicateQuestionId(id) => write!(f, "duplicate question id '{}'", id),
            CheckIssue::EmptyId { path } => write!(f, "empty id at {}", path),
        }
    }
}

/// Verify id uniqueness at every level: topic ids across the tree,
/// sub-topic ids within their topic, question ids across the tree.
pub fn check_tree(tree: &Tree) -> Vec<CheckIssue> {
    let mut issues = Vec::new();
    let mut topic_ids = HashSet::new();
    let mut question_ids = HashSet::new();

    for (ti, topic) in tree.topics.iter().enumerate() {
        if topic.id.is_empty() {
            issues.push(CheckIssue::EmptyId {
                path: format!("topic #{}", ti + 1),
            });
        } else if !topic_ids.insert(topic.id.as_str()) {
            issues.push(CheckIssue::DuplicateTopicId(topic.id.clone()));
        }

        let mut sub_ids = HashSet::new();
        for (si, sub) in topic.subtopics.iter().enumerate() {
            if sub.id.is_empty() {
                issues.push(CheckIssue::EmptyId {
                    path: format!("{} / sub-topic #{}", topic.id, si + 1),
                });
            } else if !sub_ids.insert(sub.id.as_str()) {
                issues.push(CheckIssue::DuplicateSubTopicId {
                    topic_id: topic.id.clone(),
                    sub_topic_id: sub.id.clone(),
                });
            }

            for (qi, question) in sub.questions.iter().enumerate() {
                if question.id.is_empty() {
                    issues.push(CheckIssue::EmptyId {
                        path: format!("{} / {} / question #{}", topic.id, sub.id, qi + 1),
                    });
                } else if !question_ids.insert(question.id.as_str()) {
                    issues.push(CheckIssue::DuplicateQuestionId(question.id.clone()));
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{Difficulty, Question, Status};
    use crate::model::tree::{SubTopic, Topic};

    fn q(id: &str) -> Question {
        Question {
            id: id.into(),
            title: id.into(),
            status: Status::Pending,
            difficulty: Difficulty::Medium,
            platform: String::new(),
            link: String::new(),
            resource: None,
            topics: vec![],
            starred: false,
        }
    }

    fn topic(id: &str, subs: Vec<SubTopic>) -> Topic {
        Topic {
            id: id.into(),
            title: id.into(),
            subtopics: subs,
        }
    }

    fn sub(id: &str, questions: Vec<Question>) -> SubTopic {
        SubTopic {
            id: id.into(),
            title: id.into(),
            questions,
        }
    }

    #[test]
    fn clean_tree_has_no_issues() {
        let tree = Tree::new(vec![
            topic("a", vec![sub("easy", vec![q("1")])]),
            topic("b", vec![sub("easy", vec![q("2")])]),
        ]);
        assert!(check_tree(&tree).is_empty());
    }

    #[test]
    fn reports_each_duplicate_level() {
        let tree = Tree::new(vec![
            topic("a", vec![sub("easy", vec![q("1")]), sub("easy", vec![])]),
            topic("a", vec![sub("hard", vec![q("1")])]),
        ]);
        assert_eq!(
            check_tree(&tree),
            vec![
                CheckIssue::DuplicateSubTopicId {
                    topic_id: "a".into(),
                    sub_topic_id: "easy".into()
                },
                CheckIssue::DuplicateTopicId("a".into()),
                CheckIssue::DuplicateQuestionId("1".into()),
            ]
        );
    }

    #[test]
    fn reports_empty_ids_with_path() {
        let tree = Tree::new(vec![topic("a", vec![sub("s", vec![q("")])])]);
        let issues = check_tree(&tree);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "empty id at a / s / question #1");
    }
}
