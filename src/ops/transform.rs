use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::dataset::{Dataset, QuestionRecord};
use crate::model::question::{Question, Status};
use crate::model::tree::{SubTopic, Topic, Tree};
use crate::ops::ids::{IdKind, dedupe_slug, generate_id, slugify};

/// Build the nested tree from a flat sheet export.
///
/// Records are grouped by topic name, then by sub-topic name, both in
/// first-seen order; questions keep input order. Groups are keyed by the
/// original name, so two names with the same slug stay separate and the
/// later one gets a numbered id (`easy`, `easy-2`).
pub fn transform_dataset(dataset: &Dataset) -> Tree {
    let mut groups: IndexMap<&str, IndexMap<&str, Vec<&QuestionRecord>>> = IndexMap::new();
    for record in &dataset.questions {
        groups
            .entry(record.topic.as_str())
            .or_default()
            .entry(record.sub_topic.as_str())
            .or_default()
            .push(record);
    }

    let mut seen_question_ids = HashSet::new();
    let mut topics: Vec<Topic> = Vec::with_capacity(groups.len());

    for (topic_name, sub_groups) in groups {
        let topic_id = dedupe_slug(
            &slugify(topic_name),
            topics.iter().map(|t| t.id.as_str()),
        );

        let mut subtopics: Vec<SubTopic> = Vec::with_capacity(sub_groups.len());
        for (sub_name, records) in sub_groups {
            let sub_id = dedupe_slug(
                &slugify(sub_name),
                subtopics.iter().map(|s| s.id.as_str()),
            );
            let questions = records
                .into_iter()
                .map(|r| record_to_question(r, &mut seen_question_ids))
                .collect();
            subtopics.push(SubTopic {
                id: sub_id,
                title: sub_name.to_string(),
                questions,
            });
        }

        topics.push(Topic {
            id: topic_id,
            title: topic_name.to_string(),
            subtopics,
        });
    }

    Tree::new(topics)
}

fn record_to_question(record: &QuestionRecord, seen_ids: &mut HashSet<String>) -> Question {
    let id = if seen_ids.insert(record.id.clone()) {
        record.id.clone()
    } else {
        let fresh = generate_id(IdKind::Question);
        tracing::warn!(
            duplicate = %record.id,
            replacement = %fresh,
            "duplicate question id in dataset"
        );
        seen_ids.insert(fresh.clone());
        fresh
    };

    Question {
        id,
        title: record.question.name.clone(),
        status: Status::from_solved(record.is_solved),
        difficulty: record.question.difficulty,
        platform: record.question.platform.clone(),
        link: record.question.problem_url.clone(),
        resource: record
            .resource
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
        topics: record.question.topics.clone(),
        starred: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dataset::{ProblemRecord, Sheet};
    use crate::model::question::Difficulty;
    use crate::ops::progress::topic_progress;
    use pretty_assertions::assert_eq;

    fn record(id: &str, topic: &str, sub: &str, name: &str, solved: bool) -> QuestionRecord {
        QuestionRecord {
            id: id.to_string(),
            question: ProblemRecord {
                name: name.to_string(),
                difficulty: Difficulty::Easy,
                platform: "LeetCode".to_string(),
                problem_url: format!("https://leetcode.com/problems/{}", id),
                topics: vec!["Arrays".to_string()],
            },
            topic: topic.to_string(),
            sub_topic: sub.to_string(),
            resource: Some(String::new()),
            is_solved: solved,
        }
    }

    fn dataset(questions: Vec<QuestionRecord>) -> Dataset {
        Dataset {
            sheet: Sheet::default(),
            questions,
        }
    }

    #[test]
    fn groups_by_topic_then_sub_topic_in_first_seen_order() {
        let tree = transform_dataset(&dataset(vec![
            record("1", "Arrays", "Easy", "Two Sum", false),
            record("2", "Strings", "Easy", "Valid Anagram", false),
            record("3", "Arrays", "Hard", "Trapping Rain Water", false),
            record("4", "Arrays", "Easy", "Majority Element", false),
        ]));

        let titles: Vec<_> = tree.topics.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Arrays", "Strings"]);

        let arrays = &tree.topics[0];
        let subs: Vec<_> = arrays.subtopics.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(subs, vec!["easy", "hard"]);

        let easy: Vec<_> = arrays.subtopics[0]
            .questions
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(easy, vec!["1", "4"]);
    }

    #[test]
    fn derives_status_and_never_stars() {
        let tree = transform_dataset(&dataset(vec![
            record("1", "Arrays", "Easy", "Two Sum", true),
            record("2", "Arrays", "Hard", "3Sum", false),
        ]));
        let arrays = &tree.topics[0];
        assert_eq!(arrays.subtopics[0].questions[0].status, Status::Completed);
        assert_eq!(arrays.subtopics[1].questions[0].status, Status::Pending);
        assert!(tree.questions().all(|(_, _, q)| !q.starred));
    }

    #[test]
    fn two_records_one_solved_gives_half_progress() {
        let tree = transform_dataset(&dataset(vec![
            record("1", "Arrays", "Easy", "Two Sum", true),
            record("2", "Arrays", "Hard", "Median of Two Arrays", false),
        ]));
        assert_eq!(tree.topics.len(), 1);
        assert_eq!(tree.topics[0].subtopics.len(), 2);
        let progress = topic_progress(&tree.topics[0]);
        assert_eq!(progress.to_string(), "1 / 2");
        assert_eq!(progress.percent(), 50.0);
    }

    #[test]
    fn topic_ids_are_slugs() {
        let tree = transform_dataset(&dataset(vec![record(
            "1",
            "Arrays & Sorting",
            "Medium  Level",
            "3Sum",
            false,
        )]));
        assert_eq!(tree.topics[0].id, "arrays-&-sorting");
        assert_eq!(tree.topics[0].subtopics[0].id, "medium-level");
    }

    #[test]
    fn colliding_slugs_stay_separate_with_distinct_ids() {
        let tree = transform_dataset(&dataset(vec![
            record("1", "Linked List", "Easy", "Reverse List", false),
            record("2", "linked  list", "Easy", "Middle Node", false),
            record("3", "Linked List", "EASY", "Merge Lists", false),
        ]));

        assert_eq!(tree.topics.len(), 2);
        assert_eq!(tree.topics[0].id, "linked-list");
        assert_eq!(tree.topics[1].id, "linked-list-2");
        assert_eq!(tree.topics[1].title, "linked  list");

        let subs: Vec<_> = tree.topics[0]
            .subtopics
            .iter()
            .map(|s| (s.id.as_str(), s.title.as_str()))
            .collect();
        assert_eq!(subs, vec![("easy", "Easy"), ("easy-2", "EASY")]);
    }

    #[test]
    fn duplicate_record_ids_get_fresh_question_ids() {
        let tree = transform_dataset(&dataset(vec![
            record("dup", "Arrays", "Easy", "Two Sum", false),
            record("dup", "Arrays", "Easy", "Two Sum II", false),
        ]));
        let qs = &tree.topics[0].subtopics[0].questions;
        assert_eq!(qs[0].id, "dup");
        assert_ne!(qs[1].id, "dup");
        assert!(qs[1].id.starts_with("q-"));
    }

    #[test]
    fn empty_resource_becomes_none() {
        let mut with_resource = record("2", "Arrays", "Easy", "3Sum", false);
        with_resource.resource = Some("https://example.com/3sum".to_string());
        let tree = transform_dataset(&dataset(vec![
            record("1", "Arrays", "Easy", "Two Sum", false),
            with_resource,
        ]));
        let qs = &tree.topics[0].subtopics[0].questions;
        assert_eq!(qs[0].resource, None);
        assert_eq!(qs[1].resource.as_deref(), Some("https://example.com/3sum"));
    }

    #[test]
    fn empty_dataset_gives_empty_tree() {
        assert!(transform_dataset(&dataset(vec![])).is_empty());
    }
}
