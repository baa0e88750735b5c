use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::model::tree::Tree;

/// Which field of a question matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Title,
    Tag,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchField::Title => write!(f, "title"),
            MatchField::Tag => write!(f, "tag"),
        }
    }
}

/// A question whose title or one of its tags matched
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub topic_id: String,
    pub sub_topic_id: String,
    pub question_id: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search question titles, then tags, in tree order. At most one hit per
/// question; a title match wins over a tag match.
pub fn search_questions(tree: &Tree, re: &Regex, topic_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for (topic, sub, question) in tree.questions() {
        if topic_filter.is_some_and(|id| id != topic.id) {
            continue;
        }

        let title_spans = find_matches(re, &question.title);
        let (field, spans) = if !title_spans.is_empty() {
            (MatchField::Title, title_spans)
        } else if let Some(spans) = question
            .topics
            .iter()
            .map(|tag| find_matches(re, tag))
            .find(|spans| !spans.is_empty())
        {
            (MatchField::Tag, spans)
        } else {
            continue;
        };

        hits.push(SearchHit {
            topic_id: topic.id.clone(),
            sub_topic_id: sub.id.clone(),
            question_id: question.id.clone(),
            field,
            spans,
        });
    }
    hits
}
