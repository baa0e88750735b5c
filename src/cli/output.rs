use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::question::{Difficulty, Question, Status};
use crate::model::tree::{SubTopic, Topic, Tree};
use crate::ops::progress::{Progress, sub_topic_progress, topic_progress, tree_progress};
use crate::util::unicode::{display_width, fit_to_width};

const BAR_CELLS: usize = 10;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProgressJson {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Serialize)]
pub struct QuestionJson {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub difficulty: Difficulty,
    pub platform: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    pub starred: bool,
}

#[derive(Serialize)]
pub struct SubTopicJson {
    pub id: String,
    pub title: String,
    pub progress: ProgressJson,
    pub questions: Vec<QuestionJson>,
}

#[derive(Serialize)]
pub struct TopicJson {
    pub id: String,
    pub title: String,
    pub progress: ProgressJson,
    pub subtopics: Vec<SubTopicJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub name: String,
    pub progress: ProgressJson,
    pub topics: Vec<TopicJson>,
}

#[derive(Serialize)]
pub struct NodeProgressJson {
    pub id: String,
    pub title: String,
    pub progress: ProgressJson,
}

#[derive(Serialize)]
pub struct TopicProgressJson {
    pub id: String,
    pub title: String,
    pub progress: ProgressJson,
    pub subtopics: Vec<NodeProgressJson>,
}

#[derive(Serialize)]
pub struct ProgressReportJson {
    pub name: String,
    pub progress: ProgressJson,
    pub topics: Vec<TopicProgressJson>,
}

#[derive(Serialize)]
pub struct QuestionDetailJson {
    pub topic_id: String,
    pub sub_topic_id: String,
    #[serde(flatten)]
    pub question: QuestionJson,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub topic_id: String,
    pub sub_topic_id: String,
    pub question_id: String,
    pub title: String,
    pub field: String,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn progress_to_json(progress: Progress) -> ProgressJson {
    ProgressJson {
        completed: progress.completed,
        total: progress.total,
        percent: (progress.percent() * 10.0).round() / 10.0,
    }
}

pub fn question_to_json(question: &Question) -> QuestionJson {
    QuestionJson {
        id: question.id.clone(),
        title: question.title.clone(),
        status: question.status,
        difficulty: question.difficulty,
        platform: question.platform.clone(),
        link: question.link.clone(),
        resource: question.resource.clone(),
        topics: question.topics.clone(),
        starred: question.starred,
    }
}

pub fn sub_topic_to_json(sub: &SubTopic, filter: &ListFilter) -> SubTopicJson {
    SubTopicJson {
        id: sub.id.clone(),
        title: sub.title.clone(),
        progress: progress_to_json(sub_topic_progress(sub)),
        questions: sub
            .questions
            .iter()
            .filter(|q| filter.matches(q))
            .map(question_to_json)
            .collect(),
    }
}

pub fn topic_to_json(topic: &Topic, filter: &ListFilter) -> TopicJson {
    TopicJson {
        id: topic.id.clone(),
        title: topic.title.clone(),
        progress: progress_to_json(topic_progress(topic)),
        subtopics: topic
            .subtopics
            .iter()
            .map(|s| sub_topic_to_json(s, filter))
            .filter(|s| !filter.is_active() || !s.questions.is_empty())
            .collect(),
    }
}

pub fn topic_progress_to_json(topic: &Topic) -> TopicProgressJson {
    TopicProgressJson {
        id: topic.id.clone(),
        title: topic.title.clone(),
        progress: progress_to_json(topic_progress(topic)),
        subtopics: topic
            .subtopics
            .iter()
            .map(|s| NodeProgressJson {
                id: s.id.clone(),
                title: s.title.clone(),
                progress: progress_to_json(sub_topic_progress(s)),
            })
            .collect(),
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        body: entry.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Question filter for `qt list`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    pub starred: bool,
    pub pending: bool,
}

impl ListFilter {
    pub fn is_active(&self) -> bool {
        self.starred || self.pending
    }

    pub fn matches(&self, question: &Question) -> bool {
        (!self.starred || question.starred) && (!self.pending || !question.is_completed())
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `[#####-----] 50%`
pub fn format_progress_bar(progress: Progress) -> String {
    let percent = progress.percent();
    let filled = ((percent / 100.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_CELLS - filled),
        percent
    )
}

pub fn format_topic_header(topic: &Topic) -> String {
    let progress = topic_progress(topic);
    format!(
        "== {} ({})  {}  {} ==",
        topic.title,
        topic.id,
        progress,
        format_progress_bar(progress)
    )
}

pub fn format_sub_topic_header(sub: &SubTopic) -> String {
    format!(
        "  -- {} ({})  {} --",
        sub.title,
        sub.id,
        sub_topic_progress(sub)
    )
}

/// One question per line; the title column is `title_cells` wide
pub fn format_question_line(question: &Question, title_cells: usize) -> String {
    let star = if question.starred { "\u{2605} " } else { "  " };
    let meta = if question.platform.is_empty() {
        question.difficulty.to_string()
    } else {
        format!("{} \u{b7} {}", question.difficulty, question.platform)
    };
    let tags = if question.topics.is_empty() {
        String::new()
    } else {
        format!("  [{}]", question.topics.join(", "))
    };
    format!(
        "    [{}] {}{}  {}{}  ({})",
        question.status.checkbox_char(),
        star,
        fit_to_width(&question.title, title_cells),
        meta,
        tags,
        question.id
    )
}

/// Width of the title column for a sub-topic: its longest title, capped
fn title_column(questions: &[&Question], max_cells: usize) -> usize {
    questions
        .iter()
        .map(|q| display_width(&q.title))
        .max()
        .unwrap_or(0)
        .min(max_cells)
}

/// Format a topic with its sub-topics and questions
pub fn format_topic_listing(topic: &Topic, filter: &ListFilter, title_width: usize) -> Vec<String> {
    let mut lines = vec![format_topic_header(topic)];
    for sub in &topic.subtopics {
        let questions: Vec<&Question> = sub.questions.iter().filter(|q| filter.matches(q)).collect();
        if filter.is_active() && questions.is_empty() {
            continue;
        }
        lines.push(format_sub_topic_header(sub));
        let cells = title_column(&questions, title_width);
        for question in questions {
            lines.push(format_question_line(question, cells));
        }
    }
    lines
}

/// Search result line: `[ ] Title  (topic / sub / question)`
pub fn format_search_hit(topic_id: &str, sub_topic_id: &str, question: &Question) -> String {
    format!(
        "[{}] {}  ({} / {} / {})",
        question.status.checkbox_char(),
        question.title,
        topic_id,
        sub_topic_id,
        question.id
    )
}

/// Detailed view of one question
pub fn format_question_detail(topic: &Topic, sub: &SubTopic, question: &Question) -> Vec<String> {
    let star = if question.starred { " \u{2605}" } else { "" };
    let mut lines = vec![
        format!("[{}] {}{}", question.status.checkbox_char(), question.title, star),
        format!("id: {}", question.id),
        format!("topic: {} ({})", topic.title, topic.id),
        format!("sub-topic: {} ({})", sub.title, sub.id),
        format!("difficulty: {}", question.difficulty),
    ];
    if !question.platform.is_empty() {
        lines.push(format!("platform: {}", question.platform));
    }
    lines.push(format!("link: {}", question.link));
    if let Some(resource) = &question.resource {
        lines.push(format!("resource: {}", resource));
    }
    if !question.topics.is_empty() {
        lines.push(format!("tags: {}", question.topics.join(", ")));
    }
    lines
}

/// Overall line followed by one line per topic and sub-topic
pub fn format_progress_report(name: &str, tree: &Tree, topic_id: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    if topic_id.is_none() {
        let overall = tree_progress(tree);
        lines.push(format!(
            "{}  {}  {}",
            name,
            overall,
            format_progress_bar(overall)
        ));
    }
    for topic in tree
        .topics
        .iter()
        .filter(|t| topic_id.is_none_or(|id| t.id == id))
    {
        let progress = topic_progress(topic);
        lines.push(format!(
            "  {} ({})  {}  {}",
            topic.title,
            topic.id,
            progress,
            format_progress_bar(progress)
        ));
        for sub in &topic.subtopics {
            lines.push(format!(
                "    {} ({})  {}",
                sub.title,
                sub.id,
                sub_topic_progress(sub)
            ));
        }
    }
    lines
}

pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}: {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    if !entry.body.is_empty() {
        let body_lines: Vec<&str> = entry.body.lines().collect();
        for line in body_lines.iter().take(5) {
            lines.push(format!("  {}", line));
        }
        if body_lines.len() > 5 {
            lines.push(format!("  ... ({} more lines)", body_lines.len() - 5));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, title: &str, status: Status, starred: bool) -> Question {
        Question {
            id: id.into(),
            title: title.into(),
            status,
            difficulty: Difficulty::Easy,
            platform: "LeetCode".into(),
            link: format!("https://leetcode.com/problems/{}/", id),
            resource: None,
            topics: vec![],
            starred,
        }
    }

    fn arrays() -> Topic {
        let mut solved = question("two-sum", "Two Sum", Status::Completed, true);
        solved.topics = vec!["Arrays".into(), "Hashing".into()];
        Topic {
            id: "arrays".into(),
            title: "Arrays".into(),
            subtopics: vec![
                SubTopic {
                    id: "easy".into(),
                    title: "Easy".into(),
                    questions: vec![
                        solved,
                        question("pascal", "Pascal's Triangle", Status::Pending, false),
                    ],
                },
                SubTopic {
                    id: "hard".into(),
                    title: "Hard".into(),
                    questions: vec![],
                },
            ],
        }
    }

    #[test]
    fn progress_bar_rounds() {
        let half = Progress {
            completed: 1,
            total: 2,
        };
        assert_eq!(format_progress_bar(half), "[#####-----] 50%");
        assert_eq!(format_progress_bar(Progress::default()), "[----------] 0%");
        let third = Progress {
            completed: 1,
            total: 3,
        };
        assert_eq!(format_progress_bar(third), "[###-------] 33%");
    }

    #[test]
    fn topic_listing() {
        let lines = format_topic_listing(&arrays(), &ListFilter::default(), 60).join("\n");
        insta::assert_snapshot!(lines, @r"
== Arrays (arrays)  1 / 2  [#####-----] 50% ==
  -- Easy (easy)  1 / 2 --
    [x] ★ Two Sum            Easy · LeetCode  [Arrays, Hashing]  (two-sum)
    [ ]   Pascal's Triangle  Easy · LeetCode  (pascal)
  -- Hard (hard)  0 / 0 --
");
    }

    #[test]
    fn filtered_listing_hides_empty_sub_topics() {
        let filter = ListFilter {
            starred: false,
            pending: true,
        };
        let lines = format_topic_listing(&arrays(), &filter, 8);
        assert_eq!(
            lines,
            vec![
                "== Arrays (arrays)  1 / 2  [#####-----] 50% ==",
                "  -- Easy (easy)  1 / 2 --",
                "    [ ]   Pascal'\u{2026}  Easy · LeetCode  (pascal)",
            ]
        );
    }

    #[test]
    fn question_detail() {
        let topic = arrays();
        let sub = &topic.subtopics[0];
        let lines = format_question_detail(&topic, sub, &sub.questions[0]).join("\n");
        insta::assert_snapshot!(lines, @r"
[x] Two Sum ★
id: two-sum
topic: Arrays (arrays)
sub-topic: Easy (easy)
difficulty: Easy
platform: LeetCode
link: https://leetcode.com/problems/two-sum/
tags: Arrays, Hashing
");
    }

    #[test]
    fn progress_report_for_one_topic() {
        let tree = Tree::new(vec![arrays()]);
        let lines = format_progress_report("SDE Sheet", &tree, Some("arrays"));
        assert_eq!(
            lines,
            vec![
                "  Arrays (arrays)  1 / 2  [#####-----] 50%",
                "    Easy (easy)  1 / 2",
                "    Hard (hard)  0 / 0",
            ]
        );
        let all = format_progress_report("SDE Sheet", &tree, None);
        assert_eq!(all[0], "SDE Sheet  1 / 2  [#####-----] 50%");
    }

    #[test]
    fn json_omits_empty_optionals() {
        let q = question("pascal", "Pascal's Triangle", Status::Pending, false);
        let value = serde_json::to_value(question_to_json(&q)).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["difficulty"], "Easy");
        assert!(value.get("resource").is_none());
        assert!(value.get("topics").is_none());
    }
}
