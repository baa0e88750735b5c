use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- question tracker recovery log, append-only
     Trees that could not be saved, and saved state that was rejected at
     startup, are kept here so no progress is lost.
     View with: qt recovery
     Prune old entries: qt recovery prune
     Safe to delete if empty or stale. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A tree that storage refused to persist
    Write,
    /// Persisted state discarded because it failed to load
    Rejected,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Rejected => write!(f, "rejected"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "write" => Some(RecoveryCategory::Write),
            "rejected" => Some(RecoveryCategory::Rejected),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub body: String,
}

impl RecoveryEntry {
    pub fn now(category: RecoveryCategory, description: impl Into<String>, body: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            body: body.into(),
        }
    }

    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );

        if !self.body.is_empty() {
            let fence = fence_for(&self.body);
            out.push('\n');
            out.push_str(&fence);
            out.push_str("json\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&fence);
            out.push('\n');
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }
}

/// A backtick fence longer than any backtick run opening a line of `body`,
/// so no body line can close it.
fn fence_for(body: &str) -> String {
    let longest = body.lines().map(leading_backticks).max().unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn leading_backticks(line: &str) -> usize {
    line.len() - line.trim_start_matches('`').len()
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(tracker_dir: &Path) -> PathBuf {
    tracker_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Errors are swallowed and logged.
pub fn log_recovery(tracker_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(tracker_dir, &entry) {
        tracing::warn!(error = %e, "could not write to recovery log");
    } else {
        tracing::info!(
            category = %entry.category,
            path = %recovery_log_path(tracker_dir).display(),
            "recovery entry written"
        );
    }
}

fn log_recovery_inner(tracker_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(tracker_dir);
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read recovery entries, most recent first.
pub fn read_recovery_entries(tracker_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(tracker_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

/// Whether the newest entry of `category` already holds `body`. Trailing
/// newlines are not significant.
pub fn latest_body_matches(tracker_dir: &Path, category: RecoveryCategory, body: &str) -> bool {
    read_recovery_entries(tracker_dir, None)
        .into_iter()
        .find(|e| e.category == category)
        .is_some_and(|e| e.body.trim_end_matches('\n') == body.trim_end_matches('\n'))
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut body: Vec<&str> = Vec::new();
        // Length of the open fence, while inside the body
        let mut fence: Option<usize> = None;
        for line in lines.by_ref() {
            if let Some(open) = fence {
                let closes = leading_backticks(line) >= open && line.trim_start_matches('`').is_empty();
                if closes {
                    fence = None;
                } else {
                    body.push(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                fence = Some(leading_backticks(line));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            body: body.join("\n"),
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Drop entries older than `before` (default: [`PRUNE_AGE_DAYS`] ago), or
/// every entry when `all` is set. Returns the number of entries removed.
pub fn prune_recovery(
    tracker_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(tracker_dir);
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(&path)?;
    let mut entries = parse_entries(&content);
    let original_count = entries.len();

    if all {
        entries.clear();
    } else {
        let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
        entries.retain(|e| e.timestamp >= cutoff);
    }

    let mut rewritten = String::from(FILE_HEADER);
    for entry in &entries {
        rewritten.push_str(&entry.to_markdown());
    }
    atomic_write(&path, rewritten.as_bytes())?;
    Ok(original_count - entries.len())
}
