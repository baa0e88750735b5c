mod init;
pub use init::cmd_init;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::RegexBuilder;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::dataset_io;
use crate::io::lock::FileLock;
use crate::io::recovery;
use crate::io::tracker_io::{self, Fallback, TRACKER_DIR, TrackerError};
use crate::model::question::Difficulty;
use crate::model::tracker::Tracker;
use crate::ops::forms::{
    DeleteConfirmation, DeleteTarget, MissingField, NameForm, NameTarget, QuestionForm,
};
use crate::ops::progress::tree_progress;
use crate::ops::reorder::{ExplicitGesture, run_gesture};
use crate::ops::search::search_questions;
use crate::ops::store::MountSource;
use crate::ops::transform::transform_dataset;
use crate::ops::tree_ops::{self, ReorderScope};
use crate::util::unicode::display_width;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Where commands look for the tracker, and how they print
struct Session {
    start: PathBuf,
    json: bool,
}

impl Session {
    fn load(&self) -> Result<Tracker, TrackerError> {
        let root = tracker_io::discover_tracker(&self.start)?;
        let tracker = tracker_io::load_tracker(&root)?;
        warn_if_rejected(&tracker);
        Ok(tracker)
    }

    /// Lock the tracker directory, then load. The lock must outlive every
    /// write made through the returned tracker.
    fn load_for_write(&self) -> Result<(Tracker, FileLock), Box<dyn std::error::Error>> {
        self.load_for_write_with(Fallback::Dataset)
    }

    fn load_for_write_with(
        &self,
        fallback: Fallback,
    ) -> Result<(Tracker, FileLock), Box<dyn std::error::Error>> {
        let root = tracker_io::discover_tracker(&self.start)?;
        let lock = FileLock::acquire_default(&root.join(TRACKER_DIR))?;
        let tracker = tracker_io::load_tracker_with(&root, fallback)?;
        warn_if_rejected(&tracker);
        Ok((tracker, lock))
    }
}

fn warn_if_rejected(tracker: &Tracker) {
    if tracker.store.source() == MountSource::Rejected {
        tracing::warn!("saved progress could not be read; showing the dataset instead (see `qt recovery`)");
    }
}

fn resolve_start(tracker_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match tracker_dir {
        Some(dir) => Ok(fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

/// `[log] level` of the tracker the command will run against, if any
pub fn configured_log_level(tracker_dir: Option<&str>) -> Option<String> {
    let start = resolve_start(tracker_dir).ok()?;
    let root = tracker_io::discover_tracker(&start).ok()?;
    let (config, _) = config_io::read_config(&root.join(TRACKER_DIR)).ok()?;
    config.log.level
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let session = Session {
        start: resolve_start(cli.tracker_dir.as_deref())?,
        json: cli.json,
    };

    match cli.command {
        Commands::Init(args) => cmd_init(args, &session.start),

        // Read commands
        Commands::List(args) => cmd_list(&session, args),
        Commands::Show(args) => cmd_show(&session, args),
        Commands::Progress(args) => cmd_progress(&session, args),
        Commands::Search(args) => cmd_search(&session, args),

        // Write commands
        Commands::Toggle(path) => cmd_toggle(&session, path),
        Commands::Star(path) => cmd_star(&session, path),
        Commands::Add(cmd) => cmd_add(&session, cmd.action),
        Commands::Rename(cmd) => cmd_rename(&session, cmd.action),
        Commands::Edit(args) => cmd_edit(&session, args),
        Commands::Delete(cmd) => cmd_delete(&session, cmd),
        Commands::Mv(cmd) => cmd_mv(&session, cmd.action),

        // Maintenance
        Commands::Import(args) => cmd_import(&session, args),
        Commands::Reset(args) => cmd_reset(&session, args),
        Commands::Recovery(cmd) => cmd_recovery(&session, cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn no_change() -> CmdResult {
    tracing::warn!("no change: nothing matched the given ids");
    Ok(())
}

/// Ask on stderr, read one line from stdin. Anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, std::io::Error> {
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse()
}

fn missing_message(missing: &[MissingField]) -> String {
    let labels: Vec<&str> = missing.iter().map(|m| m.label()).collect();
    format!("missing required field(s): {}", labels.join(", "))
}

fn print_question(tracker: &Tracker, json: bool, path: &QuestionPath) -> CmdResult {
    let tree = tracker.store.tree();
    if let Some(q) = tree.question(&path.topic, &path.sub, &path.question) {
        if json {
            return print_json(&question_to_json(q));
        }
        println!("{}", format_question_line(q, display_width(&q.title)).trim_start());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &Session, args: ListArgs) -> CmdResult {
    let tracker = session.load()?;
    let tree = tracker.store.tree();
    let filter = ListFilter {
        starred: args.starred,
        pending: args.pending,
    };

    let topics: Vec<_> = match &args.topic {
        Some(id) => vec![tree.topic(id).ok_or_else(|| format!("topic not found: {}", id))?],
        None => tree.topics.iter().collect(),
    };
    let topics: Vec<_> = topics
        .into_iter()
        .filter(|t| {
            !filter.is_active()
                || t.subtopics
                    .iter()
                    .flat_map(|s| &s.questions)
                    .any(|q| filter.matches(q))
        })
        .collect();

    if session.json {
        return print_json(&ListJson {
            name: tracker.config.tracker.name.clone(),
            progress: progress_to_json(tree_progress(tree)),
            topics: topics.iter().map(|t| topic_to_json(t, &filter)).collect(),
        });
    }

    if args.topic.is_none() {
        let overall = tree_progress(tree);
        println!(
            "{}  {}  {}",
            tracker.config.tracker.name,
            overall,
            format_progress_bar(overall)
        );
        if !tracker.config.tracker.description.is_empty() {
            println!("{}", tracker.config.tracker.description);
        }
    }
    if tree.is_empty() {
        println!("no topics yet (try `qt add topic <TITLE>`)");
        return Ok(());
    }

    let width = tracker.config.ui.title_width;
    for topic in topics {
        println!();
        for line in format_topic_listing(topic, &filter, width) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(session: &Session, args: ShowArgs) -> CmdResult {
    let tracker = session.load()?;
    let tree = tracker.store.tree();
    let path = &args.path;
    let topic = tree
        .topic(&path.topic)
        .ok_or_else(|| format!("topic not found: {}", path.topic))?;
    let sub = topic
        .sub_topic(&path.sub)
        .ok_or_else(|| format!("sub-topic not found: {} / {}", path.topic, path.sub))?;
    let question = sub
        .questions
        .iter()
        .find(|q| q.id == path.question)
        .ok_or_else(|| format!("question not found: {}", path.question))?;

    if session.json {
        return print_json(&QuestionDetailJson {
            topic_id: topic.id.clone(),
            sub_topic_id: sub.id.clone(),
            question: question_to_json(question),
        });
    }
    for line in format_question_detail(topic, sub, question) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_progress(session: &Session, args: ProgressArgs) -> CmdResult {
    let tracker = session.load()?;
    let tree = tracker.store.tree();
    if let Some(id) = &args.topic
        && tree.topic(id).is_none()
    {
        return Err(format!("topic not found: {}", id).into());
    }

    if session.json {
        return print_json(&ProgressReportJson {
            name: tracker.config.tracker.name.clone(),
            progress: progress_to_json(tree_progress(tree)),
            topics: tree
                .topics
                .iter()
                .filter(|t| args.topic.as_ref().is_none_or(|id| &t.id == id))
                .map(topic_progress_to_json)
                .collect(),
        });
    }
    for line in format_progress_report(&tracker.config.tracker.name, tree, args.topic.as_deref()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_search(session: &Session, args: SearchArgs) -> CmdResult {
    let tracker = session.load()?;
    let tree = tracker.store.tree();
    let re = RegexBuilder::new(&args.pattern)
        .case_insensitive(true)
        .build()?;
    let hits = search_questions(tree, &re, None);

    if session.json {
        let json: Vec<SearchHitJson> = hits
            .iter()
            .filter_map(|hit| {
                let q = tree.question(&hit.topic_id, &hit.sub_topic_id, &hit.question_id)?;
                Some(SearchHitJson {
                    topic_id: hit.topic_id.clone(),
                    sub_topic_id: hit.sub_topic_id.clone(),
                    question_id: hit.question_id.clone(),
                    title: q.title.clone(),
                    field: hit.field.to_string(),
                })
            })
            .collect();
        return print_json(&json);
    }

    for hit in &hits {
        if let Some(q) = tree.question(&hit.topic_id, &hit.sub_topic_id, &hit.question_id) {
            println!("{}", format_search_hit(&hit.topic_id, &hit.sub_topic_id, q));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_toggle(session: &Session, path: QuestionPath) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let changed = tracker.store.apply(|t| {
        tree_ops::toggle_question_status(t, &path.topic, &path.sub, &path.question)
    });
    if !changed {
        return no_change();
    }
    print_question(&tracker, session.json, &path)
}

fn cmd_star(session: &Session, path: QuestionPath) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let changed = tracker
        .store
        .apply(|t| tree_ops::toggle_star(t, &path.topic, &path.sub, &path.question));
    if !changed {
        return no_change();
    }
    print_question(&tracker, session.json, &path)
}

fn cmd_add(session: &Session, action: AddAction) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;

    match action {
        AddAction::Topic { title } => {
            let form = NameForm::new(NameTarget::NewTopic, &title);
            let next = form.submit(tracker.store.tree()).ok_or("topic title cannot be empty")?;
            if !tracker.store.replace(next) {
                return no_change();
            }
            if let Some(topic) = tracker.store.tree().topics.last() {
                println!("{}", topic.id);
            }
        }
        AddAction::Sub { topic, title } => {
            let form = NameForm::new(
                NameTarget::NewSubTopic {
                    topic_id: topic.clone(),
                },
                &title,
            );
            let next = form
                .submit(tracker.store.tree())
                .ok_or("sub-topic title cannot be empty")?;
            if !tracker.store.replace(next) {
                return no_change();
            }
            if let Some(sub) = tracker
                .store
                .tree()
                .topic(&topic)
                .and_then(|t| t.subtopics.last())
            {
                println!("{}", sub.id);
            }
        }
        AddAction::Question(args) => {
            let Some(topic) = tracker.store.tree().topic(&args.topic) else {
                return no_change();
            };
            if let Some(sub) = &args.sub
                && topic.sub_topic(sub).is_none()
            {
                return no_change();
            }

            let mut form = QuestionForm::for_add(&topic.subtopics, args.sub.as_deref());
            form.title = args.title.unwrap_or_default();
            form.link = args.link.unwrap_or_default();
            form.resource = args.resource.unwrap_or_default();
            if let Some(d) = &args.difficulty {
                form.difficulty = parse_difficulty(d)?;
            }
            if let Some(p) = &args.platform {
                form.set_platform(p)?;
            }
            let missing = form.missing_fields();
            if !missing.is_empty() {
                return Err(missing_message(&missing).into());
            }

            let sub_id = form.sub_topic_id.clone();
            let Some(next) = form.submit(tracker.store.tree(), &args.topic) else {
                return no_change();
            };
            if !tracker.store.replace(next) {
                return no_change();
            }
            let added = tracker
                .store
                .tree()
                .sub_topic(&args.topic, &sub_id)
                .and_then(|s| s.questions.last());
            if let Some(q) = added {
                if session.json {
                    return print_json(&question_to_json(q));
                }
                println!("{}", q.id);
            }
        }
    }
    Ok(())
}

fn cmd_rename(session: &Session, action: RenameAction) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let (target, title) = match action {
        RenameAction::Topic { topic, title } => (NameTarget::RenameTopic { topic_id: topic }, title),
        RenameAction::Sub { topic, sub, title } => (
            NameTarget::RenameSubTopic {
                topic_id: topic,
                sub_topic_id: sub,
            },
            title,
        ),
    };
    let form = NameForm::new(target, &title);
    let next = form.submit(tracker.store.tree()).ok_or("title cannot be empty")?;
    if !tracker.store.replace(next) {
        return no_change();
    }
    println!("renamed to \"{}\"", title.trim());
    Ok(())
}

fn cmd_edit(session: &Session, args: EditArgs) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let path = &args.path;
    let tree = tracker.store.tree();
    let Some(topic) = tree.topic(&path.topic) else {
        return no_change();
    };
    let Some(question) = topic
        .sub_topic(&path.sub)
        .and_then(|s| s.questions.iter().find(|q| q.id == path.question))
    else {
        return no_change();
    };

    let mut form = QuestionForm::for_edit(question, &path.sub, &topic.subtopics);
    if let Some(title) = &args.title {
        form.title = title.clone();
    }
    if let Some(link) = &args.link {
        form.link = link.clone();
    }
    if let Some(resource) = &args.resource {
        form.resource = resource.clone();
    }
    if let Some(d) = &args.difficulty {
        form.difficulty = parse_difficulty(d)?;
    }
    if let Some(p) = &args.platform {
        form.set_platform(p)?;
    }
    if let Some(to_sub) = &args.to_sub {
        form.sub_topic_id = to_sub.clone();
    }
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(missing_message(&missing).into());
    }

    let dest_sub = form.sub_topic_id.clone();
    let Some(next) = form.submit(tree, &path.topic) else {
        return no_change();
    };
    if !tracker.store.replace(next) {
        return no_change();
    }
    let moved = QuestionPath {
        topic: path.topic.clone(),
        sub: dest_sub,
        question: path.question.clone(),
    };
    print_question(&tracker, session.json, &moved)
}

fn cmd_delete(session: &Session, cmd: DeleteCmd) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let target = match cmd.action {
        DeleteAction::Topic { topic } => DeleteTarget::Topic { topic_id: topic },
        DeleteAction::Sub { topic, sub } => DeleteTarget::SubTopic {
            topic_id: topic,
            sub_topic_id: sub,
        },
        DeleteAction::Question(path) => DeleteTarget::Question {
            topic_id: path.topic,
            sub_topic_id: path.sub,
            question_id: path.question,
        },
    };

    let Some(confirmation) = DeleteConfirmation::new(tracker.store.tree(), target) else {
        return no_change();
    };
    if !cmd.yes && !confirm(&confirmation.message())? {
        confirmation.cancel();
        println!("cancelled");
        return Ok(());
    }

    let kind = confirmation.target.kind();
    let name = confirmation.name.clone();
    let next = confirmation.confirm(tracker.store.tree());
    tracker.store.replace(next);
    println!("deleted {} \"{}\"", kind, name);
    Ok(())
}

fn cmd_mv(session: &Session, action: MvAction) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write()?;
    let (scope, moved_id, onto) = match action {
        MvAction::Topic { topic, onto } => (ReorderScope::Topics, topic, onto),
        MvAction::Sub { topic, sub, onto } => {
            (ReorderScope::SubTopics { topic_id: topic }, sub, onto)
        }
        MvAction::Question { path, onto } => (
            ReorderScope::Questions {
                topic_id: path.topic,
                sub_topic_id: path.sub,
            },
            path.question,
            onto,
        ),
    };

    let mut gesture = ExplicitGesture::new(moved_id.as_str(), onto.as_str());
    let next = run_gesture(tracker.store.tree(), scope.clone(), &mut gesture);
    if !tracker.store.replace(next) {
        return no_change();
    }

    let order = tree_ops::sibling_ids(tracker.store.tree(), &scope).unwrap_or_default();
    if session.json {
        return print_json(&order);
    }
    println!("{}", order.join(" "));
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

/// Copy `file` into the tracker directory unless it already lives there.
/// Returns the name it is stored under.
fn copy_into_tracker(tracker_dir: &Path, file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("not a file: {}", file.display()))?
        .to_string();
    let dest = tracker_dir.join(&name);
    let same = match (fs::canonicalize(file), fs::canonicalize(&dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same {
        fs::copy(file, &dest)?;
    }
    Ok(name)
}

fn cmd_import(session: &Session, args: ImportArgs) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write_with(Fallback::DatasetOrEmpty)?;
    let file = PathBuf::from(&args.file);
    let dataset = dataset_io::read_dataset(&file)?;
    let tree = transform_dataset(&dataset);

    if !args.yes {
        let current = tree_progress(tracker.store.tree());
        let prompt = format!(
            "Replace the current tree ({} of {} questions completed) with {} questions from {}?",
            current.completed,
            current.total,
            dataset.questions.len(),
            args.file
        );
        if !confirm(&prompt)? {
            println!("cancelled");
            return Ok(());
        }
    }

    let stored_as = copy_into_tracker(&tracker.tracker_dir, &file)?;
    let (_, mut doc) = config_io::read_config(&tracker.tracker_dir)?;
    config_io::set_dataset_file(&mut doc, &stored_as);
    config_io::set_tracker_info(&mut doc, &dataset.sheet.name, &dataset.sheet.description);
    config_io::write_config(&tracker.tracker_dir, &doc)?;

    tracker.store.replace(tree);
    let progress = tree_progress(tracker.store.tree());
    println!(
        "imported {} questions in {} topics ({} completed)",
        progress.total,
        tracker.store.tree().topics.len(),
        progress.completed
    );
    Ok(())
}

fn cmd_reset(session: &Session, args: ResetArgs) -> CmdResult {
    let (mut tracker, _lock) = session.load_for_write_with(Fallback::DatasetOrEmpty)?;
    if !args.yes && !confirm("Discard all saved progress and start over from the dataset?")? {
        println!("cancelled");
        return Ok(());
    }
    let fresh = tracker_io::dataset_tree(&tracker.tracker_dir, &tracker.config)?;
    tracker.store.reset(fresh);
    println!("progress reset");
    Ok(())
}

fn cmd_recovery(session: &Session, cmd: RecoveryCmd) -> CmdResult {
    let root = tracker_io::discover_tracker(&session.start)?;
    let tracker_dir = root.join(TRACKER_DIR);

    match cmd.action {
        None => {
            let entries = recovery::read_recovery_entries(&tracker_dir, Some(cmd.limit.unwrap_or(10)));
            if session.json {
                let json: Vec<_> = entries.iter().map(recovery_entry_to_json).collect();
                return print_json(&json);
            }
            if entries.is_empty() {
                println!("recovery log is empty");
                return Ok(());
            }
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                for line in format_recovery_entry(entry) {
                    println!("{}", line);
                }
            }
        }
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(&tracker_dir).display());
        }
        Some(RecoveryAction::Prune(args)) => {
            let before = match &args.before {
                Some(s) => Some(
                    chrono::DateTime::parse_from_rfc3339(s)
                        .map_err(|e| format!("invalid --before timestamp '{}': {}", s, e))?
                        .with_timezone(&chrono::Utc),
                ),
                None => None,
            };
            let removed = recovery::prune_recovery(&tracker_dir, before, args.all)?;
            println!("pruned {} entries", removed);
        }
    }
    Ok(())
}
