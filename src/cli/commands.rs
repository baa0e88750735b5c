use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qt", about = concat!("[x] qt v", env!("CARGO_PKG_VERSION"), " - track your way through a practice sheet"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different tracker directory
    #[arg(short = 'C', long = "tracker-dir", global = true)]
    pub tracker_dir: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a tracker in the current directory
    Init(InitArgs),
    /// List topics, sub-topics and questions
    List(ListArgs),
    /// Show one question
    Show(ShowArgs),
    /// Show completion counts
    Progress(ProgressArgs),
    /// Search question titles and tags by regex
    Search(SearchArgs),
    /// Flip a question between pending and completed
    Toggle(QuestionPath),
    /// Star or unstar a question
    Star(QuestionPath),
    /// Add a topic, sub-topic or question
    Add(AddCmd),
    /// Rename a topic or sub-topic
    Rename(RenameCmd),
    /// Edit a question, optionally moving it to another sub-topic
    Edit(EditArgs),
    /// Delete a topic, sub-topic or question
    Delete(DeleteCmd),
    /// Reorder an item among its siblings
    Mv(MvCmd),
    /// Replace the tree with a fresh copy of a sheet export
    Import(ImportArgs),
    /// Discard saved progress and start over from the dataset
    Reset(ResetArgs),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Shared args
// ---------------------------------------------------------------------------

/// Topic, sub-topic and question ids, in that order
#[derive(Args, Clone)]
pub struct QuestionPath {
    pub topic: String,
    pub sub: String,
    pub question: String,
}

// ---------------------------------------------------------------------------
// Init / read commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Sheet export to seed the tracker with (copied into tracker/)
    #[arg(long)]
    pub dataset: Option<String>,
    /// Tracker name (default: sheet name, else directory name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only this topic
    pub topic: Option<String>,
    /// Only starred questions
    #[arg(long)]
    pub starred: bool,
    /// Only questions not yet completed
    #[arg(long)]
    pub pending: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub path: QuestionPath,
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Only this topic
    pub topic: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern (case-insensitive)
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// Add / rename / edit
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddCmd {
    #[command(subcommand)]
    pub action: AddAction,
}

#[derive(Subcommand)]
pub enum AddAction {
    /// Append a topic
    Topic {
        title: String,
    },
    /// Append a sub-topic to a topic
    Sub {
        topic: String,
        title: String,
    },
    /// Append a question to a sub-topic
    Question(AddQuestionArgs),
}

#[derive(Args)]
pub struct AddQuestionArgs {
    /// Topic id
    pub topic: String,
    /// Sub-topic id (default: the topic's first sub-topic)
    #[arg(long)]
    pub sub: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    /// basic, easy, medium or hard (default: easy)
    #[arg(long)]
    pub difficulty: Option<String>,
    /// LeetCode, GeeksForGeeks or CodeStudio (default: LeetCode)
    #[arg(long)]
    pub platform: Option<String>,
    /// Editorial or video link
    #[arg(long)]
    pub resource: Option<String>,
}

#[derive(Args)]
pub struct RenameCmd {
    #[command(subcommand)]
    pub action: RenameAction,
}

#[derive(Subcommand)]
pub enum RenameAction {
    /// Rename a topic
    Topic { topic: String, title: String },
    /// Rename a sub-topic
    Sub {
        topic: String,
        sub: String,
        title: String,
    },
}

#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub path: QuestionPath,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long)]
    pub difficulty: Option<String>,
    #[arg(long)]
    pub platform: Option<String>,
    /// New resource link ("" clears it)
    #[arg(long)]
    pub resource: Option<String>,
    /// Move the question to the end of this sub-topic
    #[arg(long, value_name = "SUB")]
    pub to_sub: Option<String>,
}

// ---------------------------------------------------------------------------
// Delete / move
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct DeleteCmd {
    #[command(subcommand)]
    pub action: DeleteAction,
    /// Skip the confirmation prompt
    #[arg(long, short, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum DeleteAction {
    /// Delete a topic with all its sub-topics and questions
    Topic { topic: String },
    /// Delete a sub-topic with all its questions
    Sub { topic: String, sub: String },
    /// Delete a question
    Question(QuestionPath),
}

#[derive(Args)]
pub struct MvCmd {
    #[command(subcommand)]
    pub action: MvAction,
}

#[derive(Subcommand)]
pub enum MvAction {
    /// Move a topic onto another topic's position
    Topic {
        topic: String,
        #[arg(long)]
        onto: String,
    },
    /// Move a sub-topic within its topic
    Sub {
        topic: String,
        sub: String,
        #[arg(long)]
        onto: String,
    },
    /// Move a question within its sub-topic
    Question {
        #[command(flatten)]
        path: QuestionPath,
        #[arg(long)]
        onto: String,
    },
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ImportArgs {
    /// Sheet export (JSON)
    pub file: String,
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_delete_with_yes() {
        let cli = Cli::parse_from(["qt", "delete", "topic", "arrays", "--yes"]);
        match cli.command {
            Commands::Delete(cmd) => {
                assert!(cmd.yes);
                assert!(matches!(cmd.action, DeleteAction::Topic { ref topic } if topic == "arrays"));
            }
            _ => panic!("expected delete"),
        }
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["qt", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
