use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tagmark_logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "tagmark",
    version,
    about = "Keep a list of tagged usernames and highlight them in saved pages"
)]
pub struct Cli {
    /// Key-value store holding the tag list
    #[arg(long, global = true, default_value = "tagmark_store.json")]
    pub store: PathBuf,
    /// RON engine configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
    /// Log at debug level
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the tag list
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },
    /// Highlight tagged users in a saved HTML page
    Annotate(AnnotateArgs),
}

#[derive(Subcommand, Debug)]
pub enum TagsAction {
    /// Print every tag
    List,
    /// Tag a username
    Add { name: String },
    /// Untag a username
    Remove { name: String },
    /// Remove every tag
    Clear,
    /// Write the tag list to a JSON export file (or a directory to place it in)
    Export { file: PathBuf },
    /// Merge tags from a JSON export file
    Import { file: PathBuf },
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Saved HTML page
    pub input: PathBuf,
    /// Address the page was saved from; relative links resolve against it
    #[arg(long)]
    pub page_url: String,
    /// Output file; defaults to stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Charset to assume when the page has no byte order mark
    #[arg(long)]
    pub charset: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
