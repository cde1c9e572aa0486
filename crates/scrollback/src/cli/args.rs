use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use scrollback_core::model::MessageId;
use std::path::PathBuf;

/// Render windowed, grouped message lists from JSON dumps.
#[derive(Parser)]
#[command(version, about, long_about = None, author)]
pub struct Cli {
    /// Preferences file to use instead of the one in the config directory
    #[arg(long, env = "SCROLLBACK_PREFERENCES", global = true)]
    pub preferences: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Render the window around a message and print the render passes as JSON
    Render {
        /// JSON dump with `messages` and optional `channels`/`users`
        #[arg(long, value_name = "PATH")]
        messages: PathBuf,

        /// Message to select, e.g. `103` or `103.01`
        #[arg(long, conflicts_with = "index")]
        selected: Option<MessageId>,

        /// Position of the message to select (defaults to the newest)
        #[arg(long)]
        index: Option<usize>,

        /// Channel the view is filtered to
        #[arg(long)]
        narrow: Option<u64>,

        /// IANA time zone for day boundaries (overrides preferences)
        #[arg(long)]
        time_zone: Option<String>,

        /// Treat this instant as now when labeling dates
        #[arg(long, value_name = "RFC3339")]
        now: Option<DateTime<Utc>>,

        /// Collapse a message after the first render; repeatable, not saved
        #[arg(long, value_name = "ID")]
        collapse: Vec<MessageId>,
    },
    /// Manage view preferences
    Preferences {
        #[command(subcommand)]
        action: PreferencesCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum PreferencesCommands {
    /// Show current preferences
    Show,
    /// Reset preferences to defaults
    Reset,
    /// Print the preferences file location
    Path,
}
