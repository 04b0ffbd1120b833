//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON (same as --json)
    Json,
}

pub mod commands;

/// refsort - build, reorder and export numbered reference lists
#[derive(Parser, Debug)]
#[command(name = "refsort", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.refsort/data/projects.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Workspace file holding the local list between runs
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Signed-in owner id; required to open or save projects
    #[arg(long, global = true, env = "REFSORT_OWNER")]
    pub owner: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (text, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print version information
    Version,

    /// Add one reference
    Add {
        /// Reference text
        content: String,

        /// Insert at the start of the list (overrides the setting)
        #[arg(long, conflicts_with = "append")]
        prepend: bool,

        /// Insert at the end of the list (overrides the setting)
        #[arg(long)]
        append: bool,
    },

    /// Import references separated by blank lines
    Import {
        /// File to read (default: stdin)
        file: Option<PathBuf>,

        /// Insert at the start of the list (overrides the setting)
        #[arg(long, conflicts_with = "append")]
        prepend: bool,

        /// Insert at the end of the list (overrides the setting)
        #[arg(long)]
        append: bool,
    },

    /// Show the list with positions
    List,

    /// Remove the reference at a position
    Remove {
        /// 1-based position
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },

    /// Move a reference to another position
    Move {
        /// Current 1-based position
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        from: u32,

        /// New 1-based position
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        to: u32,
    },

    /// Remove every reference
    Clear,

    /// Show or set the project title
    Title {
        /// New title (omit to show the current one)
        title: Option<String>,
    },

    /// Render the numbered list for copying
    Export {
        /// Write to a file instead of stdout (HTML goes to a sibling .html, or .links.html for an .html target)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the hyperlinked HTML rendering (overrides the setting)
        #[arg(long, conflicts_with = "no_links")]
        links: bool,

        /// Plain text only (overrides the setting)
        #[arg(long)]
        no_links: bool,

        /// Print the HTML rendering to stdout instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Open a saved project, replacing the local list
    Open {
        /// Project ID
        id: String,
    },

    /// Close the open project and clear the local list
    Close,

    /// Save the list, creating a project if none is open
    Save,

    /// Show the session state and unsaved changes
    Status,

    /// List the owner's saved projects
    Projects {
        /// Maximum projects to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show or change preferences
    Settings {
        /// Add new references at the start of the list
        #[arg(long)]
        prepend: Option<bool>,

        /// Include hyperlinks when exporting
        #[arg(long)]
        copy_with_links: Option<bool>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Resolve an `--prepend` / `--append` pair to an override.
#[must_use]
pub const fn insert_override(prepend: bool, append: bool) -> Option<crate::list::InsertMode> {
    if prepend {
        Some(crate::list::InsertMode::Prepend)
    } else if append {
        Some(crate::list::InsertMode::Append)
    } else {
        None
    }
}
