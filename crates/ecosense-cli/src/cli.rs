//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name stored in the config file.
    pub fn from_config(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s, true).ok()
    }
}

/// Threshold preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// General-purpose office limits
    #[default]
    Default,
    /// Tighter limits for classrooms and healthcare
    Strict,
    /// Looser limits for warehouses and industrial spaces
    Relaxed,
}

impl Preset {
    pub fn from_config(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s, true).ok()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Strict => "strict",
            Preset::Relaxed => "relaxed",
        }
    }
}

/// Time window bounds
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Start of the window, inclusive (RFC3339, "YYYY-MM-DD HH:MM:SS" or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// End of the window, exclusive; a bare date includes that whole day
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Parser)]
#[command(name = "ecosense")]
#[command(author, version, about = "Sensor analytics and sustainability reports for buildings", long_about = None)]
pub struct Cli {
    /// Sensor data CSV file
    #[arg(short, long, global = true, env = "ECOSENSE_DATA")]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Threshold preset (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub preset: Option<Preset>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what the dataset contains
    Summary,

    /// Statistics, bands and score for a time window
    Stats {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Ranked recommendations over the whole dataset
    Recommend,

    /// Compare a period against a baseline period
    Compare {
        /// Start of the current period
        #[arg(long)]
        since: String,

        /// End of the current period
        #[arg(long)]
        until: String,

        /// Start of the baseline period
        #[arg(long)]
        baseline_since: String,

        /// End of the baseline period
        #[arg(long)]
        baseline_until: String,
    },

    /// Ask a question in plain language
    Ask {
        /// The question, e.g. "compare 2024-01-08 vs 2024-01-01"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration keys that can be get/set
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigKey {
    /// Default sensor data file
    Data,
    /// Default output format
    Format,
    /// Disable colored output
    NoColor,
    /// Threshold preset
    Preset,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
