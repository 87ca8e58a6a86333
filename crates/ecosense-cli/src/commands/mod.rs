//! Command implementations for the CLI.

mod ask;
mod compare;
mod config;
mod recommend;
mod stats;
mod summary;

pub use ask::cmd_ask;
pub use compare::{CompareArgs, cmd_compare};
pub use config::cmd_config;
pub use recommend::cmd_recommend;
pub use stats::cmd_stats;
pub use summary::cmd_summary;

use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::format::FormatOptions;

/// Settings shared by every data command.
pub struct OutputContext {
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub opts: FormatOptions,
}
