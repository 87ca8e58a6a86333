//! Summary command implementation.

use std::path::Path;

use anyhow::Result;

use ecosense_core::Engine;

use super::OutputContext;
use crate::cli::OutputFormat;
use crate::format::{format_summary_csv, format_summary_text};
use crate::util::{load_dataset, write_output};

pub fn cmd_summary(data: &Path, engine: &Engine, ctx: &OutputContext) -> Result<()> {
    let dataset = load_dataset(data, ctx.quiet, ctx.opts.no_color)?;
    let summary = engine.summary(&dataset);

    let content = match ctx.format {
        OutputFormat::Json => ctx.opts.as_json(&summary)?,
        OutputFormat::Text => format_summary_text(&summary, &ctx.opts),
        OutputFormat::Csv => format_summary_csv(&summary)?,
    };

    write_output(ctx.output.as_ref(), &content)
}
