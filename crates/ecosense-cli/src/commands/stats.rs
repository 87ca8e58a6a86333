//! Stats command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use ecosense_core::Engine;
use ecosense_types::TimeWindow;

use super::OutputContext;
use crate::cli::{OutputFormat, WindowArgs};
use crate::format::{format_report_csv, format_report_text};
use crate::util::{load_dataset, write_output};

pub fn cmd_stats(
    data: &Path,
    window: &WindowArgs,
    engine: &Engine,
    ctx: &OutputContext,
) -> Result<()> {
    let window = TimeWindow::parse(window.since.as_deref(), window.until.as_deref())
        .context("Invalid time window")?;
    let dataset = load_dataset(data, ctx.quiet, ctx.opts.no_color)?;
    let report = engine.get_stats(&dataset, &window)?;

    let content = match ctx.format {
        OutputFormat::Json => ctx.opts.as_json(&report)?,
        OutputFormat::Text => format_report_text(&report, &ctx.opts),
        OutputFormat::Csv => format_report_csv(&report)?,
    };

    write_output(ctx.output.as_ref(), &content)
}
