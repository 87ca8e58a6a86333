//! Compare command implementation.

use std::path::Path;

use anyhow::{Context, Result};

use ecosense_core::Engine;
use ecosense_types::TimeWindow;

use super::OutputContext;
use crate::cli::OutputFormat;
use crate::format::{format_report_csv, format_report_text};
use crate::util::{load_dataset, write_output};

/// Bounds of the two periods.
pub struct CompareArgs {
    pub since: String,
    pub until: String,
    pub baseline_since: String,
    pub baseline_until: String,
}

pub fn cmd_compare(
    data: &Path,
    args: &CompareArgs,
    engine: &Engine,
    ctx: &OutputContext,
) -> Result<()> {
    let current = TimeWindow::parse(Some(&args.since), Some(&args.until))
        .context("Invalid current period")?;
    let baseline = TimeWindow::parse(Some(&args.baseline_since), Some(&args.baseline_until))
        .context("Invalid baseline period")?;

    let dataset = load_dataset(data, ctx.quiet, ctx.opts.no_color)?;
    let report = engine.compare_periods(&dataset, &current, &baseline)?;

    let content = match ctx.format {
        OutputFormat::Json => ctx.opts.as_json(&report)?,
        OutputFormat::Text => format_report_text(&report, &ctx.opts),
        OutputFormat::Csv => format_report_csv(&report)?,
    };

    write_output(ctx.output.as_ref(), &content)
}
