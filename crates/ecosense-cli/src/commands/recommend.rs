//! Recommend command implementation.

use std::path::Path;

use anyhow::Result;

use ecosense_core::Engine;

use super::OutputContext;
use crate::cli::OutputFormat;
use crate::format::{format_recommendations_csv, format_recommendations_text};
use crate::util::{load_dataset, write_output};

pub fn cmd_recommend(data: &Path, engine: &Engine, ctx: &OutputContext) -> Result<()> {
    let dataset = load_dataset(data, ctx.quiet, ctx.opts.no_color)?;
    let recommendations = engine.get_recommendations(&dataset)?;

    let content = match ctx.format {
        OutputFormat::Json => ctx.opts.as_json(&recommendations)?,
        OutputFormat::Text => format_recommendations_text(&recommendations, &ctx.opts),
        OutputFormat::Csv => format_recommendations_csv(&recommendations)?,
    };

    write_output(ctx.output.as_ref(), &content)
}
