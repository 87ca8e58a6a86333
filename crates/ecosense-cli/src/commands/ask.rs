//! Ask command implementation.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use ecosense_core::{Engine, IntentClassifier};

use super::OutputContext;
use crate::format::format_response;
use crate::style;
use crate::util::{load_dataset, require_data_path, write_output};

const HINT: &str = "Try asking for a summary, recommendations, statistics for a date \
                    (YYYY-MM-DD) or a comparison of two dates.";

pub fn cmd_ask(
    data: Option<PathBuf>,
    question: &str,
    classifier: &dyn IntentClassifier,
    engine: &Engine,
    ctx: &OutputContext,
) -> Result<()> {
    let Some(query) = classifier.classify(question) else {
        eprintln!(
            "{}",
            style::format_warning("Could not work out what you are asking.", ctx.opts.no_color)
        );
        eprintln!("{}", HINT);
        return Ok(());
    };
    debug!("Question '{}' routed to {:?}", question, query);

    let data = require_data_path(data)?;
    let dataset = load_dataset(&data, ctx.quiet, ctx.opts.no_color)?;
    let response = engine.execute(&dataset, &query)?;
    let content = format_response(&response, ctx.format, &ctx.opts)?;
    write_output(ctx.output.as_ref(), &content)
}
