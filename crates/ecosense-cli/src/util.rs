//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use ecosense_core::{LoadReport, SensorDataset, source};

use crate::style;

/// Get the data file path, with helpful error message.
pub fn require_data_path(data: Option<PathBuf>) -> Result<PathBuf> {
    data.ok_or_else(|| {
        anyhow::anyhow!(
            "No data file specified. Use --data <FILE> or set ECOSENSE_DATA environment variable.\n\
             Run 'ecosense config set data <FILE>' to store a default."
        )
    })
}

/// Load a CSV dataset and report skipped rows on stderr.
pub fn load_dataset(path: &Path, quiet: bool, no_color: bool) -> Result<SensorDataset> {
    if !path.exists() {
        bail!("Data file not found: {}", path.display());
    }
    let (dataset, report) = source::read_csv(path)
        .with_context(|| format!("Failed to load sensor data from {}", path.display()))?;
    info!(
        "Loaded {} readings from {}",
        dataset.len(),
        path.display()
    );
    if !quiet {
        for line in load_warnings(&report) {
            eprintln!("{}", style::format_warning(&line, no_color));
        }
    }
    Ok(dataset)
}

/// Human-readable lines describing data quality problems found while loading.
pub fn load_warnings(report: &LoadReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.malformed.is_empty() {
        lines.push(format!(
            "Skipped {} of {} rows that could not be read",
            report.malformed.len(),
            report.total_rows
        ));
    }
    for (channel, count) in &report.out_of_range {
        lines.push(format!(
            "Dropped {} {} values outside the plausible range",
            count,
            channel.label()
        ));
    }
    for (channel, count) in &report.unparsable {
        lines.push(format!(
            "Ignored {} {} values that are not numbers",
            count,
            channel.label()
        ));
    }
    lines
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
