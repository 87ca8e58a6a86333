//! Output formatting utilities for text, JSON, and CSV output.

use std::collections::BTreeMap;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;

use ecosense_core::{
    BandShare, ChannelDelta, DatasetSummary, OccupancyProfile, QueryResponse, Recommendation,
    SustainabilityReport,
};
use ecosense_types::{Channel, ChannelStats, format_timestamp};

use crate::cli::OutputFormat;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool, compact: bool) -> Self {
        Self { no_color, compact }
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn heading(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("{}", text.bold())
        }
    }
}

/// Precision used for a channel's aggregated values.
fn precision(channel: Channel) -> usize {
    match channel {
        Channel::Motion => 2,
        Channel::Co2 | Channel::Light => 0,
        Channel::Temperature | Channel::Humidity => 1,
    }
}

fn opt_timestamp(ts: Option<time::OffsetDateTime>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

fn opt_csv(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_output<F>(write_rows: F) -> Result<String>
where
    F: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<()>,
{
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_rows(&mut wtr)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Dispatch any query response to the chosen format.
pub fn format_response(
    response: &QueryResponse,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    match (format, response) {
        (OutputFormat::Json, _) => opts.as_json(response),
        (OutputFormat::Text, QueryResponse::Summary(s)) => Ok(format_summary_text(s, opts)),
        (OutputFormat::Text, QueryResponse::Report(r)) => Ok(format_report_text(r, opts)),
        (OutputFormat::Text, QueryResponse::Recommendations(recs)) => {
            Ok(format_recommendations_text(recs, opts))
        }
        (OutputFormat::Csv, QueryResponse::Summary(s)) => format_summary_csv(s),
        (OutputFormat::Csv, QueryResponse::Report(r)) => format_report_csv(r),
        (OutputFormat::Csv, QueryResponse::Recommendations(recs)) => {
            format_recommendations_csv(recs)
        }
    }
}

// ============================================================================
// Dataset summary
// ============================================================================

fn stats_table(channels: &BTreeMap<Channel, ChannelStats>, opts: &FormatOptions) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Channel", "Unit", "Mean", "Median", "Min", "Max", "Std Dev", "Samples", "Missing",
    ]);
    for (channel, stats) in channels {
        let p = precision(*channel);
        builder.push_record([
            channel.label().to_string(),
            channel.unit().to_string(),
            style::format_value(stats.mean, p),
            style::format_value(stats.median, p),
            style::format_value(stats.min, p),
            style::format_value(stats.max, p),
            style::format_value(stats.std_dev, p.max(1)),
            stats.sample_count.to_string(),
            stats.missing_count.to_string(),
        ]);
    }
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.no_color);
    table.to_string()
}

#[must_use]
pub fn format_summary_text(summary: &DatasetSummary, opts: &FormatOptions) -> String {
    if summary.total_records == 0 {
        return "Dataset is empty.\n".to_string();
    }

    let title = match &summary.building_id {
        Some(id) => format!("Dataset: building {}", id),
        None => "Dataset".to_string(),
    };
    let mut out = style::format_title(&title, opts.no_color);
    out.push('\n');
    out.push_str(&format!("Readings:      {}\n", summary.total_records));
    out.push_str(&format!("First reading: {}\n", opt_timestamp(summary.first_reading)));
    out.push_str(&format!("Last reading:  {}\n", opt_timestamp(summary.last_reading)));
    out.push_str(&format!("Motion events: {}\n", summary.motion_events));
    out.push('\n');
    out.push_str(&stats_table(&summary.channels, opts));
    out.push('\n');
    out
}

pub fn format_summary_csv(summary: &DatasetSummary) -> Result<String> {
    csv_output(|wtr| {
        wtr.write_record([
            "channel", "mean", "median", "min", "max", "std_dev", "samples", "missing",
        ])?;
        for (channel, stats) in &summary.channels {
            wtr.write_record([
                channel.name().to_string(),
                opt_csv(stats.mean),
                opt_csv(stats.median),
                opt_csv(stats.min),
                opt_csv(stats.max),
                opt_csv(stats.std_dev),
                stats.sample_count.to_string(),
                stats.missing_count.to_string(),
            ])?;
        }
        Ok(())
    })
}

// ============================================================================
// Sustainability report
// ============================================================================

fn band_table(report: &SustainabilityReport, opts: &FormatOptions) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Channel", "Band", "Mean", "Min", "Max", "Samples", "Missing"]);
    for (channel, stats) in &report.channel_stats {
        let p = precision(*channel);
        let band = report
            .bands
            .get(channel)
            .map(|b| style::format_band_colored(*b, opts.no_color))
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            channel.label().to_string(),
            band,
            style::format_value(stats.mean, p),
            style::format_value(stats.min, p),
            style::format_value(stats.max, p),
            stats.sample_count.to_string(),
            stats.missing_count.to_string(),
        ]);
    }
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.no_color);
    table.to_string()
}

fn delta_table(deltas: &BTreeMap<Channel, ChannelDelta>, opts: &FormatOptions) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Channel", "Current", "Baseline", "Change", "%", "Trend"]);
    for (channel, delta) in deltas {
        let p = precision(*channel);
        let indicator = match (delta.delta, delta.trend) {
            (Some(d), Some(t)) => format!("{} {}", style::trend_indicator(d, t, opts.no_color), t),
            _ => "-".to_string(),
        };
        builder.push_record([
            channel.label().to_string(),
            style::format_value(delta.current_mean, p),
            style::format_value(delta.baseline_mean, p),
            delta
                .delta
                .map(|d| format!("{:+.*}", p, d))
                .unwrap_or_else(|| "-".to_string()),
            delta
                .percent_change
                .map(|pc| format!("{:+.1}", pc))
                .unwrap_or_else(|| "-".to_string()),
            indicator,
        ]);
    }
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.no_color);
    table.to_string()
}

fn format_distribution(distribution: &BTreeMap<Channel, Vec<BandShare>>) -> String {
    let mut out = String::new();
    for (channel, shares) in distribution {
        let parts: Vec<String> = shares
            .iter()
            .map(|s| format!("{} {:.0}%", s.band, s.percent))
            .collect();
        out.push_str(&format!("  {:<12} {}\n", channel.label(), parts.join(", ")));
    }
    out
}

fn format_hours(hours: &[u8]) -> String {
    if hours.is_empty() {
        return "none".to_string();
    }
    hours
        .iter()
        .map(|h| format!("{:02}:00", h))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_occupancy(profile: &OccupancyProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Motion events:   {}\n", profile.total_events));
    if let Some(hour) = profile.peak_hour {
        out.push_str(&format!("  Peak hour:       {:02}:00\n", hour));
    }
    if let Some(day) = &profile.peak_weekday {
        out.push_str(&format!("  Busiest day:     {}\n", day));
    }
    out.push_str(&format!(
        "  High-usage hours: {}\n",
        format_hours(&profile.high_usage_hours)
    ));
    out.push_str(&format!(
        "  Low-usage hours:  {}\n",
        format_hours(&profile.low_usage_hours)
    ));
    out
}

#[must_use]
pub fn format_report_text(report: &SustainabilityReport, opts: &FormatOptions) -> String {
    let title = match &report.summary.building_id {
        Some(id) => format!("Sustainability Report: building {}", id),
        None => "Sustainability Report".to_string(),
    };
    let mut out = style::format_title(&title, opts.no_color);
    out.push('\n');
    out.push_str(&format!("Window:   {}\n", report.window));
    out.push_str(&format!(
        "Readings: {} ({} .. {})\n",
        report.summary.reading_count,
        opt_timestamp(report.summary.first_reading),
        opt_timestamp(report.summary.last_reading)
    ));
    let verdict = report
        .score
        .map(|s| format!(" ({})", style::score_summary(s)))
        .unwrap_or_default();
    out.push_str(&format!(
        "Score:    {}{}\n",
        style::format_score_colored(report.score, opts.no_color),
        verdict
    ));

    if report.is_available() {
        out.push('\n');
        out.push_str(&band_table(report, opts));
        out.push('\n');
    } else {
        out.push_str("\nNo readings in this window.\n");
    }

    if let Some(baseline) = &report.comparison {
        out.push_str(&format!(
            "\n{}\n",
            opts.heading(&format!("Compared with {}", baseline.window))
        ));
        out.push_str(&format!(
            "Baseline score: {}\n",
            style::format_score_colored(baseline.score, opts.no_color)
        ));
        if !baseline.is_available() {
            out.push_str("No readings in the baseline window.\n");
        }
        if report.comparison_partial {
            out.push_str(&format!(
                "{}\n",
                style::format_warning(
                    "One of the periods has no readings; trends are unavailable",
                    opts.no_color
                )
            ));
        }
        if baseline.is_available() && !report.is_available() {
            out.push('\n');
            out.push_str(&band_table(baseline, opts));
            out.push('\n');
        }
        if !report.deltas.is_empty() {
            out.push_str(&delta_table(&report.deltas, opts));
            out.push('\n');
        }
    }

    if !report.distribution.is_empty() && !opts.compact {
        out.push_str(&format!("\n{}\n", opts.heading("Band distribution")));
        out.push_str(&format_distribution(&report.distribution));
    }

    if let Some(profile) = &report.occupancy {
        out.push_str(&format!("\n{}\n", opts.heading("Occupancy")));
        out.push_str(&format_occupancy(profile));
    }

    if let Some(comfort) = &report.comfort {
        out.push_str(&format!(
            "\nComfort: {:.1}% of {} readings within comfortable temperature and humidity\n",
            comfort.percent, comfort.samples
        ));
    }

    if !report.recommendations.is_empty() {
        out.push_str(&format!("\n{}\n", opts.heading("Recommendations")));
        out.push_str(&recommendation_lines(&report.recommendations, opts));
    }

    if !report.warnings.is_empty() {
        out.push('\n');
        for warning in &report.warnings {
            out.push_str(&format!(
                "{}\n",
                style::format_warning(&warning.to_string(), opts.no_color)
            ));
        }
    }

    out
}

pub fn format_report_csv(report: &SustainabilityReport) -> Result<String> {
    csv_output(|wtr| {
        wtr.write_record([
            "channel",
            "band",
            "mean",
            "median",
            "min",
            "max",
            "std_dev",
            "samples",
            "missing",
            "baseline_mean",
            "delta",
            "percent_change",
            "trend",
        ])?;
        for (channel, stats) in &report.channel_stats {
            let band = report
                .bands
                .get(channel)
                .map(|b| b.name().to_string())
                .unwrap_or_default();
            let delta = report.deltas.get(channel);
            wtr.write_record([
                channel.name().to_string(),
                band,
                opt_csv(stats.mean),
                opt_csv(stats.median),
                opt_csv(stats.min),
                opt_csv(stats.max),
                opt_csv(stats.std_dev),
                stats.sample_count.to_string(),
                stats.missing_count.to_string(),
                opt_csv(delta.and_then(|d| d.baseline_mean)),
                opt_csv(delta.and_then(|d| d.delta)),
                opt_csv(delta.and_then(|d| d.percent_change)),
                delta
                    .and_then(|d| d.trend)
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ])?;
        }
        Ok(())
    })
}

// ============================================================================
// Recommendations
// ============================================================================

fn recommendation_lines(recs: &[Recommendation], opts: &FormatOptions) -> String {
    let mut out = String::new();
    for rec in recs {
        out.push_str(&format!(
            "  {}. [{} {}] {}\n",
            rec.rank,
            rec.channel.label(),
            style::format_band_colored(rec.band, opts.no_color),
            rec.text
        ));
    }
    out
}

#[must_use]
pub fn format_recommendations_text(recs: &[Recommendation], opts: &FormatOptions) -> String {
    if recs.is_empty() {
        return format!(
            "{}\n",
            style::format_success("All channels are within good ranges.", opts.no_color)
        );
    }
    let mut out = style::format_title("Recommendations", opts.no_color);
    out.push('\n');
    out.push_str(&recommendation_lines(recs, opts));
    out
}

pub fn format_recommendations_csv(recs: &[Recommendation]) -> Result<String> {
    csv_output(|wtr| {
        wtr.write_record(["rank", "channel", "band", "grade", "penalty", "text"])?;
        for rec in recs {
            wtr.write_record([
                rec.rank.to_string(),
                rec.channel.name().to_string(),
                rec.band.name().to_string(),
                rec.grade.to_string(),
                rec.penalty.to_string(),
                rec.text.clone(),
            ])?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosense_core::{Engine, RawRecord, SensorDataset};
    use ecosense_types::TimeWindow;

    fn dataset() -> SensorDataset {
        SensorDataset::load(vec![
            RawRecord::new("2024-01-01 09:00:00", "413")
                .co2("1800")
                .temperature("22")
                .humidity("45")
                .light("300")
                .pir("1"),
            RawRecord::new("2024-01-01 10:00:00", "413")
                .co2("1700")
                .temperature("22.5")
                .humidity("46")
                .light("320")
                .pir("0"),
        ])
        .0
    }

    fn plain() -> FormatOptions {
        FormatOptions::new(true, false)
    }

    #[test]
    fn test_as_json_compact() {
        let opts = FormatOptions::new(true, true);
        let json = opts.as_json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(json, "{\"a\":1}\n");
    }

    #[test]
    fn test_summary_text() {
        let text = format_summary_text(&dataset().summary(), &plain());
        assert!(text.contains("Dataset: building 413"));
        assert!(text.contains("Readings:      2"));
        assert!(text.contains("CO2"));
        assert!(text.contains("1750"));
    }

    #[test]
    fn test_empty_summary_text() {
        let text = format_summary_text(&SensorDataset::default().summary(), &plain());
        assert_eq!(text, "Dataset is empty.\n");
    }

    #[test]
    fn test_summary_csv_has_row_per_channel() {
        let csv = format_summary_csv(&dataset().summary()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "channel,mean,median,min,max,std_dev,samples,missing");
        assert_eq!(lines.len(), 1 + Channel::ALL.len());
        assert!(lines.iter().any(|l| l.starts_with("co2,1750,1750,1700,1800,")));
    }

    #[test]
    fn test_report_text_sections() {
        let report = Engine::default()
            .get_stats(&dataset(), &TimeWindow::unbounded())
            .unwrap();
        let text = format_report_text(&report, &plain());
        assert!(text.contains("Sustainability Report: building 413"));
        assert!(text.contains("Score:"));
        assert!(text.contains("poor"));
        assert!(text.contains("Recommendations"));
        assert!(text.contains("1. [CO2 poor]"));
        assert!(text.contains("Occupancy"));
    }

    #[test]
    fn test_report_text_with_comparison() {
        let ds = dataset();
        let current = TimeWindow::parse(Some("2024-01-01 10:00:00"), Some("2024-01-01 11:00:00")).unwrap();
        let baseline = TimeWindow::parse(Some("2024-01-01 09:00:00"), Some("2024-01-01 10:00:00")).unwrap();
        let report = Engine::default().compare_periods(&ds, &current, &baseline).unwrap();
        let text = format_report_text(&report, &plain());
        assert!(text.contains("Compared with"));
        assert!(text.contains("Baseline score:"));
        assert!(text.contains("-100"));
        assert!(text.contains("improving"));
    }

    #[test]
    fn test_report_text_with_empty_current_window() {
        let ds = dataset();
        let current = TimeWindow::parse(Some("2023-01-01"), Some("2023-01-31")).unwrap();
        let report = Engine::default()
            .compare_periods(&ds, &current, &TimeWindow::unbounded())
            .unwrap();
        let text = format_report_text(&report, &plain());
        assert!(text.contains("No readings in this window."));
        assert!(text.contains("Compared with"));
        assert!(text.contains("Baseline score: "));
        assert!(!text.contains("Baseline score: N/A"));
        assert!(text.contains("[!!] One of the periods has no readings"));
        // the baseline's bands and the delta table are still rendered
        assert!(text.contains("poor"));
        assert!(text.contains("Baseline"));
        assert!(text.contains("1750"));
    }

    #[test]
    fn test_report_csv_includes_deltas() {
        let ds = dataset();
        let w = TimeWindow::unbounded();
        let report = Engine::default().compare_periods(&ds, &w, &w).unwrap();
        let csv = format_report_csv(&report).unwrap();
        let co2 = csv.lines().find(|l| l.starts_with("co2,")).unwrap();
        assert!(co2.contains(",poor,"));
        assert!(co2.ends_with(",0,0,stable"));
    }

    #[test]
    fn test_recommendations_text_and_csv() {
        let recs = Engine::default().get_recommendations(&dataset()).unwrap();
        let text = format_recommendations_text(&recs, &plain());
        assert!(text.starts_with("Recommendations\n"));
        assert!(text.contains("1. [CO2 poor]"));

        let csv = format_recommendations_csv(&recs).unwrap();
        assert!(csv.starts_with("rank,channel,band,grade,penalty,text\n"));
        assert!(csv.contains("1,co2,poor,poor,30,"));
    }

    #[test]
    fn test_no_recommendations() {
        let text = format_recommendations_text(&[], &plain());
        assert!(text.contains("[OK]"));
    }

    #[test]
    fn test_format_response_json_is_tagged() {
        let response = QueryResponse::Recommendations(Vec::new());
        let json = format_response(&response, OutputFormat::Json, &FormatOptions::new(true, true)).unwrap();
        assert_eq!(json, "{\"type\":\"recommendations\",\"data\":[]}\n");
    }

    #[test]
    fn test_hours_formatting() {
        assert_eq!(format_hours(&[]), "none");
        assert_eq!(format_hours(&[9, 14]), "09:00, 14:00");
    }
}
