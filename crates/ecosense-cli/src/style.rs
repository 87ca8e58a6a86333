//! Visual styling utilities for the CLI.
//!
//! Colors follow the grade of a band: green for excellent and good, yellow
//! for moderate, orange for poor. Every helper has a plain rendering for
//! `--no-color`.

use owo_colors::OwoColorize;

use ecosense_types::{ConditionBand, Grade, Trend};

// ============================================================================
// Colored Value Formatting
// ============================================================================

/// Format a condition band with a color for its grade.
pub fn format_band_colored(band: ConditionBand, no_color: bool) -> String {
    let name = band.name();
    if no_color {
        return name.to_string();
    }

    match band.grade() {
        Some(Grade::Excellent) | Some(Grade::Good) => format!("{}", name.green()),
        Some(Grade::Moderate) => format!("{}", name.yellow()),
        // Orange color (RGB: 255, 165, 0)
        Some(Grade::Poor) => format!("{}", name.truecolor(255, 165, 0)),
        None => format!("{}", name.dimmed()),
    }
}

/// Format a 0-100 score, or `N/A` when no channel could be assessed.
pub fn format_score_colored(score: Option<u8>, no_color: bool) -> String {
    let Some(score) = score else {
        return "N/A".to_string();
    };
    let text = format!("{}/100", score);
    if no_color {
        text
    } else if score >= 80 {
        format!("{}", text.green())
    } else if score >= 60 {
        format!("{}", text.yellow())
    } else {
        format!("{}", text.red())
    }
}

/// One-word verdict for a score.
pub fn score_summary(score: u8) -> &'static str {
    match score {
        90..=100 => "Excellent",
        75..=89 => "Good",
        50..=74 => "Fair",
        _ => "Poor",
    }
}

/// Format an optional number with a fixed precision.
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

// ============================================================================
// Trend Indicators
// ============================================================================

/// Arrow for the direction of change, colored by whether it is an improvement.
pub fn trend_indicator(delta: f64, trend: Trend, no_color: bool) -> String {
    if trend == Trend::Stable {
        return "-".to_string();
    }
    let arrow = match (delta > 0.0, no_color) {
        (true, true) => "^",
        (true, false) => "↑",
        (false, true) => "v",
        (false, false) => "↓",
    };
    if no_color {
        return arrow.to_string();
    }
    match trend {
        Trend::Improving => format!("{}", arrow.green()),
        Trend::Worsening => format!("{}", arrow.red()),
        Trend::Stable => arrow.to_string(),
    }
}

// ============================================================================
// Section Headers
// ============================================================================

/// Format a title with underline.
pub fn format_title(title: &str, no_color: bool) -> String {
    let underline = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, underline)
    } else {
        format!("{}\n{}", title.bold(), underline.dimmed())
    }
}

/// Apply the table style shared by every command.
pub fn apply_table_style(table: &mut tabled::Table, no_color: bool) {
    use tabled::settings::Style;
    if no_color {
        table.with(Style::ascii());
    } else {
        table.with(Style::rounded());
    }
}
