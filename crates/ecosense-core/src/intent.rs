//! Free-text question routing.
//!
//! Front ends turn a user's question into a [`Query`] through an
//! [`IntentClassifier`]. The built-in [`KeywordClassifier`] matches keywords
//! and `YYYY-MM-DD` dates; other implementations (an LLM tool router, for
//! example) can be plugged in behind the same trait.

use time::Date;

use ecosense_types::{TimeWindow, parse_date};

use crate::engine::Query;

/// Maps a question to a query, or `None` when it is not about the data.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Query>;
}

/// Keyword lists used by [`KeywordClassifier`], checked in this order.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    pub compare: Vec<String>,
    pub recommend: Vec<String>,
    pub summary: Vec<String>,
    pub stats: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            compare: words(&["compare", "comparison", "versus", "vs", "difference", "change"]),
            recommend: words(&[
                "recommend",
                "recommendation",
                "recommendations",
                "improve",
                "suggest",
                "suggestions",
                "advice",
                "action",
                "actions",
            ]),
            summary: words(&["summary", "overview", "available", "sensors", "dataset"]),
            stats: words(&[
                "stats",
                "statistics",
                "average",
                "mean",
                "co2",
                "temperature",
                "humidity",
                "light",
                "lighting",
                "occupancy",
                "motion",
                "comfort",
                "report",
                "score",
                "sustainability",
                "analyze",
                "analysis",
            ]),
        }
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn mentions(tokens: &[String], keywords: &[String]) -> bool {
    tokens.iter().any(|t| keywords.contains(t))
}

/// `YYYY-MM-DD` dates in the order they appear.
fn dates(text: &str) -> Vec<Date> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '-'))
        .filter(|t| t.len() == 10)
        .filter_map(|t| parse_date(t).ok())
        .collect()
}

fn window_for(dates: &[Date]) -> Option<TimeWindow> {
    match dates {
        [] => Some(TimeWindow::unbounded()),
        [day] => TimeWindow::day(*day).ok(),
        [first, last, ..] => TimeWindow::days(*first, *last).ok(),
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<Query> {
        let tokens = tokens(text);
        let dates = dates(text);

        if mentions(&tokens, &self.compare) && dates.len() >= 2 {
            let (current, baseline) = match dates.as_slice() {
                [a, b, c, d, ..] => (TimeWindow::days(*a, *b).ok()?, TimeWindow::days(*c, *d).ok()?),
                [a, b, ..] => (TimeWindow::day(*a).ok()?, TimeWindow::day(*b).ok()?),
                _ => return None,
            };
            return Some(Query::Compare { current, baseline });
        }
        if mentions(&tokens, &self.recommend) {
            return Some(Query::Recommendations);
        }
        if mentions(&tokens, &self.summary) {
            return Some(Query::Summary);
        }
        if mentions(&tokens, &self.stats) || !dates.is_empty() {
            return window_for(&dates).map(|window| Query::Stats { window });
        }
        None
    }
}
