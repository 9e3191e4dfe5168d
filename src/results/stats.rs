//! Statistics over the session history
//!
//! Pure aggregation queries over an in-memory slice of results: global
//! totals, breakdowns by section, calendar day, and session kind, a linear
//! trend over the daily percentages, and the tabular projection consumed by
//! exporters.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::store::{SessionKind, SessionResult};
use crate::bank::catalog::DEFAULT_SECTION;

/// Accumulated score over a group of sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Sum of correct answers
    pub score: u32,
    /// Sum of presented questions
    pub total: u32,
}

impl Tally {
    fn record(&mut self, result: &SessionResult) {
        self.score += result.score;
        self.total += result.total;
    }

    /// Score as a percentage of the total, 0 when nothing was presented
    pub fn percentage(&self) -> f64 {
        if self.total == 0 { 0.0 } else { 100.0 * f64::from(self.score) / f64::from(self.total) }
    }
}

/// Totals across the whole history
pub fn global_tally(results: &[SessionResult]) -> Tally {
    let mut tally = Tally::default();
    for result in results {
        tally.record(result);
    }
    tally
}

/// Totals per section; sessions without a section count under the default
/// label
pub fn by_section(results: &[SessionResult]) -> BTreeMap<String, Tally> {
    let mut groups: BTreeMap<String, Tally> = BTreeMap::new();
    for result in results {
        let section = result.section.clone().unwrap_or_else(|| DEFAULT_SECTION.to_string());
        groups.entry(section).or_default().record(result);
    }
    groups
}

/// Totals per calendar day of completion
pub fn by_day(results: &[SessionResult]) -> BTreeMap<NaiveDate, Tally> {
    let mut groups: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for result in results {
        groups.entry(result.date.date()).or_default().record(result);
    }
    groups
}

/// Totals per session kind
pub fn by_kind(results: &[SessionResult]) -> BTreeMap<SessionKind, Tally> {
    let mut groups: BTreeMap<SessionKind, Tally> = BTreeMap::new();
    for result in results {
        groups.entry(result.kind).or_default().record(result);
    }
    groups
}

/// Least-squares line over the daily percentages
///
/// Fitted over x = 0..K-1 for the K distinct days in chronological order,
/// y = that day's percentage. Display-oriented; requires at least two days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    /// Percentage points gained per day
    pub slope: f64,
    /// Fitted percentage at the first day
    pub intercept: f64,
}

/// Fit [`TrendLine`] over the history's daily percentages
pub fn daily_trend(results: &[SessionResult]) -> Option<TrendLine> {
    let days = by_day(results);
    let n = days.len();
    if n < 2 {
        return None;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_xy = 0.0;
    for (i, tally) in days.values().enumerate() {
        let x = i as f64;
        let y = tally.percentage();
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }

    let n = n as f64;
    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some(TrendLine { slope, intercept })
}

/// One exportable history row
///
/// Field order is the column order: date, section, type, test, score, total,
/// percentage. Serializing the rows (CSV or otherwise) is the caller's
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    /// Completion time
    pub date: NaiveDateTime,
    /// Section label; the default label when the session spanned sections
    pub section: String,
    /// Session kind label
    #[serde(rename = "type")]
    pub kind: SessionKind,
    /// Source test file, or empty for multi-file sessions
    pub test: String,
    /// Correct answers
    pub score: u32,
    /// Presented questions
    pub total: u32,
    /// Per-session percentage
    pub percentage: f64,
}

/// Project the history into export rows, in append order
pub fn export_rows(results: &[SessionResult]) -> Vec<ExportRow> {
    results
        .iter()
        .map(|result| ExportRow {
            date: result.date,
            section: result.section.clone().unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            kind: result.kind,
            test: result.test.clone().unwrap_or_default(),
            score: result.score,
            total: result.total,
            percentage: Tally { score: result.score, total: result.total }.percentage(),
        })
        .collect()
}
