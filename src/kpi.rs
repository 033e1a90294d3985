use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::Subject;
use crate::data::stats::mean;
use crate::error::{DashboardError, Result};

/// Headline numbers for the current filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_students: usize,
    pub avg_math: f64,
    pub avg_reading: f64,
    pub avg_writing: f64,
    /// Mean avg_score over the unfiltered table.
    pub baseline_avg: f64,
    /// `avg_math - baseline_avg`.
    pub math_delta: f64,
}

impl Kpis {
    /// Aggregate a non-empty view.  An empty view yields
    /// [`DashboardError::EmptyResult`].
    pub fn compute(view: &FilteredView<'_>) -> Result<Self> {
        let subject_mean = |subject: Subject| mean(view.records().map(|r| r.score(subject)));

        let (Some(avg_math), Some(avg_reading), Some(avg_writing)) = (
            subject_mean(Subject::Math),
            subject_mean(Subject::Reading),
            subject_mean(Subject::Writing),
        ) else {
            return Err(DashboardError::EmptyResult);
        };
        let baseline_avg = view.table().baseline_avg().ok_or(DashboardError::EmptyResult)?;

        Ok(Kpis {
            total_students: view.len(),
            avg_math,
            avg_reading,
            avg_writing,
            baseline_avg,
            math_delta: avg_math - baseline_avg,
        })
    }

    /// Display strings for the KPI tiles: `(label, value, delta)`.
    pub fn tiles(&self) -> [(&'static str, String, Option<String>); 4] {
        [
            ("Total Students", format_count(self.total_students), None),
            (
                "Average Math Score",
                format!("{:.1}", self.avg_math),
                Some(format_delta(self.math_delta)),
            ),
            ("Average Reading Score", format!("{:.1}", self.avg_reading), None),
            ("Average Writing Score", format!("{:.1}", self.avg_writing), None),
        ]
    }
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Signed one-decimal delta, e.g. `"+2.3 vs Full Avg"`.
pub fn format_delta(delta: f64) -> String {
    let text = format!("{delta:+.1}");
    let text = if text == "-0.0" { "+0.0".to_string() } else { text };
    format!("{text} vs Full Avg")
}
