//! Chart recipes: a pure mapping from (mode, filtered view) to a chart
//! description the UI can draw or the headless summary can serialise.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::filter::FilteredView;
use crate::data::model::{Category, StudentRecord, Subject};
use crate::data::stats::{mean, quantile, sorted};

// ---------------------------------------------------------------------------
// ChartKind – the user-facing selector
// ---------------------------------------------------------------------------

/// Chart type shown in the primary panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    #[default]
    Bar,
    Histogram,
    BoxPlot,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::BoxPlot,
        ChartKind::Pie,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart (Scores by Education)",
            ChartKind::Histogram => "Histogram (Math Score)",
            ChartKind::BoxPlot => "Box Plot (Math Score)",
            ChartKind::Pie => "Pie Chart (Test Prep Status)",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Mean of each subject per group, one bar per (group, subject).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBarRecipe {
    pub group_by: Category,
    pub subjects: Vec<Subject>,
}

/// Distribution of one score, one series per colour group.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRecipe {
    pub value: Subject,
    pub color_by: Category,
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotRecipe {
    pub value: Subject,
    pub group_by: Category,
    pub notched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieRecipe {
    pub names: Category,
}

/// The fixed secondary panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterRecipe {
    pub x: Subject,
    pub y: Subject,
    pub color_by: Category,
}

impl Default for ScatterRecipe {
    fn default() -> Self {
        ScatterRecipe {
            x: Subject::Reading,
            y: Subject::Writing,
            color_by: Category::Gender,
        }
    }
}

/// One selectable chart mode with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartMode {
    GroupedBar(GroupedBarRecipe),
    Histogram(HistogramRecipe),
    BoxPlot(BoxPlotRecipe),
    Pie(PieRecipe),
}

impl ChartMode {
    /// The dashboard's recipe for a selector value.
    pub fn for_kind(kind: ChartKind, histogram_bins: usize) -> Self {
        match kind {
            ChartKind::Bar => ChartMode::GroupedBar(GroupedBarRecipe {
                group_by: Category::ParentalEducation,
                subjects: Subject::ALL.to_vec(),
            }),
            ChartKind::Histogram => ChartMode::Histogram(HistogramRecipe {
                value: Subject::Math,
                color_by: Category::Gender,
                bins: histogram_bins.max(1),
            }),
            ChartKind::BoxPlot => ChartMode::BoxPlot(BoxPlotRecipe {
                value: Subject::Math,
                group_by: Category::Gender,
                notched: true,
            }),
            ChartKind::Pie => ChartMode::Pie(PieRecipe {
                names: Category::TestPreparation,
            }),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartMode::GroupedBar(_) => ChartKind::Bar,
            ChartMode::Histogram(_) => ChartKind::Histogram,
            ChartMode::BoxPlot(_) => ChartKind::BoxPlot,
            ChartMode::Pie(_) => ChartKind::Pie,
        }
    }

    /// Build the chart description for a view.
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        match self {
            ChartMode::GroupedBar(r) => r.build(view),
            ChartMode::Histogram(r) => r.build(view),
            ChartMode::BoxPlot(r) => r.build(view),
            ChartMode::Pie(r) => r.build(view),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

/// A renderable chart: panel heading, chart title and typed body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub subheading: &'static str,
    pub title: &'static str,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Bar(BarChartSpec),
    Histogram(HistogramSpec),
    Box(BoxPlotSpec),
    Pie(PieSpec),
    Scatter(ScatterSpec),
}

/// One (group, subject, value) row of the long-form bar data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub group: String,
    pub subject: Subject,
    pub value: f64,
}

/// Per-group subject means before reshaping.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub group: String,
    /// Aligned with the recipe's subjects.
    pub means: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub group_by: Category,
    /// X-axis categories in display order.
    pub groups: Vec<String>,
    pub subjects: Vec<Subject>,
    pub rows: Vec<LongRow>,
}

impl BarChartSpec {
    /// Values of one subject aligned with `groups`.
    pub fn series(&self, subject: Subject) -> Vec<f64> {
        self.groups
            .iter()
            .map(|g| {
                self.rows
                    .iter()
                    .find(|r| r.subject == subject && &r.group == g)
                    .map_or(0.0, |r| r.value)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub value: Subject,
    pub color_by: Category,
    /// `bins + 1` ascending bin edges; the last bin is closed.
    pub edges: Vec<f64>,
    pub series: Vec<HistogramSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub name: String,
    pub counts: Vec<usize>,
    /// Marginal box summary of the same values.
    pub marginal: BoxStats,
}

/// Five-number summary with whiskers, outliers and notch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub name: String,
    pub n: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    /// `median ± 1.57 * IQR / sqrt(n)`.
    pub notch: (f64, f64),
}

impl BoxStats {
    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let data = sorted(values);
        let median = quantile(&data, 0.5)?;
        let q1 = quantile(&data, 0.25)?;
        let q3 = quantile(&data, 0.75)?;
        let iqr = q3 - q1;
        let (fence_lo, fence_hi) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = || data.iter().copied().filter(|v| (fence_lo..=fence_hi).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = data
            .iter()
            .copied()
            .filter(|v| !(fence_lo..=fence_hi).contains(v))
            .collect();
        let half_notch = 1.57 * iqr / (data.len() as f64).sqrt();

        Some(BoxStats {
            name: name.into(),
            n: data.len(),
            mean: mean(data.iter().copied())?,
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
            notch: (median - half_notch, median + half_notch),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSpec {
    pub value: Subject,
    pub group_by: Category,
    pub notched: bool,
    pub groups: Vec<BoxStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSpec {
    pub names: Category,
    /// Largest slice first.
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub x: Subject,
    pub y: Subject,
    pub color_by: Category,
    pub series: Vec<ScatterSeries>,
}

// ---------------------------------------------------------------------------
// Recipe implementations
// ---------------------------------------------------------------------------

/// Group records by a category value, groups in sorted order.
fn group_records<'a>(
    view: &FilteredView<'a>,
    category: Category,
) -> BTreeMap<&'a str, Vec<&'a StudentRecord>> {
    let mut groups: BTreeMap<&str, Vec<&StudentRecord>> = BTreeMap::new();
    for rec in view.records() {
        groups.entry(rec.category(category)).or_default().push(rec);
    }
    groups
}

/// Mean of each subject per group (wide form).
pub fn subject_means_by_group(
    view: &FilteredView<'_>,
    group_by: Category,
    subjects: &[Subject],
) -> Vec<WideRow> {
    group_records(view, group_by)
        .into_iter()
        .map(|(group, recs)| WideRow {
            group: group.to_string(),
            means: subjects
                .iter()
                .map(|&s| mean(recs.iter().map(|r| r.score(s))).unwrap_or(0.0))
                .collect(),
        })
        .collect()
}

/// Reshape wide rows into one long row per (group, subject), subject-major.
pub fn melt(wide: &[WideRow], subjects: &[Subject]) -> Vec<LongRow> {
    subjects
        .iter()
        .enumerate()
        .flat_map(move |(col, &subject)| {
            wide.iter().filter_map(move |row| {
                row.means.get(col).map(|&value| LongRow {
                    group: row.group.clone(),
                    subject,
                    value,
                })
            })
        })
        .collect()
}

impl GroupedBarRecipe {
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        let wide = subject_means_by_group(view, self.group_by, &self.subjects);
        let rows = melt(&wide, &self.subjects);
        ChartSpec {
            subheading: "Average Scores by Parental Education",
            title: "Average Score by Parental Education",
            body: ChartBody::Bar(BarChartSpec {
                group_by: self.group_by,
                groups: wide.into_iter().map(|w| w.group).collect(),
                subjects: self.subjects.clone(),
                rows,
            }),
        }
    }
}

/// Equal-width bin edges spanning `values`.
pub fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
    let bins = bins.max(1);
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return Vec::new();
    }
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;
    (0..=bins).map(|i| lo + width * i as f64).collect()
}

/// Count `values` into the bins described by `edges`.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let (lo, hi) = (edges[0], edges[bins]);
    let width = (hi - lo) / bins as f64;
    for &v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

impl HistogramRecipe {
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        let all: Vec<f64> = view.records().map(|r| r.score(self.value)).collect();
        let edges = bin_edges(&all, self.bins);

        let series = group_records(view, self.color_by)
            .into_iter()
            .filter_map(|(name, recs)| {
                let values: Vec<f64> = recs.iter().map(|r| r.score(self.value)).collect();
                Some(HistogramSeries {
                    name: name.to_string(),
                    counts: bin_counts(&values, &edges),
                    marginal: BoxStats::from_values(name, values)?,
                })
            })
            .collect();

        ChartSpec {
            subheading: "Distribution of Math Scores",
            title: "Frequency of Math Scores by Gender",
            body: ChartBody::Histogram(HistogramSpec {
                value: self.value,
                color_by: self.color_by,
                edges,
                series,
            }),
        }
    }
}

impl BoxPlotRecipe {
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        let groups = group_records(view, self.group_by)
            .into_iter()
            .filter_map(|(name, recs)| {
                BoxStats::from_values(name, recs.iter().map(|r| r.score(self.value)))
            })
            .collect();

        ChartSpec {
            subheading: "Math Score Quartiles and Outliers",
            title: "Math Score Distribution by Gender",
            body: ChartBody::Box(BoxPlotSpec {
                value: self.value,
                group_by: self.group_by,
                notched: self.notched,
                groups,
            }),
        }
    }
}

impl PieRecipe {
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        let total = view.len().max(1) as f64;
        let mut slices: Vec<PieSlice> = group_records(view, self.names)
            .into_iter()
            .map(|(label, recs)| PieSlice {
                label: label.to_string(),
                count: recs.len(),
                fraction: recs.len() as f64 / total,
            })
            .collect();
        slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        ChartSpec {
            subheading: "Proportion by Test Preparation Status",
            title: "Student Proportion by Test Preparation Status",
            body: ChartBody::Pie(PieSpec {
                names: self.names,
                slices,
            }),
        }
    }
}

impl ScatterRecipe {
    pub fn build(&self, view: &FilteredView<'_>) -> ChartSpec {
        let series = group_records(view, self.color_by)
            .into_iter()
            .map(|(name, recs)| ScatterSeries {
                name: name.to_string(),
                points: recs
                    .iter()
                    .map(|r| ScatterPoint {
                        x: r.score(self.x),
                        y: r.score(self.y),
                        hover: format!(
                            "{}={}, {}={}",
                            Subject::Math,
                            r.score(Subject::Math),
                            Category::RaceEthnicity,
                            r.race_ethnicity
                        ),
                    })
                    .collect(),
            })
            .collect();

        ChartSpec {
            subheading: "Reading Score vs. Writing Score",
            title: "Relationship between Reading and Writing Scores",
            body: ChartBody::Scatter(ScatterSpec {
                x: self.x,
                y: self.y,
                color_by: self.color_by,
                series,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LoadReport, StudentTable, SubjectScores};

    fn rec(gender: &str, edu: &str, prep: &str, math: f64, reading: f64, writing: f64) -> StudentRecord {
        StudentRecord::new(
            gender,
            "group A",
            edu,
            "standard",
            prep,
            SubjectScores {
                math,
                reading,
                writing,
            },
        )
    }

    fn table() -> StudentTable {
        StudentTable::from_records(
            vec![
                rec("female", "high school", "none", 60.0, 70.0, 80.0),
                rec("male", "high school", "completed", 80.0, 60.0, 50.0),
                rec("female", "master's degree", "none", 90.0, 95.0, 100.0),
                rec("male", "some college", "none", 40.0, 45.0, 35.0),
                rec("male", "some college", "none", 50.0, 55.0, 45.0),
            ],
            LoadReport::default(),
        )
    }

    fn all_indices(t: &StudentTable) -> Vec<usize> {
        (0..t.len()).collect()
    }

    #[test]
    fn melt_yields_one_row_per_group_and_subject() {
        let t = table();
        let idx = all_indices(&t);
        let view = FilteredView::new(&t, &idx);
        let wide = subject_means_by_group(&view, Category::ParentalEducation, &Subject::ALL);
        assert_eq!(wide.len(), 3);

        let long = melt(&wide, &Subject::ALL);
        assert_eq!(long.len(), 9);
        for w in &wide {
            for (col, &s) in Subject::ALL.iter().enumerate() {
                let hits: Vec<&LongRow> = long
                    .iter()
                    .filter(|r| r.group == w.group && r.subject == s)
                    .collect();
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].value, w.means[col]);
            }
        }
    }

    #[test]
    fn grouped_bar_means_per_education() {
        let t = table();
        let idx = all_indices(&t);
        let spec = ChartMode::for_kind(ChartKind::Bar, 20).build(&FilteredView::new(&t, &idx));
        let ChartBody::Bar(bar) = spec.body else {
            panic!("expected bar chart");
        };
        assert_eq!(bar.groups, vec!["high school", "master's degree", "some college"]);
        assert_eq!(bar.series(Subject::Math), vec![70.0, 90.0, 45.0]);
        assert_eq!(bar.series(Subject::Writing), vec![65.0, 100.0, 40.0]);
    }

    #[test]
    fn histogram_counts_cover_every_value() {
        let t = table();
        let idx = all_indices(&t);
        let spec = ChartMode::for_kind(ChartKind::Histogram, 5).build(&FilteredView::new(&t, &idx));
        let ChartBody::Histogram(h) = spec.body else {
            panic!("expected histogram");
        };
        assert_eq!(h.edges, vec![40.0, 50.0, 60.0, 70.0, 80.0, 90.0]);
        let total: usize = h.series.iter().flat_map(|s| s.counts.iter()).sum();
        assert_eq!(total, 5);
        let female = h.series.iter().find(|s| s.name == "female").unwrap();
        assert_eq!(female.counts, vec![0, 0, 1, 0, 1]);
        assert_eq!(female.marginal.n, 2);
    }

    #[test]
    fn bin_edges_widen_a_constant_sample() {
        assert_eq!(bin_edges(&[7.0, 7.0], 2), vec![6.5, 7.0, 7.5]);
        assert!(bin_edges(&[], 4).is_empty());
        assert!(bin_counts(&[1.0], &[]).is_empty());
    }

    #[test]
    fn box_stats_find_outliers() {
        let stats = BoxStats::from_values("x", [1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(stats.notch.0 < stats.median && stats.median < stats.notch.1);
        assert!(BoxStats::from_values("empty", []).is_none());
    }

    #[test]
    fn box_plot_groups_by_gender() {
        let t = table();
        let idx = all_indices(&t);
        let spec = ChartMode::for_kind(ChartKind::BoxPlot, 20).build(&FilteredView::new(&t, &idx));
        let ChartBody::Box(b) = spec.body else {
            panic!("expected box plot");
        };
        assert!(b.notched);
        let names: Vec<&str> = b.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["female", "male"]);
        assert_eq!(b.groups[1].median, 50.0);
    }

    #[test]
    fn pie_fractions_sum_to_one() {
        let t = table();
        let idx = all_indices(&t);
        let spec = ChartMode::for_kind(ChartKind::Pie, 20).build(&FilteredView::new(&t, &idx));
        let ChartBody::Pie(p) = spec.body else {
            panic!("expected pie chart");
        };
        assert_eq!(p.slices[0].label, "none");
        assert_eq!(p.slices[0].count, 4);
        let sum: f64 = p.slices.iter().map(|s| s.fraction).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scatter_splits_by_gender_with_hover() {
        let t = table();
        let idx = vec![0, 1];
        let spec = ScatterRecipe::default().build(&FilteredView::new(&t, &idx));
        let ChartBody::Scatter(s) = spec.body else {
            panic!("expected scatter");
        };
        assert_eq!(s.series.len(), 2);
        assert_eq!(s.series[0].points[0].x, 70.0);
        assert_eq!(s.series[0].points[0].y, 80.0);
        assert_eq!(s.series[0].points[0].hover, "math_score=60, race/ethnicity=group A");
    }

    #[test]
    fn every_kind_round_trips_through_its_mode() {
        for kind in ChartKind::ALL {
            assert_eq!(ChartMode::for_kind(kind, 10).kind(), kind);
        }
    }
}
