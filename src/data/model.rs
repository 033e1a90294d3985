use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::stats::mean;

// ---------------------------------------------------------------------------
// Subject – one of the three scored exams
// ---------------------------------------------------------------------------

/// An exam subject with a numeric score column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Subject {
    Math,
    Reading,
    Writing,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Reading, Subject::Writing];

    /// Normalised column name in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Subject::Math => "math_score",
            Subject::Reading => "reading_score",
            Subject::Writing => "writing_score",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Category – categorical columns
// ---------------------------------------------------------------------------

/// A categorical column of the student table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Gender,
    RaceEthnicity,
    ParentalEducation,
    Lunch,
    TestPreparation,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Gender,
        Category::RaceEthnicity,
        Category::ParentalEducation,
        Category::Lunch,
        Category::TestPreparation,
    ];

    /// Normalised column name in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Category::Gender => "gender",
            Category::RaceEthnicity => "race/ethnicity",
            Category::ParentalEducation => "parental_level_of_education",
            Category::Lunch => "lunch",
            Category::TestPreparation => "test_preparation_course",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// StudentRecord – one row of the table
// ---------------------------------------------------------------------------

/// The three exam scores of one student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectScores {
    pub math: f64,
    pub reading: f64,
    pub writing: f64,
}

impl SubjectScores {
    pub fn get(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Math => self.math,
            Subject::Reading => self.reading,
            Subject::Writing => self.writing,
        }
    }

    /// Arithmetic mean of the three scores.
    pub fn mean(&self) -> f64 {
        (self.math + self.reading + self.writing) / 3.0
    }
}

/// A single student (one row of the source file).
///
/// `avg_score` is derived from the scores at construction and has no setter.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    scores: SubjectScores,
    avg_score: f64,
}

impl StudentRecord {
    pub fn new(
        gender: impl Into<String>,
        race_ethnicity: impl Into<String>,
        parental_level_of_education: impl Into<String>,
        lunch: impl Into<String>,
        test_preparation_course: impl Into<String>,
        scores: SubjectScores,
    ) -> Self {
        StudentRecord {
            gender: gender.into(),
            race_ethnicity: race_ethnicity.into(),
            parental_level_of_education: parental_level_of_education.into(),
            lunch: lunch.into(),
            test_preparation_course: test_preparation_course.into(),
            avg_score: scores.mean(),
            scores,
        }
    }

    pub fn category(&self, category: Category) -> &str {
        match category {
            Category::Gender => &self.gender,
            Category::RaceEthnicity => &self.race_ethnicity,
            Category::ParentalEducation => &self.parental_level_of_education,
            Category::Lunch => &self.lunch,
            Category::TestPreparation => &self.test_preparation_course,
        }
    }

    pub fn scores(&self) -> SubjectScores {
        self.scores
    }

    pub fn score(&self, subject: Subject) -> f64 {
        self.scores.get(subject)
    }

    pub fn avg_score(&self) -> f64 {
        self.avg_score
    }
}

// ---------------------------------------------------------------------------
// StudentTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Row accounting gathered while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows found in the source.
    pub rows_read: usize,
    /// Rows excluded because a score was missing or non-numeric.
    pub rows_dropped: usize,
}

/// The full parsed table with pre-computed indices.
#[derive(Debug, Clone)]
pub struct StudentTable {
    /// All students (rows), in source order.
    pub records: Vec<StudentRecord>,
    /// For each categorical column the sorted set of unique values.
    pub unique_values: BTreeMap<Category, BTreeSet<String>>,
    pub report: LoadReport,
    baseline_avg: Option<f64>,
}

impl StudentTable {
    /// Build indices and the baseline mean from loaded records.
    pub fn from_records(records: Vec<StudentRecord>, report: LoadReport) -> Self {
        let mut unique_values: BTreeMap<Category, BTreeSet<String>> = Category::ALL
            .iter()
            .map(|&c| (c, BTreeSet::new()))
            .collect();

        for rec in &records {
            for category in Category::ALL {
                unique_values
                    .entry(category)
                    .or_default()
                    .insert(rec.category(category).to_string());
            }
        }

        let baseline_avg = mean(records.iter().map(StudentRecord::avg_score));

        StudentTable {
            records,
            unique_values,
            report,
            baseline_avg,
        }
    }

    /// Number of students.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean avg_score over every row. Fixed for the lifetime of the table.
    pub fn baseline_avg(&self) -> Option<f64> {
        self.baseline_avg
    }

    /// Sorted unique values of a categorical column.
    pub fn options(&self, category: Category) -> Vec<String> {
        self.unique_values
            .get(&category)
            .map(|vals| vals.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `(floor(min avg_score), ceil(max avg_score))`, or `(0, 0)` when empty.
    pub fn avg_score_bounds(&self) -> (f64, f64) {
        let mut iter = self.records.iter().map(StudentRecord::avg_score);
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        let (lo, hi) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (lo.floor(), hi.ceil())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(race: &str, prep: &str, math: f64, reading: f64, writing: f64) -> StudentRecord {
        StudentRecord::new(
            "female",
            race,
            "some college",
            "standard",
            prep,
            SubjectScores {
                math,
                reading,
                writing,
            },
        )
    }

    pub(crate) fn sample_table() -> StudentTable {
        StudentTable::from_records(
            vec![
                record("group A", "none", 40.0, 50.0, 60.0),
                record("group B", "completed", 70.0, 80.0, 90.0),
                record("group B", "none", 90.0, 95.0, 100.0),
                record("group C", "completed", 55.0, 65.0, 60.0),
            ],
            LoadReport {
                rows_read: 4,
                rows_dropped: 0,
            },
        )
    }

    #[test]
    fn avg_score_is_mean_of_scores() {
        let rec = record("group A", "none", 72.0, 72.0, 74.0);
        assert!((rec.avg_score() - 218.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn unique_values_are_sorted_per_category() {
        let table = sample_table();
        assert_eq!(
            table.options(Category::RaceEthnicity),
            vec!["group A", "group B", "group C"]
        );
        assert_eq!(table.options(Category::TestPreparation), vec!["completed", "none"]);
    }

    #[test]
    fn baseline_covers_whole_table() {
        let table = sample_table();
        let expected = (50.0 + 80.0 + 95.0 + 60.0) / 4.0;
        assert!((table.baseline_avg().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn bounds_round_outwards() {
        let table = StudentTable::from_records(
            vec![record("a", "none", 10.0, 11.0, 11.0), record("a", "none", 99.0, 100.0, 100.0)],
            LoadReport::default(),
        );
        assert_eq!(table.avg_score_bounds(), (10.0, 100.0));
    }

    #[test]
    fn empty_table_has_no_baseline() {
        let table = StudentTable::from_records(Vec::new(), LoadReport::default());
        assert!(table.baseline_avg().is_none());
        assert_eq!(table.avg_score_bounds(), (0.0, 0.0));
        assert!(table.options(Category::Gender).is_empty());
    }
}
