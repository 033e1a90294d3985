use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{Category, StudentRecord, StudentTable};

// ---------------------------------------------------------------------------
// Filter predicate: selected values plus an inclusive score range
// ---------------------------------------------------------------------------

/// Inclusive range over `avg_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The user's current filter choices.
///
/// An empty race or prep set selects nothing; it is not "no filter".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub races: BTreeSet<String>,
    pub preps: BTreeSet<String>,
    pub avg_range: ScoreRange,
}

impl FilterSelection {
    /// Everything selected, range `[default_min, upper bound]`.
    ///
    /// `default_min` is clamped into the table's slider bounds.
    pub fn for_table(table: &StudentTable, default_min: f64) -> Self {
        let (lo, hi) = table.avg_score_bounds();
        FilterSelection {
            races: table.options(Category::RaceEthnicity).into_iter().collect(),
            preps: table.options(Category::TestPreparation).into_iter().collect(),
            avg_range: ScoreRange {
                min: default_min.clamp(lo, hi),
                max: hi,
            },
        }
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, rec: &StudentRecord) -> bool {
        self.races.contains(&rec.race_ethnicity)
            && self.preps.contains(&rec.test_preparation_course)
            && self.avg_range.contains(rec.avg_score())
    }

    /// Toggle a single value in a categorical selection.
    pub fn toggle(&mut self, category: Category, value: &str) {
        let Some(selected) = self.set_mut(category) else {
            return;
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Mutable access to the selection set of a filterable column.
    pub fn set_mut(&mut self, category: Category) -> Option<&mut BTreeSet<String>> {
        match category {
            Category::RaceEthnicity => Some(&mut self.races),
            Category::TestPreparation => Some(&mut self.preps),
            _ => None,
        }
    }

    pub fn set(&self, category: Category) -> Option<&BTreeSet<String>> {
        match category {
            Category::RaceEthnicity => Some(&self.races),
            Category::TestPreparation => Some(&self.preps),
            _ => None,
        }
    }
}

/// Return indices of records that pass all active filters, in table order.
pub fn filtered_indices(table: &StudentTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – read-only projection of the table
// ---------------------------------------------------------------------------

/// Records of a table that satisfy a selection.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    table: &'a StudentTable,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(table: &'a StudentTable, indices: &'a [usize]) -> Self {
        FilteredView { table, indices }
    }

    pub fn table(&self) -> &'a StudentTable {
        self.table
    }

    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a StudentRecord> + 'a {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }

    /// Indices ordered by `avg_score` descending; ties keep table order.
    pub fn sorted_by_avg_desc(&self) -> Vec<usize> {
        let mut order = self.indices.to_vec();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.table.records[a], &self.table.records[b]);
            b.avg_score().total_cmp(&a.avg_score())
        });
        order
    }
}
