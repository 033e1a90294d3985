use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chart::ChartKind;
use crate::config::DashboardConfig;
use crate::dashboard::{DashboardFrame, build_frame};
use crate::data::cache::LoadCache;
use crate::data::filter::{FilterSelection, ScoreRange};
use crate::data::model::{Category, StudentTable};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Outcome of the latest recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameState {
    /// No table loaded yet.
    NoData,
    /// The selection matches no students.
    Empty,
    Ready(Box<DashboardFrame>),
}

/// One user's session, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Tables loaded this session, by path.
    cache: LoadCache,

    /// Path of the table currently shown.
    pub data_path: Option<PathBuf>,

    /// Loaded table (None until a file loads).
    pub table: Option<Arc<StudentTable>>,

    /// Current filter choices; rebuilt when a table loads.
    pub selection: Option<FilterSelection>,

    /// Which chart the primary panel shows.
    pub chart_kind: ChartKind,

    /// Whether the raw-data table is expanded.
    pub show_raw_table: bool,

    /// Result of the latest filter → aggregate → chart pass.
    pub frame: FrameState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            chart_kind: config.default_chart,
            config,
            cache: LoadCache::new(),
            data_path: None,
            table: None,
            selection: None,
            show_raw_table: false,
            frame: FrameState::NoData,
            status_message: None,
        }
    }

    /// Load (or fetch from cache) the table at `path` and make it current.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let table = self
            .cache
            .get_or_load(path)
            .with_context(|| format!("loading {}", path.display()))?;
        self.set_table(path.to_path_buf(), table);
        Ok(())
    }

    /// Drop the cached copy of the current file and load it again.
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.data_path.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.open(&path)
    }

    /// Ingest a loaded table and reset filters to "everything selected".
    pub fn set_table(&mut self, path: PathBuf, table: Arc<StudentTable>) {
        self.selection = Some(FilterSelection::for_table(&table, self.config.default_min_avg));
        self.table = Some(table);
        self.data_path = Some(path);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the frame after any change.
    pub fn refresh(&mut self) {
        let (Some(table), Some(selection)) = (&self.table, &self.selection) else {
            self.frame = FrameState::NoData;
            return;
        };
        self.frame = match build_frame(table, selection, self.chart_kind, &self.config) {
            Ok(frame) => FrameState::Ready(Box::new(frame)),
            Err(DashboardError::EmptyResult) => FrameState::Empty,
            Err(e) => {
                log::error!("Failed to build dashboard: {e}");
                self.status_message = Some(format!("Error: {e}"));
                FrameState::NoData
            }
        };
    }

    /// Toggle a single value in a filterable column.
    pub fn toggle_filter_value(&mut self, category: Category, value: &str) {
        if let Some(sel) = &mut self.selection {
            sel.toggle(category, value);
            self.refresh();
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, category: Category) {
        let (Some(table), Some(sel)) = (&self.table, &mut self.selection) else {
            return;
        };
        if let Some(set) = sel.set_mut(category) {
            *set = table.options(category).into_iter().collect();
            self.refresh();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, category: Category) {
        if let Some(set) = self.selection.as_mut().and_then(|s| s.set_mut(category)) {
            set.clear();
            self.refresh();
        }
    }

    /// Set the average-score range, swapping the ends if they cross.
    pub fn set_range(&mut self, min: f64, max: f64) {
        if let Some(sel) = &mut self.selection {
            sel.avg_range = ScoreRange {
                min: min.min(max),
                max: min.max(max),
            };
            self.refresh();
        }
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if self.chart_kind != kind {
            self.chart_kind = kind;
            self.refresh();
        }
    }
}
