use serde::Serialize;

use crate::chart::{ChartKind, ChartMode, ChartSpec, ScatterRecipe};
use crate::config::DashboardConfig;
use crate::data::filter::{FilterSelection, FilteredView, filtered_indices};
use crate::data::model::StudentTable;
use crate::error::{DashboardError, Result};
use crate::kpi::Kpis;

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub kpis: Kpis,
    pub primary: ChartSpec,
    pub secondary: ChartSpec,
    /// Filtered row indices, highest avg_score first.
    pub table_rows: Vec<usize>,
}

/// Run one filter → aggregate → chart pass.
///
/// Returns [`DashboardError::EmptyResult`] before any aggregation when the
/// selection matches no rows.
pub fn build_frame(
    table: &StudentTable,
    selection: &FilterSelection,
    kind: ChartKind,
    config: &DashboardConfig,
) -> Result<DashboardFrame> {
    let indices = filtered_indices(table, selection);
    if indices.is_empty() {
        log::debug!("Selection matched no rows");
        return Err(DashboardError::EmptyResult);
    }
    let view = FilteredView::new(table, &indices);

    let kpis = Kpis::compute(&view)?;
    let primary = ChartMode::for_kind(kind, config.histogram_bins).build(&view);
    let secondary = ScatterRecipe::default().build(&view);
    log::debug!("Frame: {} of {} rows, chart {kind}", view.len(), table.len());

    Ok(DashboardFrame {
        kpis,
        primary,
        secondary,
        table_rows: view.sorted_by_avg_desc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBody;
    use crate::data::model::tests::sample_table;

    #[test]
    fn frame_combines_kpis_and_charts() {
        let table = sample_table();
        let config = DashboardConfig::default();
        let sel = FilterSelection::for_table(&table, config.default_min_avg);
        let frame = build_frame(&table, &sel, ChartKind::Pie, &config).unwrap();

        assert_eq!(frame.kpis.total_students, 4);
        assert!(matches!(frame.primary.body, ChartBody::Pie(_)));
        assert!(matches!(frame.secondary.body, ChartBody::Scatter(_)));
        assert_eq!(frame.table_rows, vec![2, 1, 3, 0]);
    }

    #[test]
    fn empty_selection_short_circuits() {
        let table = sample_table();
        let config = DashboardConfig::default();
        let mut sel = FilterSelection::for_table(&table, config.default_min_avg);
        sel.preps.clear();
        let err = build_frame(&table, &sel, ChartKind::Bar, &config).unwrap_err();
        assert!(err.is_recoverable());
    }
}
