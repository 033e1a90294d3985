use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Category, StudentTable, Subject};
use crate::kpi::Kpis;

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

/// Four metric tiles side by side.
pub fn kpi_tiles(ui: &mut Ui, kpis: &Kpis) {
    ui.heading("Key Performance Indicators (KPIs)");
    let tiles = kpis.tiles();
    ui.columns(tiles.len(), |cols| {
        for (col, (label, value, delta)) in cols.iter_mut().zip(tiles) {
            col.group(|ui| {
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(28.0).strong());
                if let Some(delta) = delta {
                    let color = if delta.starts_with('-') {
                        Color32::LIGHT_RED
                    } else {
                        Color32::LIGHT_GREEN
                    };
                    ui.label(RichText::new(delta).color(color));
                }
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// Filtered rows in the given order; the derived average is not shown.
pub fn raw_table(ui: &mut Ui, table: &StudentTable, rows: &[usize]) {
    let n_cols = Category::ALL.len() + Subject::ALL.len();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), n_cols)
        .max_scroll_height(400.0)
        .header(20.0, |mut header| {
            for category in Category::ALL {
                header.col(|ui| {
                    ui.strong(category.column());
                });
            }
            for subject in Subject::ALL {
                header.col(|ui| {
                    ui.strong(subject.column());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let rec = &table.records[rows[row.index()]];
                for category in Category::ALL {
                    row.col(|ui| {
                        ui.label(rec.category(category));
                    });
                }
                for subject in Subject::ALL {
                    row.col(|ui| {
                        ui.label(format!("{}", rec.score(subject)));
                    });
                }
            });
        });
}
