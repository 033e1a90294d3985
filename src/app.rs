use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, FrameState};
use crate::ui::{panels, plot, tiles};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScorescopeApp {
    pub state: AppState,
}

impl ScorescopeApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ScorescopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, raw table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Student Academic Performance Analysis");
    ui.label("Use the filters on the left to analyze score trends and distributions.");
    ui.separator();

    let frame = match &state.frame {
        FrameState::NoData => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view scores  (File → Open…)");
            });
            return;
        }
        FrameState::Empty => {
            ui.label(
                RichText::new(
                    "No students match the selected filters. Please adjust your selections.",
                )
                .color(Color32::YELLOW),
            );
            return;
        }
        FrameState::Ready(frame) => frame,
    };

    tiles::kpi_tiles(ui, &frame.kpis);
    ui.separator();

    ui.heading("Detailed Performance Visualizations");
    let height = state.config.chart_height;
    ui.columns(2, |cols| {
        plot::chart_panel(&mut cols[0], "primary_chart", &frame.primary, height);
        plot::chart_panel(&mut cols[1], "secondary_chart", &frame.secondary, height);
    });
    ui.separator();

    let Some(table) = &state.table else {
        return;
    };
    let response = egui::CollapsingHeader::new("View Filtered Student Data Table")
        .open(Some(state.show_raw_table))
        .show(ui, |ui: &mut Ui| {
            tiles::raw_table(ui, table, &frame.table_rows);
        });
    if response.header_response.clicked() {
        state.show_raw_table = !state.show_raw_table;
    }
}
