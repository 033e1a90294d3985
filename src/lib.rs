//! Student exam score dashboard.
//!
//! The data pipeline (`data`, `kpi`, `chart`, `dashboard`) is free of any UI
//! code; `app`, `ui` and `color` draw it with egui.  `exercises` holds the
//! unrelated numeric-array demonstrations.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod exercises;
pub mod kpi;
pub mod state;
pub mod ui;
