use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;

/// User-tunable dashboard settings, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Data file opened at start-up when none is given on the command line.
    #[serde(default = "DashboardConfig::default_data_file")]
    pub data_file: PathBuf,
    /// Initial lower bound of the average-score range.
    #[serde(default = "DashboardConfig::default_min_avg")]
    pub default_min_avg: f64,
    #[serde(default = "DashboardConfig::default_histogram_bins")]
    pub histogram_bins: usize,
    /// Chart height in points.
    #[serde(default = "DashboardConfig::default_chart_height")]
    pub chart_height: f32,
    #[serde(default)]
    pub default_chart: ChartKind,
}

impl DashboardConfig {
    fn default_data_file() -> PathBuf {
        PathBuf::from("StudentsPerformance.csv")
    }
    fn default_min_avg() -> f64 {
        50.0
    }
    fn default_histogram_bins() -> usize {
        20
    }
    fn default_chart_height() -> f32 {
        450.0
    }

    /// Read `path`; a missing or invalid file falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(cfg) => cfg.validated(),
                Err(err) => {
                    log::warn!("Failed to parse config {}: {err}. Using defaults.", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Failed to read config {}: {err}. Using defaults.", path.display());
                Self::default()
            }
        }
    }
}

impl DashboardConfig {
    fn validated(mut self) -> Self {
        if !self.default_min_avg.is_finite() {
            log::warn!(
                "default_min_avg must be a finite number, got {}. Using {}.",
                self.default_min_avg,
                Self::default_min_avg()
            );
            self.default_min_avg = Self::default_min_avg();
        }
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: Self::default_data_file(),
            default_min_avg: Self::default_min_avg(),
            histogram_bins: Self::default_histogram_bins(),
            chart_height: Self::default_chart_height(),
            default_chart: ChartKind::default(),
        }
    }
}
