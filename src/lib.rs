// Library exports for tabchart

pub mod chart_config;
pub mod coerce;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod graph;
pub mod palette;
pub mod series;
pub mod session;
pub mod stats;
pub mod telemetry;

pub use chart_config::ChartConfig;
pub use coerce::{coerce_column, coerce_numeric, NumericSeries};
pub use csv_reader::ParseOptions;
pub use data::{Column, Row, Table};
pub use error::{Axis, Notice, VizError, VizResult};
pub use graph::{ChartBackend, ChartHandle, PlottersBackend};
pub use series::{build_series, ChartKind, ChartSpec, ScatterPoint, SeriesData};
pub use session::{Session, SessionState, Visualization};
pub use stats::{compute_statistics, SummaryStatistics};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON object such as `{"width": 1024, "type": "svg"}`.
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
