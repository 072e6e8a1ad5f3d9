//! Translation of a built series into the chart engine's configuration.
//!
//! The shape mirrors the JSON object Chart.js-style engines accept, so the
//! serialized form can be handed to a browser renderer unchanged. Invalid
//! values serialize as `null`.

use crate::palette;
use crate::series::{ChartKind, ChartSpec, ScatterPoint, SeriesData};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Category labels; absent for scatter charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: DatasetValues,
    pub background_color: BackgroundColor,
    pub border_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetValues {
    Values(Vec<Option<f64>>),
    Points(Vec<ScatterPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackgroundColor {
    Single(String),
    /// One colour per slice (pie and doughnut)
    PerSlice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub scales: Scales,
}

/// Cartesian axes; both are absent for pie and doughnut charts
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scales {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<AxisOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<AxisOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<ScaleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Linear,
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

impl AxisTitle {
    fn shown(text: &str) -> Self {
        Self {
            display: true,
            text: text.to_string(),
        }
    }
}

impl ChartConfig {
    /// Build the configuration for `series`, which must have been built
    /// from `spec`.
    pub fn from_series(series: &SeriesData, spec: &ChartSpec) -> Self {
        let (labels, data) = match series {
            SeriesData::Categorical { labels, values } => (
                Some(labels.clone()),
                DatasetValues::Values(values.clone()),
            ),
            SeriesData::Scatter { points } => (None, DatasetValues::Points(points.clone())),
        };

        let background_color = if spec.kind.is_radial() {
            BackgroundColor::PerSlice(
                (0..palette::PALETTE.len()).map(palette::css_rgba).collect(),
            )
        } else {
            BackgroundColor::Single(palette::css_rgba(0))
        };

        let scales = if spec.kind.is_radial() {
            Scales::default()
        } else {
            let x_type = if spec.kind == ChartKind::Scatter {
                ScaleType::Linear
            } else {
                ScaleType::Category
            };
            Scales {
                y: Some(AxisOptions {
                    scale_type: None,
                    begin_at_zero: Some(true),
                    position: None,
                    title: AxisTitle::shown(&spec.y_field),
                }),
                x: Some(AxisOptions {
                    scale_type: Some(x_type),
                    begin_at_zero: None,
                    position: Some("bottom".to_string()),
                    title: AxisTitle::shown(&spec.x_field),
                }),
            }
        };

        ChartConfig {
            kind: spec.kind,
            data: ChartData {
                labels,
                datasets: vec![Dataset {
                    label: spec.dataset_label(),
                    data,
                    background_color,
                    border_color: palette::border_css(),
                    border_width: 1,
                }],
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                scales,
            },
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.data.datasets.first()
    }

    pub fn x_title(&self) -> Option<&str> {
        self.options.scales.x.as_ref().map(|a| a.title.text.as_str())
    }

    pub fn y_title(&self) -> Option<&str> {
        self.options.scales.y.as_ref().map(|a| a.title.text.as_str())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
