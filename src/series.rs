use crate::coerce::{coerce_column, coerce_numeric};
use crate::data::Table;
use crate::error::VizResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    Doughnut,
    Scatter,
}

impl ChartKind {
    /// Pie and doughnut charts have no cartesian axes
    pub fn is_radial(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

/// User-selected chart configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            kind,
            x_field: x_field.into(),
            y_field: y_field.into(),
        }
    }

    /// Dataset label shown by the chart, e.g. `"sales vs month"`
    pub fn dataset_label(&self) -> String {
        format!("{} vs {}", self.y_field, self.x_field)
    }
}

/// A scatter point; `x` is `None` when the x field was not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: Option<f64>,
    pub y: f64,
}

/// Chart-ready shaping of table data
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// Bar, line, pie and doughnut: one label and one value per row.
    /// Invalid values stay in place as `None` so labels stay aligned.
    Categorical {
        labels: Vec<String>,
        values: Vec<Option<f64>>,
    },
    /// Rows with an invalid y are dropped; invalid x is kept as `None`.
    Scatter { points: Vec<ScatterPoint> },
}

impl SeriesData {
    /// The y values statistics are computed over
    pub fn y_values(&self) -> Vec<Option<f64>> {
        match self {
            SeriesData::Categorical { values, .. } => values.clone(),
            SeriesData::Scatter { points } => points.iter().map(|p| Some(p.y)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesData::Categorical { values, .. } => values.len(),
            SeriesData::Scatter { points } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of invalid entries still present in the series
    /// (y values for categorical, x values for scatter)
    pub fn invalid_count(&self) -> usize {
        match self {
            SeriesData::Categorical { values, .. } => values.iter().filter(|v| v.is_none()).count(),
            SeriesData::Scatter { points } => points.iter().filter(|p| p.x.is_none()).count(),
        }
    }
}

/// Shape the table's `x_field` / `y_field` columns for the requested chart kind.
pub fn build_series(table: &Table, spec: &ChartSpec) -> VizResult<SeriesData> {
    let x_raw = table.column_values(&spec.x_field)?;
    let y_raw = table.column_values(&spec.y_field)?;

    match spec.kind {
        ChartKind::Scatter => Ok(SeriesData::Scatter {
            points: extract_scatter_points(&x_raw, &y_raw),
        }),
        ChartKind::Bar | ChartKind::Line | ChartKind::Pie | ChartKind::Doughnut => {
            let labels = x_raw.iter().map(|s| s.to_string()).collect();
            let values = coerce_column(y_raw).values;
            Ok(SeriesData::Categorical { labels, values })
        }
    }
}

fn extract_scatter_points(x_raw: &[&str], y_raw: &[&str]) -> Vec<ScatterPoint> {
    x_raw
        .iter()
        .zip(y_raw)
        .filter_map(|(x, y)| {
            let y = coerce_numeric(y)?;
            Some(ScatterPoint {
                x: coerce_numeric(x),
                y,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> Table {
        Table::new(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_scatter_drops_invalid_y_and_keeps_invalid_x() {
        let table = make_table(
            vec!["x", "y"],
            vec![vec!["1", "2"], vec!["a", "3"], vec!["2", "b"]],
        );
        let spec = ChartSpec::new(ChartKind::Scatter, "x", "y");
        let series = build_series(&table, &spec).unwrap();
        assert_eq!(
            series,
            SeriesData::Scatter {
                points: vec![
                    ScatterPoint { x: Some(1.0), y: 2.0 },
                    ScatterPoint { x: None, y: 3.0 },
                ]
            }
        );
        assert_eq!(series.invalid_count(), 1);
        assert_eq!(series.y_values(), vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_bar_keeps_invalid_values_in_place() {
        let table = make_table(vec!["cat", "val"], vec![vec!["A", "10"], vec!["B", "x"]]);
        let spec = ChartSpec::new(ChartKind::Bar, "cat", "val");
        let series = build_series(&table, &spec).unwrap();
        assert_eq!(
            series,
            SeriesData::Categorical {
                labels: vec!["A".to_string(), "B".to_string()],
                values: vec![Some(10.0), None],
            }
        );
        assert_eq!(series.invalid_count(), 1);
    }

    #[test]
    fn test_line_pie_doughnut_share_categorical_shape() {
        let table = make_table(vec!["m", "v"], vec![vec!["Jan", "1"], vec!["Feb", "2"]]);
        for kind in [ChartKind::Line, ChartKind::Pie, ChartKind::Doughnut] {
            let series = build_series(&table, &ChartSpec::new(kind, "m", "v")).unwrap();
            assert!(matches!(series, SeriesData::Categorical { .. }));
            assert_eq!(series.len(), 2);
        }
    }

    #[test]
    fn test_categorical_labels_are_raw_strings() {
        let table = make_table(vec!["x", "y"], vec![vec![" 01 ", "5"], vec!["", "6"]]);
        let spec = ChartSpec::new(ChartKind::Bar, "x", "y");
        match build_series(&table, &spec).unwrap() {
            SeriesData::Categorical { labels, .. } => {
                assert_eq!(labels, vec![" 01 ".to_string(), String::new()])
            }
            other => panic!("unexpected series {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_gives_empty_series() {
        let table = make_table(vec!["x", "y"], vec![]);
        for kind in [ChartKind::Bar, ChartKind::Scatter] {
            let series = build_series(&table, &ChartSpec::new(kind, "x", "y")).unwrap();
            assert!(series.is_empty());
        }
    }

    #[test]
    fn test_same_field_on_both_axes() {
        let table = make_table(vec!["v"], vec![vec!["3"], vec!["4"]]);
        let series = build_series(&table, &ChartSpec::new(ChartKind::Scatter, "v", "v")).unwrap();
        assert_eq!(
            series,
            SeriesData::Scatter {
                points: vec![
                    ScatterPoint { x: Some(3.0), y: 3.0 },
                    ScatterPoint { x: Some(4.0), y: 4.0 },
                ]
            }
        );
    }

    #[test]
    fn test_unknown_column() {
        let table = make_table(vec!["x", "y"], vec![vec!["1", "2"]]);
        let spec = ChartSpec::new(ChartKind::Line, "x", "z");
        assert_eq!(
            build_series(&table, &spec),
            Err(VizError::UnknownColumn("z".to_string()))
        );
    }

    #[test]
    fn test_dataset_label() {
        let spec = ChartSpec::new(ChartKind::Bar, "month", "sales");
        assert_eq!(spec.dataset_label(), "sales vs month");
    }

    #[test]
    fn test_chart_kind_display_matches_serde() {
        for kind in [
            ChartKind::Bar,
            ChartKind::Line,
            ChartKind::Pie,
            ChartKind::Doughnut,
            ChartKind::Scatter,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
        assert!(ChartKind::Doughnut.is_radial());
        assert!(!ChartKind::Scatter.is_radial());
    }
}
