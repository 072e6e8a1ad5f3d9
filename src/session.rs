//! User-action driven state: load a table, generate charts, clear.
//!
//! A [`Session`] moves between three states:
//!
//! - `Empty`: no table
//! - `Loaded`: a table is present, no chart yet
//! - `Visualized`: a chart and its statistics exist for the last [`ChartSpec`]
//!
//! Each action runs to completion. A failed action is reported to the caller
//! and leaves the state as it was. At most one chart is held by the backend:
//! the previous one is destroyed before a replacement is created, and on
//! load, clear and drop.

use crate::chart_config::ChartConfig;
use crate::csv_reader::{self, ParseOptions};
use crate::data::Table;
use crate::error::{Axis, Notice, VizError, VizResult};
use crate::graph::{ChartBackend, ChartHandle};
use crate::series::{build_series, ChartKind, ChartSpec, SeriesData};
use crate::stats::{compute_statistics, SummaryStatistics};
use serde_json::Value;
use std::io::Read;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Visualized,
}

/// Everything produced by one successful `generate`
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub spec: ChartSpec,
    pub series: SeriesData,
    /// `None` when the y values hold no valid number
    pub statistics: Option<SummaryStatistics>,
    pub notices: Vec<Notice>,
    pub config: ChartConfig,
    pub handle: ChartHandle,
}

pub struct Session<B: ChartBackend> {
    backend: B,
    table: Option<Table>,
    current: Option<Visualization>,
}

impl<B: ChartBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            table: None,
            current: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.table, &self.current) {
            (None, _) => SessionState::Empty,
            (Some(_), None) => SessionState::Loaded,
            (Some(_), Some(_)) => SessionState::Visualized,
        }
    }

    /// Load pasted delimited text, replacing any previous table.
    pub fn load_text(&mut self, text: &str, options: ParseOptions) -> VizResult<&Table> {
        let table = csv_reader::read_table_from_str(text, options)
            .inspect_err(|e| warn!("load rejected: {}", e))?;
        Ok(self.replace_table(table))
    }

    /// Load delimited records from a reader such as an opened file.
    pub fn load_reader<R: Read>(&mut self, reader: R, options: ParseOptions) -> VizResult<&Table> {
        let table = csv_reader::read_table(reader, options)
            .inspect_err(|e| warn!("load rejected: {}", e))?;
        Ok(self.replace_table(table))
    }

    /// Load a JSON array of objects.
    pub fn load_json(&mut self, value: &Value) -> VizResult<&Table> {
        let table = Table::from_json(value).inspect_err(|e| warn!("load rejected: {}", e))?;
        Ok(self.replace_table(table))
    }

    /// Load an already-built table. A table without rows is rejected.
    pub fn load_table(&mut self, table: Table) -> VizResult<&Table> {
        if table.is_empty() {
            warn!("load rejected: table has no rows");
            return Err(VizError::EmptyResult);
        }
        Ok(self.replace_table(table))
    }

    fn replace_table(&mut self, table: Table) -> &Table {
        self.release_chart();
        info!(
            columns = table.columns().len(),
            rows = table.row_count(),
            "table loaded"
        );
        self.table.insert(table)
    }

    /// Build the series, statistics and chart for `spec`.
    ///
    /// Non-numeric axis values and an all-invalid y column are reported as
    /// notices on the result, not as errors.
    pub fn generate(&mut self, spec: &ChartSpec) -> VizResult<&Visualization> {
        let table = self.table.as_ref().ok_or(VizError::NoTable)?;
        let series = build_series(table, spec)?;

        let mut notices = Vec::new();
        let invalid = series.invalid_count();
        if invalid > 0 {
            let (field, axis) = match spec.kind {
                ChartKind::Scatter => (&spec.x_field, Axis::X),
                _ => (&spec.y_field, Axis::Y),
            };
            notices.push(Notice::NonNumericColumn {
                field: field.clone(),
                axis,
                invalid,
            });
        }

        let statistics = compute_statistics(&series.y_values());
        if statistics.is_none() {
            notices.push(Notice::NoValidData {
                field: spec.y_field.clone(),
            });
        }
        for notice in &notices {
            warn!("{}", notice);
        }

        let config = ChartConfig::from_series(&series, spec);

        self.release_chart();
        let handle = self
            .backend
            .create(&config)
            .map_err(|e| VizError::Render(format!("{:#}", e)))?;
        info!(kind = %spec.kind, x = %spec.x_field, y = %spec.y_field, "chart generated");

        Ok(self.current.insert(Visualization {
            spec: spec.clone(),
            series,
            statistics,
            notices,
            config,
            handle,
        }))
    }

    /// Drop the table and any chart, returning to `Empty`.
    pub fn clear(&mut self) {
        self.release_chart();
        if self.table.take().is_some() {
            info!("session cleared");
        }
    }

    fn release_chart(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!(handle = previous.handle.id(), "releasing chart");
            self.backend.destroy(previous.handle);
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn visualization(&self) -> Option<&Visualization> {
        self.current.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChartBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.release_chart();
    }
}
