use crate::coerce::coerce_numeric;
use crate::error::{VizError, VizResult};
use serde_json::Value;

/// Number of rows shown by a data preview
pub const PREVIEW_ROW_LIMIT: usize = 100;

/// A named column and its position in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub position: usize,
}

/// One record, holding a raw string for every declared column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    /// Raw value at the given column position (empty if out of range)
    pub fn get(&self, position: usize) -> &str {
        self.values.get(position).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Rectangular table of raw string fields.
///
/// Every row carries exactly one value per column: short records are padded
/// with empty strings and surplus fields are dropped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<Column> = unique_names(headers)
            .into_iter()
            .enumerate()
            .map(|(position, name)| Column { name, position })
            .collect();

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut values| {
                values.resize(width, String::new());
                Row { values }
            })
            .collect();

        Self { columns, rows }
    }

    /// Create a Table from a JSON array of objects.
    ///
    /// Columns come from the keys of the first object, in document order.
    pub fn from_json(value: &Value) -> VizResult<Self> {
        let array = value.as_array().ok_or_else(|| {
            VizError::ParseFailure("Input data must be a JSON array of objects".to_string())
        })?;

        let first_obj = match array.first() {
            Some(first) => first.as_object().ok_or_else(|| {
                VizError::ParseFailure("Items in array must be objects".to_string())
            })?,
            None => return Err(VizError::EmptyResult),
        };

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item.as_object().ok_or_else(|| {
                VizError::ParseFailure("Items in array must be objects".to_string())
            })?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => {
                        return Err(VizError::ParseFailure(format!(
                            "Unsupported value type for field '{}'",
                            header
                        )))
                    }
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Row-ordered raw values of a column
    pub fn column_values(&self, name: &str) -> VizResult<Vec<&str>> {
        let column = self
            .column(name)
            .ok_or_else(|| VizError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| r.get(column.position)).collect())
    }

    /// Leading rows for display, capped at [`PREVIEW_ROW_LIMIT`]
    pub fn preview(&self) -> &[Row] {
        &self.rows[..self.rows.len().min(PREVIEW_ROW_LIMIT)]
    }

    /// First column whose first-row value coerces to a number.
    ///
    /// Convenience default for the y axis; `None` for an empty table or when
    /// no column qualifies.
    pub fn default_y_field(&self) -> Option<&str> {
        let first = self.rows.first()?;
        self.columns
            .iter()
            .find(|c| coerce_numeric(first.get(c.position)).is_some())
            .map(|c| c.name.as_str())
    }

    /// First column, the default x axis
    pub fn default_x_field(&self) -> Option<&str> {
        self.columns.first().map(|c| c.name.as_str())
    }
}

/// Rename repeated header names to `name_1`, `name_2`, ... so every column
/// name is unique.
fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut candidate = header.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}_{}", header, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}
