use std::fmt;
use thiserror::Error;

/// Errors that abort a single user action (load, generate).
///
/// None of these leave the session in a partially updated state: the
/// action that raised them is simply not applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VizError {
    /// Malformed or blank source input
    #[error("Error parsing input: {0}")]
    ParseFailure(String),

    /// Input parsed but contained no data rows
    #[error("No valid data found.")]
    EmptyResult,

    /// A chart field does not name a column of the loaded table
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    /// Generate requested before any table was loaded
    #[error("No data loaded")]
    NoTable,

    /// The rendering backend failed to build the chart
    #[error("Failed to render chart: {0}")]
    Render(String),
}

pub type VizResult<T> = Result<T, VizError>;

/// Which chart axis a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Non-fatal conditions surfaced alongside a visualization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A selected axis column has values that failed numeric coercion.
    NonNumericColumn {
        field: String,
        axis: Axis,
        invalid: usize,
    },
    /// Statistics were requested over a series with no valid numbers.
    NoValidData { field: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NonNumericColumn {
                field,
                axis: Axis::X,
                ..
            } => write!(
                f,
                "Scatter plots require a numerical X-axis. The column \"{}\" contains non-numeric values.",
                field
            ),
            Notice::NonNumericColumn {
                field,
                axis: Axis::Y,
                ..
            } => write!(
                f,
                "The column \"{}\" contains non-numeric values. Charts may not render correctly.",
                field
            ),
            Notice::NoValidData { .. } => write!(f, "No valid numeric data to analyze."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages_name_the_field() {
        let x = Notice::NonNumericColumn {
            field: "height".to_string(),
            axis: Axis::X,
            invalid: 2,
        };
        assert!(x.to_string().contains("numerical X-axis"));
        assert!(x.to_string().contains("\"height\""));

        let y = Notice::NonNumericColumn {
            field: "weight".to_string(),
            axis: Axis::Y,
            invalid: 1,
        };
        assert!(y.to_string().contains("\"weight\" contains non-numeric"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(VizError::EmptyResult.to_string(), "No valid data found.");
        assert_eq!(
            VizError::UnknownColumn("q3".to_string()).to_string(),
            "Column 'q3' not found"
        );
    }
}
