// Delimited text loading into a Table

use crate::data::Table;
use crate::error::{VizError, VizResult};
use std::io::Read;
use tracing::debug;

/// How delimited input should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat the first record as the header row
    pub has_headers: bool,
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: b',',
        }
    }
}

/// Parse pasted text. Blank text is rejected before any parsing happens.
pub fn read_table_from_str(text: &str, options: ParseOptions) -> VizResult<Table> {
    if text.trim().is_empty() {
        return Err(VizError::ParseFailure(
            "Please paste some data or upload a file.".to_string(),
        ));
    }
    read_table(text.as_bytes(), options)
}

/// Parse delimited records from any reader.
///
/// Empty lines are skipped; a line of blank fields such as `,` is a record. Ragged records are accepted and
/// normalised by [`Table::new`]. Zero data rows is an [`VizError::EmptyResult`].
pub fn read_table<R: Read>(reader: R, options: ParseOptions) -> VizResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            VizError::ParseFailure(format!("record {}: {}", idx + 1, e))
        })?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        records.push(record.iter().map(|s| s.to_string()).collect());
    }

    let mut records = records.into_iter();
    let headers: Vec<String> = if options.has_headers {
        match records.next() {
            Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
            None => {
                return Err(VizError::ParseFailure(
                    "Input contains no records".to_string(),
                ))
            }
        }
    } else {
        Vec::new()
    };

    let rows: Vec<Vec<String>> = records.collect();
    if rows.is_empty() {
        return Err(VizError::EmptyResult);
    }

    let headers = if options.has_headers {
        headers
    } else {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        (1..=width).map(|i| format!("column_{}", i)).collect()
    };

    debug!(columns = headers.len(), rows = rows.len(), "parsed delimited input");
    Ok(Table::new(headers, rows))
}
