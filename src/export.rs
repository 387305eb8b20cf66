//! CSV export of list results.
//!
//! Rows are written as elements arrive, so an export never holds more than the
//! current page. Column names may be dotted paths (`project.name`) reaching
//! into nested objects; the dotted name itself is the column header.

use csv::Writer;
use serde_json::Value;
use std::{fs::File, path::Path};
use tracing::{debug, trace};

use crate::error::ApiError;

/// Error types that can occur while writing an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A requested field path does not exist in an element
    #[error("field '{0}' not found in element")]
    MissingField(String),
    /// Columns can only be inferred from a JSON object
    #[error("element is not an object, can not infer columns")]
    NotAnObject,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Follow a dot-separated path through nested objects
pub fn resolve_path<'v>(element: &'v Value, path: &str) -> Result<&'v Value, ExportError> {
    path.split('.').try_fold(element, |value, key| {
        value
            .as_object()
            .and_then(|map| map.get(key))
            .ok_or_else(|| ExportError::MissingField(path.to_string()))
    })
}

/// Render a JSON value as a CSV cell
///
/// Strings are written raw, null becomes an empty cell, everything else is
/// written as compact JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render one row for the given columns
pub fn render_row(element: &Value, fields: &[String]) -> Result<Vec<String>, ExportError> {
    fields
        .iter()
        .map(|field| resolve_path(element, field).map(render_cell))
        .collect()
}

/// Stream `elements` into a CSV file at `output`
///
/// With empty `fields` the columns are the keys of the first element, in the
/// order the server sent them. Returns the number of data rows written. On error
/// the rows written so far stay in the file.
pub fn export_csv<I>(elements: I, fields: &[String], output: &Path) -> Result<usize, ApiError>
where
    I: IntoIterator<Item = Result<Value, ApiError>>,
{
    debug!("Exporting to {}", output.display());
    let file = File::create(output).map_err(|e| ExportError::CsvError(e.into()))?;
    let mut writer = Writer::from_writer(file);

    let mut columns: Option<Vec<String>> = None;
    if !fields.is_empty() {
        writer.write_record(fields).map_err(ExportError::from)?;
        columns = Some(fields.to_vec());
    }

    let mut rows = 0;
    for element in elements {
        let element = element?;
        if columns.is_none() {
            let inferred: Vec<String> = element
                .as_object()
                .ok_or(ExportError::NotAnObject)?
                .keys()
                .cloned()
                .collect();
            trace!("Inferred columns: {:?}", inferred);
            writer.write_record(&inferred).map_err(ExportError::from)?;
            columns = Some(inferred);
        }
        let row = render_row(&element, columns.as_deref().unwrap_or_default())?;
        writer.write_record(row).map_err(ExportError::from)?;
        rows += 1;
    }

    writer.flush().map_err(|e| ExportError::CsvError(e.into()))?;
    debug!("Exported {} rows to {}", rows, output.display());
    Ok(rows)
}
