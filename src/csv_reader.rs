// Raw delimited text -> typed Dataset

use crate::data::{Column, Dataset, Value};
use crate::infer::{coerce, TypeFold};
use std::collections::HashSet;
use std::io::{self, Read};
use thiserror::Error;
use tracing::{debug, warn};

/// Why raw text could not become a dataset.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input is empty: expected a header line")]
    Empty,

    #[error("Header column {0} has an empty name")]
    EmptyHeader(usize),

    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Read a dataset from any reader (a file, stdin)
pub fn read_dataset<R: Read>(mut reader: R) -> Result<Dataset, ParseError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_dataset(&text)
}

/// Parse comma-separated text into a typed dataset.
///
/// The first non-blank line is the header. Fields are split on commas with
/// no quoting or escaping, and trimmed. Short rows are padded with empty
/// cells; fields past the header width are dropped. Blank lines are skipped
/// and do not count as rows.
pub fn parse_dataset(text: &str) -> Result<Dataset, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader
        .records()
        .filter(|r| !matches!(r, Ok(record) if is_blank(record)));

    let header = records.next().ok_or(ParseError::Empty)??;
    let names = parse_header(&header)?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut folds = vec![TypeFold::default(); names.len()];
    let mut row_count = 0;

    for record in records {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() < names.len() {
            warn!(line, fields = record.len(), expected = names.len(), "Padding short row");
        } else if record.len() > names.len() {
            warn!(line, fields = record.len(), expected = names.len(), "Ignoring extra fields");
        }

        for (idx, (column, fold)) in values.iter_mut().zip(folds.iter_mut()).enumerate() {
            let value = coerce(record.get(idx).unwrap_or(""));
            *fold = fold.observe(&value);
            column.push(value);
        }
        row_count += 1;
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(values)
        .zip(folds)
        .map(|((name, values), fold)| {
            let kind = fold.finish();
            debug!(column = %name, kind = %kind, "Inferred column type");
            Column::new(name, kind, values)
        })
        .collect();

    Ok(Dataset::from_columns(columns, row_count))
}

fn parse_header(record: &csv::StringRecord) -> Result<Vec<String>, ParseError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(record.len());
    for (idx, name) in record.iter().enumerate() {
        if name.is_empty() {
            return Err(ParseError::EmptyHeader(idx + 1));
        }
        if !seen.insert(name) {
            return Err(ParseError::DuplicateColumn(name.to_string()));
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// A whitespace-only line comes through as a single empty field
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).map_or(true, str::is_empty)
}
