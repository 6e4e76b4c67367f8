use chrono::{NaiveDateTime, Timelike};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// A single coerced cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Null,
}

impl Value {
    /// Numeric contribution of this cell to an aggregation.
    /// Anything that is not a number counts as zero.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => 0.0,
        }
    }
}

/// Stringified form used as the grouping key and chart label.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // -0 and 0 share a label
            Value::Number(n) if *n == 0.0 => f.write_str("0"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Value::Null => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Null => serializer.serialize_unit(),
            other => serializer.collect_str(other),
        }
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnType::Number
    }
}

/// Typed columnar dataset. Columns keep header order and all have `row_count` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub(crate) fn from_columns(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == row_count));
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Exact (case-sensitive) lookup by column name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn first_of_type(&self, kind: ColumnType) -> Option<&Column> {
        self.columns.iter().find(|c| c.kind == kind)
    }

    pub fn columns_of_type(&self, kind: ColumnType) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    /// First `n` rows as `(column name, value)` records, for previews.
    pub fn sample_rows(&self, n: usize) -> Vec<Vec<(&str, &Value)>> {
        (0..n.min(self.row_count))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.as_str(), &c.values[row]))
                    .collect()
            })
            .collect()
    }

    /// Serializable view limited to the first `n` rows.
    pub fn preview(&self, n: usize) -> DatasetPreview<'_> {
        DatasetPreview {
            dataset: self,
            rows: n.min(self.row_count),
        }
    }
}

/// Serializes the whole dataset in the upload-response shape.
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.preview(self.row_count).serialize(serializer)
    }
}

pub struct DatasetPreview<'a> {
    dataset: &'a Dataset,
    rows: usize,
}

struct ColumnSchema<'a>(&'a Column);

impl Serialize for ColumnSchema<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Column", 2)?;
        s.serialize_field("name", &self.0.name)?;
        s.serialize_field("type", &self.0.kind)?;
        s.end()
    }
}

struct Row<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.dataset.columns.len()))?;
        for column in &self.dataset.columns {
            map.serialize_entry(&column.name, &column.values[self.index])?;
        }
        map.end()
    }
}

impl Serialize for DatasetPreview<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns: Vec<ColumnSchema> = self.dataset.columns.iter().map(ColumnSchema).collect();
        let rows: Vec<Row> = (0..self.rows)
            .map(|index| Row {
                dataset: self.dataset,
                index,
            })
            .collect();

        let mut s = serializer.serialize_struct("Dataset", 3)?;
        s.serialize_field("columns", &columns)?;
        s.serialize_field("rows", &rows)?;
        s.serialize_field("rowCount", &self.dataset.row_count)?;
        s.end()
    }
}
