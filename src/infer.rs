// Cell coercion and column type inference

use crate::data::{ColumnType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use nom::{combinator::all_consuming, number::complete::recognize_float, IResult};

/// Datetime layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; parsed values land at midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Parse a locale-free decimal. The whole input must match; no prefix parsing.
pub fn parse_number(text: &str) -> Option<f64> {
    let matched: IResult<&str, &str> = all_consuming(recognize_float)(text);
    let (_, literal) = matched.ok()?;
    literal.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Coerce one trimmed cell: number first, then date, otherwise text.
/// An empty cell is `Null`.
pub fn coerce(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else if let Some(n) = parse_number(text) {
        Value::Number(n)
    } else if let Some(d) = parse_date(text) {
        Value::Date(d)
    } else {
        Value::Text(text.to_string())
    }
}

/// Running type of a column while its values are folded in row order.
///
/// A column starts as text. The first number or date promotes it. A value
/// that parses as neither, or that does not match the promoted type, forces
/// text for good: types only widen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFold {
    kind: ColumnType,
    failed: bool,
}

impl Default for TypeFold {
    fn default() -> Self {
        Self {
            kind: ColumnType::Text,
            failed: false,
        }
    }
}

impl TypeFold {
    pub fn observe(self, value: &Value) -> Self {
        let observed = match value {
            Value::Number(_) => Some(ColumnType::Number),
            Value::Date(_) => Some(ColumnType::Date),
            Value::Text(_) | Value::Null => None,
        };
        match observed {
            None => Self {
                kind: ColumnType::Text,
                failed: true,
            },
            Some(_) if self.failed => self,
            Some(kind) if self.kind == ColumnType::Text || self.kind == kind => Self {
                kind,
                failed: false,
            },
            Some(_) => Self {
                kind: ColumnType::Text,
                failed: true,
            },
        }
    }

    pub fn finish(self) -> ColumnType {
        self.kind
    }
}

/// Infer a column type from its coerced values.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
    values
        .into_iter()
        .fold(TypeFold::default(), TypeFold::observe)
        .finish()
}
