use crate::data::{Column, Dataset, Value};
use crate::ir::{CategoricalDataset, ChartDescription, ScatterDataset, ScatterPoint, Series};
use crate::labels::generate_title;
use crate::query::{ChartIntent, ChartType};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum ShapeError {
    #[error("At least one y-axis column is required")]
    NoYColumns,

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Column '{column}' has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Main entry point: resolve an intent against the dataset and shape it
pub fn describe(intent: &ChartIntent, dataset: &Dataset) -> Result<ChartDescription, ShapeError> {
    let x_column = find_column(dataset, &intent.x_axis)?;
    let y_columns = intent
        .y_axes
        .iter()
        .map(|name| find_column(dataset, name))
        .collect::<Result<Vec<_>, _>>()?;

    let series = shape(intent.chart_type, x_column, &y_columns)?;

    Ok(ChartDescription {
        chart_type: intent.chart_type,
        title: generate_title(intent.chart_type, &intent.x_axis, &intent.y_axes),
        x_axis: intent.x_axis.clone(),
        y_axes: intent.y_axes.clone(),
        series,
    })
}

/// Group rows by stringified x-value and aggregate each y column per group.
///
/// bar and line sum per group, pie sums its first y column only, scatter
/// averages. Non-numeric y cells count as zero.
pub fn shape(chart_type: ChartType, x_column: &Column, y_columns: &[&Column]) -> Result<Series, ShapeError> {
    if y_columns.is_empty() {
        return Err(ShapeError::NoYColumns);
    }
    for y in y_columns {
        if y.values.len() != x_column.values.len() {
            return Err(ShapeError::LengthMismatch {
                column: y.name.clone(),
                expected: x_column.values.len(),
                found: y.values.len(),
            });
        }
    }

    let groups = group_by_x(x_column);
    debug!(
        %chart_type,
        x = %x_column.name,
        rows = x_column.values.len(),
        groups = groups.labels.len(),
        "Grouped rows by x-value"
    );

    let series = match chart_type {
        ChartType::Bar | ChartType::Line => Series::Categorical {
            datasets: y_columns
                .iter()
                .map(|y| CategoricalDataset {
                    label: Some(y.name.clone()),
                    data: groups.sums(y),
                })
                .collect(),
            labels: groups.labels,
        },
        ChartType::Pie => Series::Categorical {
            datasets: vec![CategoricalDataset {
                label: None,
                data: groups.sums(y_columns[0]),
            }],
            labels: groups.labels,
        },
        ChartType::Scatter => Series::Scatter {
            datasets: y_columns
                .iter()
                .map(|y| ScatterDataset {
                    label: y.name.clone(),
                    data: groups
                        .first_x
                        .iter()
                        .zip(groups.means(y))
                        .map(|(x, y)| ScatterPoint { x: (*x).clone(), y })
                        .collect(),
                })
                .collect(),
        },
    };

    Ok(series)
}

fn find_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, ShapeError> {
    dataset
        .column(name)
        .ok_or_else(|| ShapeError::MissingColumn(name.to_string()))
}

/// Rows partitioned by x-value, groups in order of first occurrence
struct XGroups<'a> {
    labels: Vec<String>,
    first_x: Vec<&'a Value>,
    counts: Vec<usize>,
    row_group: Vec<usize>,
}

fn group_by_x(x_column: &Column) -> XGroups<'_> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups = XGroups {
        labels: Vec::new(),
        first_x: Vec::new(),
        counts: Vec::new(),
        row_group: Vec::with_capacity(x_column.values.len()),
    };

    for value in &x_column.values {
        let key = value.to_string();
        let group = match index.get(&key) {
            Some(&g) => g,
            None => {
                let g = groups.labels.len();
                index.insert(key.clone(), g);
                groups.labels.push(key);
                groups.first_x.push(value);
                groups.counts.push(0);
                g
            }
        };
        groups.counts[group] += 1;
        groups.row_group.push(group);
    }

    groups
}

impl XGroups<'_> {
    fn sums(&self, y_column: &Column) -> Vec<f64> {
        let mut sums = vec![0.0; self.labels.len()];
        for (row, &group) in self.row_group.iter().enumerate() {
            sums[group] += y_column.values[row].as_number();
        }
        sums
    }

    fn means(&self, y_column: &Column) -> Vec<f64> {
        self.sums(y_column)
            .into_iter()
            .zip(&self.counts)
            .map(|(sum, &count)| sum / count as f64)
            .collect()
    }
}
