// Axis selection for a query against a dataset schema

use super::intent::ChartIntent;
use super::keywords::detect_chart_type;
use crate::data::{Column, ColumnType, Dataset};
use tracing::debug;

/// Type preference for the x-axis among mentioned columns, best first.
pub const X_AXIS_PREFERENCE: [ColumnType; 3] =
    [ColumnType::Date, ColumnType::Text, ColumnType::Number];

/// Map a free-text query onto a chart intent.
///
/// Returns `None` when no x-axis or no y-axis can be resolved; that is an
/// ordinary outcome, not a failure.
pub fn interpret(query: &str, dataset: &Dataset) -> Option<ChartIntent> {
    let chart_type = detect_chart_type(query);
    let candidates = candidate_columns(query, dataset);
    debug!(
        candidates = ?candidates.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "Columns mentioned in query"
    );

    let Some(x) = select_x_axis(&candidates, dataset) else {
        debug!("No x-axis column available");
        return None;
    };
    let y_axes = select_y_axes(&candidates, dataset, &x.name);
    if y_axes.is_empty() {
        debug!(x_axis = %x.name, "No numeric column left for the y-axis");
        return None;
    }

    debug!(%chart_type, x_axis = %x.name, ?y_axes, "Resolved chart intent");
    Some(ChartIntent {
        chart_type,
        x_axis: x.name.clone(),
        y_axes,
    })
}

/// Columns whose name occurs in the query (case-insensitive), in dataset order
pub fn candidate_columns<'a>(query: &str, dataset: &'a Dataset) -> Vec<&'a Column> {
    let query = query.to_lowercase();
    dataset
        .columns()
        .iter()
        .filter(|c| query.contains(&c.name.to_lowercase()))
        .collect()
}

/// First candidate of the most preferred type present; without candidates,
/// the first non-numeric column of the dataset, else its first column.
pub fn select_x_axis<'a>(candidates: &[&'a Column], dataset: &'a Dataset) -> Option<&'a Column> {
    if candidates.is_empty() {
        let columns = dataset.columns();
        return columns
            .iter()
            .find(|c| !c.is_numeric())
            .or_else(|| columns.first());
    }

    X_AXIS_PREFERENCE
        .iter()
        .find_map(|kind| candidates.iter().find(|c| c.kind == *kind))
        .copied()
}

/// Numeric candidates other than the x-axis; failing that, the first numeric
/// column of the dataset other than the x-axis.
pub fn select_y_axes(candidates: &[&Column], dataset: &Dataset, x_axis: &str) -> Vec<String> {
    let mut y_axes: Vec<String> = Vec::new();
    for column in candidates {
        if column.is_numeric() && column.name != x_axis && !y_axes.contains(&column.name) {
            y_axes.push(column.name.clone());
        }
    }

    if y_axes.is_empty() {
        if let Some(fallback) = dataset
            .columns()
            .iter()
            .find(|c| c.is_numeric() && c.name != x_axis)
        {
            y_axes.push(fallback.name.clone());
        }
    }

    y_axes
}
