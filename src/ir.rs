use crate::data::Value;
use crate::query::ChartType;
use serde::Serialize;

// =============================================================================
// Renderer contract
// =============================================================================

/// Fully shaped chart, ready for any renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescription {
    pub chart_type: ChartType,
    pub title: String,
    pub x_axis: String,
    pub y_axes: Vec<String>,
    pub series: Series,
}

/// Series layout, depending on the chart type.
///
/// Serialized untagged so the JSON is exactly
/// `{labels, datasets: [{label, data}]}` or `{datasets: [{label, data: [{x, y}]}]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Series {
    /// bar, line and pie
    Categorical {
        labels: Vec<String>,
        datasets: Vec<CategoricalDataset>,
    },
    Scatter {
        datasets: Vec<ScatterDataset>,
    },
}

impl Series {
    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        match self {
            Series::Categorical { labels, .. } => labels.is_empty(),
            Series::Scatter { datasets } => datasets.iter().all(|d| d.data.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalDataset {
    /// Absent for pie charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Aligned with the series labels
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterDataset {
    pub label: String,
    pub data: Vec<ScatterPoint>,
}

/// One point per distinct x-value. `x` keeps the first occurrence's value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: Value,
    pub y: f64,
}
