// End-to-end executor: raw CSV + query -> chart description -> output bytes

use crate::csv_reader;
use crate::data::Dataset;
use crate::graph;
use crate::ir::ChartDescription;
use crate::query;
use crate::transform;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use tracing::info;

/// Interpret a query and shape the chart.
///
/// `Ok(None)` means the query could not be mapped onto the dataset.
pub fn build_chart(query_text: &str, dataset: &Dataset) -> Result<Option<ChartDescription>> {
    let Some(intent) = query::interpret(query_text, dataset) else {
        return Ok(None);
    };
    let description = transform::describe(&intent, dataset)
        .with_context(|| format!("Failed to shape {} chart", intent.chart_type))?;
    info!(
        chart_type = %description.chart_type,
        title = %description.title,
        "Built chart"
    );
    Ok(Some(description))
}

/// Encode a chart description in the requested output format
pub fn render(description: &ChartDescription, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(description)
                .context("Failed to serialize chart description")?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        OutputFormat::Png => graph::render_png(description, options.width, options.height),
        OutputFormat::Svg => {
            graph::render_svg(description, options.width, options.height).map(String::into_bytes)
        }
    }
}

/// Parse CSV text, answer the query and render the result
pub fn render_query(query_text: &str, csv_text: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let dataset = csv_reader::parse_dataset(csv_text).context("Failed to parse CSV")?;
    let description = build_chart(query_text, &dataset)?.with_context(|| {
        format!("Cannot determine a visualization for query '{}'", query_text)
    })?;
    render(&description, options)
}
