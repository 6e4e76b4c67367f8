// Library exports for chartquery

pub mod csv_reader;
pub mod data;
pub mod graph;
pub mod history;
pub mod infer;
pub mod ir;
pub mod labels;
pub mod query;
pub mod runtime;
pub mod transform;

pub use csv_reader::{parse_dataset, ParseError};
pub use data::{Column, ColumnType, Dataset, Value};
pub use ir::{ChartDescription, Series};
pub use query::{interpret, suggest_queries, ChartIntent, ChartType};
pub use transform::{describe, shape, ShapeError};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Chart description as JSON
    #[serde(rename = "json")]
    #[default]
    Json,
    /// Rendered bitmap chart
    #[serde(rename = "png")]
    Png,
    /// Rendered vector chart
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.width, 800);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, OutputFormat::Json);
    }

    #[test]
    fn test_render_options_from_json() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"width": 1024, "type": "svg"}"#).unwrap();
        assert_eq!(options.width, 1024);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, OutputFormat::Svg);
        assert!(serde_json::from_str::<RenderOptions>(r#"{"type": "gif"}"#).is_err());
    }
}
