// Keyword rules for chart type selection

use super::intent::ChartType;
use tracing::debug;

/// Ordered rule table: the first family with a trigger in the query wins.
pub const CHART_TYPE_RULES: &[(ChartType, &[&str])] = &[
    (ChartType::Line, &["line", "trend", "over time"]),
    (ChartType::Pie, &["pie", "distribution", "percentage"]),
    (ChartType::Scatter, &["scatter", "correlation", "relationship"]),
];

pub const DEFAULT_CHART_TYPE: ChartType = ChartType::Bar;

/// Pick a chart type by case-insensitive substring match against the rules
pub fn detect_chart_type(query: &str) -> ChartType {
    let query = query.to_lowercase();
    CHART_TYPE_RULES
        .iter()
        .find_map(|(chart_type, triggers)| {
            triggers
                .iter()
                .copied()
                .find(|t| query.contains(t))
                .map(|trigger| {
                    debug!(%chart_type, trigger, "Chart type keyword matched");
                    *chart_type
                })
        })
        .unwrap_or(DEFAULT_CHART_TYPE)
}
