// Chart titles

use crate::query::ChartType;

/// Join y-axis names as "a", "a and b", "a, b and c"
pub fn y_axis_label(y_axes: &[String]) -> String {
    match y_axes {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

pub fn generate_title(chart_type: ChartType, x_axis: &str, y_axes: &[String]) -> String {
    let y_label = y_axis_label(y_axes);
    match chart_type {
        ChartType::Bar => format!("{y_label} by {x_axis}"),
        ChartType::Line => format!("{y_label} Trends by {x_axis}"),
        ChartType::Pie => format!("Distribution of {y_label} by {x_axis}"),
        ChartType::Scatter => format!("Correlation between {x_axis} and {y_label}"),
    }
}
