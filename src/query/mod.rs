// Free-text query interpretation

pub mod axes;
pub mod intent;
pub mod keywords;
pub mod suggest;

// Public API re-exports
pub use axes::interpret;
pub use intent::{ChartIntent, ChartType};
pub use keywords::detect_chart_type;
pub use suggest::suggest_queries;
