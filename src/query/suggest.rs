// Example queries offered while a query is being typed

use crate::data::{Column, ColumnType, Dataset};

pub const MAX_SUGGESTIONS: usize = 3;

/// Below this many characters any input is treated as just getting started.
const SHORT_INPUT_CHARS: usize = 10;

const TRIGGER_WORDS: &[&str] = &["show", "display", "create"];

/// Suggestions for the in-progress query text, or nothing once the text is
/// long and contains none of the trigger words.
pub fn suggest_queries(input: &str, dataset: &Dataset) -> Vec<String> {
    if !wants_suggestions(input) {
        return Vec::new();
    }
    templates(dataset)
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub fn wants_suggestions(input: &str) -> bool {
    if input.trim().is_empty() {
        return false;
    }
    let lower = input.to_lowercase();
    lower.chars().count() < SHORT_INPUT_CHARS || TRIGGER_WORDS.iter().any(|w| lower.contains(w))
}

fn templates(dataset: &Dataset) -> Vec<String> {
    let numeric: Vec<&Column> = dataset.columns_of_type(ColumnType::Number).collect();
    let num = numeric.first().map(|c| c.name.as_str());
    let cat = dataset.first_of_type(ColumnType::Text).map(|c| c.name.as_str());
    let date = dataset.first_of_type(ColumnType::Date).map(|c| c.name.as_str());

    let mut out = Vec::new();
    if let (Some(num), Some(cat)) = (num, cat) {
        out.push(format!("Show {num} by {cat} as a bar chart"));
        let all: Vec<&str> = numeric.iter().map(|c| c.name.as_str()).collect();
        out.push(format!("Compare {} by {cat}", all.join(" and ")));
    }
    if let (Some(num), Some(date)) = (num, date) {
        out.push(format!("Show trend of {num} over {date}"));
    }
    if let [first, second, ..] = numeric.as_slice() {
        out.push(format!(
            "Show correlation between {} and {}",
            first.name, second.name
        ));
    }
    if let (Some(num), Some(cat)) = (num, cat) {
        out.push(format!("Show distribution of {num} by {cat}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::parse_dataset;

    fn sales() -> Dataset {
        parse_dataset("Date,Region,Sales,Profit\n2023-01-01,North,100,10").unwrap()
    }

    #[test]
    fn test_trigger_conditions() {
        assert!(wants_suggestions("sal"));
        assert!(wants_suggestions("Please DISPLAY the numbers per region"));
        assert!(!wants_suggestions("sales numbers per region please"));
        assert!(!wants_suggestions(""));
        assert!(!wants_suggestions("   "));
    }

    #[test]
    fn test_first_three_templates() {
        let suggestions = suggest_queries("show", &sales());
        assert_eq!(
            suggestions,
            vec![
                "Show Sales by Region as a bar chart",
                "Compare Sales and Profit by Region",
                "Show trend of Sales over Date",
            ]
        );
    }

    #[test]
    fn test_templates_depend_on_schema() {
        let numbers = parse_dataset("a,b\n1,2").unwrap();
        assert_eq!(
            suggest_queries("s", &numbers),
            vec!["Show correlation between a and b"]
        );

        let text = parse_dataset("a,b\nx,y").unwrap();
        assert!(suggest_queries("s", &text).is_empty());
    }

    #[test]
    fn test_cleared_when_condition_fails() {
        assert!(suggest_queries("compare revenue across regions", &sales()).is_empty());
    }
}
