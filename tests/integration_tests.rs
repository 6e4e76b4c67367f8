use chartquery::{interpret, parse_dataset, runtime, ChartType, ColumnType, Series};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

const SALES: &str = "Date,Region,Sales\n2023-01-01,North,100\n2023-01-01,South,50\n2023-01-02,North,80";

/// Helper function to run chartquery with arguments and CSV on stdin
fn run_chartquery(args: &[&str], stdin: &str) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_chartquery"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut input) = child.stdin.take() {
        input
            .write_all(stdin.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn is_valid_svg(bytes: &[u8]) -> bool {
    String::from_utf8_lossy(bytes).trim_start().starts_with("<svg")
}

/// Write CSV to a per-test file for modes that need `--file`
fn write_csv(name: &str, csv: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("chartquery-{}-{}.csv", name, std::process::id()));
    fs::write(&path, csv).expect("Failed to write test CSV");
    path
}

const MEASUREMENTS: &str = "Height,Weight\n150,50\n160,60\n150,70\n";

/// One query per chart kind, with the data it runs against
const CHART_KINDS: [(&str, &str); 4] = [
    ("Show sales by region", SALES),
    ("trend of sales over date", SALES),
    ("sales distribution by region", SALES),
    ("correlation of height and weight", MEASUREMENTS),
];

fn run_json(args: &[&str], stdin: &str) -> Value {
    let bytes = run_chartquery(args, stdin).expect("chartquery failed");
    serde_json::from_slice(&bytes).expect("output is not JSON")
}

#[test]
fn test_scenario_a_column_types() {
    let data = parse_dataset(SALES).unwrap();
    assert_eq!(data.row_count(), 3);
    let kinds: Vec<ColumnType> = data.columns().iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ColumnType::Date, ColumnType::Text, ColumnType::Number]);
}

#[test]
fn test_scenario_b_bar_by_region() {
    let data = parse_dataset(SALES).unwrap();
    let intent = interpret("Show sales by region", &data).unwrap();
    assert_eq!(intent.chart_type, ChartType::Bar);
    assert_eq!(intent.x_axis, "Region");
    assert_eq!(intent.y_axes, vec!["Sales"]);

    let chart = runtime::build_chart("Show sales by region", &data).unwrap().unwrap();
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(json["title"], "Sales by Region");
    assert_eq!(json["series"]["labels"], json!(["North", "South"]));
    assert_eq!(json["series"]["datasets"][0]["label"], "Sales");
    assert_eq!(json["series"]["datasets"][0]["data"], json!([180.0, 50.0]));
}

#[test]
fn test_scenario_c_line_over_date() {
    let json = run_json(&["trend of sales over date"], SALES);
    assert_eq!(json["chartType"], "line");
    assert_eq!(json["xAxis"], "Date");
    assert_eq!(json["yAxes"], json!(["Sales"]));
    assert_eq!(json["title"], "Sales Trends by Date");
    assert_eq!(json["series"]["labels"], json!(["2023-01-01", "2023-01-02"]));
    assert_eq!(json["series"]["datasets"][0]["data"], json!([150.0, 80.0]));
}

#[test]
fn test_scenario_d_all_numeric_fallback() {
    let data = parse_dataset("a,b,c\n1,2,3\n4,5,6").unwrap();
    let intent = interpret("what does this look like", &data).unwrap();
    assert_eq!(intent.x_axis, "a");
    assert_eq!(intent.y_axes, vec!["b"]);
}

#[test]
fn test_scenario_e_pie() {
    let data = parse_dataset(SALES).unwrap();
    let chart = runtime::build_chart("sales distribution by region", &data)
        .unwrap()
        .unwrap();
    assert_eq!(chart.chart_type, ChartType::Pie);
    let Series::Categorical { labels, datasets } = &chart.series else {
        panic!("expected categorical series");
    };
    assert_eq!(labels, &vec!["North".to_string(), "South".to_string()]);
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].data, vec![180.0, 50.0]);

    let json = serde_json::to_value(&chart).unwrap();
    assert!(json["series"]["datasets"][0].get("label").is_none());
}

#[test]
fn test_end_to_end_scatter_shape() {
    let json = run_json(&["correlation of height and weight"], MEASUREMENTS);
    assert_eq!(json["chartType"], "scatter");
    assert_eq!(json["title"], "Correlation between Height and Weight");
    assert!(json["series"].get("labels").is_none());
    assert_eq!(
        json["series"]["datasets"][0]["data"],
        json!([{"x": 150.0, "y": 60.0}, {"x": 160.0, "y": 60.0}])
    );
}

#[test]
fn test_end_to_end_intent_only() {
    let json = run_json(&["--intent", "Show sales by region"], SALES);
    assert_eq!(
        json,
        json!({"chartType": "bar", "xAxis": "Region", "yAxes": ["Sales"]})
    );
}

#[test]
fn test_end_to_end_preview() {
    let json = run_json(&["--preview", "2"], SALES);
    assert_eq!(json["rowCount"], 3);
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["columns"][0], json!({"name": "Date", "type": "date"}));
    assert_eq!(json["rows"][0]["Date"], "2023-01-01");
    assert_eq!(json["rows"][0]["Sales"], 100.0);
}

#[test]
fn test_end_to_end_suggestions() {
    let out = run_chartquery(&["--suggest", "show"], SALES).unwrap();
    let lines: Vec<String> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(
        lines,
        vec![
            "Show Sales by Region as a bar chart",
            "Compare Sales by Region",
            "Show trend of Sales over Date",
        ]
    );
}

#[test]
fn test_end_to_end_undetermined_query() {
    let result = run_chartquery(&["show name by city"], "name,city\nann,rome\n");
    assert!(result.is_err(), "Should have failed with no numeric column");
    assert!(result.unwrap_err().contains("Cannot determine a visualization"));
}

#[test]
fn test_end_to_end_empty_input() {
    let result = run_chartquery(&["Show sales by region"], "");
    assert!(result.is_err(), "Should have failed with empty CSV error");
    assert!(result.unwrap_err().contains("Failed to parse CSV"));
}

#[test]
fn test_end_to_end_missing_query() {
    let result = run_chartquery(&[], SALES);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("A query is required"));
}

#[test]
fn test_end_to_end_invalid_options() {
    let result = run_chartquery(&["--options", "{\"type\": \"gif\"}", "sales"], SALES);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid --options JSON"));
}

#[test]
fn test_end_to_end_header_only_is_undetermined() {
    let result = run_chartquery(&["Show sales by region"], "Region,Sales\n");
    assert!(result.is_err());
}

#[test]
fn test_end_to_end_png_for_every_chart_kind() {
    for (query, csv) in CHART_KINDS {
        let result = run_chartquery(&["--format", "png", query], csv);
        assert!(result.is_ok(), "{}: {:?}", query, result.err());
        assert!(is_valid_png(&result.unwrap()), "{}: output is not a valid PNG", query);
    }
}

#[test]
fn test_end_to_end_svg_for_every_chart_kind() {
    for (query, csv) in CHART_KINDS {
        let result = run_chartquery(&["--format", "svg", query], csv);
        assert!(result.is_ok(), "{}: {:?}", query, result.err());
        assert!(is_valid_svg(&result.unwrap()), "{}: output is not SVG", query);
    }
}

#[test]
fn test_end_to_end_png_size_from_options() {
    let result = run_chartquery(
        &["--options", r#"{"width": 320, "height": 240, "type": "png"}"#, "Show sales by region"],
        SALES,
    );
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_oversized_png_rejected() {
    let result = run_chartquery(
        &["--options", r#"{"width": 40000, "height": 40000, "type": "png"}"#, "Show sales by region"],
        SALES,
    );
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to render chart"));
}

#[test]
fn test_end_to_end_interactive_history() {
    let path = write_csv("interactive", SALES);
    let file = path.to_string_lossy().to_string();
    let queries = "Show sales by region\n:history\npie of sales by region\n\n:history\n:quit\nShow units\n";
    let result = run_chartquery(&["--interactive", "--file", &file], queries);
    fs::remove_file(&path).ok();

    let out = String::from_utf8(result.expect("interactive mode failed")).unwrap();
    assert!(out.contains(r#""title": "Sales by Region""#));
    assert!(out.contains(r#""title": "Distribution of Sales by Region""#));

    let history: Vec<&str> = out.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit())).collect();
    assert_eq!(
        history,
        vec![
            "1. Show sales by region",
            "1. pie of sales by region",
            "2. Show sales by region",
        ]
    );
    // Nothing after :quit is answered
    assert_eq!(out.matches(r#""chartType""#).count(), 2);
}

#[test]
fn test_end_to_end_interactive_requires_file() {
    let result = run_chartquery(&["--interactive"], "Show sales by region\n");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("--file"));
}
