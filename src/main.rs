use anyhow::{bail, Context, Result};
use chartquery::csv_reader;
use chartquery::data::Dataset;
use chartquery::history::QueryHistory;
use chartquery::{query, runtime, OutputFormat, RenderOptions};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chartquery")]
#[command(about = "Turn a plain-language question about CSV data into a chart", long_about = None)]
struct Args {
    /// Question about the data (e.g., 'Show sales by region')
    query: Option<String>,

    /// CSV file to read instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Render options as JSON, e.g. '{"width": 1024, "type": "png"}'
    #[arg(long)]
    options: Option<String>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print suggested queries for the (partial) query text
    #[arg(long)]
    suggest: bool,

    /// Print only the inferred chart intent
    #[arg(long)]
    intent: bool,

    /// Print the first N parsed rows with column types
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Read one query per line from stdin (requires --file)
    #[arg(long)]
    interactive: bool,

    /// Log inference decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let dataset = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            csv_reader::read_dataset(file)
        }
        None if args.interactive => {
            bail!("--interactive reads queries from stdin; pass the data with --file")
        }
        None => csv_reader::read_dataset(io::stdin().lock()),
    }
    .context("Failed to parse CSV")?;

    if let Some(rows) = args.preview {
        let json = serde_json::to_vec_pretty(&dataset.preview(rows))?;
        return write_output(args.output.as_ref(), &json);
    }

    if args.interactive {
        return run_interactive(&dataset);
    }

    let query_text = args
        .query
        .as_deref()
        .context("A query is required (e.g., 'Show sales by region')")?;

    if args.suggest {
        let mut out = String::new();
        for suggestion in query::suggest_queries(query_text, &dataset) {
            out.push_str(&suggestion);
            out.push('\n');
        }
        return write_output(args.output.as_ref(), out.as_bytes());
    }

    if args.intent {
        let intent = query::interpret(query_text, &dataset).with_context(|| {
            format!("Cannot determine a visualization for query '{}'", query_text)
        })?;
        let json = serde_json::to_vec_pretty(&intent)?;
        return write_output(args.output.as_ref(), &json);
    }

    let options = resolve_options(&args)?;
    let description = runtime::build_chart(query_text, &dataset)?.with_context(|| {
        format!("Cannot determine a visualization for query '{}'", query_text)
    })?;
    let bytes = runtime::render(&description, &options).context("Failed to render chart")?;
    write_output(args.output.as_ref(), &bytes)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

/// `--options` JSON first, then explicit flags on top
fn resolve_options(args: &Args) -> Result<RenderOptions> {
    let mut options = match &args.options {
        Some(json) => serde_json::from_str(json).context("Invalid --options JSON")?,
        None => RenderOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    Ok(options)
}

fn run_interactive(dataset: &Dataset) -> Result<()> {
    let mut history = QueryHistory::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read query from stdin")?;
        let query_text = line.trim();
        match query_text {
            "" => continue,
            ":quit" | ":q" => break,
            ":history" => {
                for (idx, past) in history.iter().enumerate() {
                    writeln!(out, "{}. {}", idx + 1, past)?;
                }
                continue;
            }
            _ => {}
        }

        history.record(query_text);
        match runtime::build_chart(query_text, dataset)? {
            Some(description) => {
                serde_json::to_writer_pretty(&mut out, &description)?;
                writeln!(out)?;
            }
            None => eprintln!("Cannot determine a visualization for query '{}'", query_text),
        }
        out.flush()?;
    }

    Ok(())
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    if let Some(path) = path {
        return fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()));
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(bytes)
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
