use crate::data::Value;
use crate::ir::{CategoricalDataset, ChartDescription, ScatterDataset, Series};
use crate::query::ChartType;
use anyhow::{anyhow, bail, Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";

/// Largest width or height accepted for either output backend
pub const MAX_DIMENSION: u32 = 16_384;

/// Bitmap canvas for a single chart description
pub struct Canvas {
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_size(width, height)?;
        let Some(len) = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(3))
        else {
            bail!("Canvas size {}x{} is too large", width, height);
        };
        Ok(Canvas {
            buffer: vec![0u8; len],
            width,
            height,
        })
    }

    pub fn draw(&mut self, description: &ChartDescription) -> Result<()> {
        let root = BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
            .into_drawing_area();
        draw_chart(&root, description)?;
        root.present().map_err(draw_err)
    }

    /// Finalize and encode the canvas as PNG
    pub fn render(self) -> Result<Vec<u8>> {
        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(
                    &self.buffer,
                    self.width,
                    self.height,
                    image::ColorType::Rgb8,
                )
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }
}

pub fn render_png(description: &ChartDescription, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut canvas = Canvas::new(width, height)?;
    canvas.draw(description)?;
    canvas.render()
}

pub fn render_svg(description: &ChartDescription, width: u32, height: u32) -> Result<String> {
    check_size(width, height)?;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, description)?;
        root.present().map_err(draw_err)?;
    }
    Ok(svg)
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("Canvas size must be non-zero (got {}x{})", width, height);
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!(
            "Canvas size {}x{} exceeds the {} pixel limit",
            width,
            height,
            MAX_DIMENSION
        );
    }
    Ok(())
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("Failed to draw chart: {}", e)
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, d: &ChartDescription) -> Result<()> {
    if d.series.is_empty() {
        bail!("Chart '{}' has no data to draw", d.title);
    }
    root.fill(&WHITE).map_err(draw_err)?;

    let y_desc = d.y_axes.join(", ");
    match (d.chart_type, &d.series) {
        (ChartType::Pie, Series::Categorical { labels, datasets }) => {
            draw_pie(root, &d.title, labels, datasets)
        }
        (ChartType::Bar, Series::Categorical { labels, datasets }) => {
            draw_bars(root, &d.title, &d.x_axis, &y_desc, labels, datasets)
        }
        (ChartType::Line, Series::Categorical { labels, datasets }) => {
            draw_lines(root, &d.title, &d.x_axis, &y_desc, labels, datasets)
        }
        (ChartType::Scatter, Series::Scatter { datasets }) => {
            draw_scatter(root, &d.title, &d.x_axis, &y_desc, datasets)
        }
        (chart_type, _) => bail!("Series layout does not match a {} chart", chart_type),
    }
}

fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).to_rgba()
}

/// Data range with 5% padding; a degenerate range is widened by one unit
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> Range<f64> {
    let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Categories sit at integer positions 0..n
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

fn category_at(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn build_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    title: &str,
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> Result<Chart<'a, DB>> {
    ChartBuilder::on(root)
        .margin(10)
        .caption(title, (FONT, 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)
}

fn draw_mesh<'a, DB: DrawingBackend + 'a>(
    chart: &mut Chart<'a, DB>,
    categories: Option<&[String]>,
    x_desc: &str,
    y_desc: &str,
) -> Result<()> {
    let format_category = |x: &f64| categories.map(|c| category_at(c, *x)).unwrap_or_default();
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x_desc).y_desc(y_desc);
    if let Some(categories) = categories {
        mesh.x_labels(categories.len()).x_label_formatter(&format_category);
    }
    mesh.draw().map_err(draw_err)
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(chart: &mut Chart<'a, DB>) -> Result<()> {
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)
}

/// Series side by side within each category
fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    datasets: &[CategoricalDataset],
) -> Result<()> {
    let y_range = padded_range(datasets.iter().flat_map(|d| d.data.iter().copied()), true);
    let mut chart = build_chart(root, title, category_range(labels.len()), y_range)?;
    draw_mesh(&mut chart, Some(labels), x_desc, y_desc)?;

    let slot = 0.8 / datasets.len() as f64;
    for (s, dataset) in datasets.iter().enumerate() {
        let color = series_color(s);
        let left_of = |i: usize| i as f64 - 0.4 + s as f64 * slot;
        chart
            .draw_series(dataset.data.iter().enumerate().map(|(i, &v)| {
                Rectangle::new([(left_of(i), 0.0), (left_of(i) + slot, v)], color.filled())
            }))
            .map_err(draw_err)?
            .label(dataset.label.clone().unwrap_or_default())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    draw_legend(&mut chart)
}

fn draw_lines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    datasets: &[CategoricalDataset],
) -> Result<()> {
    let y_range = padded_range(datasets.iter().flat_map(|d| d.data.iter().copied()), false);
    let mut chart = build_chart(root, title, category_range(labels.len()), y_range)?;
    draw_mesh(&mut chart, Some(labels), x_desc, y_desc)?;

    for (s, dataset) in datasets.iter().enumerate() {
        let color = series_color(s);
        let points: Vec<(f64, f64)> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(dataset.label.clone().unwrap_or_default())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
            .map_err(draw_err)?;
    }

    draw_legend(&mut chart)
}

/// Numeric x when every point has a numeric x, otherwise categories in
/// order of first appearance
fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    datasets: &[ScatterDataset],
) -> Result<()> {
    let numeric_x = datasets
        .iter()
        .flat_map(|d| &d.data)
        .all(|p| matches!(p.x, Value::Number(_)));

    let mut categories: Vec<String> = Vec::new();
    if !numeric_x {
        for point in datasets.iter().flat_map(|d| &d.data) {
            let label = point.x.to_string();
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
    }
    let position = |x: &Value| match x {
        Value::Number(n) if numeric_x => *n,
        other => {
            let label = other.to_string();
            categories.iter().position(|c| *c == label).unwrap_or_default() as f64
        }
    };

    let x_range = if numeric_x {
        padded_range(datasets.iter().flat_map(|d| d.data.iter().map(|p| p.x.as_number())), false)
    } else {
        category_range(categories.len())
    };
    let y_range = padded_range(datasets.iter().flat_map(|d| d.data.iter().map(|p| p.y)), false);

    let mut chart = build_chart(root, title, x_range, y_range)?;
    let category_labels = (!numeric_x).then_some(categories.as_slice());
    draw_mesh(&mut chart, category_labels, x_desc, y_desc)?;

    for (s, dataset) in datasets.iter().enumerate() {
        let color = series_color(s);
        chart
            .draw_series(
                dataset
                    .data
                    .iter()
                    .map(|p| Circle::new((position(&p.x), p.y), 4, color.filled())),
            )
            .map_err(draw_err)?
            .label(dataset.label.clone())
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    draw_legend(&mut chart)
}

/// Start and end angle (radians, clockwise from 12 o'clock) of each wedge.
/// Non-positive values get no wedge.
pub fn wedge_angles(values: &[f64]) -> Vec<Option<(f64, f64)>> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut start = 0.0;
    values
        .iter()
        .map(|&v| {
            if v <= 0.0 || total <= 0.0 {
                return None;
            }
            let end = start + v / total * 2.0 * PI;
            let wedge = (start, end);
            start = end;
            Some(wedge)
        })
        .collect()
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    labels: &[String],
    datasets: &[CategoricalDataset],
) -> Result<()> {
    let values = datasets.first().map(|d| d.data.as_slice()).unwrap_or_default();
    let wedges = wedge_angles(values);
    if wedges.iter().all(Option::is_none) {
        bail!("Pie chart '{}' has no positive values", title);
    }
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();

    let area = root.titled(title, (FONT, 20)).map_err(draw_err)?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.35;
    let at = |angle: f64, r: f64| {
        (
            (center.0 + r * angle.sin()).round() as i32,
            (center.1 - r * angle.cos()).round() as i32,
        )
    };

    for (idx, wedge) in wedges.iter().enumerate() {
        let Some((start, end)) = *wedge else { continue };
        let steps = ((end - start) / (PI / 90.0)).ceil().max(1.0) as usize;
        let mut points = vec![at(0.0, 0.0)];
        points.extend((0..=steps).map(|k| at(start + (end - start) * k as f64 / steps as f64, radius)));

        area.draw(&Polygon::new(points, series_color(idx).filled()))
            .map_err(draw_err)?;

        let share = values[idx] / total * 100.0;
        let text = format!("{} ({:.1}%)", labels.get(idx).map(String::as_str).unwrap_or(""), share);
        area.draw(&Text::new(text, at((start + end) / 2.0, radius * 1.15), (FONT, 14).into_font()))
            .map_err(draw_err)?;
    }

    Ok(())
}
