use crate::config::Config;
use crate::errors::{ChartError, Result};
use crate::models::price::ChartPoint;
use crate::services::chart_service::ChartView;
use chrono::{DateTime, Duration, Utc};
use log::info;
use plotters::prelude::*;
use std::fmt::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            width: config.chart_width,
            height: config.chart_height,
        }
    }
}

/// Y axis bounds: data range padded by 10% on each side
pub fn value_bounds(points: &[ChartPoint]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let min_value = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max_value = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);

    let span = (max_value - min_value).max(1e-8);
    let padding = span * 0.1;
    let lower = if min_value >= 0.0 {
        (min_value - padding).max(0.0)
    } else {
        min_value - padding
    };

    Some((lower, max_value + padding))
}

fn time_bounds(points: &[ChartPoint]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = points.first()?.date.and_utc();
    let last = points.last()?.date.and_utc();
    if last > first {
        Some((first, last))
    } else {
        Some((first, first + Duration::days(1)))
    }
}

fn render_err<E: std::fmt::Display>(what: &str) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::RenderError(format!("Failed to {}: {}", what, e))
}

/// Draw the line + area chart, with the annotation marker when present,
/// to a PNG file
pub fn render_chart(view: &ChartView, options: &RenderOptions, path: &Path) -> Result<()> {
    if view.points.len() < 2 {
        return Err(ChartError::DataError(format!(
            "Not enough data to draw a chart for {} in {} ({} points, need 2)",
            view.symbol, view.range, view.points.len()
        )));
    }

    let (y_min, y_max) = value_bounds(&view.points)
        .ok_or_else(|| ChartError::DataError("No values to chart".to_string()))?;
    let (x_min, x_max) = time_bounds(&view.points)
        .ok_or_else(|| ChartError::DataError("No dates to chart".to_string()))?;

    {
        let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err("fill canvas"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} closing price ({})", view.symbol, view.period),
                ("sans-serif", 32.0).into_font(),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(render_err("build chart"))?;

        chart
            .configure_mesh()
            .x_labels(10)
            .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
            .y_desc("Price")
            .x_desc("Date")
            .draw()
            .map_err(render_err("draw mesh"))?;

        let series = || view.points.iter().map(|p| (p.date.and_utc(), p.value));

        chart
            .draw_series(AreaSeries::new(series(), y_min, BLUE.mix(0.2)))
            .map_err(render_err("draw area"))?;
        chart
            .draw_series(LineSeries::new(series(), BLUE.stroke_width(3)))
            .map_err(render_err("draw line"))?;

        if let Some(annotation) = &view.annotation {
            let at = (annotation.date.and_utc(), annotation.value);
            chart
                .draw_series(std::iter::once(
                    EmptyElement::at(at)
                        + Circle::new((0, 0), 6, RED.filled())
                        + Text::new(annotation.label(), (10, -24), ("sans-serif", 18.0).into_font()),
                ))
                .map_err(render_err("draw annotation"))?;
        }

        root.present().map_err(render_err("write chart"))?;
    }

    info!("Chart for {} written to {}", view.symbol, path.display());
    Ok(())
}

/// Plain-text listing of the displayed series
pub fn format_table(view: &ChartView, limit: usize) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_table(&mut out, view, limit);
    out
}

fn write_table(out: &mut String, view: &ChartView, limit: usize) -> fmt::Result {
    writeln!(out, "{} {} prices, {}", view.symbol, view.period, view.range)?;
    writeln!(out, "{:-<32}", "")?;
    writeln!(out, "{:<20} {:>11}", "Date", "Price")?;
    writeln!(out, "{:-<32}", "")?;

    for point in view.points.iter().take(limit) {
        writeln!(out, "{:<20} {:>11.2}", point.date.format("%Y-%m-%d %H:%M"), point.value)?;
    }

    if view.points.len() > limit {
        writeln!(out, "... and {} more points", view.points.len() - limit)?;
    } else if view.points.is_empty() {
        writeln!(out, "No data in range")?;
    }

    if let Some(annotation) = &view.annotation {
        writeln!(out, "Selected {}", annotation.label())?;
    }
    if view.undated_count > 0 {
        writeln!(out, "{} of {} records skipped: unparsable date", view.undated_count, view.raw_count)?;
    }

    Ok(())
}
