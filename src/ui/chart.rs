//! Terminal rendition of a [`RenderSpec`]
//!
//! Bars are scaled to the largest value in the chart; pie slices print as
//! share percentages.

use crate::report::{Chart, RenderSpec, Series};
use crate::ui::{theme, Theme};
use owo_colors::{OwoColorize, Style};
use std::fmt::Write;

const BAR_WIDTH: usize = 40;

fn fmt_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn bar(style: Style, value: f64, max: f64) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize
    } else {
        0
    };
    "█".repeat(len).style(style).to_string()
}

fn label_width<'a>(labels: impl Iterator<Item = &'a String>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

fn max_of<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.copied().fold(0.0, f64::max)
}

fn bars(style: Style, out: &mut String, labels: &[String], values: &[f64], width: usize) {
    let max = max_of(values.iter());
    for (label, value) in labels.iter().zip(values) {
        let _ = writeln!(out, "  {:<width$} {} {}", label, bar(style, *value, max), fmt_number(*value));
    }
}

fn grouped(t: &Theme, out: &mut String, categories: &[String], series: &[Series]) {
    let max = max_of(series.iter().flat_map(|s| s.values.iter()));
    let width = label_width(series.iter().map(|s| &s.name));
    for (i, category) in categories.iter().enumerate() {
        let _ = writeln!(out, "  {}", category.style(t.dim));
        for (n, s) in series.iter().enumerate() {
            let value = s.values.get(i).copied().unwrap_or(0.0);
            let painted = bar(t.series_style(n), value, max);
            let _ = writeln!(out, "    {:<width$} {} {}", s.name, painted, fmt_number(value));
        }
    }
}

/// One chart as text, title first
fn render_chart(t: &Theme, chart: &Chart) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title().style(t.header));
    match chart {
        Chart::Bar {
            labels,
            values,
            color_scale,
            ..
        } => {
            let style = color_scale.map_or(t.bar, |scale| t.scale(scale));
            bars(style, &mut out, labels, values, label_width(labels.iter()));
        }
        Chart::GroupedBar {
            x_title,
            y_title,
            categories,
            series,
            ..
        } => {
            let _ = writeln!(out, "  {}", format!("{} by {}", y_title, x_title).style(t.muted));
            grouped(t, &mut out, categories, series);
        }
        Chart::Pie { labels, values, .. } => {
            let total: f64 = values.iter().sum();
            let width = label_width(labels.iter());
            for (i, (label, value)) in labels.iter().zip(values).enumerate() {
                let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                let _ = writeln!(
                    out,
                    "  {:<width$} {} {:>5.1}% ({})",
                    label,
                    bar(t.series_style(i), share, 100.0),
                    share,
                    fmt_number(*value)
                );
            }
        }
        Chart::Line {
            x_title,
            y_title,
            x,
            series,
            ..
        } => {
            let _ = writeln!(out, "  {}", format!("{} over {}", y_title, x_title).style(t.muted));
            grouped(t, &mut out, x, series);
        }
    }
    out
}

pub fn render_spec(spec: &RenderSpec) -> String {
    render_spec_with(theme(), spec)
}

fn render_spec_with(t: &Theme, spec: &RenderSpec) -> String {
    match spec {
        RenderSpec::NoData { message } => format!("{}\n", message.style(t.warn)),
        RenderSpec::Single { chart } => render_chart(t, chart),
        RenderSpec::DualSubplot { left, right } => {
            format!("{}\n{}", render_chart(t, left), render_chart(t, right))
        }
    }
}
