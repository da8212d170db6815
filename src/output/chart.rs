use std::fmt::Write;

use ansi_term::Colour;

use crate::storage::entities::{DailyMinutes, MonthlyUsage};

const BAR_SYMBOL: char = '█';

const DAILY_COLOUR: &str = "#2E86AB";
const MONTHLY_MINUTES_COLOUR: &str = "#A23B72";
const MONTHLY_COST_COLOUR: &str = "#F18F01";

const SVG_PANEL_HEIGHT: i64 = 320;
const SVG_MARGIN: i64 = 60;
const SVG_MIN_WIDTH: i64 = 640;
const SVG_SLOT_WIDTH: i64 = 44;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: i64,
}

/// A single bar chart panel. `colour` is used for exported images, `terminal_colour` when
/// printing.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub unit: &'static str,
    pub colour: &'static str,
    pub terminal_colour: Colour,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn daily_minutes(days: &[DailyMinutes], window_days: u32) -> Self {
        Self {
            title: format!("Minutes worked per day, last {window_days} days"),
            unit: "min",
            colour: DAILY_COLOUR,
            terminal_colour: Colour::Blue,
            bars: days
                .iter()
                .map(|day| Bar {
                    label: day.date.format("%m/%d").to_string(),
                    value: day.total_minutes,
                })
                .collect(),
        }
    }

    pub fn monthly_minutes(months: &[MonthlyUsage]) -> Self {
        Self {
            title: "Minutes worked per month".into(),
            unit: "min",
            colour: MONTHLY_MINUTES_COLOUR,
            terminal_colour: Colour::Purple,
            bars: months
                .iter()
                .map(|month| Bar {
                    label: month.month.to_string(),
                    value: month.total_minutes,
                })
                .collect(),
        }
    }

    pub fn monthly_cost(months: &[MonthlyUsage]) -> Self {
        Self {
            title: "Cafe cost per month".into(),
            unit: "",
            colour: MONTHLY_COST_COLOUR,
            terminal_colour: Colour::Yellow,
            bars: months
                .iter()
                .map(|month| Bar {
                    label: month.month.to_string(),
                    value: month.total_cost,
                })
                .collect(),
        }
    }

    fn max_value(&self) -> i64 {
        self.bars.iter().map(|v| v.value).max().unwrap_or(0).max(1)
    }
}

/// Renders a chart as horizontal bars. `width` is the length of the longest bar.
pub fn render_terminal(chart: &BarChart, width: usize, coloured: bool) -> String {
    let label_width = chart
        .bars
        .iter()
        .map(|v| v.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = chart.max_value();

    let mut output = String::new();
    let _ = writeln!(output, "{}", chart.title);
    for bar in &chart.bars {
        let length = (bar.value.max(0) as usize * width) / max as usize;
        let symbols = BAR_SYMBOL.to_string().repeat(length);
        let symbols = if coloured {
            chart.terminal_colour.paint(symbols).to_string()
        } else {
            symbols
        };
        let value = if chart.unit.is_empty() {
            bar.value.to_string()
        } else {
            format!("{} {}", bar.value, chart.unit)
        };
        let _ = writeln!(output, "{:>label_width$} │{symbols} {value}", bar.label);
    }
    output
}

/// Renders panels one below another into a standalone svg document.
pub fn render_svg(panels: &[BarChart]) -> String {
    let slots = panels.iter().map(|v| v.bars.len()).max().unwrap_or(0) as i64;
    let width = (slots * SVG_SLOT_WIDTH + 2 * SVG_MARGIN).max(SVG_MIN_WIDTH);
    let height = SVG_PANEL_HEIGHT * panels.len().max(1) as i64;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    for (index, panel) in panels.iter().enumerate() {
        render_svg_panel(&mut svg, panel, index as i64 * SVG_PANEL_HEIGHT, width);
    }
    svg.push_str("</svg>\n");
    svg
}

fn render_svg_panel(svg: &mut String, chart: &BarChart, top: i64, width: i64) {
    let plot_left = SVG_MARGIN;
    let plot_right = width - SVG_MARGIN / 2;
    let plot_top = top + SVG_MARGIN / 2 + 10;
    let plot_bottom = top + SVG_PANEL_HEIGHT - SVG_MARGIN;
    let plot_height = plot_bottom - plot_top;
    let max = chart.max_value();

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="16" font-weight="bold">{}</text>"#,
        width / 2,
        top + 24,
        escape(&chart.title)
    );
    let _ = writeln!(
        svg,
        r##"<line x1="{plot_left}" y1="{plot_bottom}" x2="{plot_right}" y2="{plot_bottom}" stroke="#444"/>"##
    );

    let slot = if chart.bars.is_empty() {
        0
    } else {
        (plot_right - plot_left) / chart.bars.len() as i64
    };
    for (index, bar) in chart.bars.iter().enumerate() {
        let bar_height = bar.value.max(0) * plot_height / max;
        let x = plot_left + index as i64 * slot + slot / 10;
        let y = plot_bottom - bar_height;
        let bar_width = (slot * 8 / 10).max(1);
        let centre = x + bar_width / 2;
        let _ = writeln!(
            svg,
            r#"<rect x="{x}" y="{y}" width="{bar_width}" height="{bar_height}" fill="{}" fill-opacity="0.7"/>"#,
            chart.colour
        );
        let _ = writeln!(
            svg,
            r#"<text x="{centre}" y="{}" text-anchor="middle" font-size="10">{}</text>"#,
            y - 4,
            bar.value
        );
        let _ = writeln!(
            svg,
            r#"<text x="{centre}" y="{}" text-anchor="end" font-size="10" transform="rotate(-45 {centre} {})">{}</text>"#,
            plot_bottom + 14,
            plot_bottom + 14,
            escape(&bar.label)
        );
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
