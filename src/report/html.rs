//! The dashboard page: the monthly table and the donut chart in one self-contained HTML document.

use crate::report::pie::PieChart;
use crate::report::table::{AggregationTable, Tone, CATEGORY_HEADER};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::f64::consts::TAU;

/// Slice colours, reused in order when there are more slices than colours.
const PALETTE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

const RADIUS: f64 = 100.0;

const STYLE: &str = "
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2rem; color: #212529; }
table { border-collapse: collapse; margin-bottom: 2rem; }
th, td { padding: 0.4rem 0.8rem; border: 1px solid #dee2e6; }
th { background: #f8f9fa; }
td.amount { text-align: right; font-variant-numeric: tabular-nums; }
tr.total td, tr.total th { font-weight: bold; }
.generated { color: #6c757d; font-size: 0.8rem; }
";

fn background(tone: Tone) -> &'static str {
    match tone {
        Tone::Warning => "#f8d7da",
        Tone::Favorable => "#d4edda",
        Tone::Neutral => "#e9ecef",
        Tone::Edge => "#fff3cd",
    }
}

/// The whole page as a string, ready to be written to disk.
pub fn render_dashboard(table: &AggregationTable, chart: &PieChart, generated_at: &str) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Spending" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Spending by month" }
                (table_markup(table))
                h2 { (chart.title()) }
                (donut_markup(chart))
                p class="generated" { "Generated " (generated_at) }
            }
        }
    }
    .into_string()
}

fn table_markup(table: &AggregationTable) -> Markup {
    html! {
        @if table.is_empty() {
            p { "No transactions in this period." }
        } @else {
            table {
                thead {
                    tr {
                        th { (CATEGORY_HEADER) }
                        @for column in table.columns() {
                            th { (column.label()) }
                        }
                    }
                }
                tbody {
                    @for row in table.rows() {
                        tr class=[row.is_total().then_some("total")] {
                            th { (row.label()) }
                            @for cell in row.cells() {
                                td class="amount"
                                    data-style=(cell.style())
                                    style={ "background-color: " (background(cell.style().tone(table.reverse()))) } {
                                    (cell.text())
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn donut_markup(chart: &PieChart) -> Markup {
    let inner = RADIUS * chart.hole();
    let mut start = 0.0;
    let arcs: Vec<(String, &str, String)> = chart
        .slices()
        .iter()
        .enumerate()
        .map(|(ix, slice)| {
            let end = start + slice.share() * TAU;
            let path = arc_path(start, end, RADIUS, inner);
            start = end;
            let tooltip = format!("{}: {} ({}%)", slice.label(), slice.amount(), slice.percent());
            (path, PALETTE[ix % PALETTE.len()], tooltip)
        })
        .collect();

    html! {
        svg xmlns="http://www.w3.org/2000/svg" viewBox="-110 -110 220 220" width="360" height="360" {
            @for (path, color, tooltip) in &arcs {
                path d=(path) fill=(color) stroke="white" stroke-width="1" {
                    title { (tooltip) }
                }
            }
            text x="0" y="0" text-anchor="middle" dominant-baseline="middle" font-size="16" {
                (chart.center_label())
            }
        }
        ul {
            @for (slice, (_, color, _)) in chart.slices().iter().zip(&arcs) {
                li {
                    span style={ "color: " (color) } { "■ " }
                    (slice.label()) " " (slice.amount()) " (" (slice.percent()) "%)"
                }
            }
        }
    }
}

/// An SVG path for a ring segment between angles `start` and `end`, in radians clockwise from
/// twelve o'clock.
fn arc_path(start: f64, end: f64, outer: f64, inner: f64) -> String {
    // A segment whose endpoints coincide draws nothing, so a full ring stops just short.
    let end = if end - start >= TAU { start + TAU - 1e-4 } else { end };
    let large = if end - start > TAU / 2.0 { 1 } else { 0 };
    let point = |radius: f64, angle: f64| (radius * angle.sin(), -radius * angle.cos());
    let (x0, y0) = point(outer, start);
    let (x1, y1) = point(outer, end);
    let (x2, y2) = point(inner, end);
    let (x3, y3) = point(inner, start);
    format!(
        "M {x0:.3} {y0:.3} A {outer} {outer} 0 {large} 1 {x1:.3} {y1:.3} \
         L {x2:.3} {y2:.3} A {inner} {inner} 0 {large} 0 {x3:.3} {y3:.3} Z"
    )
}
