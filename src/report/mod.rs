//! Summaries built from `Transactions` and the renderers that display them.
//!
//! The builders only attach enumerated style tags to cells; colours and marks are chosen by the
//! renderers in `text` and `html`.

mod html;
mod pie;
mod table;
mod text;

pub use html::render_dashboard;
pub use pie::{create_pie_chart, PieChart, Slice, HOLE};
pub use table::{
    create_main_table, highlight_row, AggregationTable, Cell, CellStyle, Column, ColumnKind, Row,
    TableOptions, Tone, CATEGORY_HEADER, DEFAULT_LOOKBACK_MONTHS, TOTAL,
};
pub use text::{percentage_bar, render_pie, render_table, render_transactions};
