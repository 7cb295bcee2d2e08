//! Terminal rendering with comfy-table.

use crate::model::Transactions;
use crate::report::pie::PieChart;
use crate::report::table::{AggregationTable, CellStyle, Tone, CATEGORY_HEADER};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

/// Width of the bar in the text chart.
const BAR_WIDTH: usize = 20;

fn mark(style: CellStyle) -> char {
    match style {
        CellStyle::Increase => '▲',
        CellStyle::Decrease => '▼',
        CellStyle::Neutral => '=',
        CellStyle::Highlighted => '•',
    }
}

fn color(tone: Tone) -> Option<Color> {
    match tone {
        Tone::Warning => Some(Color::Red),
        Tone::Favorable => Some(Color::Green),
        Tone::Edge => Some(Color::Yellow),
        Tone::Neutral => None,
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn amount_cell(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Returns something like `████████░░  80%`.
pub fn percentage_bar(percentage: u32, width: usize) -> String {
    let filled = ((percentage as usize * width) / 100).min(width);
    let empty = width.saturating_sub(filled);
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(empty),
        percentage
    )
}

/// Renders the month table. Each month cell carries its comparison mark and, when `use_color` is
/// set, the colour of its tone. The Total row is bold.
pub fn render_table(table: &AggregationTable, use_color: bool) -> String {
    let mut out = new_table();
    let mut header = vec![Cell::new(CATEGORY_HEADER)];
    header.extend(table.columns().iter().map(|c| amount_cell(c.label())));
    out.set_header(header);

    for row in table.rows() {
        let mut cells = vec![Cell::new(row.label())];
        for (column, cell) in table.columns().iter().zip(row.cells()) {
            let mut shown = if column.is_total() {
                amount_cell(cell.text())
            } else {
                amount_cell(format!("{} {}", cell.text(), mark(cell.style())))
            };
            if use_color && !column.is_total() {
                if let Some(color) = color(cell.style().tone(table.reverse())) {
                    shown = shown.fg(color);
                }
            }
            cells.push(shown);
        }
        if use_color && row.is_total() {
            cells = cells
                .into_iter()
                .map(|c| c.add_attribute(Attribute::Bold))
                .collect();
        }
        out.add_row(cells);
    }

    let direction = if table.reverse() {
        "newest first"
    } else {
        "oldest first"
    };
    format!(
        "{out}\n▲ more than the month to the left  ▼ less  = same  • first month ({direction})\n"
    )
}

/// Renders the chart as one bar per slice with the total underneath.
pub fn render_pie(chart: &PieChart) -> String {
    if chart.is_empty() {
        return format!("{}\nNo spending yet this month\n", chart.title());
    }
    let mut out = new_table();
    out.set_header(vec![
        Cell::new(CATEGORY_HEADER),
        amount_cell("Amount"),
        Cell::new("Share"),
    ]);
    for slice in chart.slices() {
        out.add_row(vec![
            Cell::new(slice.label()),
            amount_cell(slice.amount()),
            Cell::new(percentage_bar(slice.percent(), BAR_WIDTH)),
        ]);
    }
    format!(
        "{}\n{out}\nTotal: {}\n",
        chart.title(),
        chart.center_label()
    )
}

/// Renders transactions with one column per header, in header order.
pub fn render_transactions(transactions: &Transactions) -> String {
    let headers: Vec<&str> = transactions.headers().iter().map(|h| h.as_ref()).collect();
    let mut out = new_table();
    out.set_header(headers.iter().map(Cell::new).collect::<Vec<_>>());
    for t in transactions.iter() {
        out.add_row(
            headers
                .iter()
                .map(|h| Cell::new(t.field(h).unwrap_or_default()))
                .collect::<Vec<_>>(),
        );
    }
    format!("{out}\n{} transactions\n", transactions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Transaction};
    use crate::report::{create_main_table, create_pie_chart, TableOptions};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn data() -> Transactions {
        Transactions::parse(
            vec![
                vec!["Date", "Type", "Amount", "Note"],
                vec!["2024-01-05", "Food", "10", "a"],
                vec!["2024-01-20", "Food", "5", ""],
                vec!["2024-02-02", "Food", "20", "b"],
                vec!["2024-02-03", "Rent", "1,000", ""],
            ],
            None,
        )
        .unwrap()
    }

    fn line_with<'a>(text: &'a str, needle: &str) -> (usize, &'a str) {
        text.lines()
            .enumerate()
            .find(|(_, line)| line.contains(needle))
            .unwrap()
    }

    #[test]
    fn test_percentage_bar() {
        assert_eq!(percentage_bar(80, 10), "████████░░  80%");
        assert_eq!(percentage_bar(0, 4), "░░░░   0%");
        assert_eq!(percentage_bar(100, 4), "████ 100%");
    }

    #[test]
    fn test_render_table() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let table = create_main_table(&data(), &now, TableOptions::default());
        let text = render_table(&table, false);

        let (header_ix, header) = line_with(&text, "Jan'24");
        assert!(header.contains("Type"));
        assert!(header.find("Feb'24").unwrap() < header.find("Total").unwrap());

        let (food_ix, food) = line_with(&text, "Food");
        assert!(food.contains("$15.00 •"));
        assert!(food.contains("$20.00 ▲"));
        assert!(food.contains("$35.00"));
        assert!(!food.contains("$35.00 ="));

        let (rent_ix, rent) = line_with(&text, "Rent");
        assert!(rent.contains("$0.00 •"));

        let (total_ix, total) = line_with(&text, "$1,035.00");
        assert!(total.contains("Total"));
        assert!(header_ix < food_ix && food_ix < rent_ix && rent_ix < total_ix);
        assert!(text.contains("oldest first"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_render_table_reversed() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let table = create_main_table(&data(), &now, TableOptions::new(2, true));
        let text = render_table(&table, false);
        let (_, header) = line_with(&text, "Jan'24");
        assert!(header.find("Total").unwrap() < header.find("Feb'24").unwrap());
        assert!(header.find("Feb'24").unwrap() < header.find("Jan'24").unwrap());
        assert!(text.contains("newest first"));
    }

    #[test]
    fn test_render_pie() {
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        let chart = create_pie_chart(&data(), &now);
        let text = render_pie(&chart);
        assert!(text.starts_with("Spending for February 2024"));
        assert!(line_with(&text, "Food").1.contains("$20.00"));
        let (_, rent) = line_with(&text, "Rent");
        assert!(rent.contains("$1,000.00"));
        assert!(rent.contains("98%"));
        assert!(text.ends_with("Total: $1,020.00\n"));

        let empty = create_pie_chart(&data(), &Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert!(render_pie(&empty).contains("No spending"));
    }

    #[test]
    fn test_render_transactions() {
        let transactions = data().with_data(vec![Transaction::new(
            d(2024, 1, 5),
            "Food",
            Amount::from_str("10").unwrap(),
        )
        .with_field("Note", "lunch")]);
        let text = render_transactions(&transactions);

        let (header_ix, header) = line_with(&text, "Note");
        assert!(header.find("Date").unwrap() < header.find("Type").unwrap());
        assert!(header.find("Amount").unwrap() < header.find("Note").unwrap());
        let (row_ix, row) = line_with(&text, "2024-01-05");
        assert!(row.contains("Food"));
        assert!(row.contains("$10.00"));
        assert!(row.contains("lunch"));
        assert!(header_ix < row_ix);
        assert!(text.ends_with("1 transactions\n"));
    }
}
