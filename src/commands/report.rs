//! The terminal reports: the month table, the pie chart and transaction slices.

use crate::api::Mode;
use crate::args::{PieArgs, SliceArgs, SliceRange, TableArgs};
use crate::commands::{local_now, table_options, Out};
use crate::filters;
use crate::loader::Loader;
use crate::model::Transactions;
use crate::report::{self, AggregationTable, PieChart};
use crate::{Config, Result};
use anyhow::ensure;
use chrono::{DateTime, Utc};
use std::io::IsTerminal;

/// Handles `spend-dash table`: spending by type for the last few months.
pub async fn table(
    config: &Config,
    mode: Mode,
    args: &TableArgs,
    now: DateTime<Utc>,
) -> Result<Out<AggregationTable>> {
    let mut loader = Loader::from_config(config, mode, args.source().offline()).await?;
    let transactions = loader.load(now).await?;
    let options = table_options(config, args.layout());
    let table = report::create_main_table(&transactions, &local_now(config, now)?, options);
    let text = report::render_table(&table, std::io::stdout().is_terminal());
    Ok(Out::new(
        format!(
            "Summarized {} transactions over {} months",
            transactions.len(),
            options.lookback_months()
        ),
        table,
    )
    .with_report(text))
}

/// Handles `spend-dash pie`: this month's spending by type.
pub async fn pie(
    config: &Config,
    mode: Mode,
    args: &PieArgs,
    now: DateTime<Utc>,
) -> Result<Out<PieChart>> {
    let mut loader = Loader::from_config(config, mode, args.source().offline()).await?;
    let transactions = loader.load(now).await?;
    let chart = report::create_pie_chart(&transactions, &local_now(config, now)?);
    let text = report::render_pie(&chart);
    Ok(Out::new(chart.title(), chart).with_report(text))
}

/// Handles `spend-dash slice`: the transactions of a date range, a month or a week.
pub async fn slice(
    config: &Config,
    mode: Mode,
    args: &SliceArgs,
    now: DateTime<Utc>,
) -> Result<Out<Transactions>> {
    let mut loader = Loader::from_config(config, mode, args.source().offline()).await?;
    let transactions = loader.load(now).await?;
    let sliced = match args.range() {
        SliceRange::Dates { start, end } => {
            ensure!(start <= end, "The start date {start} is after the end date {end}");
            filters::get_dates(&transactions, *start, *end)
        }
        SliceRange::Month { month } => filters::get_month(&transactions, *month),
        SliceRange::Week { week } => filters::get_week(&transactions, week)?,
    };
    let text = report::render_transactions(&sliced);
    Ok(Out::new(
        format!("{} of {} transactions", sliced.len(), transactions.len()),
        sliced,
    )
    .with_report(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{LayoutArgs, SourceArgs};
    use crate::commands::fetch;
    use crate::report::CellStyle;
    use crate::test::{now, TestEnv};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_table_from_seed_data() {
        let env = TestEnv::new().await;
        let out = table(&env.config(), Mode::Test, &TableArgs::default(), now())
            .await
            .unwrap();
        let table = out.structure().unwrap();

        assert_eq!(
            table.month_labels(),
            vec!["Jul'25", "Aug'25", "Sep'25", "Oct'25"]
        );
        assert_eq!(
            table.month_values("Total").unwrap(),
            vec![dec("271.77"), dec("236.58"), dec("287.96"), dec("259.12")]
        );
        assert_eq!(
            table.month_values("Transport").unwrap(),
            vec![dec("21.50"), dec("0"), dec("40"), dec("55.20")]
        );
        let utilities = table.row("Utilities").unwrap();
        let styles: Vec<CellStyle> = table.month_cells(utilities).map(|c| c.style()).collect();
        assert_eq!(
            styles,
            vec![
                CellStyle::Highlighted,
                CellStyle::Increase,
                CellStyle::Decrease,
                CellStyle::Decrease
            ]
        );
        assert!(out.report().unwrap().contains("Utilities"));
    }

    #[tokio::test]
    async fn test_table_overrides() {
        let env = TestEnv::new().await;
        let args = TableArgs::new(LayoutArgs::new(Some(2), Some(true)), SourceArgs::default());
        let out = table(&env.config(), Mode::Test, &args, now()).await.unwrap();
        let table = out.structure().unwrap();
        assert!(table.reverse());
        assert_eq!(table.month_labels(), vec!["Oct'25", "Sep'25"]);
    }

    #[tokio::test]
    async fn test_table_offline_needs_snapshot() {
        let env = TestEnv::new().await;
        let args = TableArgs::new(LayoutArgs::default(), SourceArgs::new(true));
        let err = table(&env.config(), Mode::Test, &args, now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("spend-dash fetch"));

        let _ = fetch(&env.config(), Mode::Test).await.unwrap();
        let offline = table(&env.config(), Mode::Test, &args, now()).await.unwrap();
        let live = table(&env.config(), Mode::Test, &TableArgs::default(), now())
            .await
            .unwrap();
        assert_eq!(offline.structure(), live.structure());
    }

    #[tokio::test]
    async fn test_pie_from_seed_data() {
        let env = TestEnv::new().await;
        let out = pie(&env.config(), Mode::Test, &PieArgs::default(), now())
            .await
            .unwrap();
        let chart = out.structure().unwrap();
        let labels: Vec<&str> = chart.slices().iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Dining", "Groceries", "Transport", "Utilities"]);
        assert_eq!(chart.center_label(), "$259.12");
        assert_eq!(out.message(), "Spending for October 2025");
    }

    #[tokio::test]
    async fn test_slice_week() {
        let env = TestEnv::new().await;
        let monday = SliceArgs::new(
            SliceRange::Week {
                week: "2025-10-06".to_string(),
            },
            SourceArgs::default(),
        );
        let out = slice(&env.config(), Mode::Test, &monday, now()).await.unwrap();
        let week = out.structure().unwrap();
        assert_eq!(week.len(), 3);
        assert!(week
            .iter()
            .all(|t| t.week_start() == NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()));

        let tuesday = SliceArgs::new(
            SliceRange::Week {
                week: "2025-10-07".to_string(),
            },
            SourceArgs::default(),
        );
        let err = slice(&env.config(), Mode::Test, &tuesday, now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a Monday"));
    }

    #[tokio::test]
    async fn test_slice_dates_and_month() {
        let env = TestEnv::new().await;
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();

        let range = SliceArgs::new(
            SliceRange::Dates {
                start: d(8, 2),
                end: d(8, 8),
            },
            SourceArgs::default(),
        );
        let out = slice(&env.config(), Mode::Test, &range, now()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);

        let month = SliceArgs::new(SliceRange::Month { month: d(9, 1) }, SourceArgs::default());
        let out = slice(&env.config(), Mode::Test, &month, now()).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 4);
        assert!(out.report().unwrap().contains("Groceries"));

        let backwards = SliceArgs::new(
            SliceRange::Dates {
                start: d(8, 8),
                end: d(8, 2),
            },
            SourceArgs::default(),
        );
        assert!(slice(&env.config(), Mode::Test, &backwards, now())
            .await
            .is_err());
    }
}
