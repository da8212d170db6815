use anyhow::Result;
use chrono::{DateTime, Local};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser};

use crate::{
    context::AppContext,
    storage::entities::{MonthlyTotal, YearMonth},
};

use super::{Args, DateStyle};

#[derive(Debug, Parser)]
pub struct SummaryCommand {
    #[arg(
        long,
        short,
        help = "Month to summarize. Examples are \"2025-03\", \"last month\", \"15/03/2025\". Defaults to the current month"
    )]
    month: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print the summary as json")]
    json: bool,
}

/// Command to process `summary` command. Prints total minutes and cost of the sessions started
/// in a month.
pub fn process_summary_command(
    context: &AppContext,
    SummaryCommand {
        month,
        date_style,
        json,
    }: SummaryCommand,
) -> Result<()> {
    let aggregator = context.aggregator()?;
    let month = match month {
        Some(month) => parse_month(&month, date_style, context.clock().time())?,
        None => aggregator.current_month(),
    };

    let total = aggregator.monthly_total(month)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&total)?);
    } else {
        println!("{}", describe_total(&total));
    }
    Ok(())
}

/// Accepts either an exact `YYYY-MM` or anything [parse_date_string] understands, in which case the
/// month containing that date is used.
fn parse_month(value: &str, date_style: DateStyle, now: DateTime<Local>) -> Result<YearMonth> {
    if let Ok(month) = value.parse::<YearMonth>() {
        return Ok(month);
    }
    match parse_date_string(value, now, date_style.into()) {
        Ok(date) => Ok(YearMonth::containing(date)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate month {value:?}: {e}"),
            )
            .into()),
    }
}

fn describe_total(total: &MonthlyTotal) -> String {
    format!(
        "Summary for {}\nTotal time: {} min ({:.1} h)\nTotal cost: {}",
        total.month,
        total.total_minutes,
        total.total_minutes as f64 / 60.,
        total.total_cost
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use crate::{
        cli::DateStyle,
        storage::entities::{MonthlyTotal, YearMonth},
    };

    use super::{describe_total, parse_month};

    fn now() -> chrono::DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 14)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_parse_month_exact() {
        let month = parse_month("2024-11", DateStyle::Uk, now()).unwrap();
        assert_eq!(month, YearMonth::new_opt(2024, 11).unwrap());
    }

    #[test]
    fn test_parse_month_from_date() {
        let month = parse_month("15/02/2025", DateStyle::Uk, now()).unwrap();
        assert_eq!(month, YearMonth::new_opt(2025, 2).unwrap());
        let month = parse_month("02/15/2025", DateStyle::Us, now()).unwrap();
        assert_eq!(month, YearMonth::new_opt(2025, 2).unwrap());
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("whenever", DateStyle::Uk, now()).is_err());
    }

    #[test]
    fn test_describe_total() {
        let total = MonthlyTotal {
            month: YearMonth::new_opt(2025, 3).unwrap(),
            total_minutes: 90,
            total_cost: 750,
        };
        assert_eq!(
            describe_total(&total),
            "Summary for 2025-03\nTotal time: 90 min (1.5 h)\nTotal cost: 750"
        );
    }
}
