use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    session::cost::Cost,
    utils::time::{parse_date, parse_timestamp},
};

/// A single work session. Created on start and completed exactly once on close.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub cost: Option<Cost>,
}

impl SessionRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Raw row as it's stored in the `logs` table.
#[derive(Debug)]
pub struct LogRow {
    pub id: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub cost: Option<i64>,
}

impl TryFrom<LogRow> for SessionRecord {
    type Error = anyhow::Error;

    fn try_from(
        LogRow {
            id,
            start_time,
            end_time,
            duration_minutes,
            cost,
        }: LogRow,
    ) -> Result<Self> {
        Ok(SessionRecord {
            id,
            start_time: parse_timestamp(&start_time)?,
            end_time: end_time.as_deref().map(parse_timestamp).transpose()?,
            duration_minutes,
            cost: cost.map(Cost::new).transpose()?,
        })
    }
}

/// A calendar month. Displayed and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new_opt(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Prefix shared by every stored timestamp in this month.
    pub fn timestamp_prefix(&self) -> String {
        self.to_string()
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Expected YYYY-MM, got {s:?}"))?;
        let year = year.parse::<i32>()?;
        let month = month.parse::<u32>()?;
        YearMonth::new_opt(year, month).ok_or_else(|| anyhow!("{s:?} is not a valid month"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Sums over all sessions started in a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub total_minutes: i64,
    pub total_cost: i64,
}

/// Minutes worked on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyMinutes {
    pub date: NaiveDate,
    pub total_minutes: i64,
}

impl DailyMinutes {
    pub fn from_row(date: &str, total_minutes: Option<i64>) -> Result<Self> {
        Ok(Self {
            date: parse_date(date)?,
            total_minutes: total_minutes.unwrap_or(0),
        })
    }
}

/// Minutes worked and money spent during a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyUsage {
    pub month: YearMonth,
    pub total_minutes: i64,
    pub total_cost: i64,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_year_month_parse_and_display() {
        let month: YearMonth = "2025-03".parse().unwrap();
        assert_eq!(month, YearMonth::new_opt(2025, 3).unwrap());
        assert_eq!(month.to_string(), "2025-03");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_containing() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(YearMonth::containing(date).to_string(), "2024-12");
    }

    #[test]
    fn test_row_with_illegal_cost_is_rejected() {
        let row = LogRow {
            id: 1,
            start_time: "2025-03-01 10:00:00".into(),
            end_time: Some("2025-03-01 11:00:00".into()),
            duration_minutes: Some(60),
            cost: Some(99_999),
        };
        assert!(SessionRecord::try_from(row).is_err());
    }

    #[test]
    fn test_open_row_converts() {
        let row = LogRow {
            id: 4,
            start_time: "2025-03-01 10:00:00".into(),
            end_time: None,
            duration_minutes: None,
            cost: None,
        };
        let record = SessionRecord::try_from(row).unwrap();
        assert!(record.is_open());
        assert_eq!(record.id, 4);
    }
}
