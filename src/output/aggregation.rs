use anyhow::Result;
use chrono::{Duration, NaiveDate};
use now::DateTimeNow;
use tracing::debug;

use crate::{
    storage::{
        entities::{DailyMinutes, MonthlyTotal, MonthlyUsage, YearMonth},
        log_storage::LogStorage,
    },
    utils::clock::Clock,
};

pub const DEFAULT_DAILY_WINDOW: u32 = 30;
pub const DEFAULT_MONTHLY_LIMIT: u32 = 12;

/// Read-only summaries over the session log.
pub struct Aggregator<S: LogStorage> {
    storage: S,
    clock: Box<dyn Clock>,
}

impl<S: LogStorage> Aggregator<S> {
    pub fn new(storage: S, clock: Box<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::containing(self.clock.time())
    }

    /// Minutes and cost of all sessions started in `month`. Zero when there are none.
    pub fn monthly_total(&self, month: YearMonth) -> Result<MonthlyTotal> {
        self.storage.monthly_total(month)
    }

    /// Minutes per day over closed sessions of the last `window_days` days, oldest day first.
    /// A window reaching past the supported date range covers the whole history.
    pub fn daily_series(&self, window_days: u32) -> Result<Vec<DailyMinutes>> {
        let since = self
            .clock
            .time()
            .checked_sub_signed(Duration::days(window_days.into()))
            .map(|v| v.beginning_of_day().date_naive())
            .unwrap_or(NaiveDate::MIN);
        debug!("Collecting daily series since {since}");
        self.storage.daily_minutes(since)
    }

    /// Minutes and cost of closed sessions for the `limit` latest months, oldest month first.
    pub fn monthly_series(&self, limit: u32) -> Result<Vec<MonthlyUsage>> {
        let mut months = self.storage.latest_monthly_usage(limit)?;
        months.reverse();
        Ok(months)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone};

    use crate::{
        storage::log_storage::{
            tests::{insert_closed, test_storage, TEST_START_DATE},
            LogStorage, SqliteLogStorage,
        },
        utils::clock::MockClock,
    };

    use super::Aggregator;

    fn aggregator(storage: &SqliteLogStorage) -> Aggregator<&SqliteLogStorage> {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .returning(|| Local.from_local_datetime(&TEST_START_DATE).unwrap());
        Aggregator::new(storage, Box::new(clock))
    }

    #[test]
    fn test_monthly_total_two_sessions() -> Result<()> {
        let (_dir, storage) = test_storage()?;
        let aggregator = aggregator(&storage);
        let month = aggregator.current_month();
        assert_eq!(month.to_string(), "2025-03");

        let empty = aggregator.monthly_total(month)?;
        assert_eq!((empty.total_minutes, empty.total_cost), (0, 0));

        insert_closed(&storage, TEST_START_DATE - Duration::days(5), 30, 100)?;
        insert_closed(&storage, TEST_START_DATE - Duration::days(1), 45, 150)?;

        let total = aggregator.monthly_total(month)?;
        assert_eq!((total.total_minutes, total.total_cost), (75, 250));
        Ok(())
    }

    #[test]
    fn test_daily_series_window() -> Result<()> {
        let (_dir, storage) = test_storage()?;
        let aggregator = aggregator(&storage);
        assert!(aggregator.daily_series(30)?.is_empty());

        // outside of a 7 day window
        insert_closed(&storage, TEST_START_DATE - Duration::days(8), 60, 0)?;
        // first day of the window
        insert_closed(&storage, TEST_START_DATE - Duration::days(7), 25, 0)?;
        insert_closed(&storage, TEST_START_DATE - Duration::days(1), 40, 0)?;
        // open sessions are skipped
        storage.insert_open(TEST_START_DATE - Duration::days(1))?;

        let series = aggregator.daily_series(7)?;
        let points = series
            .iter()
            .map(|v| (v.date, v.total_minutes))
            .collect::<Vec<_>>();
        assert_eq!(
            points,
            vec![
                (NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), 25),
                (NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(), 40),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_daily_series_huge_window_covers_history() -> Result<()> {
        let (_dir, storage) = test_storage()?;
        let aggregator = aggregator(&storage);
        let first_day = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        insert_closed(&storage, first_day.and_time(NaiveTime::MIN), 15, 0)?;
        insert_closed(&storage, TEST_START_DATE, 20, 0)?;

        let series = aggregator.daily_series(u32::MAX)?;
        let points = series
            .iter()
            .map(|v| (v.date, v.total_minutes))
            .collect::<Vec<_>>();
        assert_eq!(points, vec![(first_day, 15), (TEST_START_DATE.date(), 20)]);
        Ok(())
    }

    #[test]
    fn test_monthly_series_is_ascending() -> Result<()> {
        let (_dir, storage) = test_storage()?;
        let aggregator = aggregator(&storage);
        assert!(aggregator.monthly_series(12)?.is_empty());

        for month in [1, 2, 3] {
            let start = NaiveDate::from_ymd_opt(2025, month, 2)
                .unwrap()
                .and_time(NaiveTime::MIN);
            insert_closed(&storage, start, 60, 500)?;
            insert_closed(&storage, start + Duration::hours(2), 30, 250)?;
        }
        storage.insert_open(TEST_START_DATE)?;

        let series = aggregator.monthly_series(2)?;
        let points = series
            .iter()
            .map(|v| (v.month.to_string(), v.total_minutes, v.total_cost))
            .collect::<Vec<_>>();
        assert_eq!(
            points,
            vec![("2025-02".to_string(), 90, 750), ("2025-03".to_string(), 90, 750)]
        );
        Ok(())
    }
}
