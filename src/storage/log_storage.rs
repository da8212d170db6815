use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};

use crate::{
    session::cost::Cost,
    utils::time::{format_date, format_timestamp},
};

use super::entities::{
    DailyMinutes, LogRow, MonthlyTotal, MonthlyUsage, SessionRecord, YearMonth,
};

const CREATE_LOGS_TABLE: &str = "CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY,
    start_time TEXT,
    end_time TEXT,
    duration_minutes INTEGER,
    cost INTEGER
)";

const SELECT_COLUMNS: &str = "SELECT id, start_time, end_time, duration_minutes, cost FROM logs";

/// Interface for abstracting storage of session records.
pub trait LogStorage {
    /// Inserts a new open session.
    fn insert_open(&self, start_time: NaiveDateTime) -> Result<SessionRecord>;

    /// The open session with the largest id, if any.
    fn latest_open(&self) -> Result<Option<SessionRecord>>;

    fn count_open(&self) -> Result<usize>;

    fn get(&self, id: i64) -> Result<Option<SessionRecord>>;

    /// Completes an open session. Fails if the session doesn't exist or was already closed.
    fn close(
        &self,
        id: i64,
        end_time: NaiveDateTime,
        duration_minutes: i64,
        cost: Cost,
    ) -> Result<SessionRecord>;

    /// Sums over every session whose start falls into `month`, open ones included.
    fn monthly_total(&self, month: YearMonth) -> Result<MonthlyTotal>;

    /// Minutes per day for closed sessions started on or after `since`, oldest day first.
    fn daily_minutes(&self, since: NaiveDate) -> Result<Vec<DailyMinutes>>;

    /// Usage for closed sessions of the `limit` most recent months, newest month first.
    fn latest_monthly_usage(&self, limit: u32) -> Result<Vec<MonthlyUsage>>;
}

impl<T: Deref> LogStorage for T
where
    T::Target: LogStorage,
{
    fn insert_open(&self, start_time: NaiveDateTime) -> Result<SessionRecord> {
        self.deref().insert_open(start_time)
    }

    fn latest_open(&self) -> Result<Option<SessionRecord>> {
        self.deref().latest_open()
    }

    fn count_open(&self) -> Result<usize> {
        self.deref().count_open()
    }

    fn get(&self, id: i64) -> Result<Option<SessionRecord>> {
        self.deref().get(id)
    }

    fn close(
        &self,
        id: i64,
        end_time: NaiveDateTime,
        duration_minutes: i64,
        cost: Cost,
    ) -> Result<SessionRecord> {
        self.deref().close(id, end_time, duration_minutes, cost)
    }

    fn monthly_total(&self, month: YearMonth) -> Result<MonthlyTotal> {
        self.deref().monthly_total(month)
    }

    fn daily_minutes(&self, since: NaiveDate) -> Result<Vec<DailyMinutes>> {
        self.deref().daily_minutes(since)
    }

    fn latest_monthly_usage(&self, limit: u32) -> Result<Vec<MonthlyUsage>> {
        self.deref().latest_monthly_usage(limit)
    }
}

/// The main realization of [LogStorage]. Every operation opens its own connection which is closed
/// when the operation returns, on success and on error alike.
pub struct SqliteLogStorage {
    database_path: PathBuf,
}

impl SqliteLogStorage {
    /// Creates the database file and the `logs` table if they don't exist yet.
    pub fn new(database_path: PathBuf) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Self { database_path };
        storage.connect()?.execute_batch(CREATE_LOGS_TABLE)?;
        Ok(storage)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    fn connect(&self) -> Result<Connection> {
        debug!("Opening {:?}", self.database_path);
        Ok(Connection::open(&self.database_path)?)
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<LogRow> {
        Ok(LogRow {
            id: row.get(0)?,
            start_time: row.get(1)?,
            end_time: row.get(2)?,
            duration_minutes: row.get(3)?,
            cost: row.get(4)?,
        })
    }

    fn get_with(conn: &Connection, id: i64) -> Result<Option<SessionRecord>> {
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            Self::read_row,
        )
        .optional()?
        .map(SessionRecord::try_from)
        .transpose()
    }
}

impl LogStorage for SqliteLogStorage {
    #[instrument(skip(self))]
    fn insert_open(&self, start_time: NaiveDateTime) -> Result<SessionRecord> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO logs (start_time) VALUES (?1)",
            params![format_timestamp(start_time)],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted session {id}");
        // Read back so the record carries the stored second resolution.
        let Some(record) = Self::get_with(&conn, id)? else {
            bail!("Session {id} disappeared after insert");
        };
        Ok(record)
    }

    fn latest_open(&self) -> Result<Option<SessionRecord>> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE end_time IS NULL ORDER BY id DESC LIMIT 1"),
            [],
            Self::read_row,
        )
        .optional()?
        .map(SessionRecord::try_from)
        .transpose()
    }

    fn count_open(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM logs WHERE end_time IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn get(&self, id: i64) -> Result<Option<SessionRecord>> {
        let conn = self.connect()?;
        Self::get_with(&conn, id)
    }

    #[instrument(skip(self))]
    fn close(
        &self,
        id: i64,
        end_time: NaiveDateTime,
        duration_minutes: i64,
        cost: Cost,
    ) -> Result<SessionRecord> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE logs SET end_time = ?1, duration_minutes = ?2, cost = ?3
             WHERE id = ?4 AND end_time IS NULL",
            params![format_timestamp(end_time), duration_minutes, cost.value(), id],
        )?;
        if updated != 1 {
            // Dropping the transaction rolls it back.
            bail!("Session {id} is not open");
        }
        let Some(record) = Self::get_with(&tx, id)? else {
            bail!("Session {id} disappeared while closing");
        };
        tx.commit()?;
        Ok(record)
    }

    fn monthly_total(&self, month: YearMonth) -> Result<MonthlyTotal> {
        let conn = self.connect()?;
        let (total_minutes, total_cost) = conn.query_row(
            "SELECT COALESCE(SUM(duration_minutes), 0), COALESCE(SUM(cost), 0)
             FROM logs WHERE start_time LIKE ?1",
            params![format!("{}%", month.timestamp_prefix())],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(MonthlyTotal {
            month,
            total_minutes,
            total_cost,
        })
    }

    fn daily_minutes(&self, since: NaiveDate) -> Result<Vec<DailyMinutes>> {
        let conn = self.connect()?;
        let mut statement = conn.prepare(
            "SELECT DATE(start_time) AS day, SUM(duration_minutes)
             FROM logs
             WHERE start_time >= ?1 AND end_time IS NOT NULL
             GROUP BY day
             ORDER BY day",
        )?;
        let rows = statement.query_map(params![format_date(since)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
        })?;

        let mut days = vec![];
        for row in rows {
            let (day, minutes) = row?;
            days.push(DailyMinutes::from_row(&day, minutes)?);
        }
        Ok(days)
    }

    fn latest_monthly_usage(&self, limit: u32) -> Result<Vec<MonthlyUsage>> {
        let conn = self.connect()?;
        let mut statement = conn.prepare(
            "SELECT strftime('%Y-%m', start_time) AS month,
                    SUM(duration_minutes),
                    SUM(cost)
             FROM logs
             WHERE end_time IS NOT NULL
             GROUP BY month
             ORDER BY month DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?;

        let mut months = vec![];
        for row in rows {
            let (month, minutes, cost) = row?;
            months.push(MonthlyUsage {
                month: month.parse()?,
                total_minutes: minutes.unwrap_or(0),
                total_cost: cost.unwrap_or(0),
            });
        }
        Ok(months)
    }
}
