//!  Storage is organized through [log_storage::SqliteLogStorage].
//!  The basic idea is:
//!   - There is a single SQLite file with a single `logs` table.
//!   - Every row is a session. A row without `end_time` is an open session.
//!   - Timestamps are stored as local `YYYY-MM-DD HH:MM:SS` text, so grouping by day or month is
//!     done with SQLite's own date functions.

pub mod entities;
pub mod log_storage;
