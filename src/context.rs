use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::{
    output::aggregation::Aggregator,
    session::SessionController,
    storage::log_storage::SqliteLogStorage,
    utils::clock::{Clock, DefaultClock},
};

pub const DATABASE_FILE_NAME: &str = "cafe_log.db";
pub const CHART_DIR_NAME: &str = "pic";

fn default_clock() -> Box<dyn Clock> {
    Box::new(DefaultClock)
}

/// Everything a command needs to run. Created once in [crate::cli::run_cli] and handed to every
/// command handler.
pub struct AppContext {
    app_dir: PathBuf,
    hourly_rate: u32,
    clock_factory: fn() -> Box<dyn Clock>,
}

impl AppContext {
    pub fn new(app_dir: PathBuf, hourly_rate: u32) -> Self {
        Self {
            app_dir,
            hourly_rate,
            clock_factory: default_clock,
        }
    }

    /// Replaces the wall clock, e.g. to evaluate commands at a fixed moment.
    pub fn with_clock(self, clock_factory: fn() -> Box<dyn Clock>) -> Self {
        Self {
            clock_factory,
            ..self
        }
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn hourly_rate(&self) -> u32 {
        self.hourly_rate
    }

    pub fn database_path(&self) -> PathBuf {
        self.app_dir.join(DATABASE_FILE_NAME)
    }

    pub fn chart_dir(&self) -> PathBuf {
        self.app_dir.join(CHART_DIR_NAME)
    }

    pub fn clock(&self) -> Box<dyn Clock> {
        (self.clock_factory)()
    }

    pub fn storage(&self) -> Result<SqliteLogStorage> {
        SqliteLogStorage::new(self.database_path())
    }

    pub fn controller(&self) -> Result<SessionController<SqliteLogStorage>> {
        Ok(SessionController::new(
            self.storage()?,
            self.clock(),
            self.hourly_rate,
        ))
    }

    pub fn aggregator(&self) -> Result<Aggregator<SqliteLogStorage>> {
        Ok(Aggregator::new(self.storage()?, self.clock()))
    }
}
