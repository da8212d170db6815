//! Opening and closing of sessions. [SessionController] is the only place where records are
//! mutated.

pub mod cost;
pub mod prompt;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    storage::{entities::SessionRecord, log_storage::LogStorage},
    utils::{clock::Clock, time::whole_minutes_between},
};

use cost::default_cost;
use prompt::{CostPrompt, PromptError, PromptOutcome};

#[derive(Debug, Error)]
pub enum CloseError {
    #[error("no active session")]
    NoActiveSession,
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct StartOutcome {
    pub record: SessionRecord,
    /// Sessions that were already open before this one was started.
    pub previously_open: usize,
}

#[derive(Debug)]
pub enum CloseOutcome {
    Closed(SessionRecord),
    Cancelled(SessionRecord),
}

/// Opens and closes sessions using current time from the clock.
pub struct SessionController<S: LogStorage> {
    storage: S,
    clock: Box<dyn Clock>,
    hourly_rate: u32,
}

impl<S: LogStorage> SessionController<S> {
    pub fn new(storage: S, clock: Box<dyn Clock>, hourly_rate: u32) -> Self {
        Self {
            storage,
            clock,
            hourly_rate,
        }
    }

    /// Always creates a new open session, even if another one is still open.
    pub fn start(&self) -> anyhow::Result<StartOutcome> {
        let previously_open = self.storage.count_open()?;
        if previously_open > 0 {
            warn!("Starting a session while {previously_open} other session(s) are open");
        }
        let now = self.clock.time().naive_local();
        let record = self.storage.insert_open(now)?;
        info!("Started session {} at {}", record.id, record.start_time);
        Ok(StartOutcome {
            record,
            previously_open,
        })
    }

    /// Closes the newest open session. Older open sessions are left as they are.
    pub fn close(&self, prompt: &mut impl CostPrompt) -> Result<CloseOutcome, CloseError> {
        let Some(open) = self.storage.latest_open()? else {
            warn!("Close requested without an open session");
            return Err(CloseError::NoActiveSession);
        };

        let now = self.clock.time().naive_local();
        let duration_minutes = whole_minutes_between(open.start_time, now);
        let suggested = default_cost(duration_minutes, self.hourly_rate);

        let cost = match prompt.ask_cost(duration_minutes, suggested)? {
            PromptOutcome::Accepted(cost) => cost,
            PromptOutcome::Cancelled => {
                info!("Closing session {} was cancelled", open.id);
                return Ok(CloseOutcome::Cancelled(open));
            }
        };

        let record = self.storage.close(open.id, now, duration_minutes, cost)?;
        info!(
            "Closed session {} after {duration_minutes} minutes with cost {cost}",
            record.id
        );
        Ok(CloseOutcome::Closed(record))
    }

    /// Newest open session together with the number of minutes since it started.
    pub fn active(&self) -> anyhow::Result<Option<(SessionRecord, i64)>> {
        let now = self.clock.time().naive_local();
        Ok(self
            .storage
            .latest_open()?
            .map(|record| {
                let elapsed = whole_minutes_between(record.start_time, now);
                (record, elapsed)
            }))
    }

    pub fn open_count(&self) -> anyhow::Result<usize> {
        self.storage.count_open()
    }
}
