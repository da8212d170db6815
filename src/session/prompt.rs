use thiserror::Error;
use tracing::warn;

use super::cost::Cost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Accepted(Cost),
    /// The user declined to give a cost. Closing must leave the session untouched.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PromptError {
    /// The surface can't be used at all, for example there is no terminal attached.
    #[error("cost prompt is unavailable: {0}")]
    Unavailable(String),
}

/// Surface used to confirm or override the suggested cost of a session that's being closed.
#[cfg_attr(test, mockall::automock)]
pub trait CostPrompt {
    fn ask_cost(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> Result<PromptOutcome, PromptError>;
}

impl<P: CostPrompt + ?Sized> CostPrompt for Box<P> {
    fn ask_cost(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> Result<PromptOutcome, PromptError> {
        (**self).ask_cost(duration_minutes, default_cost)
    }
}

/// Accepts the suggested cost without asking.
pub struct DefaultPrompt;

impl CostPrompt for DefaultPrompt {
    fn ask_cost(&mut self, _: i64, default_cost: Cost) -> Result<PromptOutcome, PromptError> {
        Ok(PromptOutcome::Accepted(default_cost))
    }
}

/// Answers with a cost known up front, e.g. one passed on the command line.
pub struct FixedPrompt(pub Cost);

impl CostPrompt for FixedPrompt {
    fn ask_cost(&mut self, _: i64, _: Cost) -> Result<PromptOutcome, PromptError> {
        Ok(PromptOutcome::Accepted(self.0))
    }
}

/// Uses `primary` while it works. Once it reports [PromptError::Unavailable] every following
/// question goes to `fallback`.
pub struct FallbackPrompt<P, F> {
    primary: Option<P>,
    fallback: F,
}

impl<P: CostPrompt, F: CostPrompt> FallbackPrompt<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary: Some(primary),
            fallback,
        }
    }
}

impl<P: CostPrompt, F: CostPrompt> CostPrompt for FallbackPrompt<P, F> {
    fn ask_cost(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> Result<PromptOutcome, PromptError> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.ask_cost(duration_minutes, default_cost) {
                Err(PromptError::Unavailable(reason)) => {
                    warn!("Falling back to text prompt: {reason}");
                    self.primary = None;
                }
                outcome => return outcome,
            }
        }
        self.fallback.ask_cost(duration_minutes, default_cost)
    }
}
