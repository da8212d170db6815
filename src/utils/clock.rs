use chrono::{DateTime, Local};

/// Represents an entity responsible for providing dates across application. This allows sessions
/// to be opened and closed at fixed moments during testing.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}
