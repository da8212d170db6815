//! Simple to use cli for logging work sessions at a cafe together with what they cost.
//! Sessions are kept in a local SQLite file and can be summarized per month or charted per day
//! and month.
//!

pub mod cli;
pub mod context;
pub mod output;
pub mod session;
pub mod storage;
pub mod utils;
