use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub const CLI_PREFIX: &str = "cli";
pub const LOG_DIR_NAME: &str = "logs";
const LOG_SUFFIX: &str = "log";
const KEPT_LOG_FILES: usize = 7;
const DEFAULT_LEVEL: &str = "info";

pub fn log_dir(application_data_path: &Path) -> PathBuf {
    application_data_path.join(LOG_DIR_NAME)
}

/// Directive enabling `level` for this crate only. An explicit level wins over `RUST_LOG`.
fn filter_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace("-", "_"))
}

/// Log files are written into `<application_data_path>/logs`, one per day. Console output goes
/// to stderr and only when `show_std` is set, so that stdout (including `--json`) stays clean.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix(LOG_SUFFIX)
        .build(log_dir(application_data_path))?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);
    let directive = filter_directive(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_writer(stderr.and(appender))
        .with_ansi(false)
        .compact()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .compact()
        .try_init();
});
