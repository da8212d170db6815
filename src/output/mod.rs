//! Everything that's derived from the session log without changing it: sums, series and charts.

pub mod aggregation;
pub mod chart;
pub mod viewer;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::utils::dir::ensure_dir;

/// Writes an exported chart into `chart_dir`, creating the directory when needed.
pub fn save_chart(chart_dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = ensure_dir(chart_dir.to_path_buf())?.join(file_name);
    std::fs::write(&path, content)?;
    info!("Saved chart to {path:?}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::save_chart;

    #[test]
    fn test_save_chart_creates_directory() -> Result<()> {
        let dir = tempdir()?;
        let chart_dir = dir.path().join("pic");
        let path = save_chart(&chart_dir, "daily_chart.svg", "<svg></svg>")?;
        assert_eq!(path, chart_dir.join("daily_chart.svg"));
        assert_eq!(std::fs::read_to_string(path)?, "<svg></svg>");
        Ok(())
    }
}
