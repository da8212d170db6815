use std::path::Path;

use anyhow::{bail, Result};
use tokio::process::Command;
use tracing::debug;

/// Command that makes the host OS open `path` with its default application.
pub fn default_viewer_command(path: &Path) -> Command {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "macos")] {
            let mut command = Command::new("open");
            command.arg(path);
            command
        } else if #[cfg(windows)] {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]).arg(path);
            command
        } else {
            let mut command = Command::new("xdg-open");
            command.arg(path);
            command
        }
    }
}

/// Opens a chart with the default viewer and waits for the launcher to hand it over.
pub async fn open_with_default_viewer(path: &Path) -> Result<()> {
    let mut command = default_viewer_command(path);
    debug!("Opening {path:?} with {command:?}");
    let status = command.status().await?;
    if !status.success() {
        bail!("Viewer exited with {status} for {path:?}");
    }
    Ok(())
}
