use anyhow::Result;
use clap::Subcommand;
use tracing::warn;

use crate::{
    context::AppContext,
    output::{
        aggregation::{DEFAULT_DAILY_WINDOW, DEFAULT_MONTHLY_LIMIT},
        chart::{render_svg, render_terminal, BarChart},
        save_chart,
        viewer::open_with_default_viewer,
    },
};

const TERMINAL_BAR_WIDTH: usize = 40;
const DAILY_CHART_FILE: &str = "daily_chart.svg";
const MONTHLY_CHART_FILE: &str = "monthly_chart.svg";

#[derive(Debug, Subcommand)]
pub enum ChartCommand {
    #[command(about = "Minutes worked per day")]
    Daily {
        #[arg(long, default_value_t = DEFAULT_DAILY_WINDOW, help = "Number of past days to include")]
        days: u32,
        #[command(flatten)]
        output: ChartOutput,
    },
    #[command(about = "Minutes worked and cost per month")]
    Monthly {
        #[arg(long, default_value_t = DEFAULT_MONTHLY_LIMIT, help = "Number of latest months to include")]
        months: u32,
        #[command(flatten)]
        output: ChartOutput,
    },
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct ChartOutput {
    #[arg(long, help = "Save the chart as an svg image into the application directory")]
    export: bool,
    #[arg(long, requires = "export", help = "Don't open the exported image")]
    no_open: bool,
    #[arg(long, conflicts_with = "export", help = "Print the series as json")]
    json: bool,
}

/// Command to process `chart` command. Prints the chart in the terminal or exports it as an image.
pub async fn process_chart_command(context: &AppContext, command: ChartCommand) -> Result<()> {
    let aggregator = context.aggregator()?;
    match command {
        ChartCommand::Daily { days, output } => {
            let series = aggregator.daily_series(days)?;
            if series.is_empty() {
                println!("No data to display");
                return Ok(());
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }
            let panels = [BarChart::daily_minutes(&series, days)];
            present(context, &panels, DAILY_CHART_FILE, output).await
        }
        ChartCommand::Monthly { months, output } => {
            let series = aggregator.monthly_series(months)?;
            if series.is_empty() {
                println!("No data to display");
                return Ok(());
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }
            let panels = [
                BarChart::monthly_minutes(&series),
                BarChart::monthly_cost(&series),
            ];
            present(context, &panels, MONTHLY_CHART_FILE, output).await
        }
    }
}

async fn present(
    context: &AppContext,
    panels: &[BarChart],
    file_name: &str,
    output: ChartOutput,
) -> Result<()> {
    if !output.export {
        for panel in panels {
            println!("{}", render_terminal(panel, TERMINAL_BAR_WIDTH, true));
        }
        return Ok(());
    }

    let path = save_chart(&context.chart_dir(), file_name, &render_svg(panels))?;
    println!("Chart saved: {}", path.display());
    if !output.no_open {
        // Not being able to show the image doesn't undo the export.
        if let Err(e) = open_with_default_viewer(&path).await {
            warn!("Couldn't open {path:?}: {e:?}");
            println!("Couldn't open the chart automatically: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::tempdir;

    use crate::{
        context::AppContext,
        storage::log_storage::tests::{insert_closed, TEST_START_DATE},
        utils::clock::{Clock, MockClock},
    };

    use super::{process_chart_command, ChartCommand, ChartOutput};

    fn fixed_clock() -> Box<dyn Clock> {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .returning(|| Local.from_local_datetime(&TEST_START_DATE).unwrap());
        Box::new(clock)
    }

    const EXPORT_ONLY: ChartOutput = ChartOutput {
        export: true,
        no_open: true,
        json: false,
    };

    #[tokio::test]
    async fn test_export_writes_svg() -> Result<()> {
        let dir = tempdir()?;
        let context = AppContext::new(dir.path().to_path_buf(), 500).with_clock(fixed_clock);
        let storage = context.storage()?;
        insert_closed(&storage, TEST_START_DATE - Duration::days(1), 90, 750)?;
        insert_closed(&storage, TEST_START_DATE - Duration::days(40), 30, 250)?;

        process_chart_command(
            &context,
            ChartCommand::Monthly {
                months: 12,
                output: EXPORT_ONLY,
            },
        )
        .await?;
        let svg = std::fs::read_to_string(context.chart_dir().join("monthly_chart.svg"))?;
        assert!(svg.contains("2025-01"));
        assert!(svg.contains("2025-03"));

        process_chart_command(
            &context,
            ChartCommand::Daily {
                days: 30,
                output: EXPORT_ONLY,
            },
        )
        .await?;
        let svg = std::fs::read_to_string(context.chart_dir().join("daily_chart.svg"))?;
        assert!(svg.contains("03/09"));
        assert!(!svg.contains("01/29"));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_data_skips_export() -> Result<()> {
        let dir = tempdir()?;
        let context = AppContext::new(dir.path().to_path_buf(), 500).with_clock(fixed_clock);

        process_chart_command(
            &context,
            ChartCommand::Daily {
                days: 30,
                output: EXPORT_ONLY,
            },
        )
        .await?;
        assert!(!context.chart_dir().join("daily_chart.svg").exists());
        Ok(())
    }
}
