use anyhow::Result;

use crate::{
    context::AppContext,
    session::{
        cost::Cost,
        prompt::{CostPrompt, DefaultPrompt, FallbackPrompt, FixedPrompt},
        CloseError, CloseOutcome,
    },
    storage::entities::SessionRecord,
    utils::time::format_timestamp,
};

use super::prompt::{InteractivePrompt, TextPrompt};

pub fn process_start_command(context: &AppContext) -> Result<()> {
    let outcome = context.controller()?.start()?;
    if outcome.previously_open > 0 {
        println!(
            "Warning: {} earlier session(s) are still open. `end` only closes the newest one.",
            outcome.previously_open
        );
    }
    println!("Started: {}", format_timestamp(outcome.record.start_time));
    Ok(())
}

/// Closes the newest open session. The cost comes from `--cost`, from `--yes`, or from the
/// interactive prompt, which falls back to plain stdin when there is no terminal.
pub fn process_end_command(context: &AppContext, cost: Option<Cost>, yes: bool) -> Result<()> {
    let mut prompt: Box<dyn CostPrompt> = match (cost, yes) {
        (Some(cost), _) => Box::new(FixedPrompt(cost)),
        (None, true) => Box::new(DefaultPrompt),
        (None, false) => Box::new(FallbackPrompt::new(InteractivePrompt, TextPrompt::stdio())),
    };

    match context.controller()?.close(&mut prompt) {
        Ok(CloseOutcome::Closed(record)) => println!("{}", describe_closed(&record)),
        Ok(CloseOutcome::Cancelled(_)) => println!("Cancelled. The session is still open."),
        Err(CloseError::NoActiveSession) => {
            println!("No active session. Use `cafelog start` first.")
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn process_status_command(context: &AppContext) -> Result<()> {
    let controller = context.controller()?;
    match controller.active()? {
        Some((record, elapsed)) => {
            println!(
                "Active since {} ({elapsed} min)",
                format_timestamp(record.start_time)
            );
            let open = controller.open_count()?;
            if open > 1 {
                println!("{} older session(s) are also open", open - 1);
            }
        }
        None => println!("No active session."),
    }
    Ok(())
}

fn describe_closed(record: &SessionRecord) -> String {
    let end = record
        .end_time
        .map(format_timestamp)
        .unwrap_or_else(|| "-".into());
    let minutes = record.duration_minutes.unwrap_or(0);
    let cost = record.cost.unwrap_or(Cost::ZERO);
    format!("Ended: {end}\nDuration: {minutes} min\nCost: {cost}")
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use crate::{session::cost::Cost, storage::entities::SessionRecord};

    use super::describe_closed;

    #[test]
    fn test_describe_closed() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        let record = SessionRecord {
            id: 1,
            start_time: start,
            end_time: Some(start + chrono::Duration::minutes(90)),
            duration_minutes: Some(90),
            cost: Some(Cost::new(750).unwrap()),
        };
        assert_eq!(
            describe_closed(&record),
            "Ended: 2025-03-10 11:30:00\nDuration: 90 min\nCost: 750"
        );
    }
}
