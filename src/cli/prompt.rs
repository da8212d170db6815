use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use inquire::{validator::Validation, CustomUserError, InquireError, Text};
use tracing::debug;

use crate::session::{
    cost::{Cost, MAX_COST, MIN_COST},
    prompt::{CostPrompt, PromptError, PromptOutcome},
};

fn hours(duration_minutes: i64) -> f64 {
    duration_minutes as f64 / 60.
}

fn validate_cost(input: &str) -> Result<Validation, CustomUserError> {
    Ok(match input.parse::<Cost>() {
        Ok(_) => Validation::Valid,
        Err(e) => Validation::Invalid(e.to_string().into()),
    })
}

/// Interactive terminal form. Invalid input is reported inline and the form stays open. Esc and
/// Ctrl-C cancel.
pub struct InteractivePrompt;

impl CostPrompt for InteractivePrompt {
    fn ask_cost(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> Result<PromptOutcome, PromptError> {
        let default = default_cost.to_string();
        let help = format!(
            "Worked {duration_minutes} min ({:.1} h). Enter a value from {MIN_COST} to {MAX_COST}",
            hours(duration_minutes)
        );

        let answer = Text::new("Cafe cost:")
            .with_default(&default)
            .with_help_message(&help)
            .with_validator(validate_cost)
            .prompt();

        match answer {
            Ok(value) => value
                .parse::<Cost>()
                .map(PromptOutcome::Accepted)
                .map_err(|e| PromptError::Unavailable(e.to_string())),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                debug!("Cost prompt cancelled");
                Ok(PromptOutcome::Cancelled)
            }
            Err(e) => Err(PromptError::Unavailable(e.to_string())),
        }
    }
}

/// Line based prompt over any pair of streams. An empty line accepts the suggested cost and end
/// of input cancels.
pub struct TextPrompt<R, W> {
    reader: R,
    writer: W,
}

impl TextPrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TextPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn ask_inner(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> io::Result<PromptOutcome> {
        writeln!(self.writer, "\n=== Cafe cost ===")?;
        writeln!(
            self.writer,
            "Worked: {duration_minutes} min ({:.1} h)",
            hours(duration_minutes)
        )?;
        writeln!(self.writer, "Suggested cost: {default_cost}")?;

        let mut line = String::new();
        loop {
            write!(self.writer, "Cafe cost [{default_cost}]: ")?;
            self.writer.flush()?;

            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                writeln!(self.writer, "\nCancelled")?;
                return Ok(PromptOutcome::Cancelled);
            }

            let input = line.trim();
            if input.is_empty() {
                return Ok(PromptOutcome::Accepted(default_cost));
            }
            match input.parse::<Cost>() {
                Ok(cost) => return Ok(PromptOutcome::Accepted(cost)),
                Err(e) => writeln!(self.writer, "Error: {e}")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> CostPrompt for TextPrompt<R, W> {
    fn ask_cost(
        &mut self,
        duration_minutes: i64,
        default_cost: Cost,
    ) -> Result<PromptOutcome, PromptError> {
        self.ask_inner(duration_minutes, default_cost)
            .map_err(|e| PromptError::Unavailable(e.to_string()))
    }
}
