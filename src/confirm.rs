//! Deletion confirmation policies
//!
//! The pruner asks a [`ConfirmDeletion`] implementation before every delete.
//! Interactive use goes through [`TerminalPrompt`] (or [`ReaderPrompt`] when
//! stdin is piped); [`FixedDecision`] and [`DecisionList`] answer without
//! asking anyone.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use tracing::warn;

use crate::error::{PruneError, Result};
use crate::record::LogGroupRecord;

pub trait ConfirmDeletion {
    /// Decide whether `record` should be deleted.
    fn confirm(&mut self, record: &LogGroupRecord) -> Result<bool>;
}

/// Interpret an answer to the delete prompt.
///
/// `Some(true)` for y/yes, `Some(false)` for n/no/empty (case-insensitive),
/// `None` for anything else.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "" => Some(false),
        _ => None,
    }
}

fn prompt_text(record: &LogGroupRecord) -> String {
    format!("Delete log group {}? (y/N)", record.name())
}

#[allow(clippy::ptr_arg)]
fn validate_answer(input: &String) -> std::result::Result<(), String> {
    match parse_answer(input) {
        Some(_) => Ok(()),
        None => Err("Please answer y(es) or n(o)".to_string()),
    }
}

/// Interactive terminal prompt. Invalid answers are rejected and asked again.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl ConfirmDeletion for TerminalPrompt {
    fn confirm(&mut self, record: &LogGroupRecord) -> Result<bool> {
        let answer: String = Input::new()
            .with_prompt(prompt_text(record))
            .allow_empty(true)
            .validate_with(validate_answer)
            .interact_text()
            .map_err(|e| PruneError::prompt(record.name(), e.to_string()))?;

        Ok(parse_answer(&answer).unwrap_or(false))
    }
}

/// Line-oriented prompt over arbitrary reader/writer, for piped input.
///
/// End of input counts as "no".
pub struct ReaderPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn ask(&mut self, record: &LogGroupRecord) -> io::Result<bool> {
        let mut line = String::new();
        loop {
            write!(self.writer, "{} ", prompt_text(record))?;
            self.writer.flush()?;

            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                writeln!(self.writer)?;
                warn!(log_group = record.name(), "Input closed, treating as 'no'");
                return Ok(false);
            }

            match parse_answer(&line) {
                Some(decision) => return Ok(decision),
                None => writeln!(self.writer, "Please answer y(es) or n(o).")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ConfirmDeletion for ReaderPrompt<R, W> {
    fn confirm(&mut self, record: &LogGroupRecord) -> Result<bool> {
        self.ask(record)
            .map_err(|e| PruneError::prompt(record.name(), e.to_string()))
    }
}

/// Gives the same answer for every log group (`--yes`).
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub bool);

impl ConfirmDeletion for FixedDecision {
    fn confirm(&mut self, _record: &LogGroupRecord) -> Result<bool> {
        Ok(self.0)
    }
}

/// Pre-supplied decisions, consumed in order. Answers "no" once exhausted.
#[derive(Debug, Clone, Default)]
pub struct DecisionList {
    decisions: VecDeque<bool>,
}

impl DecisionList {
    pub fn new(decisions: impl IntoIterator<Item = bool>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl ConfirmDeletion for DecisionList {
    fn confirm(&mut self, _record: &LogGroupRecord) -> Result<bool> {
        Ok(self.decisions.pop_front().unwrap_or(false))
    }
}

/// Prompt on the console: a terminal prompt if stdin is a TTY, otherwise
/// line-by-line over stdin with prompts on stderr.
pub fn console() -> Box<dyn ConfirmDeletion> {
    if io::stdin().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        Box::new(ReaderPrompt::new(io::stdin().lock(), io::stderr()))
    }
}
