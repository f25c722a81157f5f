//! Operator confirmation before any push happens.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use std::io::BufRead;

/// The only answer that lets a rollout proceed
pub const CONFIRMATION_TOKEN: &str = "ok";

/// Prompt shown before reading the operator's answer
pub const CONFIRMATION_PROMPT: &str = "Press 'ok' to continue with Deployment:";

/// Operator decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The operator typed the confirmation token
    Proceed,
    /// Anything else, including end of input
    Aborted,
}

impl Confirmation {
    /// Whether the rollout may proceed
    pub fn is_proceed(self) -> bool {
        self == Confirmation::Proceed
    }
}

/// Read one line and compare it to the confirmation token.
///
/// Only the line terminator (`\n` or `\r\n`) is removed before the
/// comparison, so `"OK"` or `"ok "` abort.
pub fn read_confirmation<R: BufRead>(input: &mut R) -> std::io::Result<Confirmation> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.strip_suffix('\n').unwrap_or(&line);
    let answer = answer.strip_suffix('\r').unwrap_or(answer);

    if answer == CONFIRMATION_TOKEN {
        Ok(Confirmation::Proceed)
    } else {
        Ok(Confirmation::Aborted)
    }
}

/// Asks the operator to confirm the displayed timetable
#[derive(Debug)]
pub struct ConfirmationGate<R> {
    input: R,
}

impl<R: BufRead> ConfirmationGate<R> {
    /// Gate reading answers from `input`
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Show the prompt and block until one line is read
    pub fn confirm(&mut self, config: &RuntimeConfig) -> Result<Confirmation> {
        config.prompt(CONFIRMATION_PROMPT);
        let confirmation = read_confirmation(&mut self.input)?;
        log::debug!("operator confirmation: {:?}", confirmation);
        Ok(confirmation)
    }
}
