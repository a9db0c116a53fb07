use crate::{CliError, CliResult};

use std::io::{BufRead, Write};

/// Answer required to proceed with a destructive command
pub const CONFIRMATION_WORD: &str = "yes";

/// Interactive gate in front of destructive commands
pub trait Confirmation {
    fn confirm(&mut self, prompt: &str) -> CliResult<bool>;
}

/// Prompts on stderr and reads one line from stdin
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&mut self, prompt: &str) -> CliResult<bool> {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr();
        ask(&mut stdin.lock(), &mut stderr, prompt)
    }
}

/// Only an exact (case-insensitive) `yes` confirms
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> CliResult<bool> {
    write!(output, "{} Type '{}' to continue: ", prompt, CONFIRMATION_WORD)
        .and_then(|_| output.flush())
        .map_err(|e| CliError::io("Failed to write prompt", e))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| CliError::io("Failed to read confirmation", e))?;

    Ok(answer.trim().eq_ignore_ascii_case(CONFIRMATION_WORD))
}
