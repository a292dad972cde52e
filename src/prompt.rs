//! Operator confirmation before any rename runs.
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Yes/no decision injected into the rename workflow.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Accepts `y` or `yes` in any case; everything else, including EOF, declines.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Reads one line of input after printing the question.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{question} [y/yes to confirm]: ").context("write prompt")?;
        self.output.flush().context("flush prompt")?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("read confirmation")?;
        if read == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&line))
    }
}

/// Fixed answer, used for `--yes` and for non-interactive runs.
pub struct Preapproved(pub bool);

impl Confirm for Preapproved {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}
