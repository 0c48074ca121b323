//! Confirmation gate before the environment is modified

use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Prompt shown before upgrading
pub const PROMPT: &str = "Proceed with upgrade? (y/n): ";

/// Ask once whether to proceed.
///
/// Only `y` (any case, surrounding whitespace ignored) is a yes. Empty
/// input, end of input and every other answer decline.
pub fn confirm<R, W>(input: &mut R, output: &mut W, color: bool) -> io::Result<bool>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    if color {
        write!(output, "\n{}", PROMPT.bold())?;
    } else {
        write!(output, "\n{}", PROMPT)?;
    }
    output.flush()?;

    let mut answer = String::new();
    let read = input.read_line(&mut answer)?;
    if read == 0 {
        // EOF: make sure the next output starts on its own line
        writeln!(output)?;
        return Ok(false);
    }

    Ok(is_affirmative(&answer))
}

/// Returns true for the single accepted affirmative token
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
