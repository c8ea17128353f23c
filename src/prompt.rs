//! Operator prompts
//!
//! `Prompter` reads one line per question from any `BufRead` and writes the
//! question to any `Write`, so the whole interactive flow can be driven from
//! in-memory buffers in tests.
//!
//! # Answer rules
//!
//! - An empty line takes the default, when there is one.
//! - With both an answer set and a default, an answer outside the set is
//!   refused and the question is asked again.
//! - Without a default, the answer is returned as typed, even if it is empty
//!   or outside the answer set.
//! - End of input is never an answer: `ask` fails with
//!   `io::ErrorKind::UnexpectedEof` (see `is_input_closed`).

use std::io::{self, BufRead, Stdout, Write};

use crate::theme::Theme;

const RE_ASK_MESSAGE: &str = "You must select one of the following answers";

/// Line-oriented question/answer channel
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, Stdout> {
    /// Prompter bound to the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a question and return the operator's answer.
    ///
    /// See the module docs for how `answers` and `default` constrain the
    /// result.
    pub fn ask(
        &mut self,
        message: &str,
        answers: Option<&[&str]>,
        default: Option<&str>,
    ) -> io::Result<String> {
        let answers = answers.filter(|set| !set.is_empty());
        let mut retry = false;

        loop {
            if retry {
                write!(self.output, "{}{}", Theme::bullet(), Theme::warning(RE_ASK_MESSAGE))?;
            } else {
                write!(self.output, "{}{}", Theme::bullet(), message)?;
            }
            self.write_choices(answers, default)?;
            write!(self.output, " : ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                tracing::debug!("input closed at {:?}", message);
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
            }

            let response = line.trim_end_matches(['\r', '\n']);
            match (answers, default) {
                (_, Some(default)) if response.is_empty() => return Ok(default.to_string()),
                (Some(set), Some(_)) if !set.contains(&response) => retry = true,
                _ => return Ok(response.to_string()),
            }
        }
    }

    /// Ask a `y`/`n` question; only `"y"` counts as yes
    pub fn ask_bool(&mut self, message: &str, default: Option<&str>) -> io::Result<bool> {
        let answer = self.ask(message, Some(&["y", "n"]), default)?;
        Ok(answer == "y")
    }

    /// Print one informational line
    pub fn say(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Output side, for status lines printed between questions
    pub fn writer(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn write_choices(&mut self, answers: Option<&[&str]>, default: Option<&str>) -> io::Result<()> {
        match (answers, default) {
            (Some(set), Some(default)) => {
                write!(self.output, " [")?;
                for (i, answer) in set.iter().enumerate() {
                    if i > 0 {
                        write!(self.output, "/")?;
                    }
                    if *answer == default {
                        write!(self.output, "{}", Theme::default_answer(answer))?;
                    } else {
                        write!(self.output, "{}", answer)?;
                    }
                }
                write!(self.output, "]")
            }
            (None, Some(default)) => write!(self.output, " [{}]", Theme::default_answer(default)),
            _ => Ok(()),
        }
    }
}

/// True when `err` means the operator's input ended
pub fn is_input_closed(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::UnexpectedEof
}
