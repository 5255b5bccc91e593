//! Interactive settings prompts
//!
//! Generic over its streams so tests can script the answers.

use crate::cli::Args;
use crate::processor::FilterRequest;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Line-based question/answer session
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a question; an empty answer selects `default` when there is one.
    ///
    /// End of input is treated as the user interrupting.
    pub fn ask(&mut self, prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
        match default {
            Some(default) => write!(self.output, "{} [{}]: ", prompt, default)?,
            None => write!(self.output, "{}: ", prompt)?,
        }
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            anyhow::bail!("Interrupted by user.");
        }

        let answer = answer.trim();
        Ok(match default {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer.to_string(),
        })
    }

    /// Ask until the answer is yes/y or no/n
    pub fn confirm(&mut self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        let default = if default { "yes" } else { "no" };
        loop {
            match self.ask(prompt, Some(default))?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no (y/n).")?,
            }
        }
    }

    /// Ask until the answer is a positive integer
    pub fn ask_min_length(&mut self, default: usize) -> anyhow::Result<usize> {
        let default = default.to_string();
        loop {
            let answer = self.ask("Minimum password length to keep (integer)", Some(&default))?;
            match crate::cli::parse_min_length(&answer) {
                Ok(min_length) => return Ok(min_length),
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }
    }

    /// Collect a full request, with command-line values as defaults
    pub fn request(&mut self, args: &Args) -> anyhow::Result<FilterRequest> {
        let input_default = args.input.as_ref().map(|p| p.display().to_string());
        let input = self.ask("Path to input wordlist", input_default.as_deref())?;
        if input.is_empty() {
            anyhow::bail!("No input path provided.");
        }

        let output_default = args.output.display().to_string();
        let output = self.ask("Output file (where results will be saved)", Some(&output_default))?;

        let min_length = self.ask_min_length(args.min_length)?;
        let dedupe =
            self.confirm("Remove duplicate lines? (may use more memory) (y/n)", args.dedupe)?;

        Ok(FilterRequest::new(
            PathBuf::from(input),
            PathBuf::from(output),
            min_length,
            dedupe,
        ))
    }
}
