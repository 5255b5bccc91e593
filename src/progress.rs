//! Progress reporting and terminal presentation
//!
//! The engine reports progress through a [`ProgressSink`] so callers can log
//! it, draw a spinner, capture it in tests, or drop it entirely.

use crate::processor::{FilterRequest, FilterResult};

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Default number of input lines between progress observations
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Snapshot of a running filter pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Lines read so far
    pub lines: u64,
    /// Lines written so far
    pub kept: u64,
}

/// Receiver of progress observations
///
/// Purely observational: nothing a sink does affects the filter result.
pub trait ProgressSink {
    /// Called every `progress_interval` input lines
    fn observe(&mut self, progress: Progress);

    /// Called once when the pass ends, successfully or not
    fn finish(&mut self, _progress: Progress) {}
}

/// Discards every observation
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn observe(&mut self, _progress: Progress) {}
}

/// Writes observations to the `log` facade at info level
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn observe(&mut self, progress: Progress) {
        log::info!(
            "[...] processed {} lines, kept {}",
            format_number(progress.lines),
            format_number(progress.kept)
        );
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for Box<P> {
    fn observe(&mut self, progress: Progress) {
        (**self).observe(progress);
    }

    fn finish(&mut self, progress: Progress) {
        (**self).finish(progress);
    }
}

/// Collects observations in memory
impl ProgressSink for Vec<Progress> {
    fn observe(&mut self, progress: Progress) {
        self.push(progress);
    }
}

/// Terminal spinner showing running counts
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            bar: create_spinner("Processing..."),
        }
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerProgress {
    fn observe(&mut self, progress: Progress) {
        self.bar.set_message(format!(
            "processed {} lines, kept {}",
            format_number(progress.lines),
            format_number(progress.kept)
        ));
    }

    fn finish(&mut self, progress: Progress) {
        self.bar.finish_with_message(
            format!(
                "Complete: {} lines, kept {}",
                format_number(progress.lines),
                format_number(progress.kept)
            )
            .green()
            .to_string(),
        );
    }
}

/// Print the application banner
pub fn print_banner() {
    println!("{}", "═".repeat(60).green());
    println!("{}", "                      WORDLIST MINLEN".green().bold());
    println!("{}", "       Minimum-length filter with optional deduplication".green());
    println!("{}", "═".repeat(60).green());
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Create a styled spinner for indeterminate progress
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    let template = "{spinner:.green} [{elapsed_precise}] {msg}";
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Print the settings block shown before processing starts
pub fn print_settings(request: &FilterRequest) {
    print_header("Settings");
    print_info(&format!("Input:          {}", request.input.display()));
    print_info(&format!("Output:         {}", request.output.display()));
    print_info(&format!("Minimum length: {}", request.min_length));
    print_info(&format!("Deduplicate:    {}", if request.dedupe { "yes" } else { "no" }));
}

/// Print final statistics
pub fn print_summary(request: &FilterRequest, result: &FilterResult) {
    println!();
    println!("{}", "═".repeat(60).green());
    println!("{}", "                         SUMMARY".green().bold());
    println!("{}", "═".repeat(60).green());
    println!();

    println!("  {} {}", "Input file:      ".green(), request.input.display());
    println!("  {} {}", "Output file:     ".green(), request.output.display());
    println!("  {} {}", "Total lines read:".green(), format_number(result.total));
    println!(
        "  {} {}",
        format!("Kept (len >= {}):", request.min_length).green().bold(),
        format_number(result.kept).green().bold()
    );
    if let Some(unique) = result.unique_count {
        println!("  {} {}", "Unique entries:  ".green(), format_number(unique));
    }
    if result.decode_errors > 0 {
        println!(
            "  {} {}",
            "Decode errors:   ".yellow(),
            format_number(result.decode_errors).yellow()
        );
    }

    println!();
    println!("  {} {}", "Written:         ".green(), ByteSize(result.bytes_written));
    println!("  {} {}", "Duration:        ".green(), format_duration(result.elapsed));
    println!("  {} {:.2} lines/sec", "Throughput:      ".green(), result.lines_per_second());

    if let Some(ref error) = result.error {
        println!("  {} {}", "Status:          ".red(), error.to_string().red());
    } else {
        println!("  {} {}", "Status:          ".green(), "Done.".green().bold());
    }
    println!();
    println!("{}", "═".repeat(60).green());
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}
