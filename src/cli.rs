//! Command-line interface definition for wordlist-minlen
//!
//! Builds the [`FilterRequest`] handed to the engine, either straight from
//! flags or (when no input is given) through interactive prompts.

use crate::encoding::Decoding;
use crate::processor::FilterRequest;

use clap::Parser;
use std::path::PathBuf;

/// Output file used when none is given
pub const DEFAULT_OUTPUT: &str = "results_of_wordlist.txt";

/// Minimum length used when none is given
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Streaming wordlist filter
///
/// Keeps entries at least --min-length characters long, optionally
/// removing duplicates, and writes them to the output file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wordlist-minlen",
    author = "m0h1nd4",
    version,
    about = "Keep wordlist entries above a minimum length, optionally deduplicated",
    long_about = r#"
Reads a wordlist line by line, strips surrounding whitespace, and keeps every
entry that is at least --min-length characters long. With --dedupe only the
first occurrence of each entry is kept (memory grows with the number of
unique entries). Output order follows input order.

Run without --input (or with --interactive) to be prompted for the settings.

EXAMPLES:
    # Keep entries of 8+ characters
    wordlist-minlen -i rockyou.txt

    # 12+ characters, deduplicated, custom output
    wordlist-minlen -i rockyou.txt -o long.txt -m 12 --dedupe

    # Guess the input encoding instead of assuming UTF-8
    wordlist-minlen -i legacy.txt --decoding detect

    # Interactive mode
    wordlist-minlen
"#
)]
pub struct Args {
    /// Input wordlist path
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output file (created or truncated)
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Minimum entry length to keep, in characters
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = DEFAULT_MIN_LENGTH,
        value_parser = parse_min_length
    )]
    pub min_length: usize,

    /// Remove duplicate entries (may use more memory)
    #[arg(short, long, default_value_t = false)]
    pub dedupe: bool,

    /// Prompt for settings, using the flags above as defaults
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    /// How undecodable input bytes are handled
    #[arg(long, value_enum, default_value_t = Decoding::Ignore)]
    pub decoding: Decoding,

    /// Buffer size for file operations (e.g. "512KB", "8MB")
    #[arg(long, value_name = "SIZE", default_value = "8MB")]
    pub buffer_size: String,

    /// Input lines between progress updates
    #[arg(
        long,
        value_name = "LINES",
        default_value_t = 100_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub progress_interval: u64,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl Args {
    /// Whether settings must be collected interactively
    pub fn needs_prompt(&self) -> bool {
        self.interactive || self.input.is_none()
    }

    /// Build the engine request from flags alone
    pub fn to_request(&self) -> anyhow::Result<FilterRequest> {
        let Some(ref input) = self.input else {
            anyhow::bail!("No input path provided.");
        };
        if self.output.as_os_str().is_empty() {
            anyhow::bail!("Output path must not be empty");
        }

        Ok(FilterRequest::new(input, &self.output, self.min_length, self.dedupe))
    }

    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        let size = parse_size(&self.buffer_size)?;
        if size == 0 {
            anyhow::bail!("Buffer size must be greater than zero");
        }
        Ok(size)
    }
}

/// Parse a positive integer minimum length
pub fn parse_min_length(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("Please enter a positive integer.".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Please enter a valid integer (e.g. 8), got '{}'", value)),
    }
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(num) = size_str.strip_suffix("GB") {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("MB") {
        (num, 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("KB") {
        (num, 1024)
    } else if let Some(num) = size_str.strip_suffix('B') {
        (num, 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size too large: '{}'", size_str))
}
