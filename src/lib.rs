//! # Wordlist Minlen
//!
//! Streaming wordlist filter: keeps entries of at least a minimum length and
//! optionally removes duplicates.
//!
//! ## Features
//!
//! - **Length filtering**: Keep stripped entries with at least N characters
//! - **Deduplication**: Keep only the first occurrence of each entry (case-sensitive)
//! - **Streaming**: Constant memory without deduplication, input order preserved
//! - **Tolerant decoding**: Undecodable bytes are dropped, replaced, or transcoded
//! - **Partial results**: A failed run still reports what it counted so far
//!
//! ## Usage
//!
//! ```bash
//! # Keep entries of 8+ characters
//! wordlist-minlen -i wordlist.txt
//!
//! # 10+ characters, deduplicated
//! wordlist-minlen -i wordlist.txt -o long.txt -m 10 --dedupe
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordlist_minlen::processor::{EngineConfig, FilterEngine, FilterRequest};
//!
//! let request = FilterRequest::new("wordlist.txt", "results_of_wordlist.txt", 8, true);
//! let result = FilterEngine::new(EngineConfig::default()).run(&request);
//!
//! if result.is_success() {
//!     println!("kept {} of {} lines", result.kept, result.total);
//! }
//! ```

pub mod cli;
pub mod dedup;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod output;
pub mod processor;
pub mod progress;
pub mod prompt;

pub use cli::Args;
pub use error::{FilterError, FilterErrorKind};
pub use processor::{EngineConfig, FilterEngine, FilterRequest, FilterResult};
