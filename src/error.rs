//! Error kinds reported by the filter engine
//!
//! The engine never propagates these as `Err`; they are carried inside
//! [`FilterResult`](crate::processor::FilterResult) so the caller can
//! still read the partial counts of a failed run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single filter run
#[derive(Debug, Error)]
pub enum FilterError {
    /// Input path does not resolve to a readable regular file
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Output path could not be created or truncated
    #[error("Cannot open output file {}: {source}", path.display())]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failure after streaming began
    #[error("Exception while processing: {source}")]
    ProcessingError {
        #[source]
        source: io::Error,
    },

    /// Rejected request parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Run stopped by an external interrupt
    #[error("Interrupted by user")]
    Interrupted,
}

/// Payload-free discriminant of [`FilterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    InputNotFound,
    OutputWriteError,
    ProcessingError,
    InvalidConfig,
    Interrupted,
}

impl FilterError {
    pub fn kind(&self) -> FilterErrorKind {
        match self {
            Self::InputNotFound { .. } => FilterErrorKind::InputNotFound,
            Self::OutputWriteError { .. } => FilterErrorKind::OutputWriteError,
            Self::ProcessingError { .. } => FilterErrorKind::ProcessingError,
            Self::InvalidConfig(_) => FilterErrorKind::InvalidConfig,
            Self::Interrupted => FilterErrorKind::Interrupted,
        }
    }

    pub(crate) fn processing(source: io::Error) -> Self {
        Self::ProcessingError { source }
    }
}
