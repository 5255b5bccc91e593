//! Output management module
//!
//! Buffered, truncating writer for the filtered wordlist.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default buffer size for file writing (8MB)
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Output file writer with buffering
pub struct OutputWriter<W: Write = File> {
    writer: BufWriter<W>,
    path: PathBuf,
    lines_written: u64,
    bytes_written: u64,
}

impl OutputWriter<File> {
    /// Create (or truncate) the output file
    pub fn create(path: &Path, buffer_size: usize) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self::with_writer(file, path.to_path_buf(), buffer_size))
    }
}

impl<W: Write> OutputWriter<W> {
    /// Wrap an already opened sink
    pub fn with_writer(inner: W, path: PathBuf, buffer_size: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(buffer_size, inner),
            path,
            lines_written: 0,
            bytes_written: 0,
        }
    }

    /// Write a line followed by a single `\n`
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        self.bytes_written += line.len() as u64 + 1; // +1 for newline
        Ok(())
    }

    /// Flush the buffer to the underlying sink
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get number of lines written
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Get bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: Write> Drop for OutputWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
