//! Core processing engine
//!
//! One sequential streaming pass: read a line, strip it, drop it if it is
//! blank, too short, or (with dedupe) already kept, otherwise write it out.
//! Every failure ends up in [`FilterResult::error`] together with whatever
//! counts were accumulated before it happened.

use crate::cli::Args;
use crate::dedup::{create_deduplicator, Deduplicator};
use crate::encoding::{Decoding, LineReader};
use crate::error::{FilterError, FilterErrorKind};
use crate::filter::{strip_line, MinLengthFilter};
use crate::output::{OutputWriter, DEFAULT_BUFFER_SIZE};
use crate::progress::{NoProgress, Progress, ProgressSink, DEFAULT_PROGRESS_INTERVAL};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parameters of a single filter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Minimum stripped length in characters, must be positive
    pub min_length: usize,
    pub dedupe: bool,
}

impl FilterRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        min_length: usize,
        dedupe: bool,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            min_length,
            dedupe,
        }
    }
}

/// Outcome of a filter run
///
/// Counts are always meaningful: on failure they hold what was accumulated
/// before the run stopped.
#[derive(Debug)]
pub struct FilterResult {
    /// Lines read, including blank and short ones
    pub total: u64,
    /// Lines written to the output
    pub kept: u64,
    /// Size of the seen-set; `Some` iff deduplication was requested
    pub unique_count: Option<u64>,
    /// Lines that needed lossy decoding. In detect mode any U+FFFD in the
    /// transcoded line counts, even one present in the source text.
    pub decode_errors: u64,
    pub bytes_written: u64,
    pub elapsed: Duration,
    pub error: Option<FilterError>,
}

impl FilterResult {
    fn new(dedupe: bool) -> Self {
        Self {
            total: 0,
            kept: 0,
            unique_count: dedupe.then_some(0),
            decode_errors: 0,
            bytes_written: 0,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_kind(&self) -> Option<FilterErrorKind> {
        self.error.as_ref().map(FilterError::kind)
    }

    pub fn lines_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.total as f64 / elapsed
        } else {
            0.0
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            lines: self.total,
            kept: self.kept,
        }
    }
}

/// Engine tunables that do not change what a run produces
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub buffer_size: usize,
    pub decoding: Decoding,
    /// Input lines between progress observations
    pub progress_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            decoding: Decoding::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl EngineConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            buffer_size: args.parse_buffer_size()?,
            decoding: args.decoding,
            progress_interval: args.progress_interval,
        })
    }
}

/// The filter engine
pub struct FilterEngine<P: ProgressSink = NoProgress> {
    config: EngineConfig,
    progress: P,
    interrupt: Arc<AtomicBool>,
}

impl FilterEngine<NoProgress> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            progress: NoProgress,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<P: ProgressSink> FilterEngine<P> {
    /// Replace the progress sink
    pub fn with_progress<Q: ProgressSink>(self, progress: Q) -> FilterEngine<Q> {
        FilterEngine {
            config: self.config,
            progress,
            interrupt: self.interrupt,
        }
    }

    /// Flag that stops a running pass once set
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn into_progress(self) -> P {
        self.progress
    }

    /// Run one filter pass
    pub fn run(&mut self, request: &FilterRequest) -> FilterResult {
        let started = Instant::now();
        log::info!(
            "Filtering {:?} -> {:?} (min length {}, dedupe {})",
            request.input,
            request.output,
            request.min_length,
            request.dedupe
        );

        let mut result = FilterResult::new(request.dedupe);
        if let Err(error) = self.execute(request, &mut result) {
            log::error!("{}", error);
            result.error = Some(error);
        }
        result.elapsed = started.elapsed();

        log::info!(
            "Read {} lines, kept {} in {:?}",
            result.total,
            result.kept,
            result.elapsed
        );
        result
    }

    fn execute(
        &mut self,
        request: &FilterRequest,
        result: &mut FilterResult,
    ) -> Result<(), FilterError> {
        let filter = MinLengthFilter::new(request.min_length)?;
        ensure_distinct_paths(&request.input, &request.output)?;

        let input = open_input(&request.input)?;
        let mut writer = OutputWriter::create(&request.output, self.config.buffer_size)
            .map_err(|source| FilterError::OutputWriteError {
                path: request.output.clone(),
                source,
            })?;

        // Both streams are open from here on; they close when dropped on any path
        let mut reader = LineReader::from_file(input, self.config.decoding, self.config.buffer_size)
            .map_err(FilterError::processing)?;
        log::debug!("Decoding input as {} ({:?})", reader.encoding().name(), self.config.decoding);
        let mut dedup = create_deduplicator(request.dedupe);

        let outcome = self.process(&mut reader, &mut writer, filter, dedup.as_mut(), result);

        result.decode_errors = reader.decode_errors();
        result.bytes_written = writer.bytes_written();
        log::debug!("Wrote {} lines to {:?}", writer.lines_written(), writer.path());
        if request.dedupe {
            result.unique_count = Some(dedup.len() as u64);
            log::debug!("Seen-set holds ~{} bytes", dedup.memory_usage());
        }
        self.progress.finish(result.progress());

        outcome
    }

    /// Stream every line of `reader` through the filter into `writer`
    pub(crate) fn process<W: Write>(
        &mut self,
        reader: &mut LineReader,
        writer: &mut OutputWriter<W>,
        filter: MinLengthFilter,
        dedup: &mut dyn Deduplicator,
        result: &mut FilterResult,
    ) -> Result<(), FilterError> {
        let interval = self.config.progress_interval.max(1);
        let mut line = String::new();

        loop {
            if self.interrupt.load(Ordering::Relaxed) {
                return Err(FilterError::Interrupted);
            }
            if !reader.read_line(&mut line).map_err(FilterError::processing)? {
                break;
            }
            result.total += 1;

            let word = strip_line(&line);
            // Record in the seen-set only once the write went through
            if filter.matches(word) && !dedup.contains(word) {
                writer.write_line(word).map_err(FilterError::processing)?;
                dedup.insert(word);
                result.kept += 1;
            }

            if result.total % interval == 0 {
                self.progress.observe(result.progress());
            }
        }

        writer.flush().map_err(FilterError::processing)
    }
}

fn open_input(path: &Path) -> Result<File, FilterError> {
    if !path.is_file() {
        return Err(FilterError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    File::open(path).map_err(|e| {
        log::debug!("Cannot open {:?}: {}", path, e);
        FilterError::InputNotFound {
            path: path.to_path_buf(),
        }
    })
}

/// Refuse to truncate the file we are about to read
fn ensure_distinct_paths(input: &Path, output: &Path) -> Result<(), FilterError> {
    if let (Ok(input), Ok(output)) = (fs::canonicalize(input), fs::canonicalize(output)) {
        if input == output {
            return Err(FilterError::InvalidConfig(format!(
                "output file {:?} is the input file",
                output
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{MemoryDeduplicator, NoOpDeduplicator};
    use std::io::{self, Cursor, Read};
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("input.txt");
        let mut content = lines.join("\n");
        if !lines.is_empty() {
            content.push('\n');
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn output_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn run(request: &FilterRequest) -> FilterResult {
        FilterEngine::new(EngineConfig::default()).run(request)
    }

    /// Fails every write once `budget` bytes went through
    struct FailingWriter {
        budget: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Yields `data`, then an I/O error
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device error")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_scenario_a_keeps_duplicates() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["short", "longenoughpass", "longenoughpass", "abc"]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 8, false));

        assert!(result.is_success());
        assert_eq!(result.total, 4);
        assert_eq!(result.kept, 2);
        assert_eq!(result.unique_count, None);
        assert_eq!(output_lines(&output), vec!["longenoughpass", "longenoughpass"]);
    }

    #[test]
    fn test_scenario_b_dedupe() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["short", "longenoughpass", "longenoughpass", "abc"]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 8, true));

        assert!(result.is_success());
        assert_eq!(result.total, 4);
        assert_eq!(result.kept, 1);
        assert_eq!(result.unique_count, Some(1));
        assert_eq!(output_lines(&output), vec!["longenoughpass"]);
    }

    #[test]
    fn test_scenario_c_missing_input() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(dir.path().join("nope.txt"), &output, 8, false));

        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(FilterErrorKind::InputNotFound));
        assert!(!output.exists());
    }

    #[test]
    fn test_directory_input_is_not_found() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(dir.path(), &output, 8, false));

        assert_eq!(result.error_kind(), Some(FilterErrorKind::InputNotFound));
        assert!(!output.exists());
    }

    #[test]
    fn test_scenario_d_empty_input() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &[]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 8, true));

        assert!(result.is_success());
        assert_eq!(result.total, 0);
        assert_eq!(result.kept, 0);
        assert_eq!(result.unique_count, Some(0));
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_scenario_e_blank_lines_counted() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["a", "", "b "]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 1, false));

        assert_eq!(result.total, 3);
        assert_eq!(result.kept, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_order_and_stripping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "  zebra123\r\nalpha999\n\tmid-entry \npass\r\nlast_line").unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&path, &output, 8, false));

        assert_eq!(result.total, 5);
        assert_eq!(
            output_lines(&output),
            vec!["zebra123", "alpha999", "mid-entry", "last_line"]
        );
        assert_eq!(result.bytes_written, 9 + 9 + 10 + 10);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "longenough1\rshort\rlongenough2\r").unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&path, &output, 8, false));

        assert!(result.is_success());
        assert_eq!(result.total, 3);
        assert_eq!(result.kept, 2);
        assert_eq!(output_lines(&output), vec!["longenough1", "longenough2"]);
    }

    #[test]
    fn test_trailing_separator_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "abcdefg\x1f\nabcdefgh\x1e\n").unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&path, &output, 8, false));

        assert_eq!(result.total, 2);
        assert_eq!(output_lines(&output), vec!["abcdefgh"]);
    }

    #[test]
    fn test_dedupe_is_fixed_point() {
        let dir = TempDir::new().unwrap();
        let input = write_input(
            &dir,
            &["password1", "letmein!!", "password1", "x", " letmein!! ", "qwertyuiop", "password1"],
        );
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");

        let result = run(&FilterRequest::new(&input, &first, 8, true));
        assert_eq!(result.kept, 3);
        assert_eq!(result.unique_count, Some(result.kept));

        let again = run(&FilterRequest::new(&first, &second, 8, true));
        assert_eq!(again.total, 3);
        assert_eq!(again.kept, 3);
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_unicode_length_counts_chars() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["pässwört", "日本語日本語日本", "päss"]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 8, false));

        assert_eq!(result.kept, 2);
        assert_eq!(output_lines(&output), vec!["pässwört", "日本語日本語日本"]);
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, b"pass\xFF\xFEword\nab\xC3\n").unwrap();
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&path, &output, 8, false));

        assert!(result.is_success());
        assert_eq!(result.decode_errors, 2);
        assert_eq!(output_lines(&output), vec!["password"]);
    }

    #[test]
    fn test_zero_min_length_rejected() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["abc"]);
        let output = dir.path().join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 0, false));

        assert_eq!(result.error_kind(), Some(FilterErrorKind::InvalidConfig));
        assert!(!output.exists());
    }

    #[test]
    fn test_same_file_rejected() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["longenoughpass"]);

        let result = run(&FilterRequest::new(&input, &input, 8, false));

        assert_eq!(result.error_kind(), Some(FilterErrorKind::InvalidConfig));
        assert_eq!(fs::read_to_string(&input).unwrap(), "longenoughpass\n");
    }

    #[test]
    fn test_output_write_error() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["longenoughpass"]);
        let output = dir.path().join("missing").join("out.txt");

        let result = run(&FilterRequest::new(&input, &output, 8, false));

        assert_eq!(result.error_kind(), Some(FilterErrorKind::OutputWriteError));
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_progress_every_interval() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["longenough1", "x", "longenough2", "y", "longenough3"]);
        let output = dir.path().join("out.txt");

        let config = EngineConfig {
            progress_interval: 2,
            ..EngineConfig::default()
        };
        let mut engine = FilterEngine::new(config).with_progress(Vec::<Progress>::new());
        let result = engine.run(&FilterRequest::new(&input, &output, 8, false));

        assert!(result.is_success());
        assert_eq!(
            engine.into_progress(),
            vec![Progress { lines: 2, kept: 1 }, Progress { lines: 4, kept: 2 }]
        );
    }

    #[test]
    fn test_interrupt_stops_run() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &["longenoughpass"]);
        let output = dir.path().join("out.txt");

        let mut engine = FilterEngine::new(EngineConfig::default());
        engine.interrupt_handle().store(true, Ordering::Relaxed);
        let result = engine.run(&FilterRequest::new(&input, &output, 8, false));

        assert_eq!(result.error_kind(), Some(FilterErrorKind::Interrupted));
        assert_eq!(result.total, 0);
        assert!(output.exists());
    }

    #[test]
    fn test_write_failure_keeps_partial_counts() {
        let mut engine = FilterEngine::new(EngineConfig::default());
        let mut reader = LineReader::new(
            Cursor::new(b"longenough1\nlongenough2\nlongenough3\n".to_vec()),
            Decoding::Ignore,
            64,
        )
        .unwrap();
        // Buffer of one line, room for exactly one line on the device
        let mut writer =
            OutputWriter::with_writer(FailingWriter { budget: 12 }, PathBuf::from("out.txt"), 12);
        let mut dedup = MemoryDeduplicator::new();
        let mut result = FilterResult::new(true);

        let outcome = engine.process(
            &mut reader,
            &mut writer,
            MinLengthFilter::new(8).unwrap(),
            &mut dedup,
            &mut result,
        );

        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), FilterErrorKind::ProcessingError);
        assert!(result.kept < result.total);
        assert_eq!(dedup.len() as u64, result.kept);
    }

    #[test]
    fn test_read_failure_keeps_partial_counts() {
        let mut engine = FilterEngine::new(EngineConfig::default());
        let source = FailingReader {
            data: Cursor::new(b"longenough1\nlongenough2\n".to_vec()),
        };
        let mut reader = LineReader::new(source, Decoding::Ignore, 64).unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let mut writer = OutputWriter::with_writer(&mut sink, PathBuf::from("out.txt"), 64);
        let mut dedup = NoOpDeduplicator::new();
        let mut result = FilterResult::new(false);

        let outcome = engine.process(
            &mut reader,
            &mut writer,
            MinLengthFilter::new(8).unwrap(),
            &mut dedup,
            &mut result,
        );
        drop(writer);

        assert_eq!(outcome.unwrap_err().kind(), FilterErrorKind::ProcessingError);
        assert_eq!(result.total, 2);
        assert_eq!(result.kept, 2);
        assert_eq!(sink, b"longenough1\nlongenough2\n");
    }
}
