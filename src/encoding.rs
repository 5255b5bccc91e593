//! Encoding detection and tolerant line reading
//!
//! Input lines are always handed to the engine as UTF-8. Bytes that do not
//! decode never abort a run: they are dropped or replaced, depending on
//! [`Decoding`].

use bstr::ByteSlice;
use chardetng::EncodingDetector;
use clap::ValueEnum;
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// How many bytes are sampled for encoding detection
const SNIFF_LEN: usize = 64 * 1024;

/// How undecodable input is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Decoding {
    /// Assume UTF-8, silently drop invalid bytes
    #[default]
    Ignore,
    /// Assume UTF-8, replace invalid sequences with U+FFFD
    Replace,
    /// Detect the encoding (BOM, then heuristics) and transcode to UTF-8
    Detect,
}

/// Result of encoding detection
#[derive(Debug, Clone)]
pub struct EncodingInfo {
    /// Detected encoding name
    pub name: &'static str,
    /// Confidence level (0.0 - 1.0)
    pub confidence: f32,
    /// The encoding_rs Encoding reference
    pub encoding: &'static Encoding,
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self {
            name: "UTF-8",
            confidence: 1.0,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Detect the encoding of a content sample
pub fn detect_encoding(sample: &[u8]) -> EncodingInfo {
    if sample.is_empty() {
        return EncodingInfo::default();
    }

    // Check for BOM first
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return EncodingInfo {
            name: encoding.name(),
            confidence: 1.0,
            encoding,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);

    let encoding = detector.guess(None, true);

    // Rough confidence based on whether the content is valid UTF-8
    let confidence = if encoding == encoding_rs::UTF_8 {
        if std::str::from_utf8(sample).is_ok() {
            1.0
        } else {
            0.5
        }
    } else {
        0.8
    };

    EncodingInfo {
        name: encoding.name(),
        confidence,
        encoding,
    }
}

/// Streaming line reader that decodes every line to UTF-8
pub struct LineReader {
    reader: Box<dyn BufRead>,
    decoding: Decoding,
    encoding: &'static Encoding,
    line_buffer: Vec<u8>,
    at_start: bool,
    after_cr: bool,
    decode_errors: u64,
}

impl LineReader {
    /// Wrap an open input file
    pub fn from_file(file: File, decoding: Decoding, buffer_size: usize) -> io::Result<Self> {
        Self::new(file, decoding, buffer_size)
    }

    /// Wrap any byte source
    pub fn new<R: Read + 'static>(
        inner: R,
        decoding: Decoding,
        buffer_size: usize,
    ) -> io::Result<Self> {
        let (reader, encoding) = match decoding {
            Decoding::Ignore | Decoding::Replace => (
                Box::new(BufReader::with_capacity(buffer_size, inner)) as Box<dyn BufRead>,
                encoding_rs::UTF_8,
            ),
            Decoding::Detect => {
                let mut inner = inner;
                let mut sample = Vec::with_capacity(SNIFF_LEN);
                (&mut inner).take(SNIFF_LEN as u64).read_to_end(&mut sample)?;

                let info = detect_encoding(&sample);
                log::debug!(
                    "Detected input encoding {} (confidence {:.1})",
                    info.name,
                    info.confidence
                );

                let transcoded = DecodeReaderBytesBuilder::new()
                    .encoding(Some(info.encoding))
                    .strip_bom(true)
                    .build(Cursor::new(sample).chain(inner));
                (
                    Box::new(BufReader::with_capacity(buffer_size, transcoded)) as Box<dyn BufRead>,
                    info.encoding,
                )
            }
        };

        Ok(Self {
            reader,
            decoding,
            encoding,
            line_buffer: Vec::with_capacity(4096),
            at_start: true,
            after_cr: false,
            decode_errors: 0,
        })
    }

    /// Read the next line into `line`, without its terminator.
    ///
    /// `\n`, `\r` and `\r\n` all end a line. Returns `Ok(false)` at end of input.
    pub fn read_line(&mut self, line: &mut String) -> io::Result<bool> {
        self.line_buffer.clear();
        line.clear();

        if !self.read_raw_line()? {
            return Ok(false);
        }

        let mut bytes = self.line_buffer.as_slice();
        if self.at_start {
            self.at_start = false;
            if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
                bytes = rest;
            }
        }

        let lossy = match std::str::from_utf8(bytes) {
            // Transcoded output is always valid UTF-8; replacements show up as U+FFFD
            Ok(s) => {
                line.push_str(s);
                self.decoding == Decoding::Detect && s.contains('\u{FFFD}')
            }
            Err(_) => {
                match self.decoding {
                    Decoding::Ignore => {
                        for chunk in bytes.utf8_chunks() {
                            line.push_str(chunk.valid());
                        }
                    }
                    Decoding::Replace | Decoding::Detect => {
                        line.push_str(&bytes.to_str_lossy());
                    }
                }
                true
            }
        };

        if lossy {
            self.decode_errors += 1;
            log::debug!("Decoding errors in line, using lossy conversion");
        }

        Ok(true)
    }

    /// Fill `line_buffer` with the bytes of the next line, terminator excluded
    fn read_raw_line(&mut self) -> io::Result<bool> {
        let mut read_any = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(read_any);
            }

            // The `\n` of a `\r\n` pair may arrive in the next buffer fill
            if self.after_cr {
                self.after_cr = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            read_any = true;
            match available.find_byteset(b"\r\n") {
                Some(end) => {
                    self.line_buffer.extend_from_slice(&available[..end]);
                    self.after_cr = available[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Ok(true);
                }
                None => {
                    let len = available.len();
                    self.line_buffer.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }

    /// Encoding the input is decoded from
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Number of lines that needed lossy decoding so far
    ///
    /// With [`Decoding::Detect`] this counts every line holding U+FFFD after
    /// transcoding, including replacement characters already present in the
    /// source text.
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }
}
