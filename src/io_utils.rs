//! I/O utilities for CSV reading, writing, encoding, and delimiter resolution.
//!
//! All file I/O in wwc-report flows through this module. It provides:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding and output transcoding via `encoding_rs`,
//!   defaulting to UTF-8. A byte-order mark is honoured only at the start of
//!   the file.
//! - **Whole-table helpers**: [`read_table`] loads a file into a [`Table`];
//!   [`write_table`] writes an optional header plus rows.
//! - **Quoting**: output uses minimal quoting, so only fields containing the
//!   delimiter, a quote, or a line break are wrapped.

use std::{
    borrow::Cow,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::table::Table;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Line terminator used when writing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    fn terminator(self) -> Terminator {
        match self {
            LineEnding::Crlf => Terminator::CRLF,
            LineEnding::Lf => Terminator::Any(b'\n'),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub line_ending: LineEnding,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            line_ending: LineEnding::default(),
        }
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(
    path: &Path,
    delimiter: u8,
    has_headers: bool,
) -> Result<csv::Reader<BufReader<File>>> {
    let reader =
        BufReader::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?);
    Ok(open_csv_reader(reader, delimiter, has_headers))
}

pub fn open_csv_writer(
    path: &Path,
    options: &WriteOptions,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = Box::new(BufWriter::new(
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
    ));

    let writer: Box<dyn Write> = if options.encoding == UTF_8 {
        base
    } else {
        Box::new(TranscodingWriter::new(base, options.encoding))
    };

    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .flexible(true)
        .terminator(options.line_ending.terminator());
    Ok(builder.from_writer(writer))
}

/// Decodes one field without byte-order-mark sniffing. Only the very start of
/// a file may carry a BOM; see [`reader_headers`].
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| anyhow!("Failed to decode text with encoding {}", encoding.name()))
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Decodes the header row. The first field is the start of the file, so a
/// byte-order mark there is stripped and overrides `encoding`.
pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    let mut fields = headers.iter();
    let mut decoded = Vec::with_capacity(headers.len());
    if let Some(first) = fields.next() {
        let (text, _, had_errors) = encoding.decode(first);
        if had_errors {
            return Err(anyhow!(
                "Failed to decode text with encoding {}",
                encoding.name()
            ));
        }
        decoded.push(text.into_owned());
    }
    for field in fields {
        decoded.push(decode_bytes(field, encoding)?);
    }
    Ok(decoded)
}

/// Reads a whole delimited file. The first record becomes the header; every
/// later record is a data row, kept at whatever width it was written with.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<Table> {
    let mut reader = open_csv_reader_from_path(path, options.delimiter, true)?;
    let headers = reader_headers(&mut reader, options.encoding)
        .with_context(|| format!("Reading header row of {path:?}"))?;
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", idx + 2))?;
        let decoded = decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {} of {path:?}", idx + 2))?;
        rows.push(decoded);
    }
    Ok(Table::new(headers, rows))
}

/// Writes `rows` to `path`, preceded by `headers` when given. Returns the
/// number of data rows written.
pub fn write_table<I, R>(
    path: &Path,
    headers: Option<&[String]>,
    rows: I,
    options: &WriteOptions,
) -> Result<usize>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut writer = open_csv_writer(path, options)?;
    if let Some(headers) = headers {
        writer
            .write_record(headers)
            .with_context(|| format!("Writing header row to {path:?}"))?;
    }
    let mut written = 0usize;
    for row in rows {
        writer
            .write_record(row.as_ref())
            .with_context(|| format!("Writing row {} to {path:?}", written + 2))?;
        written += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output file {path:?}"))?;
    Ok(written)
}

struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    buffer: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buffer: Vec::new(),
        }
    }

    /// Encodes every complete UTF-8 sequence held in the buffer. A trailing
    /// partial sequence stays buffered unless `force` is set.
    fn flush_buffer(&mut self, force: bool) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let valid_up_to = match std::str::from_utf8(&self.buffer) {
            Ok(_) => self.buffer.len(),
            Err(err) => {
                if err.error_len().is_some() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "Invalid UTF-8 sequence in output stream",
                    ));
                }
                if force {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "Incomplete UTF-8 sequence at end of output stream",
                    ));
                }
                err.valid_up_to()
            }
        };
        if valid_up_to == 0 {
            return Ok(());
        }
        let text = std::str::from_utf8(&self.buffer[..valid_up_to])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
            .to_owned();
        self.encode_and_write(&text)?;
        self.buffer.drain(..valid_up_to);
        Ok(())
    }

    fn encode_and_write(&mut self, text: &str) -> io::Result<()> {
        let (encoded, _output_encoding, had_errors) = self.encoding.encode(text);
        if had_errors {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to encode text using {}", self.encoding.name()),
            ));
        }
        self.inner.write_all(encoded.as_ref())
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        self.flush_buffer(false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer(true)?;
        self.inner.flush()
    }
}
