#![forbid(unsafe_code)]
//! Tabdoc converts a terse, tab-indented manual page markup into roff.
//!
//! Input starts with a `name(section)` line, followed by headings (`#`,
//! `##`), paragraphs, `-` and `. ` lists, fenced literal blocks and tables.
//! Nesting is expressed with leading tabs only. Conversion is a single
//! streaming pass: roff is written as soon as each construct is recognized,
//! and the first malformed construct aborts the run.
//!
//! # Example
//!
//! ```
//! let options = tabdoc::ConvertOptions::new()
//!     .with_date(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
//! let roff = tabdoc::convert_str("mytool(1)\n# NAME\n\tmytool - does things\n", &options)?;
//! assert!(roff.contains(".TH \"mytool\" \"1\" \"2024-01-31\"\n.SH NAME\n"));
//! # Ok::<(), tabdoc::TabdocError>(())
//! ```

mod parser;
mod roff;
mod stream;

use chrono::{DateTime, Local, NaiveDate, Utc};
use parser::Parser;
use roff::RoffWriter;
use std::io::{self, BufReader, Read, Write};
use stream::CharStream;

pub use stream::Position;

/// Version stamped into the generated preamble comment.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that pins the title-heading date.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

/// What kind of construct a parse error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Preamble,
    Indentation,
    Escape,
    Formatting,
    Table,
    Literal,
    List,
    Heading,
    Comment,
    Encoding,
}

#[derive(Debug, thiserror::Error)]
pub enum TabdocError {
    #[error("Error at {}:{}: {message}", .position.line, .position.column)]
    Parse {
        kind: ErrorKind,
        position: Position,
        message: String,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl TabdocError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            TabdocError::Parse { kind, .. } => Some(*kind),
            TabdocError::Io(_) => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            TabdocError::Parse { position, .. } => Some(*position),
            TabdocError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TabdocError>;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Date for the title heading; today's local date when unset.
    pub date: Option<NaiveDate>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Reads `SOURCE_DATE_EPOCH` from the environment.
    pub fn from_env() -> Self {
        let date = std::env::var(SOURCE_DATE_EPOCH)
            .ok()
            .and_then(|value| match date_from_epoch(&value) {
                Some(date) => Some(date),
                None => {
                    log::warn!("ignoring invalid {SOURCE_DATE_EPOCH} value {value:?}");
                    None
                }
            });
        Self { date }
    }

    fn resolve_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Converts Unix epoch seconds to a UTC calendar date.
pub fn date_from_epoch(value: &str) -> Option<NaiveDate> {
    let seconds = value.trim().parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|moment| moment.date_naive())
}

/// Streams `input` as roff into `output`.
///
/// Output produced before a parse error is flushed and left in place.
pub fn convert<R: Read, W: Write>(input: R, output: W, options: &ConvertOptions) -> Result<()> {
    let mut parser = Parser::new(
        CharStream::new(BufReader::new(input)),
        RoffWriter::new(output),
    );
    let result = run(&mut parser, options.resolve_date());
    parser.writer().flush()?;
    result
}

fn run<R: io::BufRead, W: Write>(parser: &mut Parser<R, W>, date: NaiveDate) -> Result<()> {
    parser.writer().write_preamble(VERSION)?;
    parser.parse_preamble(date)?;
    parser.parse_document()
}

pub fn convert_str(input: &str, options: &ConvertOptions) -> Result<String> {
    let mut output = Vec::new();
    convert(input.as_bytes(), &mut output, options)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
