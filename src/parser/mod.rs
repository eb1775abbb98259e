//! Single-pass transcoder from tab-indented markup to roff.
//!
//! There is no document tree: every construct is recognized from the code
//! point stream and written out as soon as it is understood. Sub-parsers live
//! in the child modules and all operate on the one [`Parser`] context.

mod inline;
mod list;
mod literal;
mod table;

use crate::roff::RoffWriter;
use crate::stream::{CharStream, Position};
use crate::{ErrorKind, Result, TabdocError};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

use inline::Format;
use list::ListKind;
use table::TableStyle;

pub(crate) struct Parser<R, W> {
    input: CharStream<R>,
    out: RoffWriter<W>,
    format: Format,
    /// Set when a sub-parser returns after consuming the leading tabs of the
    /// next line, so the block engine must not measure them again.
    indent_measured: bool,
}

impl<R: BufRead, W: Write> Parser<R, W> {
    pub(crate) fn new(input: CharStream<R>, out: RoffWriter<W>) -> Self {
        Self {
            input,
            out,
            format: Format::Plain,
            indent_measured: false,
        }
    }

    pub(crate) fn writer(&mut self) -> &mut RoffWriter<W> {
        &mut self.out
    }

    fn next(&mut self) -> Result<Option<char>> {
        self.input.next_char()
    }

    fn unread(&mut self, ch: char) {
        self.input.unread(ch);
    }

    fn fatal<T>(&self, kind: ErrorKind, message: &str) -> Result<T> {
        Err(self.error_at(self.input.position(), kind, message))
    }

    fn error_at(&self, position: Position, kind: ErrorKind, message: &str) -> TabdocError {
        TabdocError::Parse {
            kind,
            position,
            message: message.to_string(),
        }
    }

    /// Parses the `name(section)` line and emits the title heading.
    pub(crate) fn parse_preamble(&mut self, date: NaiveDate) -> Result<()> {
        let mut name = String::new();
        loop {
            match self.next()? {
                Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' => name.push(ch),
                Some('(') => break,
                Some(_) => {
                    return self.fatal(
                        ErrorKind::Preamble,
                        "Name characters must be A-Z, a-z, 0-9, `-`, or `_`",
                    );
                }
                None => return self.fatal(ErrorKind::Preamble, "Expected preamble"),
            }
        }
        if name.is_empty() {
            return self.fatal(ErrorKind::Preamble, "Expected preamble");
        }
        let section = self.parse_section()?;
        match self.next()? {
            Some('\n') | None => {}
            Some(_) => {
                return self.fatal(ErrorKind::Preamble, "Expected end of line after preamble");
            }
        }
        log::debug!("manual page {name}({section})");
        let section = section.to_string();
        let date = date.format("%Y-%m-%d").to_string();
        self.out
            .write_request("TH", &[name.as_str(), section.as_str(), date.as_str()])?;
        Ok(())
    }

    fn parse_section(&mut self) -> Result<u8> {
        let mut digits = String::new();
        loop {
            match self.next()? {
                Some(ch) if ch.is_ascii_digit() => digits.push(ch),
                Some(')') if digits.is_empty() => break,
                Some(')') => {
                    return match digits.parse::<u8>() {
                        Ok(section @ 1..=9) => Ok(section),
                        _ => self.fatal(ErrorKind::Preamble, "Expected section between 1 and 9"),
                    };
                }
                Some(_) => return self.fatal(ErrorKind::Preamble, "Expected digit or )"),
                None => break,
            }
        }
        self.fatal(ErrorKind::Preamble, "Expected manual section")
    }

    /// Runs the block structure engine until the input is exhausted.
    pub(crate) fn parse_document(&mut self) -> Result<()> {
        let mut indent = 0;
        loop {
            if !std::mem::take(&mut self.indent_measured) {
                self.parse_indent(&mut indent, true)?;
            }
            let Some(ch) = self.next()? else {
                break;
            };
            match ch {
                ';' => self.parse_comment()?,
                '#' if indent == 0 => self.parse_heading()?,
                '#' => {
                    self.unread(ch);
                    self.parse_text()?;
                }
                '-' => self.parse_list(&mut indent, ListKind::Bullet)?,
                '.' => match self.next()? {
                    Some(' ') => {
                        self.unread(' ');
                        self.parse_list(&mut indent, ListKind::Numbered)?;
                    }
                    next => {
                        if let Some(next) = next {
                            self.unread(next);
                        }
                        self.unread('.');
                        self.parse_text()?;
                    }
                },
                '`' => self.parse_literal(indent)?,
                '[' | '|' | ']' => {
                    if indent != 0 {
                        return self.fatal(ErrorKind::Indentation, "Tables cannot be indented");
                    }
                    self.parse_table(TableStyle::from_marker(ch))?;
                }
                ' ' => return self.fatal(ErrorKind::Indentation, "Tabs are required for indentation"),
                '\n' => self.out.write_request("P", &[])?,
                _ => {
                    self.unread(ch);
                    self.parse_text()?;
                }
            }
        }
        if self.format != Format::Plain {
            log::warn!("input ends with {:?} formatting still open", self.format);
        }
        Ok(())
    }

    /// Counts leading tabs and reconciles them against `indent`.
    ///
    /// Blank lines leave the level untouched. With `emit` set, each level of
    /// decrease writes `.RE` and a single level of increase writes `.RS`;
    /// end of input counts as depth 0 so every open level is closed.
    fn parse_indent(&mut self, indent: &mut usize, emit: bool) -> Result<usize> {
        let mut depth = 0;
        let first = loop {
            match self.next()? {
                Some('\t') => depth += 1,
                other => break other,
            }
        };
        match first {
            Some('\n') => {
                self.unread('\n');
                return Ok(*indent);
            }
            Some(ch) => self.unread(ch),
            None if emit => depth = 0,
            None => return Ok(*indent),
        }
        if emit {
            if depth > *indent + 1 {
                return self.fatal(ErrorKind::Indentation, "Indented by an amount greater than 1");
            }
            if depth < *indent {
                log::trace!("dedent {} -> {depth}", *indent);
                for _ in depth..*indent {
                    self.out.write_request("RE", &[])?;
                }
            } else if depth == *indent + 1 {
                log::trace!("indent {} -> {depth}", *indent);
                self.out.write_request("RS", &["4"])?;
            }
        }
        *indent = depth;
        Ok(depth)
    }

    fn parse_comment(&mut self) -> Result<()> {
        match self.next()? {
            Some(' ') => {}
            Some('\n') | None => return Ok(()),
            Some(_) => return self.fatal(ErrorKind::Comment, "Expected space after ; to begin comment"),
        }
        while let Some(ch) = self.next()? {
            if ch == '\n' {
                break;
            }
        }
        Ok(())
    }

    fn parse_heading(&mut self) -> Result<()> {
        let mut level = 1;
        loop {
            match self.next()? {
                Some('#') => level += 1,
                Some(' ') => break,
                _ => {
                    return self.fatal(
                        ErrorKind::Heading,
                        "Invalid start of heading (probably needs a space)",
                    );
                }
            }
        }
        let request = match level {
            1 => ".SH ",
            2 => ".SS ",
            _ => {
                return self.fatal(
                    ErrorKind::Heading,
                    "Only headings up to two levels deep are permitted",
                );
            }
        };
        log::debug!("heading level {level}");
        self.out.write_raw(request)?;
        loop {
            match self.next()? {
                Some('\n') | None => break,
                Some(ch) => self.out.write_char(ch)?,
            }
        }
        self.out.write_raw("\n")?;
        Ok(())
    }
}
