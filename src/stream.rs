//! Code point input with bounded pushback.

use crate::{ErrorKind, Result, TabdocError};
use std::collections::VecDeque;
use std::io::{BufRead, ErrorKind as IoErrorKind};

/// Maximum number of code points that may be pushed back at once.
pub(crate) const PUSHBACK_CAPACITY: usize = 32;

/// A 1-based line/column location in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    fn advance(self, ch: char) -> Position {
        if ch == '\n' {
            Position {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ch: char,
    resume: Position,
}

/// Decodes UTF-8 from a byte reader one code point at a time.
///
/// Reading past the end keeps returning `None`. Pushed-back code points are
/// returned in LIFO order before any further bytes are decoded.
#[derive(Debug)]
pub(crate) struct CharStream<R> {
    reader: R,
    pending: Vec<Pending>,
    /// Positions of the most recently consumed code points, oldest first.
    consumed: VecDeque<Position>,
    next: Position,
    last: Position,
    eof: bool,
}

impl<R: BufRead> CharStream<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self::with_origin(reader, Position::START)
    }

    /// Starts position tracking at `origin`, used when re-scanning text that
    /// was captured from the middle of a document.
    pub(crate) fn with_origin(reader: R, origin: Position) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(PUSHBACK_CAPACITY),
            consumed: VecDeque::with_capacity(PUSHBACK_CAPACITY + 1),
            next: origin,
            last: origin,
            eof: false,
        }
    }

    /// Location of the most recently consumed code point.
    pub(crate) fn position(&self) -> Position {
        self.last
    }

    /// Location the next code point will be reported at.
    pub(crate) fn next_position(&self) -> Position {
        self.next
    }

    pub(crate) fn next_char(&mut self) -> Result<Option<char>> {
        if let Some(pending) = self.pending.pop() {
            self.consume_at(pending.resume);
            return Ok(Some(pending.ch));
        }
        let Some(ch) = self.decode()? else {
            return Ok(None);
        };
        self.consume_at(self.next.advance(ch));
        Ok(Some(ch))
    }

    /// Un-reads `ch` so the next call to [`CharStream::next_char`] returns it.
    ///
    /// Both positions step back to where they were before `ch` was read, so
    /// consecutive un-reads report the same locations when re-read.
    pub(crate) fn unread(&mut self, ch: char) {
        assert!(
            self.pending.len() < PUSHBACK_CAPACITY,
            "pushback queue overflow"
        );
        let at = self.consumed.pop_back().unwrap_or(self.next);
        self.pending.push(Pending {
            ch,
            resume: self.next,
        });
        self.next = at;
        self.last = self.consumed.back().copied().unwrap_or(at);
    }

    fn consume_at(&mut self, resume: Position) {
        if self.consumed.len() > PUSHBACK_CAPACITY {
            self.consumed.pop_front();
        }
        self.consumed.push_back(self.next);
        self.last = self.next;
        self.next = resume;
    }

    fn decode(&mut self) -> Result<Option<char>> {
        if self.eof {
            return Ok(None);
        }
        let Some(lead) = self.read_byte()? else {
            self.eof = true;
            return Ok(None);
        };
        let width = match lead {
            0x00..=0x7f => return Ok(Some(char::from(lead))),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Err(self.invalid_utf8()),
        };
        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            match self.read_byte()? {
                Some(byte) => *slot = byte,
                None => return Err(self.invalid_utf8()),
            }
        }
        std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|text| text.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_utf8())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            return Ok(Some(byte));
        }
    }

    fn invalid_utf8(&self) -> TabdocError {
        TabdocError::Parse {
            kind: ErrorKind::Encoding,
            position: self.next,
            message: "Invalid UTF-8 sequence".to_string(),
        }
    }
}
