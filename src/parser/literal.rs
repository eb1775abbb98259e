use super::Parser;
use crate::{ErrorKind, Result};
use std::io::{BufRead, Write};

const FENCE_LEN: usize = 3;

impl<R: BufRead, W: Write> Parser<R, W> {
    /// Parses a fenced literal block opened at `indent`. The first backtick
    /// of the opening fence has already been consumed.
    pub(super) fn parse_literal(&mut self, indent: usize) -> Result<()> {
        for _ in 1..FENCE_LEN {
            if self.next()? != Some('`') {
                return self.open_fence_error();
            }
        }
        if self.next()? != Some('\n') {
            return self.open_fence_error();
        }
        log::debug!("literal block at depth {indent}");
        self.out.write_request("nf", &[])?;
        self.out.write_request("RS", &["4"])?;

        let mut ticks = 0;
        let mut line_start = true;
        let mut leading = true;
        loop {
            if line_start {
                let mut depth = indent;
                self.parse_indent(&mut depth, false)?;
                if depth < indent {
                    return self.fatal(ErrorKind::Indentation, "Cannot deindent in literal block");
                }
                for _ in indent..depth {
                    self.out.write_raw("\t")?;
                }
                line_start = false;
                leading = true;
            }
            let Some(ch) = self.next()? else {
                return self.fatal(ErrorKind::Literal, "Unterminated literal block");
            };
            if ch == '`' {
                ticks += 1;
                if ticks == FENCE_LEN {
                    if self.next()? != Some('\n') {
                        return self.fatal(
                            ErrorKind::Literal,
                            "Expected literal block to end with newline",
                        );
                    }
                    if !leading {
                        self.out.write_raw("\n")?;
                    }
                    self.out.write_request("fi", &[])?;
                    self.out.write_request("RE", &[])?;
                    return Ok(());
                }
                continue;
            }
            if ticks > 0 {
                for _ in 0..ticks {
                    self.out.write_char('`')?;
                }
                ticks = 0;
                leading = false;
            }
            match ch {
                '\n' => {
                    self.out.write_char(ch)?;
                    line_start = true;
                }
                '.' if leading => self.out.write_raw("\\&.")?,
                '\\' => self.parse_escape()?,
                _ => self.out.write_char(ch)?,
            }
            leading = false;
        }
    }

    fn open_fence_error(&self) -> Result<()> {
        self.fatal(
            ErrorKind::Literal,
            "Expected ``` and a newline to begin literal block",
        )
    }
}
