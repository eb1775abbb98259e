//! Low-level roff output.

use std::io::{self, Write};

/// Streams roff requests and text to an underlying writer.
#[derive(Debug)]
pub(crate) struct RoffWriter<W> {
    out: W,
}

impl<W: Write> RoffWriter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    pub(crate) fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    #[cfg(test)]
    pub(crate) fn get_ref(&self) -> &W {
        &self.out
    }

    /// Writes the boilerplate that precedes every generated page.
    pub(crate) fn write_preamble(&mut self, version: &str) -> io::Result<()> {
        self.write_raw(&format!(".\\\" Generated by tabdoc {version}\n"))?;
        self.write_raw(".\\\" Fix weird quotation marks:\n")?;
        self.write_raw(".ie \\n(.g .ds Aq \\(aq\n")?;
        self.write_raw(".el       .ds Aq '\n")?;
        self.write_raw(".\\\" Disable hyphenation:\n")?;
        self.write_request("nh", &[])?;
        self.write_raw(".\\\" Disable justification:\n")?;
        self.write_request("ad l", &[])?;
        self.write_raw(".\\\" Generated content:\n")
    }

    /// Writes `.NAME "arg" ...` on a line of its own.
    pub(crate) fn write_request(&mut self, name: &str, args: &[&str]) -> io::Result<()> {
        write!(self.out, ".{name}")?;
        for arg in args {
            self.out.write_all(b" \"")?;
            for ch in arg.chars() {
                if ch == '"' {
                    self.out.write_all(b"\\")?;
                }
                self.write_char(ch)?;
            }
            self.out.write_all(b"\"")?;
        }
        self.out.write_all(b"\n")
    }

    pub(crate) fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub(crate) fn write_char(&mut self, ch: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.out.write_all(ch.encode_utf8(&mut buf).as_bytes())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
