use super::Parser;
use crate::{ErrorKind, Result};
use std::io::{BufRead, Write};

/// The active inline font. Bold and underline never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Format {
    #[default]
    Plain,
    Bold,
    Underline,
}

impl Format {
    fn font(self) -> &'static str {
        match self {
            Format::Plain => "\\fR",
            Format::Bold => "\\fB",
            Format::Underline => "\\fI",
        }
    }
}

impl<R: BufRead, W: Write> Parser<R, W> {
    /// Renders inline text up to and including the next newline.
    pub(super) fn parse_text(&mut self) -> Result<()> {
        let mut leading = true;
        while let Some(ch) = self.next()? {
            match ch {
                '\\' => self.parse_escape()?,
                '*' => self.toggle_format(Format::Bold)?,
                '_' => self.toggle_format(Format::Underline)?,
                '\n' => {
                    self.out.write_char(ch)?;
                    return Ok(());
                }
                // A line starting with `.` would be read as a request.
                '.' if leading => self.out.write_raw("\\&.")?,
                _ => self.out.write_char(ch)?,
            }
            leading = false;
        }
        Ok(())
    }

    /// Handles the character after a `\`.
    pub(super) fn parse_escape(&mut self) -> Result<()> {
        match self.next()? {
            None => self.fatal(ErrorKind::Escape, "Unexpected EOF"),
            Some('\\') => Ok(self.out.write_raw("\\\\")?),
            Some(ch) => Ok(self.out.write_char(ch)?),
        }
    }

    fn toggle_format(&mut self, requested: Format) -> Result<()> {
        self.format = match self.format {
            Format::Plain => {
                self.out.write_raw(requested.font())?;
                requested
            }
            active if active == requested => {
                self.out.write_raw(Format::Plain.font())?;
                Format::Plain
            }
            _ => return self.fatal(ErrorKind::Formatting, "Cannot nest inline formatting"),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roff::RoffWriter;
    use crate::stream::CharStream;
    use pretty_assertions::assert_eq;

    fn scan(input: &str) -> (Parser<&[u8], Vec<u8>>, Result<()>) {
        let mut parser = Parser::new(CharStream::new(input.as_bytes()), RoffWriter::new(Vec::new()));
        let result = parser.parse_text();
        (parser, result)
    }

    fn output(parser: &Parser<&[u8], Vec<u8>>) -> String {
        String::from_utf8(parser.out.get_ref().clone()).expect("utf-8 output")
    }

    #[test]
    fn bold_round_trips() {
        let (parser, result) = scan("a *bold* word\n");
        result.expect("scan");
        assert_eq!(output(&parser), "a \\fBbold\\fR word\n");
        assert_eq!(parser.format, Format::Plain);
    }

    #[test]
    fn underline_round_trips() {
        let (parser, result) = scan("_under_\n");
        result.expect("scan");
        assert_eq!(output(&parser), "\\fIunder\\fR\n");
        assert_eq!(parser.format, Format::Plain);
    }

    #[test]
    fn formatting_may_span_lines() {
        let (parser, result) = scan("*open\n");
        result.expect("scan");
        assert_eq!(parser.format, Format::Bold);
    }

    #[test]
    fn nesting_is_fatal() {
        let (parser, result) = scan("*bold _under_*\n");
        let err = result.expect_err("nested");
        assert_eq!(err.kind(), Some(ErrorKind::Formatting));
        assert_eq!(parser.format, Format::Bold);
    }

    #[test]
    fn backslash_escapes() {
        let (parser, result) = scan("a \\\\ b \\* c \\_ d\n");
        result.expect("scan");
        assert_eq!(output(&parser), "a \\\\ b * c _ d\n");
    }

    #[test]
    fn escape_at_end_of_input_is_fatal() {
        let (_, result) = scan("trailing \\");
        assert_eq!(result.expect_err("eof").kind(), Some(ErrorKind::Escape));
    }

    #[test]
    fn only_leading_dot_is_escaped() {
        let (parser, result) = scan(".start. middle.\n");
        result.expect("scan");
        assert_eq!(output(&parser), "\\&.start. middle.\n");
    }

    #[test]
    fn stops_after_newline() {
        let (mut parser, result) = scan("one\ntwo\n");
        result.expect("scan");
        assert_eq!(output(&parser), "one\n");
        assert_eq!(parser.next().expect("next"), Some('t'));
    }
}
