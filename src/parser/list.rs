use super::Parser;
use crate::{ErrorKind, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ListKind {
    Bullet,
    Numbered,
}

/// Produces the marker for each successive entry of one list.
#[derive(Debug)]
struct ListMarker {
    kind: ListKind,
    number: usize,
}

impl ListMarker {
    fn new(kind: ListKind) -> Self {
        Self { kind, number: 1 }
    }

    fn next_label(&mut self) -> (String, usize) {
        match self.kind {
            ListKind::Bullet => ("\\(bu".to_string(), 4),
            ListKind::Numbered => {
                let number = self.number;
                self.number += 1;
                let offset = if number >= 10 { 5 } else { 4 };
                (format!("{number}."), offset)
            }
        }
    }
}

impl<R: BufRead, W: Write> Parser<R, W> {
    /// Parses a list whose first marker has already been consumed.
    pub(super) fn parse_list(&mut self, indent: &mut usize, kind: ListKind) -> Result<()> {
        let base = *indent;
        let mut marker = ListMarker::new(kind);
        self.expect_entry_space()?;
        log::debug!("{kind:?} list at depth {base}");
        self.write_entry_header(&mut marker)?;
        self.parse_text()?;
        loop {
            self.parse_indent(indent, true)?;
            let Some(ch) = self.next()? else {
                break;
            };
            if *indent < base {
                self.unread(ch);
                self.indent_measured = true;
                break;
            }
            match ch {
                ' ' => {
                    if self.next()? != Some(' ') {
                        return self.fatal(
                            ErrorKind::List,
                            "Expected two spaces for list entry continuation",
                        );
                    }
                    self.parse_text()?;
                }
                '-' => {
                    self.expect_entry_space()?;
                    self.start_sibling(&mut marker)?;
                }
                '.' => match self.next()? {
                    Some(' ') => self.start_sibling(&mut marker)?,
                    next => {
                        if let Some(next) = next {
                            self.unread(next);
                        }
                        self.unread('.');
                        self.indent_measured = true;
                        self.out.write_raw("\n")?;
                        break;
                    }
                },
                _ => {
                    self.out.write_raw("\n")?;
                    self.unread(ch);
                    self.indent_measured = true;
                    break;
                }
            }
        }
        self.out.write_request("RE", &[])?;
        Ok(())
    }

    fn expect_entry_space(&mut self) -> Result<()> {
        match self.next()? {
            Some(' ') => Ok(()),
            _ => self.fatal(ErrorKind::List, "Expected space before start of list entry"),
        }
    }

    fn start_sibling(&mut self, marker: &mut ListMarker) -> Result<()> {
        self.out.write_request("RE", &[])?;
        self.write_entry_header(marker)?;
        self.parse_text()
    }

    fn write_entry_header(&mut self, marker: &mut ListMarker) -> Result<()> {
        let (label, offset) = marker.next_label();
        self.out.write_request("RS", &["4"])?;
        self.out.write_raw(".ie n \\{\\\n")?;
        self.out
            .write_raw(&format!("\\h'-0{offset}'{label}\\h'+03'\\c\n"))?;
        self.out.write_raw(".\\}\n")?;
        self.out.write_raw(".el \\{\\\n")?;
        self.out.write_raw(&format!(".IP {label} 4\n"))?;
        self.out.write_raw(".\\}\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_marker_never_changes() {
        let mut marker = ListMarker::new(ListKind::Bullet);
        assert_eq!(marker.next_label(), ("\\(bu".to_string(), 4));
        assert_eq!(marker.next_label(), ("\\(bu".to_string(), 4));
    }

    #[test]
    fn numbered_marker_widens_at_ten() {
        let mut marker = ListMarker::new(ListKind::Numbered);
        let labels: Vec<_> = (0..11).map(|_| marker.next_label()).collect();
        assert_eq!(labels[0], ("1.".to_string(), 4));
        assert_eq!(labels[8], ("9.".to_string(), 4));
        assert_eq!(labels[9], ("10.".to_string(), 5));
        assert_eq!(labels[10], ("11.".to_string(), 5));
    }
}
