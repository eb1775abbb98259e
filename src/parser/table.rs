use super::Parser;
use crate::roff::RoffWriter;
use crate::stream::{CharStream, Position};
use crate::{ErrorKind, Result};
use std::io::{BufRead, Write};

/// Border style, selected by the character that opens the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TableStyle {
    AllBox,
    Plain,
    Box,
}

impl TableStyle {
    pub(super) fn from_marker(marker: char) -> Self {
        match marker {
            '[' => TableStyle::AllBox,
            ']' => TableStyle::Box,
            _ => TableStyle::Plain,
        }
    }

    fn options(self) -> &'static str {
        match self {
            TableStyle::AllBox => "allbox  tab(:);",
            TableStyle::Plain => " tab(:);",
            TableStyle::Box => "box  tab(:);",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn format_key(self) -> char {
        match self {
            Align::Left => 'l',
            Align::Center => 'c',
            Align::Right => 'r',
        }
    }
}

#[derive(Debug)]
struct Cell {
    align: Align,
    text: String,
    origin: Position,
}

type Row = Vec<Cell>;

impl<R: BufRead, W: Write> Parser<R, W> {
    /// Parses a table whose style marker has already been consumed, then
    /// writes it out as a tbl block.
    pub(super) fn parse_table(&mut self, style: TableStyle) -> Result<()> {
        let mut rows: Vec<Row> = Vec::new();
        // The style marker doubles as the first row marker.
        self.unread('|');
        loop {
            let Some(ch) = self.next()? else {
                break;
            };
            match ch {
                '\n' => break,
                '|' => rows.push(Row::new()),
                ':' if !rows.is_empty() => {}
                ':' => {
                    return self.fatal(
                        ErrorKind::Table,
                        "Cannot start a column without starting a row first",
                    );
                }
                '\t' => return self.fatal(ErrorKind::Indentation, "Tables cannot be indented"),
                _ => return self.fatal(ErrorKind::Table, "Expected either '|' or ':'"),
            }
            let align = self.parse_cell_align(&rows)?;
            let cell = self.parse_cell_text(align)?;
            if let Some(row) = rows.last_mut() {
                row.push(cell);
            }
        }
        log::debug!("{style:?} table with {} rows", rows.len());
        self.write_table(style, rows)
    }

    fn parse_cell_align(&mut self, rows: &[Row]) -> Result<Align> {
        match self.next()? {
            Some('[') => Ok(Align::Left),
            Some('-') => Ok(Align::Center),
            Some(']') => Ok(Align::Right),
            Some(' ') => {
                let column = rows.last().map_or(0, Vec::len);
                let Some(previous) = rows.len().checked_sub(2).map(|index| &rows[index]) else {
                    return self.fatal(ErrorKind::Table, "No previous row to infer alignment from");
                };
                match previous.get(column) {
                    Some(cell) => Ok(cell.align),
                    None => self.fatal(
                        ErrorKind::Table,
                        "No cell in the previous row to infer alignment from",
                    ),
                }
            }
            None => self.fatal(ErrorKind::Table, "Unexpected EOF in table"),
            Some(_) => self.fatal(ErrorKind::Table, "Expected one of '[', '-', ']', or ' '"),
        }
    }

    fn parse_cell_text(&mut self, align: Align) -> Result<Cell> {
        if self.next()? != Some(' ') {
            return self.fatal(ErrorKind::Table, "Expected ' '");
        }
        let mut text = String::new();
        let origin = self.input.next_position();
        while let Some(ch) = self.next()? {
            if ch == '\n' {
                break;
            }
            text.push(ch);
        }
        if text.contains("T{") || text.contains("T}") {
            return Err(self.error_at(
                origin,
                ErrorKind::Table,
                "Cells cannot contain T{ or T} due to roff limitations",
            ));
        }
        Ok(Cell {
            align,
            text,
            origin,
        })
    }

    fn write_table(&mut self, style: TableStyle, rows: Vec<Row>) -> Result<()> {
        self.out.write_request("RS", &["4"])?;
        self.out.write_request("TS", &[])?;
        self.out.write_raw(style.options())?;
        self.out.write_raw("\n")?;

        let last_row = rows.len().saturating_sub(1);
        for (index, row) in rows.iter().enumerate() {
            let keys: Vec<String> = row
                .iter()
                .map(|cell| cell.align.format_key().to_string())
                .collect();
            self.out.write_raw(&keys.join(" "))?;
            if index == last_row {
                self.out.write_raw(".")?;
            }
            self.out.write_raw("\n")?;
        }

        for row in rows {
            self.out.write_raw("T{\n")?;
            let mut cells = row.into_iter().peekable();
            while let Some(cell) = cells.next() {
                self.write_cell(&cell)?;
                if cells.peek().is_some() {
                    self.out.write_raw("\nT}:T{\n")?;
                } else {
                    self.out.write_raw("\nT}")?;
                }
            }
            self.out.write_raw("\n")?;
        }

        self.out.write_request("TE", &[])?;
        self.out.write_raw(".sp 1\n")?;
        self.out.write_request("RE", &[])?;
        Ok(())
    }

    /// Runs the captured cell text back through the inline scanner.
    fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        let mut scanner = Parser::new(
            CharStream::with_origin(cell.text.as_bytes(), cell.origin),
            RoffWriter::new(self.out.get_mut()),
        );
        scanner.format = self.format;
        scanner.parse_text()?;
        self.format = scanner.format;
        Ok(())
    }
}
