//! Positional line tokenizer
//!
//! Splits a raw line on a single separator byte and records the byte spans of
//! the configured columns only. Scanning stops as soon as the highest required
//! column has been seen, so wide files are never split past what is needed.

use crate::config::{Column, ColumnLayout};

/// Byte range of one field inside a line buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Field spans produced by [`Tokenizer::split`], indexed by logical column.
///
/// Spans are offsets rather than slices so the owning line buffer can still be
/// mutated (the contains filter lowercases its field in place).
#[derive(Debug, Clone, Default)]
pub struct Fields {
    spans: [Option<Span>; Column::COUNT],
    seen: usize,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.spans = [None; Column::COUNT];
        self.seen = 0;
    }

    /// Span of a column, `None` when the line was truncated before it
    pub fn span(&self, column: Column) -> Option<Span> {
        self.spans[column.slot()]
    }

    pub fn get<'a>(&self, line: &'a [u8], column: Column) -> Option<&'a [u8]> {
        self.span(column).map(|span| &line[span.start..span.end])
    }

    /// Number of physical columns scanned on the last split
    pub fn columns_seen(&self) -> usize {
        self.seen
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    separator: u8,
    /// (physical index, logical column), ascending by index
    plan: Vec<(usize, Column)>,
}

impl Tokenizer {
    pub fn new(separator: u8, layout: &ColumnLayout, columns: &[Column]) -> Self {
        let mut plan: Vec<(usize, Column)> = columns
            .iter()
            .map(|&column| (layout.index(column), column))
            .collect();
        plan.sort_unstable();
        plan.dedup();

        Self { separator, plan }
    }

    /// Split `line` into `fields`. Returns `false` when the line ended before
    /// the last required column; columns past that point stay absent.
    pub fn split(&self, line: &[u8], fields: &mut Fields) -> bool {
        fields.clear();
        if self.plan.is_empty() {
            return true;
        }

        let line = trim_line_end(line);
        let mut next = 0;
        let mut start = 0;
        let mut field = 0;

        loop {
            let end = line[start..]
                .iter()
                .position(|&b| b == self.separator)
                .map_or(line.len(), |offset| start + offset);

            while next < self.plan.len() && self.plan[next].0 == field {
                fields.spans[self.plan[next].1.slot()] = Some(Span { start, end });
                next += 1;
            }

            if next == self.plan.len() {
                fields.seen = field + 1;
                return true;
            }
            if end == line.len() {
                fields.seen = field + 1;
                return false;
            }

            start = end + 1;
            field += 1;
        }
    }
}

/// Strip a trailing `\n` or `\r\n`
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
