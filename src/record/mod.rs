//! Line parsing for receivable stock files
//!
//! # Module Structure
//!
//! - `tokenizer`: positional field splitting
//! - `decode`: amount, key and government id decoding
//!
//! [`LineParser`] chains tokenizer, decoder and filter for one line.

pub mod decode;
pub mod tokenizer;

pub use decode::{decode_amount, parse_key, GovernmentId, GOVERNMENT_ID_WIDTH};
pub use tokenizer::{trim_line_end, Fields, Span, Tokenizer};

use crate::config::{Column, InputConfig, RunConfig, ValueProfile, MAX_VALUE_COLUMNS};
use crate::error::DecodeError;
use crate::filter::Filter;

/// One decoded line: its key and the profile's numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub key: i32,
    values: [f32; MAX_VALUE_COLUMNS],
    len: usize,
}

impl Record {
    /// Build a record; values past [`MAX_VALUE_COLUMNS`] are ignored
    pub fn new(key: i32, values: &[f32]) -> Self {
        let len = values.len().min(MAX_VALUE_COLUMNS);
        let mut stored = [0.0; MAX_VALUE_COLUMNS];
        stored[..len].copy_from_slice(&values[..len]);
        Self {
            key,
            values: stored,
            len,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values[..self.len]
    }
}

/// Decoded key plus whether it had to fall back to `0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub record: Record,
    pub key_defaulted: bool,
}

#[derive(Debug, Clone)]
pub struct RecordDecoder {
    values: &'static [Column],
}

impl RecordDecoder {
    pub fn new(profile: ValueProfile) -> Self {
        Self {
            values: profile.columns(),
        }
    }

    /// Columns the decoder reads
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        std::iter::once(Column::DocumentNumber).chain(self.values.iter().copied())
    }

    /// Absent fields (truncated line) decode to `0`; present but invalid
    /// amounts are errors.
    pub fn decode(&self, line: &[u8], fields: &Fields) -> Result<Decoded, DecodeError> {
        let (key, key_defaulted) = match fields
            .get(line, Column::DocumentNumber)
            .and_then(parse_key)
        {
            Some(key) => (key, false),
            None => (0, true),
        };

        let mut values = [0.0f32; MAX_VALUE_COLUMNS];
        for (slot, &column) in values.iter_mut().zip(self.values) {
            if let Some(raw) = fields.get(line, column) {
                *slot = decode_amount(raw, column)?;
            }
        }

        Ok(Decoded {
            record: Record::new(key, &values[..self.values.len()]),
            key_defaulted,
        })
    }
}

/// Outcome of parsing one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedLine {
    pub record: Record,
    /// The active filter accepted the record
    pub accepted: bool,
    /// Every required column was present
    pub complete: bool,
    pub key_defaulted: bool,
}

/// Tokenizer → decoder → filter for a single line
#[derive(Debug, Clone)]
pub struct LineParser {
    tokenizer: Tokenizer,
    decoder: RecordDecoder,
    filter: Filter,
}

impl LineParser {
    pub fn new(input: &InputConfig, filter: Filter) -> Self {
        let decoder = RecordDecoder::new(input.values);
        let mut columns: Vec<Column> = decoder.columns().collect();
        columns.extend(filter.column());

        Self {
            tokenizer: Tokenizer::new(input.separator, &input.layout, &columns),
            decoder,
            filter,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(&config.input, config.processing.filter.clone())
    }

    /// Parse one line. The line buffer may be modified by the filter.
    pub fn parse(&self, line: &mut [u8], fields: &mut Fields) -> Result<ParsedLine, DecodeError> {
        let complete = self.tokenizer.split(line, fields);
        let decoded = self.decoder.decode(line, fields)?;
        let accepted = self.filter.evaluate(line, fields);

        Ok(ParsedLine {
            record: decoded.record,
            accepted,
            complete,
            key_defaulted: decoded.key_defaulted,
        })
    }
}
