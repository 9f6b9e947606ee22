//! Field value decoding
//!
//! Amounts are parsed as `f32` after dropping grouping commas, keys as decimal
//! `i32`, and government ids are reduced to their digits.

use std::borrow::Cow;
use std::fmt;

use crate::config::Column;
use crate::error::DecodeError;

/// Digits kept from a government id (CNPJ width)
pub const GOVERNMENT_ID_WIDTH: usize = 14;

/// Decode a monetary amount such as `1,234.56`.
///
/// Empty or non-numeric content is an error; `NaN` and infinities are rejected
/// because they would poison the running min/max.
pub fn decode_amount(raw: &[u8], column: Column) -> Result<f32, DecodeError> {
    let invalid = || DecodeError {
        column: column.name(),
        value: String::from_utf8_lossy(raw).into_owned(),
    };

    let trimmed = raw.trim_ascii();
    let cleaned: Cow<'_, [u8]> = if trimmed.contains(&b',') {
        Cow::Owned(trimmed.iter().copied().filter(|&b| b != b',').collect())
    } else {
        Cow::Borrowed(trimmed)
    };

    let text = std::str::from_utf8(&cleaned).map_err(|_| invalid())?;
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}

/// Parse a document number, `None` when the field is not a decimal `i32`
pub fn parse_key(raw: &[u8]) -> Option<i32> {
    std::str::from_utf8(raw.trim_ascii()).ok()?.parse().ok()
}

/// Government id reduced to its digits, e.g. `11.222.333/0001-81` → `11222333000181`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GovernmentId {
    digits: [u8; GOVERNMENT_ID_WIDTH],
    len: u8,
}

impl GovernmentId {
    /// Keep ASCII digits only; anything past the width is dropped
    pub fn normalize(raw: &[u8]) -> Self {
        let mut id = Self::default();
        for &b in raw.iter().filter(|b| b.is_ascii_digit()) {
            if id.len as usize == GOVERNMENT_ID_WIDTH {
                break;
            }
            id.digits[id.len as usize] = b;
            id.len += 1;
        }
        id
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.digits[..self.len as usize]
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for GovernmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GovernmentId({})", self.as_str())
    }
}

impl fmt::Display for GovernmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_amount_plain_and_grouped() {
        assert_eq!(decode_amount(b"100.00", Column::PresentValue), Ok(100.0));
        assert_eq!(decode_amount(b"1,234.50", Column::PresentValue), Ok(1234.5));
        assert_eq!(decode_amount(b" 7 ", Column::PresentValue), Ok(7.0));
        assert_eq!(decode_amount(b"-2.25", Column::PresentValue), Ok(-2.25));
    }

    #[test]
    fn test_decode_amount_rejects_garbage() {
        let err = decode_amount(b"12a.0", Column::NominalValue).unwrap_err();
        assert_eq!(err.column, "nominal_value");
        assert_eq!(err.value, "12a.0");

        assert!(decode_amount(b"", Column::NominalValue).is_err());
        assert!(decode_amount(b",", Column::NominalValue).is_err());
        assert!(decode_amount(b"NaN", Column::NominalValue).is_err());
        assert!(decode_amount(b"inf", Column::NominalValue).is_err());
    }

    #[test]
    fn test_decode_amount_long_grouped_value() {
        let zeros = "0".repeat(80);
        let plain = format!("{}1234567.25", zeros);
        let grouped = format!("{}1,234,567.25", zeros);
        let expected = decode_amount(plain.as_bytes(), Column::NominalValue).unwrap();
        assert_eq!(expected, 1_234_567.25);
        assert_eq!(decode_amount(grouped.as_bytes(), Column::NominalValue), Ok(expected));
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(parse_key(b"123"), Some(123));
        assert_eq!(parse_key(b" 42\r"), Some(42));
        assert_eq!(parse_key(b"12x"), None);
        assert_eq!(parse_key(b"99999999999"), None);
        assert_eq!(parse_key(b""), None);
        assert_eq!(parse_key(b"abc"), None);
    }

    #[test]
    fn test_government_id_normalization() {
        let id = GovernmentId::normalize(b"11.222.333/0001-81");
        assert_eq!(id.as_bytes(), b"11222333000181");
        assert_eq!(id.to_string(), "11222333000181");

        let cpf = GovernmentId::normalize(b"123.456.789-09");
        assert_eq!(cpf.as_str(), "12345678909");
    }

    #[test]
    fn test_government_id_truncates_silently() {
        let id = GovernmentId::normalize(b"1234567890123456789");
        assert_eq!(id.as_str(), "12345678901234");
        assert!(GovernmentId::normalize(b"--").is_empty());
    }
}
