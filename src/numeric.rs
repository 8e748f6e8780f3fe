//! Numeric cell parsing and rendering under the Argentine convention
//! ("." groups thousands, "," marks the decimal fraction).
//!
//! The locale policy lives entirely in this module; detection and extraction
//! never look at separators themselves.

use regex::Regex;

use crate::error::ExtractionResult;
use crate::model::CellValue;

/// Shapes accepted as numeric: optional minus; groups of exactly three
/// digits separated by "." with an optional "," fraction; or a plain digit
/// run with at most one "," or "." separator.
const NUMERIC_SHAPE: &str = r"^-?\d{1,3}(?:\.\d{3})*(?:,\d+)?$|^-?\d+(?:,\d+)?$|^-?\d+(?:\.\d+)?$";

/// Pure thousands grouping: every "."-separated group after the first has
/// exactly three digits ("1.500", "1.000.000")
const GROUPED_SHAPE: &str = r"^-?\d{1,3}(?:\.\d{3})+$";

/// Locale-aware parser for numeric cell text
pub struct NumericParser {
    shape: Regex,
    grouped: Regex,
}

impl NumericParser {
    pub fn new() -> ExtractionResult<Self> {
        Ok(Self {
            shape: Regex::new(NUMERIC_SHAPE)?,
            grouped: Regex::new(GROUPED_SHAPE)?,
        })
    }

    /// Parse one cell text.
    ///
    /// Empty (after trimming) becomes `Null`. Text that is not
    /// numeric-shaped, or that fails final conversion, is returned unchanged
    /// as `Text`. Never fails.
    pub fn parse_cell(&self, raw: &str) -> CellValue {
        let cleaned = raw.trim();
        if cleaned.is_empty() {
            return CellValue::Null;
        }
        if !self.shape.is_match(cleaned) {
            return CellValue::Text(cleaned.to_string());
        }

        let has_dot = cleaned.contains('.');
        let has_comma = cleaned.contains(',');

        let normalized = if has_dot && has_comma {
            // 1.500,00 → 1500.00
            cleaned.replace('.', "").replace(',', ".")
        } else if has_comma {
            // Lone comma: thousands separator iff followed by exactly three
            // digits and nothing else, decimal separator otherwise
            let parts: Vec<&str> = cleaned.split(',').collect();
            let is_thousands = parts.len() == 2
                && parts[1].len() == 3
                && parts[1].bytes().all(|b| b.is_ascii_digit());
            if is_thousands {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        } else if has_dot && self.grouped.is_match(cleaned) {
            // Dot-only in full grouped form is thousands: 1.500 → 1500
            cleaned.replace('.', "")
        } else {
            // Any other lone dot reads as an international decimal point
            cleaned.to_string()
        };

        if normalized.contains('.') {
            normalized
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or_else(|_| CellValue::Text(cleaned.to_string()))
        } else {
            normalized
                .parse::<i64>()
                .map(CellValue::Integer)
                .unwrap_or_else(|_| CellValue::Text(cleaned.to_string()))
        }
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Format an integer with "." thousands grouping: 1234567 → "1.234.567"
pub fn format_thousands(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a fractional value. Whole values render as grouped integers;
/// others keep exactly two decimals with a "," decimal mark:
/// 1234567.89 → "1.234.567,89"
pub fn format_decimal(value: f64) -> String {
    if value == value.trunc() {
        return format_thousands(value as i64);
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{},{frac_part}", group_digits(int_part))
}
