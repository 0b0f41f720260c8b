//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and one-based column/row coordinates. Column
//! labels use bijective base-26: there is no zero digit, so 26 is "Z" and 27
//! is "AA".
//!
//! # Examples
//!
//! ```
//! use cellgrid_engine::engine::CellRef;
//!
//! let cell = CellRef::parse(" b3 ").unwrap();
//! assert_eq!(cell.col, 2);
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::CellError;

/// A reference to a cell by column and row (both one-based).
///
/// Row 0 and column 0 are the heading row/column; they parse but never
/// resolve to a cell.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a reference such as "A5", " aa10 " or "Zz3".
    ///
    /// Surrounding whitespace is ignored and letters are case-insensitive.
    pub fn parse(text: &str) -> Result<CellRef, CellError> {
        let invalid = || CellError::InvalidAddress(text.trim().to_string());
        let caps = address_re().captures(text).ok_or_else(invalid)?;
        let col = letters_to_col(&caps["letters"]).ok_or_else(invalid)?;
        let row = caps["numbers"].parse::<usize>().map_err(|_| invalid())?;
        Ok(CellRef::new(col, row))
    }
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)\s*$")
            .expect("address regex must compile")
    })
}

/// Convert a one-based column index to its letter label (1 -> A, 26 -> Z, 27 -> AA).
///
/// Index 0 has no label and yields an empty string.
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Convert a letter label back to its one-based column index ("A" -> 1, "AA" -> 27).
///
/// Case-insensitive. Returns `None` for empty input, non-letters, or labels
/// too long to index.
pub fn letters_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col)
}

impl std::str::FromStr for CellRef {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letters_known_labels() {
        assert_eq!(col_to_letters(1), "A");
        assert_eq!(col_to_letters(26), "Z");
        assert_eq!(col_to_letters(27), "AA");
        assert_eq!(col_to_letters(53), "BA");
        assert_eq!(col_to_letters(702), "ZZ");
        assert_eq!(col_to_letters(703), "AAA");
    }

    #[test]
    fn test_letters_round_trip() {
        for n in 1..=20_000 {
            assert_eq!(letters_to_col(&col_to_letters(n)), Some(n), "column {}", n);
        }
    }

    #[test]
    fn test_letters_to_col_rejects_non_letters() {
        assert_eq!(letters_to_col(""), None);
        assert_eq!(letters_to_col("A1"), None);
        assert_eq!(letters_to_col("a"), Some(1));
    }

    #[test]
    fn test_parse_rejects_malformed_addresses() {
        for bad in ["", "123", "ABC", "1A", "A 1", "A1B", "A-1"] {
            assert!(
                matches!(CellRef::parse(bad), Err(CellError::InvalidAddress(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_parse_heading_row_is_syntactically_valid() {
        assert_eq!(CellRef::parse("A0").unwrap(), CellRef::new(1, 0));
    }
}
