//! A1-style cell addressing shared by the read and write pipelines.

use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum number of rows of the xlsx grid.
pub const MAX_ROWS: i64 = 1_048_576;

/// Maximum number of columns of the xlsx grid (`XFD`).
pub const MAX_COLUMNS: i64 = 16_384;

static NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{1,3})([1-9][0-9]*)$").expect("Hardcode regex pattern"));

/// Errors related to cell address construction and parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddressError {
    #[error("Cell address (row {row}, column {column}) is out of range")]
    RangeError { row: i64, column: i64 },

    #[error("Invalid cell address '{0}'")]
    FormatError(String),

    #[error("Cell address must not be empty")]
    ArgumentError,
}

/// Immutable zero-based (row, column) coordinate.
///
/// `(-1, -1)` is the "unknown" sentinel; every other address has both
/// components non-negative and within the grid limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridAddress {
    row: i64,
    column: i64,
}

impl GridAddress {
    /// Sentinel for an address that was never configured.
    pub const UNKNOWN: Self = Self { row: -1, column: -1 };

    /// Creates an address validated against the default column limit.
    pub fn from_row_col(row: i64, column: i64) -> Result<Self, AddressError> {
        Self::with_limit(row, column, MAX_COLUMNS)
    }

    /// Creates an address validated against a format-specific column limit.
    pub fn with_limit(row: i64, column: i64, max_columns: i64) -> Result<Self, AddressError> {
        if row == -1 && column == -1 {
            return Ok(Self::UNKNOWN);
        }
        if row < 0 || column < 0 || row >= MAX_ROWS || column >= max_columns {
            return Err(AddressError::RangeError { row, column });
        }
        Ok(Self { row, column })
    }

    /// Parses A1 notation such as `B3` or `aa10`.
    pub fn from_notation(text: &str) -> Result<Self, AddressError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AddressError::ArgumentError);
        }
        let captures = NOTATION
            .captures(text)
            .ok_or_else(|| AddressError::FormatError(text.to_owned()))?;
        let column = col_to_index(&captures[1])
            .ok_or_else(|| AddressError::FormatError(text.to_owned()))?;
        let row = row_to_index(&captures[2])
            .ok_or_else(|| AddressError::FormatError(text.to_owned()))?;
        Self::from_row_col(row as i64, column as i64)
    }

    /// Formats the address in A1 notation. The sentinel formats as an empty string.
    pub fn to_notation(&self) -> String {
        match (self.row_index(), self.column_index()) {
            (Some(row), Some(column)) => index_to_reference(row, column),
            _ => String::new(),
        }
    }

    /// Returns a new address shifted by the given deltas.
    pub fn offset(&self, rows: i64, columns: i64) -> Result<Self, AddressError> {
        Self::from_row_col(self.row + rows, self.column + columns)
    }

    pub fn row(&self) -> i64 {
        self.row
    }

    pub fn column(&self) -> i64 {
        self.column
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Zero-based row index, `None` for the sentinel.
    pub fn row_index(&self) -> Option<usize> {
        usize::try_from(self.row).ok()
    }

    /// Zero-based column index, `None` for the sentinel.
    pub fn column_index(&self) -> Option<usize> {
        usize::try_from(self.column).ok()
    }
}

impl Default for GridAddress {
    /// The top-left cell `A1`.
    fn default() -> Self {
        Self { row: 0, column: 0 }
    }
}

impl Display for GridAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

impl FromStr for GridAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_notation(s)
    }
}

/// Converts column letters to a zero-based index: A = 0, Z = 25, AA = 26.
/// Letters are bijective base-26 digits (A = 1 .. Z = 26, no zero digit).
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = (letter.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a zero-based column index to column letters: 0 = A, 25 = Z, 26 = AA.
pub fn index_to_col(index: usize) -> String {
    let mut column = index + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1; // no zero digit
        letters.push((b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters.iter().rev().collect()
}

/// Converts a one-based row number to a zero-based index.
pub fn row_to_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()?.checked_sub(1)
}

/// Returns the A1 reference of a zero-based (row, column) pair.
pub fn index_to_reference(row: usize, column: usize) -> String {
    format!("{}{}", index_to_col(column), row + 1)
}
