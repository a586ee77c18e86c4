use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDateTime;
use std::fmt::Display;

/// Raw value of a single cell as delivered by a format backend.
///
/// This is a closed set: backends must narrow whatever their file format
/// stores to exactly one of these shapes before handing rows to the binder.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Bool(bool),
    /// All numeric values, including serial dates the backend did not decode
    Number(f64),
    /// Inline or shared string values
    Text(String),
    /// Naive local date/time, no offset
    DateTime(NaiveDateTime),
    /// Time interval
    TimeSpan(Duration),
}

impl CellValue {
    /// Returns true for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<Duration> for CellValue {
    fn from(value: Duration) -> Self {
        CellValue::TimeSpan(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Number(value) => write!(f, "{}", format_number(*value)),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            CellValue::TimeSpan(value) => write!(f, "{}", format_duration(value)),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Formats an interval as `[-][d.]hh:mm:ss[.fffffff]`.
pub(crate) fn format_duration(value: &Duration) -> String {
    let negative = *value < Duration::zero();
    let value = if negative { -*value } else { *value };
    let mut seconds = value.num_seconds();
    let ticks = (value - Duration::seconds(seconds))
        .num_nanoseconds()
        .unwrap_or(0) / 100;
    let days = seconds / 86_400; seconds %= 86_400;
    let hours = seconds / 3_600; seconds %= 3_600;
    let minutes = seconds / 60; seconds %= 60;
    let mut text = String::new();
    if negative {
        text.push('-');
    }
    if days > 0 {
        text.push_str(&format!("{days}."));
    }
    text.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        text.push_str(&format!(".{ticks:07}"));
    }
    text
}

/// A converted value ready to be handed to a format backend writer.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputCell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell value; `CellValue::Empty` is an explicit blank cell
    pub value: CellValue,
    /// Optional number/date format code for the backend
    pub format: Option<String>,
}

impl OutputCell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_values() {
        assert_eq!(CellValue::Number(7.0).to_string(), "7");
        assert_eq!(CellValue::Number(7.25).to_string(), "7.25");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::TimeSpan(Duration::minutes(90)).to_string(), "01:30:00");
        assert_eq!(
            CellValue::TimeSpan(Duration::days(2) + Duration::milliseconds(1500)).to_string(),
            "2.00:00:01.5000000"
        );
        assert_eq!(CellValue::TimeSpan(-Duration::hours(3)).to_string(), "-03:00:00");
    }

    #[test]
    fn blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("  ").is_blank());
        assert!(!CellValue::from("x").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn output_cell_reference() {
        let cell = OutputCell { row: 2, col: 27, value: CellValue::Empty, format: None };
        assert_eq!(cell.reference(), "AB3");
    }
}
