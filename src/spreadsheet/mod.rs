//! # Spreadsheet Grid Module
//!
//! Format-independent grid model shared by the binding pipelines: cell
//! addresses in A1 notation, the closed set of raw cell values a format
//! backend may produce, and the reader/writer traits backends implement.
use thiserror::Error;

pub mod cell;
pub mod reference;
pub mod sheet;

/// Malformed raw rows reported by a backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataShapeError {
    /// Header or first data row without any field
    #[error("Row {row} is empty")]
    EmptyRow { row: usize },
}
