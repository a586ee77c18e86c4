//! # Rusty Sheet Bind
//!
//! Binds loosely typed spreadsheet cells to strongly typed Rust values, and back.
//!
//! ## Features
//!
//! - **Grid addressing**: A1 notation parsing and formatting with validated offsets
//! - **Column resolution**: match declared columns to header text by exact name,
//!   substring, prefix, suffix or regular expression, or bind them to a fixed index
//! - **Total conversion**: booleans, saturating numerics, spreadsheet serial dates,
//!   intervals, enums, UUIDs, URLs, IP addresses and versions; malformed input
//!   degrades to a default instead of failing
//! - **Three output shapes**: typed records, ordered dictionaries and dynamic rows
//! - **Write pipeline**: records or dictionaries back to cells, typed by declaration
//! - **Pluggable backends**: format readers and writers implement [`SheetReader`]
//!   and [`SheetWriter`]; an in-memory workbook is included
//!
//! ## Example
//!
//! ```
//! use rusty_sheet_bind::{CellValue, MemorySheet, MemoryWorkbook, SheetBinder, TableConfig};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Employee {
//!     id: i32,
//!     name: String,
//! }
//!
//! rusty_sheet_bind::record!(Employee {
//!     id: i32 => |c| c.name("EmpId").required(),
//!     name: String => |c| c.name("Name"),
//! });
//!
//! let mut book = MemoryWorkbook::new().with_sheet(MemorySheet::from_grid("Staff", vec![
//!     vec![CellValue::from("EmpId"), CellValue::from("Name")],
//!     vec![CellValue::from("7"), CellValue::from("Ada")],
//! ]));
//! let employees = SheetBinder::new(&mut book, TableConfig::default())
//!     .records::<Employee>()?
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(employees, vec![Employee { id: 7, name: "Ada".to_owned() }]);
//! # Ok::<(), rusty_sheet_bind::BindError>(())
//! ```
pub mod convert;
pub mod database;
pub mod error;
pub mod extension;
pub mod spreadsheet;

pub use crate::convert::Culture;
pub use crate::convert::TargetKind;
pub use crate::convert::TargetType;
pub use crate::convert::Value;
pub use crate::database::column::ColumnOverride;
pub use crate::database::column::ColumnSpec;
pub use crate::database::column::MatchStrategy;
pub use crate::database::table::SheetSelector;
pub use crate::database::table::TableConfig;
pub use crate::database::table::WhitespaceMode;
pub use crate::error::BindError;
pub use crate::extension::reader::DynamicRow;
pub use crate::extension::reader::SheetBinder;
pub use crate::extension::record::Bindable;
pub use crate::extension::record::Record;
pub use crate::extension::session::BindContext;
pub use crate::extension::session::CancellationToken;
pub use crate::extension::writer::SheetExporter;
pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::reference::GridAddress;
pub use crate::spreadsheet::sheet::MemorySheet;
pub use crate::spreadsheet::sheet::MemoryWorkbook;
pub use crate::spreadsheet::sheet::SheetReader;
pub use crate::spreadsheet::sheet::SheetWriter;
