use crate::convert::Culture;
use crate::database::column::ColumnOverride;
use crate::spreadsheet::reference::AddressError;
use crate::spreadsheet::reference::GridAddress;
use thiserror::Error;

/// Invalid table or column configuration, detected before any row is streamed.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("Invalid column pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Sheet index {index} out of range, workbook has {count} sheet(s)")]
    SheetIndexOutOfRange { index: usize, count: usize },

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("{0} must not be the unknown address")]
    UnknownAddress(&'static str),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Data start row {data} must follow header row {header}")]
    DataBeforeHeader { header: usize, data: usize },
}

/// Which sheet of a workbook a table lives on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SheetSelector {
    #[default]
    First,
    /// 0-based sheet position
    Index(usize),
    /// Case-insensitive sheet name
    Name(String),
}

impl SheetSelector {
    /// Picks the sheet position among the names reported by the backend.
    pub fn resolve(&self, names: &[String]) -> Result<usize, ConfigurationError> {
        match self {
            _ if names.is_empty() => Err(ConfigurationError::NoSheets),
            SheetSelector::First => Ok(0),
            SheetSelector::Index(index) if *index < names.len() => Ok(*index),
            SheetSelector::Index(index) => Err(ConfigurationError::SheetIndexOutOfRange {
                index: *index,
                count: names.len(),
            }),
            SheetSelector::Name(name) => names
                .iter()
                .position(|candidate| candidate.to_lowercase() == name.to_lowercase())
                .ok_or_else(|| ConfigurationError::SheetNotFound(name.to_owned())),
        }
    }
}

/// Header text normalization applied before name matching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhitespaceMode {
    #[default]
    Preserve,
    /// Strip leading and trailing whitespace
    Trim,
    /// Drop every whitespace character
    RemoveAll,
}

impl WhitespaceMode {
    pub fn apply<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            WhitespaceMode::Preserve => text.into(),
            WhitespaceMode::Trim => text.trim().into(),
            WhitespaceMode::RemoveAll => text.chars().filter(|ch| !ch.is_whitespace()).collect::<String>().into(),
        }
    }
}

/// Table descriptor shared by the read and write pipelines.
#[derive(Clone, Debug)]
pub struct TableConfig {
    /// First in-scope row carries column names
    pub has_header: bool,
    /// Top-left cell of the header row
    pub header_start: GridAddress,
    /// Top-left cell of the first data row; `None` means the row after the header
    pub data_start: Option<GridAddress>,
    pub sheet: SheetSelector,
    /// Stop after this many data rows
    pub max_rows: Option<usize>,
    pub culture: Culture,
    pub whitespace: WhitespaceMode,
    /// Runtime overrides merged into declared columns by key
    pub columns: Vec<ColumnOverride>,
    /// Omit data rows without any non-blank cell
    pub skip_empty_rows: bool,
    /// End the stream at the first data row without any non-blank cell
    pub end_at_empty_row: bool,
    /// Trim every string result, in addition to per-column trimming
    pub trim_strings: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            header_start: GridAddress::default(),
            data_start: None,
            sheet: SheetSelector::First,
            max_rows: None,
            culture: Culture::invariant(),
            whitespace: WhitespaceMode::Preserve,
            columns: Vec::new(),
            skip_empty_rows: false,
            end_at_empty_row: false,
            trim_strings: false,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn header_start(mut self, address: GridAddress) -> Self {
        self.header_start = address;
        self
    }

    pub fn data_start(mut self, address: GridAddress) -> Self {
        self.data_start = Some(address);
        self
    }

    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn sheet_name(self, name: &str) -> Self {
        self.sheet(SheetSelector::Name(name.to_owned()))
    }

    pub fn sheet_index(self, index: usize) -> Self {
        self.sheet(SheetSelector::Index(index))
    }

    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    pub fn whitespace(mut self, whitespace: WhitespaceMode) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn column(mut self, column: ColumnOverride) -> Self {
        self.columns.push(column);
        self
    }

    pub fn skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }

    pub fn end_at_empty_row(mut self, end: bool) -> Self {
        self.end_at_empty_row = end;
        self
    }

    pub fn trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }

    /// Checks the addresses and returns the effective `(header, data)` starts.
    ///
    /// # Returns
    /// The header start (meaningless without a header) and the data start,
    /// which defaults to the row below the header in header mode and to the
    /// header start itself otherwise.
    pub fn layout(&self) -> Result<(GridAddress, GridAddress), ConfigurationError> {
        if self.header_start.is_unknown() {
            return Err(ConfigurationError::UnknownAddress("Header start"));
        }
        let data_start = match self.data_start {
            Some(address) if address.is_unknown() => return Err(ConfigurationError::UnknownAddress("Data start")),
            Some(address) => address,
            None if self.has_header => self.header_start.offset(1, 0)?,
            None => self.header_start,
        };
        if self.has_header && data_start.row() <= self.header_start.row() {
            return Err(ConfigurationError::DataBeforeHeader {
                header: self.header_start.row() as usize + 1,
                data: data_start.row() as usize + 1,
            });
        }
        Ok((self.header_start, data_start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["Summary".to_owned(), "Staff".to_owned()]
    }

    #[test]
    fn test_sheet_selection() {
        assert_eq!(SheetSelector::First.resolve(&names()), Ok(0));
        assert_eq!(SheetSelector::Index(1).resolve(&names()), Ok(1));
        assert_eq!(SheetSelector::Name("STAFF".to_owned()).resolve(&names()), Ok(1));
        assert_eq!(
            SheetSelector::Index(2).resolve(&names()),
            Err(ConfigurationError::SheetIndexOutOfRange { index: 2, count: 2 })
        );
        assert_eq!(
            SheetSelector::Name("Other".to_owned()).resolve(&names()),
            Err(ConfigurationError::SheetNotFound("Other".to_owned()))
        );
        assert_eq!(SheetSelector::First.resolve(&[]), Err(ConfigurationError::NoSheets));
    }

    #[test]
    fn test_whitespace_modes() {
        assert_eq!(WhitespaceMode::Preserve.apply(" Emp Id "), " Emp Id ");
        assert_eq!(WhitespaceMode::Trim.apply(" Emp Id "), "Emp Id");
        assert_eq!(WhitespaceMode::RemoveAll.apply(" Emp\tId "), "EmpId");
    }

    #[test]
    fn test_default_layout() {
        let (header, data) = TableConfig::default().layout().unwrap();
        assert_eq!(header.to_notation(), "A1");
        assert_eq!(data.to_notation(), "A2");

        let config = TableConfig::new().header(false).header_start(GridAddress::from_notation("C3").unwrap());
        let (_, data) = config.layout().unwrap();
        assert_eq!(data.to_notation(), "C3");
    }

    #[test]
    fn test_invalid_layout() {
        let config = TableConfig::new()
            .header_start(GridAddress::from_notation("A5").unwrap())
            .data_start(GridAddress::from_notation("A5").unwrap());
        assert_eq!(config.layout(), Err(ConfigurationError::DataBeforeHeader { header: 5, data: 5 }));

        let config = TableConfig::new().header_start(GridAddress::UNKNOWN);
        assert_eq!(config.layout(), Err(ConfigurationError::UnknownAddress("Header start")));
    }
}
