//! Read pipeline: raw rows in, typed records, dictionaries or dynamic rows out.
use crate::convert::convert;
use crate::convert::ConvertContext;
use crate::convert::Value;
use crate::database::column::merge_columns;
use crate::database::column::ColumnSpec;
use crate::database::resolver::ColumnResolver;
use crate::database::table::TableConfig;
use crate::error::BindError;
use crate::error::ResultMessage;
use crate::extension::record::Bindable;
use crate::extension::record::Record;
use crate::extension::session::BindContext;
use crate::extension::session::CancellationToken;
use crate::extension::session::ProgressFn;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::index_to_col;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::GridAddress;
use crate::spreadsheet::sheet::RawRow;
use crate::spreadsheet::sheet::RowIter;
use crate::spreadsheet::sheet::SheetReader;
use crate::spreadsheet::DataShapeError;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

/// Lifecycle of one table session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No row consumed yet
    Unresolved,
    /// Column binding frozen, no data row produced yet
    Resolved,
    Streaming,
    /// Exhausted, cut off, cancelled or failed
    Done,
}

/// Entry point of a read session over one sheet of a backend.
pub struct SheetBinder<'a, B: SheetReader + ?Sized> {
    backend: &'a mut B,
    config: TableConfig,
    context: Arc<BindContext>,
    cancel: CancellationToken,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, B: SheetReader + ?Sized> SheetBinder<'a, B> {
    pub fn new(backend: &'a mut B, config: TableConfig) -> Self {
        Self {
            backend,
            config,
            context: BindContext::shared(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Uses caches shared with other sessions.
    pub fn context(mut self, context: Arc<BindContext>) -> Self {
        self.context = context;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Called with the running row count after every produced row.
    pub fn progress(mut self, progress: impl FnMut(usize) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Binds rows to records of type `T`.
    ///
    /// The header is read and resolved before this returns, so mapping errors
    /// surface here and not while iterating.
    pub fn records<T: Record>(self) -> Result<Records<'a, T>, BindError> {
        let declared = self.context.records.columns::<T>().to_vec();
        let columns = merge_columns(declared, &self.config.columns, false);
        Ok(Records {
            stream: self.open(Some(columns))?,
            marker: PhantomData,
        })
    }

    /// Binds rows to ordered maps with one entry per header cell.
    pub fn dictionaries(self) -> Result<Dictionaries<'a>, BindError> {
        Ok(Dictionaries { stream: self.open(None)? })
    }

    /// Binds rows to ordered maps keyed by the given columns.
    pub fn dictionaries_of(self, columns: Vec<ColumnSpec>) -> Result<Dictionaries<'a>, BindError> {
        let columns = merge_columns(columns, &self.config.columns, true);
        Ok(Dictionaries { stream: self.open(Some(columns))? })
    }

    /// Binds rows to dynamic rows with one entry per header cell.
    pub fn dynamic(self) -> Result<DynamicRows<'a>, BindError> {
        Ok(DynamicRows { inner: self.dictionaries()? })
    }

    pub fn dynamic_of(self, columns: Vec<ColumnSpec>) -> Result<DynamicRows<'a>, BindError> {
        Ok(DynamicRows { inner: self.dictionaries_of(columns)? })
    }

    fn open(self, columns: Option<Vec<ColumnSpec>>) -> Result<RowStream<'a>, BindError> {
        let (header_start, data_start) = self.config.layout()?;
        let resolver = columns
            .map(|columns| ColumnResolver::new(columns, self.config.whitespace))
            .transpose()?;

        let backend = self.backend;
        let names = backend
            .sheet_names()
            .map_err(BindError::from)
            .with_prefix("List sheets failed")?;
        let position = self.config.sheet.resolve(&names)?;
        let sheet = names[position].to_owned();
        let rows = backend
            .read_rows(position)
            .map_err(BindError::from)
            .with_prefix(&format!("Read sheet '{}' failed", sheet))?;

        let mut stream = RowStream {
            rows,
            sheet,
            state: SessionState::Unresolved,
            config: self.config,
            header_start,
            data_start,
            resolver,
            plan: Vec::new(),
            pending: None,
            last_row: None,
            produced: 0,
            context: self.context,
            cancel: self.cancel,
            progress: self.progress,
        };
        stream.resolve()?;
        Ok(stream)
    }
}

/// Forward-only row source shared by the three output shapes.
struct RowStream<'a> {
    rows: RowIter<'a>,
    sheet: String,
    state: SessionState,
    config: TableConfig,
    header_start: GridAddress,
    data_start: GridAddress,
    /// `None` derives one column per header cell
    resolver: Option<ColumnResolver>,
    /// Bound `(physical index, column)` pairs in declaration order
    plan: Vec<(usize, ColumnSpec)>,
    /// First data row, consumed while resolving a headerless table
    pending: Option<RawRow>,
    last_row: Option<usize>,
    produced: usize,
    context: Arc<BindContext>,
    cancel: CancellationToken,
    progress: Option<ProgressFn<'a>>,
}

impl RowStream<'_> {
    fn resolve(&mut self) -> Result<(), BindError> {
        if self.state != SessionState::Unresolved {
            return Ok(());
        }
        let result = self.try_resolve();
        if result.is_err() {
            self.state = SessionState::Done;
        }
        result
    }

    fn try_resolve(&mut self) -> Result<(), BindError> {
        let Some(headers) = self.read_headers()? else {
            self.state = SessionState::Done;
            return Ok(());
        };
        let resolver = match self.resolver.take() {
            Some(resolver) => resolver,
            None => ColumnResolver::new(self.header_columns(&headers), self.config.whitespace)?,
        };
        let binding = resolver.resolve(&headers)?;
        self.plan = binding
            .in_declared_order()
            .into_iter()
            .map(|(index, column)| (index, column.to_owned()))
            .collect();
        self.state = SessionState::Resolved;
        Ok(())
    }

    /// Reads the header texts, or the column letters of the first data row
    /// when the table has no header.
    ///
    /// # Returns
    /// `None` for a headerless table without any data row.
    fn read_headers(&mut self) -> Result<Option<BTreeMap<usize, String>>, BindError> {
        let has_header = self.config.has_header;
        let start = if has_header { self.header_start } else { self.data_start };
        let (target, first_col) = (start.row_index().unwrap_or(0), start.column_index().unwrap_or(0));
        loop {
            let row = match self.rows.next() {
                None if has_header => return Err(DataShapeError::EmptyRow { row: target + 1 }.into()),
                None => return Ok(None),
                Some(row) => row.map_err(|e| self.backend_error(e))?,
            };
            if row.index < target {
                continue;
            }
            if has_header && row.index > target {
                return Err(DataShapeError::EmptyRow { row: target + 1 }.into());
            }
            let mut cells = row.cells.range(first_col..).filter(|(_, value)| !value.is_blank()).peekable();
            if cells.peek().is_none() {
                return Err(DataShapeError::EmptyRow { row: row.index + 1 }.into());
            }
            if has_header {
                return Ok(Some(cells.map(|(index, value)| (*index, value.to_string())).collect()));
            }
            let last = cells.last().map(|(index, _)| *index).unwrap_or(first_col);
            let letters = (first_col..=last).map(|index| (index, index_to_col(index))).collect();
            self.pending = Some(row);
            return Ok(Some(letters));
        }
    }

    /// One index-bound column per header cell, keyed by header text.
    fn header_columns(&self, headers: &BTreeMap<usize, String>) -> Vec<ColumnSpec> {
        let (Some(first), Some(last)) = (headers.keys().next(), headers.keys().next_back()) else {
            return Vec::new();
        };
        let texts: Vec<(usize, String)> = (*first..=*last)
            .map(|index| {
                let text = headers
                    .get(&index)
                    .map(|text| self.config.whitespace.apply(text).into_owned())
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| index_to_col(index));
                (index, text)
            })
            .collect();
        // Generated keys must not collide with real header text.
        let mut used: HashSet<String> = texts.iter().map(|(_, text)| text.to_owned()).collect();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let columns = texts
            .iter()
            .map(|(index, text)| {
                let count = seen.entry(text.as_str()).or_insert(0);
                *count += 1;
                if *count == 1 {
                    return ColumnSpec::new(text).at(*index);
                }
                let mut suffix = *count;
                let mut key = format!("{}_{}", text, suffix);
                while used.contains(&key) {
                    suffix += 1;
                    key = format!("{}_{}", text, suffix);
                }
                used.insert(key.to_owned());
                ColumnSpec::new(&key).at(*index)
            })
            .collect();
        merge_columns(columns, &self.config.columns, true)
    }

    fn backend_error(&self, error: anyhow::Error) -> BindError {
        BindError::BackendError(error.context(format!("Read sheet '{}' failed", self.sheet)))
    }

    fn finish(&mut self) -> Option<Result<Vec<(usize, Value)>, BindError>> {
        self.state = SessionState::Done;
        None
    }

    /// Produces the converted values of the next data row as `(plan position, value)` pairs.
    fn next_row(&mut self) -> Option<Result<Vec<(usize, Value)>, BindError>> {
        if let Err(e) = self.resolve() {
            return Some(Err(e));
        }
        let (data_row, first_col) = (self.data_start.row_index().unwrap_or(0), self.data_start.column_index().unwrap_or(0));
        loop {
            if self.state == SessionState::Done {
                return None;
            }
            self.state = SessionState::Streaming;
            if self.config.max_rows.is_some_and(|max| self.produced >= max) {
                return self.finish();
            }
            if self.cancel.is_cancelled() {
                self.state = SessionState::Done;
                return Some(Err(BindError::Cancelled));
            }
            let row = match self.pending.take().map(Ok).or_else(|| self.rows.next()) {
                None => return self.finish(),
                Some(Err(e)) => {
                    self.state = SessionState::Done;
                    return Some(Err(self.backend_error(e)));
                }
                Some(Ok(row)) => row,
            };
            if row.index < data_row {
                continue;
            }
            let gap = self.last_row.is_some_and(|last| row.index > last + 1);
            self.last_row = Some(row.index);
            let blank = row.cells.range(first_col..).all(|(_, value)| value.is_blank());
            if self.config.end_at_empty_row && (blank || gap) {
                return self.finish();
            }
            if blank && self.config.skip_empty_rows {
                continue;
            }

            let values = self.bind_row(&row);
            self.produced += 1;
            if let Some(progress) = self.progress.as_mut() {
                progress(self.produced);
            }
            return Some(Ok(values));
        }
    }

    fn bind_row(&self, row: &RawRow) -> Vec<(usize, Value)> {
        let mut values = Vec::with_capacity(self.plan.len());
        for (position, (index, column)) in self.plan.iter().enumerate() {
            let raw = row.get(*index).unwrap_or(&CellValue::Empty);
            let context = ConvertContext {
                format: column.format.as_deref(),
                culture: &self.config.culture,
                trim: column.trim || self.config.trim_strings,
                enums: &self.context.enums,
            };
            match bind_cell(column, raw, &context) {
                Some(value) => values.push((position, value)),
                None => log::trace!(
                    "Left '{}' unset, cell {} holds '{}'",
                    column.key,
                    index_to_reference(row.index, *index),
                    raw
                ),
            }
        }
        values
    }
}

/// Converts one cell for a column, applying default and nullability rules.
///
/// Blank cells and failed conversions take the column default when it fits
/// the target type. A failed conversion without default binds null for
/// nullable targets; `None` leaves the destination untouched.
pub(crate) fn bind_cell(column: &ColumnSpec, raw: &CellValue, context: &ConvertContext) -> Option<Value> {
    if raw.is_blank() {
        if let Some(default) = column.compatible_default() {
            return Some(default.to_owned());
        }
    }
    convert(raw, &column.target, context).or_else(|| {
        column
            .compatible_default()
            .cloned()
            .or_else(|| column.target.nullable.then_some(Value::Null))
    })
}

/// Typed record stream.
pub struct Records<'a, T> {
    stream: RowStream<'a>,
    marker: PhantomData<T>,
}

impl<T> Records<'_, T> {
    pub fn state(&self) -> SessionState {
        self.stream.state
    }

    /// Bound `(physical index, column)` pairs in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &ColumnSpec)> {
        self.stream.plan.iter().map(|(index, column)| (*index, column))
    }
}

impl<T: Record> Iterator for Records<'_, T> {
    type Item = Result<T, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.stream.next_row()?;
        Some(values.map(|values| {
            let mut record = T::default();
            for (position, value) in values {
                let column = &self.stream.plan[position].1;
                let field = column.accessor.as_deref().unwrap_or(column.key.as_str());
                if !record.set_field(field, value) {
                    log::trace!("Field '{}' rejected the converted value", field);
                }
            }
            record
        }))
    }
}

/// Ordered dictionary stream keyed by column key.
pub struct Dictionaries<'a> {
    stream: RowStream<'a>,
}

impl Dictionaries<'_> {
    pub fn state(&self) -> SessionState {
        self.stream.state
    }

    /// Keys in output order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stream.plan.iter().map(|(_, column)| column.key.as_str())
    }
}

impl Iterator for Dictionaries<'_> {
    type Item = Result<IndexMap<String, Value>, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.stream.next_row()?;
        Some(values.map(|values| {
            values
                .into_iter()
                .map(|(position, value)| (self.stream.plan[position].1.key.to_owned(), value))
                .collect()
        }))
    }
}

/// Untyped row with the same content as a dictionary row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DynamicRow {
    values: IndexMap<String, Value>,
}

impl DynamicRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Unwraps an entry as a bindable type.
    pub fn get_as<T: Bindable>(&self, key: &str) -> Option<T> {
        self.values.get(key).cloned().and_then(T::from_value)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.to_owned(), value.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}

impl From<IndexMap<String, Value>> for DynamicRow {
    fn from(values: IndexMap<String, Value>) -> Self {
        Self { values }
    }
}

/// Dynamic row stream.
pub struct DynamicRows<'a> {
    inner: Dictionaries<'a>,
}

impl DynamicRows<'_> {
    pub fn state(&self) -> SessionState {
        self.inner.state()
    }
}

impl Iterator for DynamicRows<'_> {
    type Item = Result<DynamicRow, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(DynamicRow::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::enums::tests::Level;
    use crate::convert::TargetKind;
    use crate::convert::TargetType;
    use crate::database::column::ColumnOverride;
    use crate::extension::record::tests::Employee;
    use crate::spreadsheet::sheet::MemorySheet;
    use crate::spreadsheet::sheet::MemoryWorkbook;
    use chrono::NaiveDate;

    fn workbook(grid: Vec<Vec<CellValue>>) -> MemoryWorkbook {
        MemoryWorkbook::new().with_sheet(MemorySheet::from_grid("Staff", grid))
    }

    fn staff() -> MemoryWorkbook {
        workbook(vec![
            vec!["EmpId".into(), "Full Name".into(), "Manager".into(), "Level".into(), "Hired".into()],
            vec!["7".into(), " Ada ".into(), CellValue::Empty, "High".into(), "02.01.2024".into()],
            vec![8.0.into(), "Grace".into(), "Ada".into(), CellValue::Empty, CellValue::Empty],
            vec!["x".into(), "Linus".into(), CellValue::Empty, "bogus".into(), "later".into()],
        ])
    }

    #[test]
    fn test_records_with_defaults_and_nulls() {
        let mut book = staff();
        let rows = SheetBinder::new(&mut book, TableConfig::default())
            .records::<Employee>()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Employee {
            id: 7,
            name: "Ada".to_owned(),
            manager: None,
            level: Level::High,
            hired: NaiveDate::from_ymd_opt(2024, 1, 2),
        });
        assert_eq!(rows[1].id, 8);
        assert_eq!(rows[1].manager.as_deref(), Some("Ada"));
        assert_eq!(rows[1].level, Level::Medium);
        assert_eq!(rows[1].hired, None);
        // unconvertible non-nullable id keeps the field default
        assert_eq!(rows[2].id, 0);
        assert_eq!(rows[2].level, Level::Medium);
        assert_eq!(rows[2].hired, None);
    }

    #[test]
    fn test_state_transitions() {
        let mut book = staff();
        let mut records = SheetBinder::new(&mut book, TableConfig::new().max_rows(1)).records::<Employee>().unwrap();
        assert_eq!(records.state(), SessionState::Resolved);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(records.state(), SessionState::Streaming);
        assert!(records.next().is_none());
        assert_eq!(records.state(), SessionState::Done);
        assert!(records.next().is_none());
    }

    #[test]
    fn test_empty_header_row() {
        let mut book = workbook(vec![vec![], vec!["7".into()]]);
        let error = SheetBinder::new(&mut book, TableConfig::default()).dictionaries().err().unwrap();
        assert!(matches!(error, BindError::DataShapeError(DataShapeError::EmptyRow { row: 1 })));

        let mut book = workbook(vec![vec![CellValue::Empty, "  ".into()]]);
        let config = TableConfig::new().header(false);
        let error = SheetBinder::new(&mut book, config).dictionaries().err().unwrap();
        assert_eq!(error.to_string(), "Row 1 is empty");
    }

    #[test]
    fn test_dictionary_keys_from_header() {
        let mut book = workbook(vec![
            vec!["Name".into(), CellValue::Empty, "Name".into(), " Age ".into()],
            vec!["Ada".into(), "x".into(), "Lovelace".into(), 36.0.into()],
        ]);
        let config = TableConfig::new().whitespace(crate::database::table::WhitespaceMode::Trim);
        let mut rows = SheetBinder::new(&mut book, config).dictionaries().unwrap();
        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["Name", "B", "Name_2", "Age"]);
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row["Name"], Value::from("Ada"));
        assert_eq!(row["B"], Value::from("x"));
        assert_eq!(row["Name_2"], Value::from("Lovelace"));
        assert_eq!(row["Age"], Value::Float(36.0));
    }

    #[test]
    fn test_duplicate_keys_skip_real_headers() {
        let mut book = workbook(vec![
            vec!["Name".into(), "Name".into(), "Name_2".into()],
            vec!["a".into(), "b".into(), "c".into()],
        ]);
        let mut rows = SheetBinder::new(&mut book, TableConfig::new()).dictionaries().unwrap();
        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["Name", "Name_3", "Name_2"]);
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row["Name"], Value::from("a"));
        assert_eq!(row["Name_3"], Value::from("b"));
        assert_eq!(row["Name_2"], Value::from("c"));
    }

    #[test]
    fn test_dictionary_overrides() {
        let mut book = workbook(vec![
            vec!["Id".into(), "When".into()],
            vec!["12".into(), "2024-03-01".into()],
        ]);
        let config = TableConfig::new()
            .column(ColumnOverride::new("Id").target(TargetType::new(TargetKind::I64)))
            .column(ColumnOverride::new("Copy").at(0));
        let row = SheetBinder::new(&mut book, config).dictionaries().unwrap().next().unwrap().unwrap();
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["Id", "When", "Copy"]);
        assert_eq!(row["Id"], Value::Int(12));
        assert_eq!(row["Copy"], Value::from("12"));
    }

    #[test]
    fn test_header_and_data_offsets() {
        let mut book = workbook(vec![
            vec!["title".into()],
            vec![CellValue::Empty, "Id".into(), "Name".into()],
            vec![CellValue::Empty, "ignored".into(), "row".into()],
            vec!["left".into(), 1.0.into(), "Ada".into()],
        ]);
        let config = TableConfig::new()
            .header_start(GridAddress::from_notation("B2").unwrap())
            .data_start(GridAddress::from_notation("B4").unwrap());
        let rows = SheetBinder::new(&mut book, config)
            .dictionaries()
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["Id"], Value::Float(1.0));
    }

    #[test]
    fn test_empty_row_handling() {
        let grid = || {
            vec![
                vec!["A".into()],
                vec!["1".into()],
                vec![],
                vec!["2".into()],
            ]
        };
        let count = |config: TableConfig| {
            let mut book = workbook(grid());
            SheetBinder::new(&mut book, config).dictionaries().unwrap().count()
        };
        assert_eq!(count(TableConfig::new()), 3);
        assert_eq!(count(TableConfig::new().skip_empty_rows(true)), 2);
        assert_eq!(count(TableConfig::new().end_at_empty_row(true)), 1);
    }

    #[test]
    fn test_progress_every_row() {
        let mut book = staff();
        let mut seen = Vec::new();
        let count = SheetBinder::new(&mut book, TableConfig::default())
            .progress(|rows| seen.push(rows))
            .dynamic()
            .unwrap()
            .count();
        assert_eq!(count, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_dynamic_rows() {
        let mut book = staff();
        let columns = vec![
            ColumnSpec::new("id").name("EmpId").target(TargetType::new(TargetKind::I32)),
            ColumnSpec::new("who").names(["Full Name"]).trimmed(),
        ];
        let row = SheetBinder::new(&mut book, TableConfig::default())
            .dynamic_of(columns)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(row.get_as::<i32>("id"), Some(7));
        assert_eq!(row.get_as::<String>("who").as_deref(), Some("Ada"));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "who"]);
    }

    #[test]
    fn test_bind_cell_rules() {
        let culture = crate::convert::Culture::invariant();
        let enums = crate::convert::EnumCache::new();
        let context = crate::convert::tests::context(&culture, &enums);

        let column = ColumnSpec::new("n").target(TargetType::new(TargetKind::I32)).default_value(-1);
        assert_eq!(bind_cell(&column, &CellValue::Empty, &context), Some(Value::Int(-1)));
        assert_eq!(bind_cell(&column, &"abc".into(), &context), Some(Value::Int(-1)));
        assert_eq!(bind_cell(&column, &"42".into(), &context), Some(Value::Int(42)));

        let column = ColumnSpec::new("n").target(TargetType::new(TargetKind::I32));
        assert_eq!(bind_cell(&column, &"abc".into(), &context), None);
        assert_eq!(bind_cell(&column, &CellValue::Empty, &context), Some(Value::Int(0)));

        let column = ColumnSpec::new("n").target(TargetType::nullable(TargetKind::I32)).default_value("oops");
        assert_eq!(bind_cell(&column, &"abc".into(), &context), Some(Value::Null));
        assert_eq!(bind_cell(&column, &CellValue::Number(f64::NAN), &context), Some(Value::Null));
    }
}
