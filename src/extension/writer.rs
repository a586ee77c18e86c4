//! Write pipeline: typed records, dictionaries or dynamic rows out to a backend writer.
use crate::convert::to_cell;
use crate::convert::TargetKind;
use crate::convert::Value;
use crate::database::column::merge_columns;
use crate::database::column::ColumnSpec;
use crate::database::table::TableConfig;
use crate::error::BindError;
use crate::error::ResultMessage;
use crate::extension::reader::DynamicRow;
use crate::extension::record::Record;
use crate::extension::session::BindContext;
use crate::extension::session::CancellationToken;
use crate::extension::session::ProgressFn;
use crate::extension::session::WRITE_PROGRESS_INTERVAL;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::OutputCell;
use crate::spreadsheet::sheet::SheetWriter;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Entry point of a write session producing one sheet.
pub struct SheetExporter<'a, W: SheetWriter + ?Sized> {
    backend: &'a mut W,
    sheet: String,
    config: TableConfig,
    context: Arc<BindContext>,
    cancel: CancellationToken,
    progress: Option<ProgressFn<'a>>,
}

impl<'a, W: SheetWriter + ?Sized> SheetExporter<'a, W> {
    pub fn new(backend: &'a mut W, sheet: &str, config: TableConfig) -> Self {
        Self {
            backend,
            sheet: sheet.to_owned(),
            config,
            context: BindContext::shared(),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn context(mut self, context: Arc<BindContext>) -> Self {
        self.context = context;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Called with the running row count every 100 rows and once at the end.
    pub fn progress(mut self, progress: impl FnMut(usize) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Writes records of type `T`, one row each, returning the number of data rows.
    pub fn write_records<'r, T: Record>(self, records: impl IntoIterator<Item = &'r T>) -> Result<usize, BindError> {
        let declared = self.context.records.columns::<T>().to_vec();
        let columns = merge_columns(declared, &self.config.columns, false);
        self.export(columns, records, |record: &&T, column: &ColumnSpec| {
            record.get_field(column.accessor.as_deref().unwrap_or(column.key.as_str()))
        })
    }

    /// Writes ordered maps under the given columns.
    ///
    /// Without columns, the keys of the first row define them.
    pub fn write_dictionaries<'r>(
        self,
        columns: Vec<ColumnSpec>,
        rows: impl IntoIterator<Item = &'r IndexMap<String, Value>>,
    ) -> Result<usize, BindError> {
        let mut rows = rows.into_iter().peekable();
        let columns = match (columns.is_empty(), rows.peek()) {
            (true, Some(first)) => first.keys().map(|key| ColumnSpec::new(key)).collect(),
            _ => columns,
        };
        let columns = merge_columns(columns, &self.config.columns, true);
        self.export(columns, rows, |row: &&IndexMap<String, Value>, column: &ColumnSpec| {
            row.get(&column.key).cloned()
        })
    }

    pub fn write_dynamic<'r>(
        self,
        columns: Vec<ColumnSpec>,
        rows: impl IntoIterator<Item = &'r DynamicRow>,
    ) -> Result<usize, BindError> {
        let mut rows = rows.into_iter().peekable();
        let columns = match (columns.is_empty(), rows.peek()) {
            (true, Some(first)) => first.keys().map(ColumnSpec::new).collect(),
            _ => columns,
        };
        let columns = merge_columns(columns, &self.config.columns, true);
        self.export(columns, rows, |row: &&DynamicRow, column: &ColumnSpec| row.get(&column.key).cloned())
    }

    fn export<R, F>(mut self, columns: Vec<ColumnSpec>, rows: impl IntoIterator<Item = R>, fetch: F) -> Result<usize, BindError>
    where
        F: Fn(&R, &ColumnSpec) -> Option<Value>,
    {
        let (header_start, data_start) = self.config.layout()?;
        let plan = place_columns(columns, data_start.column_index().unwrap_or(0));
        let context = format!("Write sheet '{}' failed", self.sheet);

        self.backend
            .begin_sheet(&self.sheet)
            .map_err(BindError::from)
            .with_prefix(&context)?;

        if self.config.has_header {
            let row = header_start.row_index().unwrap_or(0);
            let shift = header_start.column() - data_start.column();
            let cells = plan
                .iter()
                .filter_map(|(col, column)| {
                    Some(OutputCell {
                        row,
                        col: usize::try_from(*col as i64 + shift).ok()?,
                        value: CellValue::Text(column.display_name().to_owned()),
                        format: None,
                    })
                })
                .collect::<Vec<_>>();
            self.backend
                .write_row(row, &cells)
                .map_err(BindError::from)
                .with_prefix(&context)?;
        }

        let first_row = data_start.row_index().unwrap_or(0);
        let mut written = 0;
        for record in rows {
            if self.cancel.is_cancelled() {
                return Err(BindError::Cancelled);
            }
            let row = first_row + written;
            let cells = plan
                .iter()
                .map(|(col, column)| output_cell(row, *col, column, fetch(&record, column)))
                .collect::<Vec<_>>();
            self.backend
                .write_row(row, &cells)
                .map_err(BindError::from)
                .with_prefix(&context)?;
            written += 1;
            if written % WRITE_PROGRESS_INTERVAL == 0 {
                if let Some(progress) = self.progress.as_mut() {
                    progress(written);
                }
            }
        }

        self.backend.end_sheet().map_err(BindError::from).with_prefix(&context)?;
        if written % WRITE_PROGRESS_INTERVAL != 0 {
            if let Some(progress) = self.progress.as_mut() {
                progress(written);
            }
        }
        log::debug!("Wrote {} row(s) to sheet '{}'", written, self.sheet);
        Ok(written)
    }
}

/// Assigns physical columns: explicit indexes first, the rest left to right
/// from `first_col` skipping taken positions. Ignored columns are dropped.
fn place_columns(columns: Vec<ColumnSpec>, first_col: usize) -> Vec<(usize, ColumnSpec)> {
    let mut taken = columns
        .iter()
        .filter(|column| !column.ignore)
        .filter_map(|column| column.index)
        .collect::<BTreeSet<_>>();
    let mut next = first_col;
    let mut plan = columns
        .into_iter()
        .filter(|column| !column.ignore)
        .map(|column| match column.index {
            Some(index) => (index, column),
            None => {
                while taken.contains(&next) {
                    next += 1;
                }
                taken.insert(next);
                (next, column)
            }
        })
        .collect::<Vec<_>>();
    plan.sort_by_key(|(col, _)| *col);
    plan
}

/// Converts one value by the column's declared type; missing values become explicit blanks.
fn output_cell(row: usize, col: usize, column: &ColumnSpec, value: Option<Value>) -> OutputCell {
    let declared = Some(&column.target.kind).filter(|kind| **kind != TargetKind::Any);
    let value = value.map(|value| to_cell(&value, declared)).unwrap_or_default();
    let format = match value {
        CellValue::Empty => None,
        _ => column.format.to_owned().or_else(|| default_format(&value)),
    };
    OutputCell { row, col, value, format }
}

fn default_format(value: &CellValue) -> Option<String> {
    match value {
        CellValue::DateTime(datetime) if datetime.time() == chrono::NaiveTime::MIN => Some("yyyy-mm-dd".to_owned()),
        CellValue::DateTime(_) => Some("yyyy-mm-dd hh:mm:ss".to_owned()),
        CellValue::TimeSpan(_) => Some("[h]:mm:ss".to_owned()),
        _ => None,
    }
}
