use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::OutputCell;
use anyhow::anyhow;
use anyhow::Result;
use std::collections::BTreeMap;

/// One physical row delivered by a format backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRow {
    /// Row index (0-based)
    pub index: usize,
    /// Non-empty cells keyed by 0-based column index
    pub cells: BTreeMap<usize, CellValue>,
}

impl RawRow {
    pub fn new(index: usize) -> Self {
        Self { index, cells: BTreeMap::new() }
    }

    /// Builds a row from positional values, dropping `CellValue::Empty` entries.
    pub fn from_values(index: usize, values: Vec<CellValue>) -> Self {
        let cells = values
            .into_iter()
            .enumerate()
            .filter(|(_, value)| *value != CellValue::Empty)
            .collect();
        Self { index, cells }
    }

    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Returns true if every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}

/// Lazily evaluated, forward-only sequence of physical rows.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<RawRow>> + 'a>;

/// Read side of a format backend (xlsx, xls, csv, ...).
pub trait SheetReader {
    /// Lists sheet names in workbook order.
    fn sheet_names(&self) -> Result<Vec<String>>;

    /// Streams the physical rows of the sheet at `sheet` (0-based), in row order.
    fn read_rows<'a>(&'a mut self, sheet: usize) -> Result<RowIter<'a>>;
}

/// Write side of a format backend.
pub trait SheetWriter {
    /// Starts a new sheet; subsequent rows belong to it.
    fn begin_sheet(&mut self, name: &str) -> Result<()>;

    /// Writes one row of converted cells. Blank cells are passed explicitly.
    fn write_row(&mut self, row: usize, cells: &[OutputCell]) -> Result<()>;

    /// Finishes the current sheet.
    fn end_sheet(&mut self) -> Result<()>;
}

/// A sheet held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    pub name: String,
    pub rows: Vec<RawRow>,
    /// Format codes recorded by the writer, keyed by (row, col)
    pub formats: BTreeMap<(usize, usize), String>,
}

impl MemorySheet {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned(), ..Default::default() }
    }

    /// Builds a sheet from a dense grid, one inner vector per row starting at row 0.
    pub fn from_grid(name: &str, grid: Vec<Vec<CellValue>>) -> Self {
        let rows = grid
            .into_iter()
            .enumerate()
            .map(|(index, values)| RawRow::from_values(index, values))
            .collect();
        Self { name: name.to_owned(), rows, formats: BTreeMap::new() }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.iter().find(|raw| raw.index == row)?.get(col)
    }
}

/// In-memory backend used by tests and by callers that already hold the grid.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    pub sheets: Vec<MemorySheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: MemorySheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

impl SheetReader for MemoryWorkbook {
    fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.sheets.iter().map(|sheet| sheet.name.to_owned()).collect())
    }

    fn read_rows<'a>(&'a mut self, sheet: usize) -> Result<RowIter<'a>> {
        let sheet = self
            .sheets
            .get(sheet)
            .ok_or_else(|| anyhow!("Sheet index {} out of range", sheet))?;
        Ok(Box::new(sheet.rows.iter().cloned().map(Ok)))
    }
}

impl SheetWriter for MemoryWorkbook {
    fn begin_sheet(&mut self, name: &str) -> Result<()> {
        self.sheets.push(MemorySheet::new(name));
        Ok(())
    }

    fn write_row(&mut self, row: usize, cells: &[OutputCell]) -> Result<()> {
        let sheet = self
            .sheets
            .last_mut()
            .ok_or_else(|| anyhow!("write_row called before begin_sheet"))?;
        let mut raw = RawRow::new(row);
        for cell in cells {
            if let Some(format) = &cell.format {
                sheet.formats.insert((cell.row, cell.col), format.to_owned());
            }
            raw.cells.insert(cell.col, cell.value.clone());
        }
        sheet.rows.push(raw);
        Ok(())
    }

    fn end_sheet(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_drops_empty_cells() {
        let sheet = MemorySheet::from_grid("Sheet1", vec![
            vec!["a".into(), CellValue::Empty, 3.0.into()],
            vec![],
        ]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].cells.len(), 2);
        assert_eq!(sheet.cell(0, 2), Some(&CellValue::Number(3.0)));
        assert!(sheet.rows[1].is_blank());
    }

    #[test]
    fn workbook_reads_sheet_by_index() {
        let mut workbook = MemoryWorkbook::new()
            .with_sheet(MemorySheet::from_grid("One", vec![vec!["x".into()]]))
            .with_sheet(MemorySheet::from_grid("Two", vec![vec!["y".into()], vec!["z".into()]]));
        assert_eq!(workbook.sheet_names().unwrap(), vec!["One", "Two"]);
        let rows: Vec<RawRow> = workbook.read_rows(1).unwrap().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(0), Some(&CellValue::from("z")));
        assert!(workbook.read_rows(5).is_err());
    }

    #[test]
    fn workbook_records_written_rows() {
        let mut workbook = MemoryWorkbook::new();
        workbook.begin_sheet("Out").unwrap();
        workbook.write_row(1, &[OutputCell {
            row: 1,
            col: 2,
            value: CellValue::Number(1.5),
            format: Some("0.00".to_owned()),
        }]).unwrap();
        workbook.end_sheet().unwrap();
        let sheet = workbook.sheet("Out").unwrap();
        assert_eq!(sheet.cell(1, 2), Some(&CellValue::Number(1.5)));
        assert_eq!(sheet.formats.get(&(1, 2)).map(String::as_str), Some("0.00"));
    }
}
