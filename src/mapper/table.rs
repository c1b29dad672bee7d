//! In-memory view of the sheet: a header row followed by data rows.

/// One cell assignment (0-based row and column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// Rows of string cells; row 0 is the header. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from sparse `(row, col, value)` cells.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, String)>,
    {
        let mut table = Self::default();
        for (row, col, value) in cells {
            table.apply(&CellWrite { row, col, value });
        }
        table
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when there is no header row with at least one label in it.
    pub fn lacks_header(&self) -> bool {
        self.header().iter().all(|label| label.trim().is_empty())
    }

    /// Cell value, or `""` outside the populated area.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn apply(&mut self, write: &CellWrite) {
        if self.rows.len() <= write.row {
            self.rows.resize_with(write.row + 1, Vec::new);
        }
        let cells = &mut self.rows[write.row];
        if cells.len() <= write.col {
            cells.resize(write.col + 1, String::new());
        }
        cells[write.col] = write.value.clone();
    }
}
