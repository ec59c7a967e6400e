//! In-memory table model: named columns of tagged cells.
//!
//! Column names are unique and every column holds the same number of cells;
//! both are checked when a table is built. Also renders tables as plain
//! aligned text for previews and column listings.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::{data::Value, error::TableError};

const MAX_CELL_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A column is numeric when it has cells and none of them is text or a
    /// date. Missing cells do not disqualify it.
    pub fn is_numeric(&self) -> bool {
        !self.values.is_empty()
            && self
                .values
                .iter()
                .all(|value| value.is_numeric() || value.is_missing())
    }

    pub fn has_boolean(&self) -> bool {
        self.values.iter().any(Value::is_boolean)
    }

    /// Single kind label when all present cells agree, `mixed` otherwise.
    pub fn kind(&self) -> &'static str {
        let mut kinds = self
            .values
            .iter()
            .filter(|value| !value.is_missing())
            .map(Value::kind);
        let Some(first) = kinds.next() else {
            return "empty";
        };
        if kinds.all(|kind| kind == first) {
            first
        } else if self.is_numeric() {
            "numeric"
        } else {
            "mixed"
        }
    }

    pub(crate) fn replace_values(&mut self, values: Vec<Value>) {
        self.values = values;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn(column.name().to_string()));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(ragged) = columns.iter().find(|column| column.len() != expected) {
                return Err(TableError::RaggedColumn {
                    column: ragged.name().to_string(),
                    expected,
                    found: ragged.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Builds a table from a header and row-major cells. Every row must be as
    /// wide as the header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        let width = headers.len();
        let mut cells: Vec<Vec<Value>> = (0..width)
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TableError::RowWidth {
                    row: row_idx + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            for (column, value) in cells.iter_mut().zip(row) {
                column.push(value);
            }
        }
        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Cells of row `idx` in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|column| &column.values[idx]).collect())
    }

    /// Copy of the table without the named columns. Names that are not in the
    /// table are ignored.
    pub fn drop_columns(&self, names: &[String]) -> Table {
        let columns = self
            .columns
            .iter()
            .filter(|column| !names.iter().any(|name| name == column.name()))
            .cloned()
            .collect();
        Table { columns }
    }

    /// Copy of the table keeping only the first occurrence of each full row.
    /// Missing cells compare equal to each other.
    pub fn drop_duplicate_rows(&self) -> Table {
        let mut seen = HashSet::with_capacity(self.row_count());
        let keep = (0..self.row_count())
            .filter(|&idx| seen.insert(self.row_key(idx)))
            .collect::<Vec<_>>();
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                values: keep.iter().map(|&idx| column.values[idx].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    fn row_key(&self, idx: usize) -> Vec<(&'static str, String)> {
        self.columns
            .iter()
            .map(|column| {
                let value = &column.values[idx];
                (value.kind(), value.as_display())
            })
            .collect()
    }

    pub fn missing_cells(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|column| column.values.iter())
            .filter(|value| value.is_missing())
            .count()
    }

    /// Copy of the table with every missing cell replaced by `fill`.
    pub fn fill_missing(&self, fill: &Value) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                values: column
                    .values
                    .iter()
                    .map(|value| if value.is_missing() { fill.clone() } else { value.clone() })
                    .collect(),
            })
            .collect();
        Table { columns }
    }

    /// First `rows` rows rendered as display strings.
    pub fn head(&self, rows: usize) -> Vec<Vec<String>> {
        (0..self.row_count().min(rows))
            .map(|idx| {
                self.columns
                    .iter()
                    .map(|column| column.values[idx].as_display())
                    .collect()
            })
            .collect()
    }
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers = headers.iter().map(|h| clip(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", join_padded(&headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", join_padded(&rule, &widths));
    for row in &rows {
        let _ = writeln!(output, "{}", join_padded(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

// Flattens control characters and shortens long cells to keep rows on one line.
fn clip(value: &str) -> String {
    let flattened = value.replace(['\n', '\r', '\t'], " ");
    if flattened.chars().count() <= MAX_CELL_WIDTH {
        return flattened;
    }
    let mut clipped = flattened
        .chars()
        .take(MAX_CELL_WIDTH - 1)
        .collect::<String>();
    clipped.push('…');
    clipped
}
