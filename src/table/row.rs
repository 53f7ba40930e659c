//! Cells, separators and rows.

use crate::style::PadType;
use crate::table::slots::Slots;

/// A table cell.
///
/// The value may contain markup and literal line breaks.
///
/// # Example
///
/// ```
/// use console_table::Cell;
///
/// let cell = Cell::new("Divine Comedy").colspan(2);
/// assert_eq!(cell.get_colspan(), 2);
/// assert_eq!(cell.get_rowspan(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    value: String,
    colspan: usize,
    rowspan: usize,
    pad: Option<PadType>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new("")
    }
}

impl Cell {
    /// A one-by-one cell.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            colspan: 1,
            rowspan: 1,
            pad: None,
        }
    }

    /// Set the number of columns covered (0 counts as 1).
    #[must_use]
    pub fn colspan(mut self, colspan: usize) -> Self {
        self.colspan = colspan.max(1);
        self
    }

    /// Set the number of rows covered (0 counts as 1).
    #[must_use]
    pub fn rowspan(mut self, rowspan: usize) -> Self {
        self.rowspan = rowspan.max(1);
        self
    }

    /// Override the pad direction for this cell.
    #[must_use]
    pub fn pad(mut self, pad: PadType) -> Self {
        self.pad = Some(pad);
        self
    }

    /// Text value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Columns covered.
    #[must_use]
    pub fn get_colspan(&self) -> usize {
        self.colspan
    }

    /// Rows covered.
    #[must_use]
    pub fn get_rowspan(&self) -> usize {
        self.rowspan
    }

    /// Pad direction override.
    #[must_use]
    pub fn get_pad(&self) -> Option<PadType> {
        self.pad
    }

    /// Same spans and padding, new value, one row high.
    #[must_use]
    pub(crate) fn continuation(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            colspan: self.colspan,
            rowspan: 1,
            pad: self.pad,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A horizontal rule in place of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Separator {
    /// Draw the heavier double rule.
    pub double: bool,
}

/// What a column slot holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Content {
    /// A text cell.
    Cell(Cell),
    /// A rule.
    Separator(Separator),
}

/// One occupied column slot of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    content: Content,
}

impl Column {
    /// Wrap content.
    #[must_use]
    pub fn new(content: Content) -> Self {
        Self { content }
    }

    /// The slot content.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The cell, unless this slot holds a separator.
    #[must_use]
    pub fn cell(&self) -> Option<&Cell> {
        match &self.content {
            Content::Cell(cell) => Some(cell),
            Content::Separator(_) => None,
        }
    }

    /// Columns covered (separators cover one).
    #[must_use]
    pub fn colspan(&self) -> usize {
        self.cell().map_or(1, Cell::get_colspan)
    }
}

impl From<Cell> for Column {
    fn from(cell: Cell) -> Self {
        Self::new(Content::Cell(cell))
    }
}

impl From<Separator> for Column {
    fn from(separator: Separator) -> Self {
        Self::new(Content::Separator(separator))
    }
}

/// A table row: column index → column.
///
/// Rows built by callers are logical: each cell takes the next free
/// column and a colspan pushes the following cells to the right.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    columns: Slots<Column>,
}

impl Row {
    /// An empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A row of cells in column order.
    pub fn from_cells<I, C>(cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        Self {
            columns: cells.into_iter().map(|c| Column::from(c.into())).collect(),
        }
    }

    /// A row of plain strings.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_cells(values.into_iter().map(|v| Cell::new(v.as_ref())))
    }

    /// A separator row.
    #[must_use]
    pub fn separator(double: bool) -> Self {
        let mut row = Self::new();
        row.columns.set(0, Separator { double }.into());
        row
    }

    /// Append a cell after the last occupied column.
    pub fn push(&mut self, cell: impl Into<Cell>) -> &mut Self {
        self.columns.push(Column::from(cell.into()));
        self
    }

    /// Put a column at `index`, replacing what was there.
    pub fn set(&mut self, index: usize, column: impl Into<Column>) -> &mut Self {
        self.columns.set(index, column.into());
        self
    }

    /// Remove the column at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Column> {
        self.columns.remove(index)
    }

    /// Column at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Cell at `index`, if the slot holds one.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.columns.get(index).and_then(Column::cell)
    }

    /// Occupied columns in index order.
    pub fn columns(&self) -> impl DoubleEndedIterator<Item = (usize, &Column)> {
        self.columns.iter()
    }

    /// Cells in index order, separators skipped.
    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.columns
            .iter()
            .filter_map(|(i, column)| column.cell().map(|cell| (i, cell)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The separator at column 0, if this is a separator row.
    #[must_use]
    pub fn separator_kind(&self) -> Option<Separator> {
        match self.columns.get(0).map(Column::content) {
            Some(Content::Separator(separator)) => Some(*separator),
            _ => None,
        }
    }

    /// Whether column 0 holds a separator.
    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.separator_kind().is_some()
    }

    /// Columns this row occupies: occupied slots plus extra colspan.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.values().map(Column::colspan).sum()
    }

    /// Whether a cell starting left of `index` spans over it.
    #[must_use]
    pub fn covers(&self, index: usize) -> bool {
        self.columns
            .iter()
            .take_while(|&(i, _)| i < index)
            .any(|(i, column)| i + column.colspan() > index)
    }

    /// Same layout with every cell emptied.
    ///
    /// Colspans and pad overrides are kept, rowspans reset to 1.
    #[must_use]
    pub fn blank_copy(&self) -> Self {
        let columns = self.columns.iter().map(|(i, column)| {
            let blank = match column.content() {
                Content::Cell(cell) => Column::from(cell.continuation("")),
                Content::Separator(separator) => Column::from(*separator),
            };
            (i, blank)
        });
        Self {
            columns: Slots::from_entries(columns),
        }
    }

    /// Put a cell at `index`, moving the cells at or after it to the right
    /// as far as needed to keep spans from overlapping.
    pub fn insert_cell(&mut self, index: usize, cell: Cell) {
        let mut next_free = index + cell.get_colspan();
        let mut moved = Vec::new();
        let tail: Vec<usize> = self.columns.keys().filter(|&k| k >= index).collect();
        for key in tail {
            if key >= next_free {
                break;
            }
            if let Some(column) = self.columns.remove(key) {
                let colspan = column.colspan();
                moved.push((next_free, column));
                next_free += colspan;
            }
        }
        for (target, column) in moved {
            self.columns.set(target, column);
        }
        self.columns.set(index, cell.into());
    }

    /// Convert logical column indices to grid positions by shifting every
    /// cell right by the extra colspan of the cells before it.
    #[must_use]
    pub fn to_grid_positions(&self) -> Self {
        let mut shift = 0;
        let columns = self.columns.iter().map(|(i, column)| {
            let position = i + shift;
            shift += column.colspan() - 1;
            (position, column.clone())
        });
        Self {
            columns: Slots::from_entries(columns),
        }
    }
}

impl<C: Into<Cell>> FromIterator<C> for Row {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::from_cells(iter)
    }
}
