//! Table data model.
//!
//! A [`Table`] is pure data: two [`DataBlock`]s (headers and rows), the
//! border titles, per-column pad overrides and the configuration used by
//! [`Table::load`]. Rendering lives in [`crate::render`].
//!
//! # Example
//!
//! ```
//! use console_table::{Cell, Row, Table};
//!
//! let mut table = Table::new();
//! table
//!     .set_headers(Row::from_strings(["ISBN", "Title", "Author"]))
//!     .add_row_from_strings(["99921-58-10-7", "Divine Comedy", "Dante Alighieri"])
//!     .add_separator()
//!     .add_row(Row::from_cells([Cell::new("This value spans 3 columns.").colspan(3)]));
//! assert_eq!(table.rows().len(), 3);
//! ```

mod row;
mod slots;

use std::collections::BTreeMap;

use serde::Serialize;

pub use row::{Cell, Column, Content, Row, Separator};
pub use slots::Slots;

use crate::markup;
use crate::parser::{ParseError, Parser, ParserConfig};
use crate::style::PadType;

/// Ordered rows: row index → row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataBlock {
    rows: Slots<Row>,
}

impl DataBlock {
    /// An empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row; returns its index.
    pub fn push(&mut self, row: Row) -> usize {
        self.rows.push(row)
    }

    /// Put a row at `index`, replacing what was there.
    pub fn set(&mut self, index: usize, row: Row) -> Option<Row> {
        self.rows.set(index, row)
    }

    /// Splice a row in at `index`, moving later rows down by one.
    pub fn insert(&mut self, index: usize, row: Row) {
        self.rows.insert_shift(index, row);
    }

    /// Remove the row at `index` without moving other rows.
    pub fn remove(&mut self, index: usize) -> Option<Row> {
        self.rows.remove(index)
    }

    /// Row at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Mutable row at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Rows in emission order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &Row)> {
        self.rows.iter()
    }

    /// Rows without their indices.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &Row> {
        self.rows.values()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the block holds no row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.rows = Slots::new();
    }

    /// Re-key rows `0..len` keeping their order.
    pub fn compact(&mut self) {
        self.rows.compact();
    }
}

impl FromIterator<Row> for DataBlock {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Headers, rows and the table-level settings that go with them.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: DataBlock,
    rows: DataBlock,
    header_title: Option<String>,
    footer_title: Option<String>,
    column_padding: BTreeMap<usize, PadType>,
    parser_config: ParserConfig,
}

impl Table {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a data row.
    pub fn add_row(&mut self, row: Row) -> &mut Self {
        self.rows.push(row);
        self
    }

    /// Append several data rows.
    pub fn add_rows<I: IntoIterator<Item = Row>>(&mut self, rows: I) -> &mut Self {
        for row in rows {
            self.rows.push(row);
        }
        self
    }

    /// Append a data row of plain strings.
    pub fn add_row_from_strings<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_row(Row::from_strings(values))
    }

    /// Append a simple rule.
    pub fn add_separator(&mut self) -> &mut Self {
        self.add_row(Row::separator(false))
    }

    /// Append a double rule.
    pub fn add_double_separator(&mut self) -> &mut Self {
        self.add_row(Row::separator(true))
    }

    /// Replace the header rows with a single row.
    pub fn set_headers(&mut self, row: Row) -> &mut Self {
        self.headers.clear();
        self.headers.push(row);
        self
    }

    /// Append a header row (multi-level headers).
    pub fn add_header_row(&mut self, row: Row) -> &mut Self {
        self.headers.push(row);
        self
    }

    /// Put a data row at `index`, replacing what was there.
    pub fn set_row(&mut self, index: usize, row: Row) -> &mut Self {
        self.rows.set(index, row);
        self
    }

    /// Drop all data rows.
    pub fn clear_rows(&mut self) -> &mut Self {
        self.rows.clear();
        self
    }

    /// Override the pad direction of one column.
    pub fn set_column_padding(&mut self, column: usize, pad: PadType) -> &mut Self {
        self.column_padding.insert(column, pad);
        self
    }

    /// Set the title shown in the top border.
    pub fn set_header_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.header_title = Some(title.into());
        self
    }

    /// Set the title shown in the bottom border.
    pub fn set_footer_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.footer_title = Some(title.into());
        self
    }

    /// Set the configuration used by [`Table::load`].
    pub fn set_parser_config(&mut self, config: ParserConfig) -> &mut Self {
        self.parser_config = config;
        self
    }

    /// Replace headers and rows with the flattened form of `value`.
    ///
    /// `filters` lists the top-level labels to keep; empty keeps all.
    /// Values are escaped, so brackets in data never read as markup.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when `value` cannot be captured or its shape
    /// has no handler.
    pub fn load<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
        filters: &[&str],
    ) -> Result<&mut Self, ParseError> {
        let parsed = Parser::new(self.parser_config.clone()).parse(value, filters)?;

        self.headers.clear();
        for level in &parsed.headers {
            let row = level
                .iter()
                .map(|header| {
                    Cell::new(markup::escape(&header.label))
                        .colspan(header.colspan)
                        .rowspan(header.rowspan)
                })
                .collect();
            self.headers.push(row);
        }

        self.rows.clear();
        for values in &parsed.rows {
            self.rows
                .push(values.iter().map(|v| Cell::new(markup::escape(v))).collect());
        }
        log::debug!(
            "loaded {} header rows and {} data rows",
            self.headers.len(),
            self.rows.len()
        );
        Ok(self)
    }

    /// Header rows.
    #[must_use]
    pub fn headers(&self) -> &DataBlock {
        &self.headers
    }

    /// Data rows.
    #[must_use]
    pub fn rows(&self) -> &DataBlock {
        &self.rows
    }

    /// Title of the top border.
    #[must_use]
    pub fn header_title(&self) -> Option<&str> {
        self.header_title.as_deref()
    }

    /// Title of the bottom border.
    #[must_use]
    pub fn footer_title(&self) -> Option<&str> {
        self.footer_title.as_deref()
    }

    /// Pad override of a column.
    #[must_use]
    pub fn column_padding(&self, column: usize) -> Option<PadType> {
        self.column_padding.get(&column).copied()
    }

    /// Configuration used by [`Table::load`].
    #[must_use]
    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser_config
    }

    /// Whether the table has neither headers nor rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}
