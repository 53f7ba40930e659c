//! Table rendering.
//!
//! A [`TableRenderer`] is bound to one [`OutputSink`] and lays out the
//! [`Table`] it is given. Styles, per-column styles and per-column width
//! bounds are configured on the renderer; the table itself is never
//! modified by a render.
//!
//! Rendering runs in two passes over the table: the first materialises the
//! grid without wrapping to find the column widths, the second wraps every
//! cell at its final content width and emits the lines.
//!
//! # Example
//!
//! ```
//! use console_table::{BufferedOutput, Row, Table, TableRenderer};
//!
//! let mut table = Table::new();
//! table
//!     .set_headers(Row::from_strings(["ISBN", "Title"]))
//!     .add_row_from_strings(["99921-58-10-7", "Divine Comedy"]);
//!
//! let mut renderer = TableRenderer::new(BufferedOutput::new());
//! renderer.set_content(table);
//! renderer.render().unwrap();
//!
//! assert_eq!(
//!     renderer.sink().lines(),
//!     [
//!         "+---------------+---------------+",
//!         "| ISBN          | Title         |",
//!         "+---------------+---------------+",
//!         "| 99921-58-10-7 | Divine Comedy |",
//!         "+---------------+---------------+",
//!     ]
//! );
//! ```

mod layout;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::cells;
use crate::error::ConfigError;
use crate::markup::Decorator;
use crate::output::OutputSink;
use crate::registry::StyleRegistry;
use crate::style::{PadType, RuleKind, TableStyle, Template};
use crate::table::{Cell, Content, DataBlock, Row, Table};

use layout::{Materializer, Sizing};

/// Renders a [`Table`] to an [`OutputSink`].
pub struct TableRenderer<S: OutputSink> {
    sink: S,
    content: Option<Table>,
    style: Arc<TableStyle>,
    column_styles: BTreeMap<usize, Arc<TableStyle>>,
    min_widths: BTreeMap<usize, usize>,
    max_widths: BTreeMap<usize, usize>,
    // Working state, empty outside of `render` and `measure`.
    number_of_columns: usize,
    effective_widths: Vec<usize>,
}

impl<S: OutputSink + fmt::Debug> fmt::Debug for TableRenderer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRenderer")
            .field("sink", &self.sink)
            .field("content", &self.content)
            .field("style", &self.style)
            .field("column_styles", &self.column_styles.keys().collect::<Vec<_>>())
            .field("min_widths", &self.min_widths)
            .field("max_widths", &self.max_widths)
            .finish_non_exhaustive()
    }
}

impl<S: OutputSink> TableRenderer<S> {
    /// A renderer with the `default` style and no content.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            content: None,
            style: Arc::new(TableStyle::new()),
            column_styles: BTreeMap::new(),
            min_widths: BTreeMap::new(),
            max_widths: BTreeMap::new(),
            number_of_columns: 0,
            effective_widths: Vec::new(),
        }
    }

    /// Bind the table to render.
    pub fn set_content(&mut self, table: Table) -> &mut Self {
        self.content = Some(table);
        self
    }

    /// The bound table.
    #[must_use]
    pub fn content(&self) -> Option<&Table> {
        self.content.as_ref()
    }

    /// The bound table, for edits between renders.
    pub fn content_mut(&mut self) -> Option<&mut Table> {
        self.content.as_mut()
    }

    /// Unbind and return the table.
    pub fn take_content(&mut self) -> Option<Table> {
        self.content.take()
    }

    /// Set the table style.
    pub fn set_style(&mut self, style: impl Into<Arc<TableStyle>>) -> &mut Self {
        self.style = style.into();
        self
    }

    /// Set the table style from the global registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StyleNotDefined`] for an unknown name.
    pub fn set_style_by_name(&mut self, name: &str) -> Result<&mut Self, ConfigError> {
        self.set_style_from(StyleRegistry::global(), name)
    }

    /// Set the table style from `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StyleNotDefined`] for an unknown name.
    pub fn set_style_from(
        &mut self,
        registry: &StyleRegistry,
        name: &str,
    ) -> Result<&mut Self, ConfigError> {
        self.style = registry.get(name)?;
        Ok(self)
    }

    /// The table style.
    #[must_use]
    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    /// Style one column differently from the table.
    ///
    /// The column style supplies the padding character, the pad direction
    /// and the cell content template of that column.
    pub fn set_column_style(
        &mut self,
        column: usize,
        style: impl Into<Arc<TableStyle>>,
    ) -> &mut Self {
        self.column_styles.insert(column, style.into());
        self
    }

    /// Style one column with a style from the global registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StyleNotDefined`] for an unknown name.
    pub fn set_column_style_by_name(
        &mut self,
        column: usize,
        name: &str,
    ) -> Result<&mut Self, ConfigError> {
        let style = StyleRegistry::global().get(name)?;
        Ok(self.set_column_style(column, style))
    }

    /// Style of a column, falling back to the table style.
    #[must_use]
    pub fn column_style(&self, column: usize) -> &TableStyle {
        resolve_style(&self.style, &self.column_styles, column)
    }

    /// Set the minimum content width of a column.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWidthBounds`] when `width` exceeds the
    /// column's maximum width.
    pub fn set_column_min_width(
        &mut self,
        column: usize,
        width: usize,
    ) -> Result<&mut Self, ConfigError> {
        if let Some(&max) = self.max_widths.get(&column).filter(|&&max| width > max) {
            return Err(ConfigError::InvalidWidthBounds {
                column,
                min: width,
                max,
            });
        }
        self.min_widths.insert(column, width);
        Ok(self)
    }

    /// Set the maximum content width of a column; longer cells wrap. A
    /// maximum of 0 wraps like a maximum of 1.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWidthBounds`] when `width` is below the
    /// column's minimum width.
    pub fn set_column_max_width(
        &mut self,
        column: usize,
        width: usize,
    ) -> Result<&mut Self, ConfigError> {
        if let Some(&min) = self.min_widths.get(&column).filter(|&&min| min > width) {
            return Err(ConfigError::InvalidWidthBounds {
                column,
                min,
                max: width,
            });
        }
        self.max_widths.insert(column, width);
        Ok(self)
    }

    /// Fix the content width of a column (minimum = maximum = `width`).
    pub fn set_column_width(&mut self, column: usize, width: usize) -> &mut Self {
        self.min_widths.insert(column, width);
        self.max_widths.insert(column, width);
        self
    }

    /// Width overrides: column → (minimum, maximum).
    #[must_use]
    pub fn column_widths(&self) -> BTreeMap<usize, (Option<usize>, Option<usize>)> {
        let mut widths: BTreeMap<usize, (Option<usize>, Option<usize>)> = BTreeMap::new();
        for (&column, &min) in &self.min_widths {
            widths.entry(column).or_default().0 = Some(min);
        }
        for (&column, &max) in &self.max_widths {
            widths.entry(column).or_default().1 = Some(max);
        }
        widths
    }

    /// Render the bound table to the sink.
    ///
    /// Without content, or for a table without cells, nothing is written.
    ///
    /// # Errors
    ///
    /// Propagates the first write error of the sink.
    pub fn render(&mut self) -> io::Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("table_render").entered();

        let result = self.render_inner();
        self.reset();
        result
    }

    /// Effective width of every column of the bound table, without
    /// rendering anything.
    #[must_use]
    pub fn measure(&mut self) -> Vec<usize> {
        let widths = match self.content.as_ref() {
            Some(table) => self.sizing(table, &*self.sink.decorator()).1.effective,
            None => Vec::new(),
        };
        self.reset();
        widths
    }

    /// Columns of the render in progress (0 between renders).
    #[must_use]
    pub fn number_of_columns(&self) -> usize {
        self.number_of_columns
    }

    /// Effective widths of the render in progress (empty between renders).
    #[must_use]
    pub fn effective_widths(&self) -> &[usize] {
        &self.effective_widths
    }

    /// The sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the renderer and return its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn reset(&mut self) {
        self.number_of_columns = 0;
        self.effective_widths.clear();
    }

    fn render_inner(&mut self) -> io::Result<()> {
        let Some(table) = self.content.as_ref() else {
            log::debug!("render without content");
            return Ok(());
        };

        let decorator = self.sink.decorator();
        let decorator: &dyn Decorator = &*decorator;
        let (number_of_columns, sizing) = self.sizing(table, decorator);
        self.number_of_columns = number_of_columns;
        self.effective_widths.clone_from(&sizing.effective);
        if number_of_columns == 0 {
            log::debug!("empty table, nothing to render");
            return Ok(());
        }

        let wrapped = Materializer::new(decorator, number_of_columns, Some(&sizing));
        let headers = wrapped.block(table.headers());
        let rows = wrapped.block(table.rows());
        log::debug!(
            "rendering {} header rows and {} rows over {number_of_columns} columns",
            headers.len(),
            rows.len()
        );

        let emitter = Emitter {
            style: &self.style,
            column_styles: &self.column_styles,
            decorator,
            table,
            sizing: &sizing,
        };
        emitter.emit(&mut self.sink, &headers, &rows)
    }

    /// Column count and final widths of `table`.
    fn sizing(&self, table: &Table, decorator: &dyn Decorator) -> (usize, Sizing) {
        let number_of_columns = layout::column_count(table);

        let unwrapped = Materializer::new(decorator, number_of_columns, None);
        let headers = unwrapped.block(table.headers());
        let rows = unwrapped.block(table.rows());
        let blocks = [&headers, &rows];

        // A column with text keeps at least one cell to wrap into.
        let max_widths: BTreeMap<usize, usize> = self
            .max_widths
            .iter()
            .map(|(&column, &max)| (column, max.max(1)))
            .collect();

        let mut widths = layout::natural_widths(&blocks, number_of_columns, decorator);
        for (column, width) in widths.iter_mut().enumerate() {
            if let Some(&min) = self.min_widths.get(&column) {
                *width = (*width).max(min);
            }
            if let Some(&max) = max_widths.get(&column) {
                *width = (*width).min(max);
            }
        }

        let overhead: Vec<usize> = (0..number_of_columns)
            .map(|column| {
                self.column_style(column)
                    .get_cell_row_content_format()
                    .overhead(decorator)
            })
            .collect();
        let separator = cells::cell_len(self.style.vertical_inside());
        layout::grow_for_spans(
            &mut widths,
            &blocks,
            decorator,
            &overhead,
            separator,
            &max_widths,
        );

        let effective = widths.iter().zip(&overhead).map(|(w, o)| w + o).collect();
        log::trace!("column widths {widths:?}, effective {effective:?}");
        (
            number_of_columns,
            Sizing {
                effective,
                overhead,
                separator,
            },
        )
    }
}

fn resolve_style<'a>(
    style: &'a Arc<TableStyle>,
    column_styles: &'a BTreeMap<usize, Arc<TableStyle>>,
    column: usize,
) -> &'a TableStyle {
    column_styles.get(&column).unwrap_or(style)
}

/// Everything needed to turn materialised rows into lines.
struct Emitter<'a> {
    style: &'a Arc<TableStyle>,
    column_styles: &'a BTreeMap<usize, Arc<TableStyle>>,
    decorator: &'a dyn Decorator,
    table: &'a Table,
    sizing: &'a Sizing,
}

impl Emitter<'_> {
    fn number_of_columns(&self) -> usize {
        self.sizing.effective.len()
    }

    fn emit<S: OutputSink>(&self, sink: &mut S, headers: &DataBlock, rows: &DataBlock) -> io::Result<()> {
        let style: &TableStyle = self.style;
        self.rule(
            sink,
            RuleKind::Top,
            self.table.header_title(),
            style.get_header_title_format(),
        )?;
        for row in headers.rows() {
            self.row(sink, row, true)?;
        }

        let footer = self.table.footer_title();
        if !headers.is_empty() && !rows.is_empty() {
            self.rule(sink, RuleKind::DoubleMid, None, style.get_footer_title_format())?;
        } else if !headers.is_empty() {
            self.rule(sink, RuleKind::Bottom, footer, style.get_footer_title_format())?;
        }

        for row in rows.rows() {
            self.row(sink, row, false)?;
        }
        if !rows.is_empty() {
            self.rule(sink, RuleKind::Bottom, footer, style.get_footer_title_format())?;
        }
        Ok(())
    }

    /// Wrap a run of border glyphs in the border template.
    fn border(&self, glyphs: &str) -> String {
        self.style
            .get_border_format()
            .apply(&self.decorator.escape(glyphs))
    }

    fn rule<S: OutputSink>(
        &self,
        sink: &mut S,
        kind: RuleKind,
        title: Option<&str>,
        title_format: &Template,
    ) -> io::Result<()> {
        if !self.style.has_rules() {
            return Ok(());
        }
        let run = self.style.build_rule(&self.sizing.effective, kind);
        let line = match title {
            Some(title) => self.titled_rule(&run, title, title_format),
            None => self.border(&run),
        };
        sink.write_line(&line)
    }

    /// Centre a formatted title in a rule, truncating it with `...` when it
    /// is longer than the rule minus four cells.
    fn titled_rule(&self, run: &str, title: &str, format: &Template) -> String {
        let run_len = cells::cell_len(run);
        let limit = run_len.saturating_sub(4);

        let mut formatted = format.apply(title);
        let mut title_len = self.decorator.measure(&formatted);
        if title_len > limit {
            let keep = limit.saturating_sub(format.overhead(self.decorator) + 3);
            let plain = self.decorator.strip(title);
            let shortened = format!("{}...", cells::truncate(&plain, keep));
            formatted = format.apply(&self.decorator.escape(&shortened));
            title_len = self.decorator.measure(&formatted);
        }

        // Glyphs wider than one cell may not split evenly; spaces fill the gap.
        let start = run_len.saturating_sub(title_len) / 2;
        let end = run_len.saturating_sub(start + title_len);
        let head = cells::truncate(run, start);
        let tail = cells::truncate_start(run, end);
        let left = format!("{head}{}", " ".repeat(start - cells::cell_len(head)));
        let right = format!("{}{tail}", " ".repeat(end - cells::cell_len(tail)));
        let line = format!(
            "{}{formatted}{}",
            self.decorator.escape(&left),
            self.decorator.escape(&right)
        );
        self.style.get_border_format().apply(&line)
    }

    fn row<S: OutputSink>(&self, sink: &mut S, row: &Row, header: bool) -> io::Result<()> {
        if let Some(separator) = row.separator_kind() {
            let kind = if separator.double {
                RuleKind::DoubleMid
            } else {
                RuleKind::Mid
            };
            return self.rule(sink, kind, None, self.style.get_footer_title_format());
        }

        let number_of_columns = self.number_of_columns();
        let mut line = self.border(self.style.vertical_outside());
        let mut column = 0;
        while column < number_of_columns {
            let (text, span) = match row.get(column).map(|c| c.content()) {
                Some(Content::Cell(cell)) => {
                    let span = cell.get_colspan().min(number_of_columns - column);
                    (self.cell(cell, column, span, header), span)
                }
                Some(Content::Separator(_)) => {
                    let width = self.sizing.span_width(column, 1);
                    (self.border(&self.style.horizontal_inside().repeat(width)), 1)
                }
                None => (self.cell(&Cell::default(), column, 1, header), 1),
            };
            line.push_str(&text);
            column += span;
            let edge = if column >= number_of_columns {
                self.style.vertical_outside()
            } else {
                self.style.vertical_inside()
            };
            line.push_str(&self.border(edge));
        }
        sink.write_line(&line)
    }

    fn cell(&self, cell: &Cell, column: usize, span: usize, header: bool) -> String {
        let column_style = resolve_style(self.style, self.column_styles, column);
        let width = self.sizing.span_width(column, span);
        let content = column_style.get_cell_row_content_format().apply(cell.value());
        let missing = width.saturating_sub(self.decorator.measure(&content));

        let pad = cell
            .get_pad()
            .or_else(|| self.table.column_padding(column))
            .unwrap_or_else(|| column_style.get_pad_type());
        let (left, right) = match pad {
            PadType::Left => (missing, 0),
            PadType::Right => (0, missing),
            PadType::Both => (missing / 2, missing - missing / 2),
        };
        let fill = column_style.get_padding_char().to_string();
        let padded = format!(
            "{}{content}{}",
            self.decorator.escape(&fill.repeat(left)),
            self.decorator.escape(&fill.repeat(right))
        );

        let format = if header {
            self.style.get_cell_header_format()
        } else {
            self.style.get_cell_row_format()
        };
        format.apply(&padded)
    }
}
