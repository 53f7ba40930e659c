//! Grid layout: column count, row materialisation and column widths.
//!
//! Caller rows are logical; materialisation turns a [`DataBlock`] into the
//! rows that are actually emitted:
//!
//! - cells move to grid positions (a colspan leaves the covered slots empty)
//! - separator rows are completed to the full column count
//! - every cell is split into physical lines (line breaks, then hard-wrap)
//! - extra lines go into synthetic rows spliced right after their row
//! - rowspan cells continue into the following rows
//!
//! Widths are measured on a grid materialised without wrapping; the emitted
//! grid is materialised again with the final content widths.

use std::collections::BTreeMap;
use std::ops::Range;

use num_rational::Ratio;

use crate::markup::{self, Decorator};
use crate::table::{Cell, DataBlock, Row, Table};

/// Final column widths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Sizing {
    /// Per column: content width plus content-template overhead.
    pub effective: Vec<usize>,
    /// Per column: visible cells the content template adds.
    pub overhead: Vec<usize>,
    /// Width of the inner vertical glyph.
    pub separator: usize,
}

impl Sizing {
    /// Visible width of a cell at `column` covering `colspan` columns.
    pub fn span_width(&self, column: usize, colspan: usize) -> usize {
        let end = (column + colspan).min(self.effective.len());
        if column >= end {
            return 0;
        }
        self.effective[column..end].iter().sum::<usize>() + (end - column - 1) * self.separator
    }

    /// Width left for the text of such a cell once its template is applied.
    pub fn content_width(&self, column: usize, colspan: usize) -> usize {
        let overhead = self.overhead.get(column).copied().unwrap_or(0);
        self.span_width(column, colspan).saturating_sub(overhead)
    }
}

/// Number of grid columns: the widest non-separator row, counting colspan.
pub(crate) fn column_count(table: &Table) -> usize {
    table
        .headers()
        .rows()
        .chain(table.rows().rows())
        .filter(|row| !row.is_separator())
        .map(Row::width)
        .max()
        .unwrap_or(0)
}

/// Fill every slot of a separator row up to `number_of_columns`.
pub(crate) fn complete_separator(row: &mut Row, number_of_columns: usize) {
    if let Some(separator) = row.separator_kind() {
        for column in 1..number_of_columns {
            row.set(column, separator);
        }
    }
}

/// Turns logical blocks into emitted rows.
pub(crate) struct Materializer<'a> {
    decorator: &'a dyn Decorator,
    number_of_columns: usize,
    sizing: Option<&'a Sizing>,
}

impl<'a> Materializer<'a> {
    /// Without `sizing` cells are only split on line breaks.
    pub fn new(decorator: &'a dyn Decorator, number_of_columns: usize, sizing: Option<&'a Sizing>) -> Self {
        Self {
            decorator,
            number_of_columns,
            sizing,
        }
    }

    /// Materialise one block; the input is left untouched.
    pub fn block(&self, block: &DataBlock) -> DataBlock {
        let mut rows: DataBlock = block.rows().map(|row| self.prepare(row)).collect();
        let mut index = 0;
        while index < rows.len() {
            self.expand_row(&mut rows, index);
            index += 1;
        }
        rows
    }

    fn prepare(&self, row: &Row) -> Row {
        if row.is_separator() {
            let mut row = row.clone();
            complete_separator(&mut row, self.number_of_columns);
            row
        } else {
            row.to_grid_positions()
        }
    }

    fn wrap_width(&self, column: usize, colspan: usize) -> Option<usize> {
        if column >= self.number_of_columns {
            return None;
        }
        self.sizing
            .map(|sizing| sizing.content_width(column, colspan).max(1))
    }

    /// Split the cells of row `index` into lines and place every line.
    fn expand_row(&self, rows: &mut DataBlock, index: usize) {
        let Some(row) = rows.get(index).cloned() else {
            return;
        };
        if row.is_separator() {
            return;
        }

        let split: Vec<(usize, &Cell, Vec<String>)> = row
            .cells()
            .map(|(column, cell)| {
                let width = self.wrap_width(column, cell.get_colspan());
                (column, cell, markup::reflow(self.decorator, cell.value(), width))
            })
            .collect();

        let synthetic = split
            .iter()
            .filter(|(_, cell, _)| cell.get_rowspan() == 1)
            .map(|(_, _, lines)| lines.len().saturating_sub(1))
            .max()
            .unwrap_or(0);

        let mut source = row.clone();
        let mut extra_rows: Vec<Row> = (0..synthetic).map(|_| row.blank_copy()).collect();
        let mut continuations: BTreeMap<usize, Vec<(usize, Cell)>> = BTreeMap::new();

        for (column, cell, lines) in split {
            let total = lines.len().max(cell.get_rowspan());
            let mut lines = lines.into_iter();
            source.set(column, cell.continuation(lines.next().unwrap_or_default()));
            for offset in 1..total {
                let line = cell.continuation(lines.next().unwrap_or_default());
                match extra_rows.get_mut(offset - 1) {
                    Some(extra) => {
                        extra.set(column, line);
                    }
                    None => continuations.entry(offset).or_default().push((column, line)),
                }
            }
        }

        rows.set(index, source);
        if synthetic > 0 {
            log::trace!("splicing {synthetic} synthetic rows after row {index}");
        }
        for (offset, extra) in extra_rows.into_iter().enumerate() {
            rows.insert(index + 1 + offset, extra);
        }
        for (offset, group) in continuations {
            self.place_continuation(rows, index + offset, group);
        }
    }

    /// Put rowspan continuation cells into row `target`, or splice a new
    /// row there when they do not fit.
    fn place_continuation(&self, rows: &mut DataBlock, target: usize, group: Vec<(usize, Cell)>) {
        let group_width: usize = group.iter().map(|(_, cell)| cell.get_colspan()).sum();
        let fits = rows.get(target).is_some_and(|row| {
            !row.is_separator()
                && row.width() + group_width <= self.number_of_columns
                && group.iter().all(|(column, _)| !row.covers(*column))
        });

        if fits {
            if let Some(row) = rows.get_mut(target) {
                for (column, cell) in group {
                    row.insert_cell(column, cell);
                }
            }
            return;
        }

        let mut fresh = target
            .checked_sub(1)
            .and_then(|previous| rows.get(previous))
            .map(Row::blank_copy)
            .unwrap_or_default();
        for (column, cell) in group {
            let end = column + cell.get_colspan();
            let overlapping: Vec<usize> = fresh
                .columns()
                .filter(|(start, existing)| *start < end && start + existing.colspan() > column)
                .map(|(start, _)| start)
                .collect();
            for start in overlapping {
                fresh.remove(start);
            }
            fresh.set(column, cell);
        }
        log::trace!("splicing continuation row at {target}");
        rows.insert(target, fresh);
    }
}

/// Widest colspan-1 cell per column.
pub(crate) fn natural_widths(
    blocks: &[&DataBlock],
    number_of_columns: usize,
    decorator: &dyn Decorator,
) -> Vec<usize> {
    let mut widths = vec![0; number_of_columns];
    for row in blocks.iter().flat_map(|block| block.rows()) {
        if row.is_separator() {
            continue;
        }
        for (column, cell) in row.cells() {
            if cell.get_colspan() == 1 && column < number_of_columns {
                widths[column] = widths[column].max(decorator.measure(cell.value()));
            }
        }
    }
    widths
}

/// Widen columns so every colspan>1 cell fits the columns it covers.
pub(crate) fn grow_for_spans(
    widths: &mut [usize],
    blocks: &[&DataBlock],
    decorator: &dyn Decorator,
    overhead: &[usize],
    separator: usize,
    max_widths: &BTreeMap<usize, usize>,
) {
    let number_of_columns = widths.len();
    for row in blocks.iter().flat_map(|block| block.rows()) {
        if row.is_separator() {
            continue;
        }
        for (column, cell) in row.cells() {
            if cell.get_colspan() < 2 || column >= number_of_columns {
                continue;
            }
            let end = (column + cell.get_colspan()).min(number_of_columns);
            let available = widths[column..end].iter().sum::<usize>()
                + overhead[column + 1..end].iter().sum::<usize>()
                + (end - column - 1) * separator;
            let needed = decorator.measure(cell.value());
            if needed > available {
                distribute(widths, column..end, needed - available, max_widths);
            }
        }
    }
}

/// Share `extra` cells between the columns of `span` in proportion to their
/// widths, never growing a column past its maximum.
fn distribute(widths: &mut [usize], span: Range<usize>, mut extra: usize, max_widths: &BTreeMap<usize, usize>) {
    while extra > 0 {
        let open: Vec<usize> = span
            .clone()
            .filter(|c| max_widths.get(c).is_none_or(|&max| widths[*c] < max))
            .collect();
        if open.is_empty() {
            break;
        }

        let total_weight: usize = open.iter().map(|&c| widths[c].max(1)).sum();
        let mut distributed = 0;
        for (i, &c) in open.iter().enumerate() {
            let left = extra - distributed;
            let share = if i + 1 == open.len() {
                left
            } else {
                (Ratio::new(widths[c].max(1), total_weight) * extra)
                    .round()
                    .to_integer()
                    .min(left)
            };
            let room = max_widths.get(&c).map_or(usize::MAX, |&max| max.saturating_sub(widths[c]));
            let grant = share.min(room);
            widths[c] += grant;
            distributed += grant;
        }

        if distributed == 0 {
            break;
        }
        extra -= distributed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;
    use crate::table::Separator;

    fn values(block: &DataBlock) -> Vec<Vec<(usize, String)>> {
        block
            .rows()
            .map(|row| {
                row.cells()
                    .map(|(i, c)| (i, c.value().to_string()))
                    .collect()
            })
            .collect()
    }

    fn block(rows: Vec<Row>) -> DataBlock {
        rows.into_iter().collect()
    }

    #[test]
    fn test_column_count_includes_colspan() {
        let mut table = Table::new();
        table
            .set_headers(Row::from_strings(["a", "b"]))
            .add_row(Row::from_cells([Cell::new("x").colspan(2), Cell::new("y")]))
            .add_separator();
        assert_eq!(column_count(&table), 3);
        assert_eq!(column_count(&Table::new()), 0);
    }

    #[test]
    fn test_separator_completion() {
        let mut row = Row::separator(true);
        complete_separator(&mut row, 4);
        assert_eq!(row.len(), 4);
        assert!(
            row.columns()
                .all(|(_, c)| c.content() == &crate::table::Content::Separator(Separator { double: true }))
        );
    }

    #[test]
    fn test_line_breaks_make_synthetic_rows() {
        let rows = block(vec![
            Row::from_strings(["Dante\nAlighieri", "x"]),
            Row::from_strings(["next", "y"]),
        ]);
        let out = Materializer::new(&Markup, 2, None).block(&rows);
        assert_eq!(
            values(&out),
            vec![
                vec![(0, "Dante".to_string()), (1, "x".to_string())],
                vec![(0, "Alighieri".to_string()), (1, String::new())],
                vec![(0, "next".to_string()), (1, "y".to_string())],
            ]
        );
    }

    #[test]
    fn test_rowspan_merges_into_following_row() {
        let rows = block(vec![
            Row::from_cells([Cell::new("tall").rowspan(2), Cell::new("a")]),
            Row::from_strings(["b"]),
        ]);
        let out = Materializer::new(&Markup, 2, None).block(&rows);
        assert_eq!(
            values(&out),
            vec![
                vec![(0, "tall".to_string()), (1, "a".to_string())],
                vec![(0, String::new()), (1, "b".to_string())],
            ]
        );
    }

    #[test]
    fn test_rowspan_splices_when_row_is_full() {
        let rows = block(vec![
            Row::from_cells([Cell::new("tall").rowspan(2), Cell::new("a")]),
            Row::from_strings(["b", "c"]),
        ]);
        let out = Materializer::new(&Markup, 2, None).block(&rows);
        assert_eq!(out.len(), 3);
        assert_eq!(
            values(&out)[1],
            vec![(0, String::new()), (1, String::new())]
        );
        assert_eq!(values(&out)[2], vec![(0, "b".to_string()), (1, "c".to_string())]);
    }

    #[test]
    fn test_rowspan_lines_fill_spanned_rows() {
        let rows = block(vec![
            Row::from_cells([Cell::new("one\ntwo\nthree").rowspan(2), Cell::new("a")]),
            Row::from_strings(["b"]),
        ]);
        let out = Materializer::new(&Markup, 2, None).block(&rows);
        let firsts: Vec<String> = values(&out)
            .into_iter()
            .map(|row| row[0].1.clone())
            .collect();
        assert_eq!(firsts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_rowspan_skips_separator_rows() {
        let rows = block(vec![
            Row::from_cells([Cell::new("tall").rowspan(2), Cell::new("a")]),
            Row::separator(false),
        ]);
        let out = Materializer::new(&Markup, 2, None).block(&rows);
        assert_eq!(out.len(), 3);
        assert!(out.get(2).is_some_and(Row::is_separator));
    }

    #[test]
    fn test_wrapping_uses_content_width() {
        let sizing = Sizing {
            effective: vec![6, 3],
            overhead: vec![2, 2],
            separator: 1,
        };
        let rows = block(vec![Row::from_strings(["abcdefghij", "x"])]);
        let out = Materializer::new(&Markup, 2, Some(&sizing)).block(&rows);
        let firsts: Vec<String> = values(&out).into_iter().map(|row| row[0].1.clone()).collect();
        assert_eq!(firsts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_span_width() {
        let sizing = Sizing {
            effective: vec![5, 7, 3],
            overhead: vec![2, 2, 2],
            separator: 1,
        };
        assert_eq!(sizing.span_width(0, 1), 5);
        assert_eq!(sizing.span_width(0, 2), 13);
        assert_eq!(sizing.span_width(1, 5), 11);
        assert_eq!(sizing.span_width(3, 1), 0);
        assert_eq!(sizing.content_width(0, 3), 15);
    }

    #[test]
    fn test_colspan_grows_columns_proportionally() {
        let rows = block(vec![
            Row::from_strings(["abcd", "abcdefgh"]),
            Row::from_cells([Cell::new("x".repeat(30)).colspan(2)]),
        ]);
        let mut widths = natural_widths(&[&rows], 2, &Markup);
        assert_eq!(widths, vec![4, 8]);
        grow_for_spans(&mut widths, &[&rows], &Markup, &[2, 2], 1, &BTreeMap::new());
        // 30 = w0 + w1 + overhead of the second column + separator
        assert_eq!(widths.iter().sum::<usize>(), 27);
        assert!(widths[1] > widths[0]);
    }

    #[test]
    fn test_colspan_growth_respects_max() {
        let rows = block(vec![Row::from_cells([Cell::new("x".repeat(20)).colspan(2)])]);
        let mut widths = vec![1, 1];
        let max: BTreeMap<usize, usize> = [(0, 3)].into_iter().collect();
        grow_for_spans(&mut widths, &[&rows], &Markup, &[0, 0], 1, &max);
        assert_eq!(widths, vec![3, 16]);
    }
}
