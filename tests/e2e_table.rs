//! End-to-end rendering tests: build a table, render it, check every line.

mod common;

use std::io;

use common::assertions::{assert_eq_logged, assert_err_logged, assert_uniform_width};
use common::grid::{glyph_positions, is_rule, render_lines, render_styled, render_with};
use common::{init_test_logging, test_phase};
use console_table::prelude::*;
use serial_test::serial;

fn books() -> Table {
    let mut table = Table::new();
    table
        .set_headers(Row::from_strings(["ISBN", "Title", "Author"]))
        .add_row_from_strings(["99921-58-10-7", "Divine Comedy", "Dante Alighieri"])
        .add_row_from_strings(["9971-5-0210-0", "A Tale of Two Cities", "Charles Dickens"]);
    table
}

fn builtin(name: &str) -> TableStyle {
    StyleRegistry::with_builtins()
        .get(name)
        .map(|style| (*style).clone())
        .expect("built-in style")
}

/// Sink that fails after accepting a number of lines.
struct FailingSink {
    remaining: usize,
    written: Vec<String>,
}

impl OutputSink for FailingSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.remaining == 0 {
            return Err(io::Error::other("sink closed"));
        }
        self.remaining -= 1;
        self.written.push(line.to_string());
        Ok(())
    }

    fn is_decorated(&self) -> bool {
        false
    }
}

#[test]
fn test_books_default_style() {
    init_test_logging();
    let lines = render_lines(books());
    assert_eq_logged(
        "books table",
        lines,
        vec![
            "+---------------+----------------------+-----------------+".to_string(),
            "| ISBN          | Title                | Author          |".to_string(),
            "+---------------+----------------------+-----------------+".to_string(),
            "| 99921-58-10-7 | Divine Comedy        | Dante Alighieri |".to_string(),
            "| 9971-5-0210-0 | A Tale of Two Cities | Charles Dickens |".to_string(),
            "+---------------+----------------------+-----------------+".to_string(),
        ],
    );
}

#[test]
fn test_colspan_widens_columns() {
    init_test_logging();
    let mut table = Table::new();
    table
        .add_row_from_strings(["ab", "cd"])
        .add_row(Row::from_cells([
            Cell::new("This value spans 2 columns").colspan(2),
        ]));

    let lines = render_lines(table);
    assert_eq!(
        lines,
        vec![
            "+--------------+-------------+",
            "| ab           | cd          |",
            "| This value spans 2 columns |",
            "+--------------+-------------+",
        ]
    );
}

#[test]
fn test_colspan_fits_without_growth() {
    let mut table = books();
    table
        .add_separator()
        .add_row(Row::from_cells([
            Cell::new("This value spans 3 columns.").colspan(3),
        ]));

    let lines = render_lines(table);
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[5], "+---------------+----------------------+-----------------+");
    assert_eq!(
        lines[6],
        "| This value spans 3 columns.                            |"
    );
    assert_uniform_width("colspan 3", &lines);
}

#[test]
fn test_line_break_makes_synthetic_row() {
    let mut table = Table::new();
    table
        .set_headers(Row::from_strings(["Title", "Author"]))
        .add_row_from_strings(["Divine Comedy", "Dante\nAlighieri"]);

    assert_eq!(
        render_lines(table),
        vec![
            "+---------------+-----------+",
            "| Title         | Author    |",
            "+---------------+-----------+",
            "| Divine Comedy | Dante     |",
            "|               | Alighieri |",
            "+---------------+-----------+",
        ]
    );
}

#[test]
fn test_width_bounds_order() {
    init_test_logging();
    let mut renderer = TableRenderer::new(NullOutput);
    renderer
        .set_column_min_width(0, 20)
        .expect("min without max");
    let error = assert_err_logged("max below min", renderer.set_column_max_width(0, 10));
    assert_eq!(
        error.to_string(),
        "minimum width (20) of column 0 must not exceed its maximum width (10)"
    );

    let mut renderer = TableRenderer::new(NullOutput);
    renderer.set_column_max_width(0, 20).expect("max first");
    renderer.set_column_min_width(0, 10).expect("min below max");
    assert_eq!(renderer.column_widths().get(&0), Some(&(Some(10), Some(20))));
}

#[test]
#[serial]
fn test_global_registry_lookup_and_register() {
    init_test_logging();
    let error = assert_err_logged("unknown style", get_style_definition("nonexistent"));
    assert_eq!(error.to_string(), "style \"nonexistent\" is not defined");

    let fire = TableStyle::new()
        .horizontal_border_chars("~", "~")
        .default_crossing_char("*");
    register_style("fire", fire.clone());
    assert_eq!(*get_style_definition("fire").expect("registered"), fire);

    let mut table = Table::new();
    table.add_row_from_strings(["hot"]);
    let lines = render_with(table, |renderer| {
        renderer.set_style_by_name("fire").expect("registered");
    });
    assert_eq!(lines, vec!["*~~~~~*", "| hot |", "*~~~~~*"]);
}

#[test]
fn test_separator_spans_all_columns() {
    let mut table = Table::new();
    table
        .add_row_from_strings(["a", "b", "c"])
        .add_separator()
        .add_row_from_strings(["d", "e", "f"]);

    let lines = render_lines(table.clone());
    assert_eq!(
        lines,
        vec![
            "+---+---+---+",
            "| a | b | c |",
            "+---+---+---+",
            "| d | e | f |",
            "+---+---+---+",
        ]
    );

    let lines = render_styled(table, builtin("box"));
    assert_eq!(lines[2], "├───┼───┼───┤");
}

#[test]
fn test_double_separator() {
    let mut table = Table::new();
    table
        .add_row_from_strings(["a", "b"])
        .add_double_separator()
        .add_row_from_strings(["c", "d"]);
    let lines = render_styled(table, builtin("box-double"));
    assert_eq!(
        lines,
        vec![
            "╔═══╤═══╗",
            "║ a │ b ║",
            "╠═══╪═══╣",
            "║ c │ d ║",
            "╚═══╧═══╝",
        ]
    );
}

#[test]
fn test_box_styles() {
    let _phase = test_phase("box");
    let lines = render_styled(books(), builtin("box"));
    assert_eq!(lines[0], "┌───────────────┬──────────────────────┬─────────────────┐");
    assert_eq!(lines[1], "│ ISBN          │ Title                │ Author          │");
    assert_eq!(lines[2], "├───────────────┼──────────────────────┼─────────────────┤");
    assert_eq!(lines[5], "└───────────────┴──────────────────────┴─────────────────┘");

    let _phase = test_phase("box-double");
    let lines = render_styled(books(), builtin("box-double"));
    assert_eq!(lines[0], "╔═══════════════╤══════════════════════╤═════════════════╗");
    assert_eq!(lines[1], "║ ISBN          │ Title                │ Author          ║");
    assert_eq!(lines[2], "╠═══════════════╪══════════════════════╪═════════════════╣");
    assert_eq!(lines[5], "╚═══════════════╧══════════════════════╧═════════════════╝");
    assert_uniform_width("box-double", &lines);
}

#[test]
fn test_compact_style_has_no_rules() {
    let mut table = Table::new();
    table
        .set_headers(Row::from_strings(["H1", "H2"]))
        .add_row_from_strings(["a", "bb"])
        .add_row_from_strings(["ccc", "d"]);
    let lines = render_styled(table, builtin("compact"));
    assert_eq!(lines, vec!["H1  H2", "a   bb", "ccc d "]);
}

#[test]
fn test_titles_in_box_borders() {
    let mut table = books();
    table.set_header_title("Books").set_footer_title("Page 1/2");
    let lines = render_styled(table, builtin("box"));
    assert_eq!(lines[0], "┌───────────────┬──────── Books ───────┬─────────────────┐");
    assert_eq!(lines[5], "└───────────────┴─────── Page 1/2 ─────┴─────────────────┘");
    assert_uniform_width("titled box", &lines);
}

#[test]
fn test_headers_only_close_with_footer() {
    let mut table = Table::new();
    table
        .set_headers(Row::from_strings(["ISBN", "Title"]))
        .set_footer_title("x");
    let lines = render_lines(table);
    assert_eq!(
        lines,
        vec!["+------+-------+", "| ISBN | Title |", "+----- x ------+"]
    );
}

#[test]
fn test_rowspan_continues_into_next_row() {
    let mut table = Table::new();
    table
        .add_row(Row::from_cells([Cell::new("tall").rowspan(2), Cell::new("a")]))
        .add_row_from_strings(["b"]);
    assert_eq!(
        render_lines(table),
        vec!["+------+---+", "| tall | a |", "|      | b |", "+------+---+"]
    );
}

#[test]
fn test_rowspan_longer_than_table() {
    let mut table = Table::new();
    table.add_row(Row::from_cells([Cell::new("tall").rowspan(3), Cell::new("a")]));
    let lines = render_lines(table);
    assert_eq!(
        lines,
        vec![
            "+------+---+",
            "| tall | a |",
            "|      |   |",
            "|      |   |",
            "+------+---+",
        ]
    );
}

#[test]
fn test_max_width_wraps_and_keeps_markup() {
    let mut table = Table::new();
    table.add_row_from_strings(["[red]abcdef[/red]", "x"]);

    let mut renderer = TableRenderer::new(BufferedOutput::new().decorated(true));
    renderer
        .set_content(table.clone())
        .set_column_max_width(0, 3)
        .expect("valid bounds");
    renderer.render().expect("render");
    let decorated = renderer.sink().lines().to_vec();
    assert_eq!(decorated.len(), 4);
    assert!(decorated[1].contains('\u{1b}'));
    assert!(decorated[2].contains('\u{1b}'));

    let plain = render_with(table, |renderer| {
        renderer.set_column_max_width(0, 3).expect("valid bounds");
    });
    assert_eq!(
        plain,
        vec!["+-----+---+", "| abc | x |", "| def |   |", "+-----+---+"]
    );
}

#[test]
fn test_markup_does_not_count_towards_width() {
    let mut table = Table::new();
    table
        .add_row_from_strings(["[bold]Dante[/bold]"])
        .add_row_from_strings(["Homer"]);
    assert_eq!(
        render_lines(table),
        vec!["+-------+", "| Dante |", "| Homer |", "+-------+"]
    );
}

#[test]
fn test_escaped_brackets_render_literally() {
    let mut table = Table::new();
    table.add_row_from_strings([console_table::markup::escape("[x]")]);
    assert_eq!(render_lines(table), vec!["+-----+", "| [x] |", "+-----+"]);
}

#[test]
fn test_wide_characters_align() {
    let mut table = Table::new();
    table
        .add_row_from_strings(["日本語", "x"])
        .add_row_from_strings(["ab", "y"]);
    let lines = render_lines(table);
    assert_uniform_width("wide chars", &lines);
    assert_eq!(lines[1], "| 日本語 | x |");
    assert_eq!(lines[2], "| ab     | y |");
}

#[test]
fn test_decorated_headers_are_styled() {
    let mut renderer = TableRenderer::new(BufferedOutput::new().decorated(true));
    renderer.set_content(books());
    renderer.render().expect("render");
    let lines = renderer.sink().lines();
    assert!(lines[1].contains('\u{1b}'), "header cells use the header format");
    assert!(!lines[0].contains('\u{1b}'), "plain border format");
    assert!(!lines[3].contains('\u{1b}'), "plain row format");
}

#[test]
fn test_render_is_idempotent() {
    let mut renderer = TableRenderer::new(BufferedOutput::new());
    let mut table = books();
    table
        .add_row(Row::from_cells([Cell::new("x\ny").rowspan(3)]))
        .set_header_title("Books");
    renderer.set_content(table);

    renderer.render().expect("first render");
    let first = renderer.sink_mut().take_lines();
    assert_eq!(renderer.number_of_columns(), 0);
    assert!(renderer.effective_widths().is_empty());

    renderer.render().expect("second render");
    let second = renderer.sink_mut().take_lines();
    assert_eq!(first, second);
    assert!(renderer.effective_widths().is_empty());
}

#[test]
fn test_render_does_not_modify_table() {
    let mut table = Table::new();
    table
        .add_row(Row::from_cells([Cell::new("a\nb").rowspan(2), Cell::new("c")]))
        .add_separator();
    let before = table.clone();
    let mut renderer = TableRenderer::new(NullOutput);
    renderer.set_content(table);
    renderer.render().expect("render");
    assert_eq!(
        renderer.content().map(|t| t.rows().clone()),
        Some(before.rows().clone())
    );
}

#[test]
fn test_sink_error_is_propagated() {
    init_test_logging();
    let sink = FailingSink {
        remaining: 2,
        written: Vec::new(),
    };
    let mut renderer = TableRenderer::new(sink);
    renderer.set_content(books());
    let error = assert_err_logged("failing sink", renderer.render());
    assert_eq!(error.to_string(), "sink closed");
    assert_eq!(renderer.sink().written.len(), 2);
    assert!(renderer.effective_widths().is_empty());
}

#[test]
fn test_empty_table_renders_nothing() {
    assert!(render_lines(Table::new()).is_empty());

    let mut table = Table::new();
    table.add_separator();
    assert!(render_lines(table).is_empty());
}

#[test]
fn test_missing_cells_render_empty() {
    let mut table = Table::new();
    table
        .add_row_from_strings(["a", "b", "c"])
        .add_row_from_strings(["d"]);
    let lines = render_lines(table);
    assert_eq!(lines[2], "| d |   |   |");
    for line in lines.iter().filter(|l| !is_rule(l)) {
        assert_eq!(glyph_positions(line, '|'), vec![0, 4, 8, 12]);
    }
}

#[test]
fn test_measure_reports_effective_widths() {
    let mut renderer = TableRenderer::new(NullOutput);
    renderer.set_content(books()).set_column_width(2, 5);
    assert_eq!(renderer.measure(), vec![15, 22, 7]);
    assert!(renderer.effective_widths().is_empty());
}
