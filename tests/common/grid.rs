//! Render helpers and structural checks on rendered grids.

#![allow(dead_code)]

use console_table::{BufferedOutput, Table, TableRenderer, TableStyle};

/// Render `table` with the default style into plain lines.
pub fn render_lines(table: Table) -> Vec<String> {
    render_with(table, |_| {})
}

/// Render `table` after letting `configure` adjust the renderer.
pub fn render_with<F>(table: Table, configure: F) -> Vec<String>
where
    F: FnOnce(&mut TableRenderer<BufferedOutput>),
{
    let mut renderer = TableRenderer::new(BufferedOutput::new());
    renderer.set_content(table);
    configure(&mut renderer);
    renderer.render().expect("buffered output never fails");
    renderer.sink_mut().take_lines()
}

/// Render `table` with one style.
pub fn render_styled(table: Table, style: TableStyle) -> Vec<String> {
    render_with(table, |renderer| {
        renderer.set_style(style);
    })
}

/// Char offsets of `glyph` in a line.
pub fn glyph_positions(line: &str, glyph: char) -> Vec<usize> {
    line.chars()
        .enumerate()
        .filter(|&(_, c)| c == glyph)
        .map(|(i, _)| i)
        .collect()
}

/// Whether a line is a horizontal rule of the default style.
pub fn is_rule(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '-' || c == '+')
}
