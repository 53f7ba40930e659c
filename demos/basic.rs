//! Basic example demonstrating console_table functionality.

use console_table::prelude::*;
use serde::Serialize;

#[derive(Serialize)]
struct Author {
    name: &'static str,
    born: u16,
}

#[derive(Serialize)]
struct Book {
    title: &'static str,
    author: Author,
    tags: Vec<&'static str>,
}

fn books() -> Table {
    let mut table = Table::new();
    table
        .set_headers(Row::from_strings(["ISBN", "Title", "Author"]))
        .add_row_from_strings(["99921-58-10-7", "[bold]Divine Comedy[/bold]", "Dante Alighieri"])
        .add_row_from_strings(["9971-5-0210-0", "A Tale of Two Cities", "Charles Dickens"])
        .add_separator()
        .add_row_from_strings(["960-425-059-0", "The Lord of the Rings", "J. R. R. Tolkien"])
        .add_row_from_strings(["80-902734-1-6", "And Then There Were None", "Agatha Christie"]);
    table
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut renderer = TableRenderer::new(ConsoleOutput::stdout());

    // Default style
    renderer.set_content(books()).render()?;

    // Named styles with titles
    for name in ["box", "box-double", "compact", "borderless"] {
        let mut table = books();
        table.set_header_title(name).set_footer_title("Page 1/2");
        renderer.set_style_by_name(name)?.set_content(table).render()?;
    }

    // Merged cells and line breaks
    let mut spans = Table::new();
    spans
        .set_headers(Row::from_cells([Cell::new("Main table title").colspan(3)]))
        .add_row(Row::from_cells([
            Cell::new("[green]Dante Alighieri\nDivine Comedy[/green]").rowspan(2),
            Cell::new("99921-58-10-7"),
            Cell::new("1265"),
        ]))
        .add_row(Row::from_cells([Cell::new("Spans two columns").colspan(2)]));
    renderer.set_style_by_name("box")?.set_content(spans).render()?;

    // Narrow column that wraps
    renderer
        .set_style_by_name("default")?
        .set_column_max_width(1, 12)?
        .set_content(books())
        .render()?;

    // Structured data
    let shelf = vec![
        Book {
            title: "Divine Comedy",
            author: Author {
                name: "Dante Alighieri",
                born: 1265,
            },
            tags: vec!["poem", "classic"],
        },
        Book {
            title: "Dune",
            author: Author {
                name: "Frank Herbert",
                born: 1920,
            },
            tags: vec!["novel"],
        },
    ];
    let mut loaded = Table::new();
    loaded.load(&shelf, &[])?;
    renderer.set_style_by_name("box")?.set_content(loaded).render()?;

    Ok(())
}
