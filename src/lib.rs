//! # console_table
//!
//! Aligned, bordered terminal tables with merged cells and inline markup.
//!
//! A [`Table`] holds header rows and data rows of [`Cell`]s. Cells may span
//! several columns or rows, contain line breaks and carry bracket markup
//! such as `[bold red]text[/]`. A [`TableRenderer`] computes the column
//! widths, wraps what does not fit and writes the result line by line to an
//! [`OutputSink`].
//!
//! ## Quick Start
//!
//! ```rust
//! use console_table::prelude::*;
//!
//! let mut table = Table::new();
//! table
//!     .set_headers(Row::from_strings(["ISBN", "Title", "Author"]))
//!     .add_row_from_strings(["99921-58-10-7", "Divine Comedy", "Dante Alighieri"])
//!     .add_separator()
//!     .add_row(Row::from_cells([Cell::new("This value spans 3 columns.").colspan(3)]));
//!
//! let mut renderer = TableRenderer::new(BufferedOutput::new());
//! renderer.set_style_by_name("box")?.set_content(table);
//! renderer.render()?;
//! print!("{}", renderer.sink().contents());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Table**: headers and rows, pure data
//! - **TableStyle**: border glyphs, crossings and format templates
//! - **StyleRegistry**: named styles, with a process-wide instance
//! - **TableRenderer**: layout and emission to a sink
//! - **Parser**: turns any `serde::Serialize` value into headers and rows
//!
//! ## Features
//!
//! - `json`: parse JSON documents with [`Parser::parse_json`]
//! - `tracing`: a `tracing` span around every render

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cells;
pub mod error;
pub mod markup;
pub mod output;
pub mod parser;
pub mod registry;
pub mod render;
pub mod style;
pub mod sync;
pub mod table;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::markup::{Decorator, Markup, PlainText};
    pub use crate::output::{BufferedOutput, ConsoleOutput, NullOutput, OutputSink};
    pub use crate::parser::{ParseError, Parser, ParserConfig};
    pub use crate::registry::{StyleRegistry, get_style_definition, register_style};
    pub use crate::render::TableRenderer;
    pub use crate::style::{Crossings, PadType, TableStyle};
    pub use crate::table::{Cell, DataBlock, Row, Separator, Table};
}

// Re-export key types at crate root
pub use error::ConfigError;
pub use markup::{Decorator, Markup, PlainText};
pub use output::{BufferedOutput, ConsoleOutput, NullOutput, OutputSink};
pub use parser::{ParseError, Parser, ParserConfig};
pub use registry::{StyleRegistry, get_style_definition, register_style};
pub use render::TableRenderer;
pub use style::{Crossings, PadType, TableStyle};
pub use table::{Cell, DataBlock, Row, Separator, Table};
