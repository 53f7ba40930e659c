//! Flatten structured data into table headers and rows.
//!
//! Any [`serde::Serialize`] value is captured as a [`Node`] tree, classified
//! by its container [`Shape`] and handed to the [`ShapeHandler`] registered
//! for that shape. Nested records become multi-level headers: each
//! [`HeaderCell`] knows the leaf columns it spans.
//!
//! Field names may carry options after a comma, set with
//! `#[serde(rename = "...")]`:
//!
//! - `"Label,inline"` splices a nested record's fields into the parent level
//! - `"Label,omit"` drops the field
//!
//! Fields whose name starts with `_` are private and skipped unless
//! [`ParserConfig::include_private`] is set.
//!
//! # Example
//!
//! ```
//! use console_table::parser::Parser;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Book {
//!     #[serde(rename = "ISBN")]
//!     isbn: &'static str,
//!     #[serde(rename = "Title")]
//!     title: &'static str,
//! }
//!
//! let books = vec![Book { isbn: "99921-58-10-7", title: "Divine Comedy" }];
//! let parsed = Parser::default().parse(&books, &[]).unwrap();
//! assert_eq!(parsed.leaf_labels(), vec!["ISBN", "Title"]);
//! assert_eq!(parsed.rows, vec![vec!["99921-58-10-7".to_string(), "Divine Comedy".to_string()]]);
//! ```

pub mod capture;
mod shapes;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

pub use capture::{CaptureError, Node, capture};
pub use shapes::{DocumentHandler, Item, KeyedHandler, ListHandler, RecordHandler, Shape, ShapeHandler};

use crate::cells;

/// Errors raised while parsing structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No handler is registered for this container shape.
    UnsupportedShape(Shape),
    /// The value could not be captured.
    Capture(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedShape(shape) => write!(f, "unsupported shape: {shape}"),
            Self::Capture(msg) => write!(f, "failed to capture value: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<CaptureError> for ParseError {
    fn from(err: CaptureError) -> Self {
        Self::Capture(err.to_string())
    }
}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of header levels; deeper records render as one cell.
    pub max_depth: usize,
    /// Include fields whose name starts with `_`.
    pub include_private: bool,
    /// Include only fields whose name carries options (`"label,..."`).
    pub tags_only: bool,
    /// Header of the key column of keyed collections.
    pub key_label: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            include_private: false,
            tags_only: false,
            key_label: "Key".to_string(),
        }
    }
}

impl ParserConfig {
    /// Set the maximum number of header levels (0 counts as 1).
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Set whether private fields are included.
    #[must_use]
    pub fn include_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    /// Set whether only tagged fields are included.
    #[must_use]
    pub fn tags_only(mut self, tags_only: bool) -> Self {
        self.tags_only = tags_only;
        self
    }

    /// Set the header of the key column.
    #[must_use]
    pub fn key_label(mut self, label: impl Into<String>) -> Self {
        self.key_label = label.into();
        self
    }
}

/// One cell of a (possibly multi-level) header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Text shown.
    pub label: String,
    /// Number of leaf columns covered.
    pub colspan: usize,
    /// Number of header levels covered (leaves reach the last level).
    pub rowspan: usize,
    /// Header level, 0 at the top.
    pub depth: usize,
    /// Index of the first leaf column covered.
    pub position: usize,
}

/// Output of [`Parser::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    /// Header cells per level, ordered by position.
    pub headers: Vec<Vec<HeaderCell>>,
    /// One string per leaf column.
    pub rows: Vec<Vec<String>>,
    /// Widest header label or value per leaf column.
    pub column_sizes: Vec<usize>,
}

impl Parsed {
    /// Labels of the leaf columns, left to right.
    #[must_use]
    pub fn leaf_labels(&self) -> Vec<&str> {
        let height = self.headers.len();
        let mut leaves: Vec<&HeaderCell> = self
            .headers
            .iter()
            .flatten()
            .filter(|cell| cell.depth + cell.rowspan == height)
            .collect();
        leaves.sort_by_key(|cell| cell.position);
        leaves.into_iter().map(|cell| cell.label.as_str()).collect()
    }
}

/// A field name split into label and options.
struct FieldTag<'a> {
    label: &'a str,
    inline: bool,
    omit: bool,
    tagged: bool,
    private: bool,
}

fn parse_field_tag(name: &str) -> FieldTag<'_> {
    let (label, options) = match name.split_once(',') {
        Some((label, options)) => (label, Some(options)),
        None => (name, None),
    };
    let has = |wanted: &str| {
        options.is_some_and(|opts| opts.split(',').any(|opt| opt.trim() == wanted))
    };
    FieldTag {
        label: label.trim(),
        inline: has("inline"),
        omit: has("omit"),
        tagged: options.is_some(),
        private: name.starts_with('_'),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderNode {
    label: String,
    children: Vec<HeaderNode>,
}

impl HeaderNode {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(Self::leaf_count).sum()
        }
    }

    fn height(&self) -> usize {
        1 + self.children.iter().map(Self::height).max().unwrap_or(0)
    }
}

/// Union `from` into `into` by label, keeping first-seen order.
fn merge_nodes(into: &mut Vec<HeaderNode>, from: Vec<HeaderNode>) {
    for node in from {
        match into.iter_mut().find(|existing| existing.label == node.label) {
            Some(existing) if !existing.children.is_empty() && !node.children.is_empty() => {
                merge_nodes(&mut existing.children, node.children);
            }
            Some(_) => {}
            None => into.push(node),
        }
    }
}

fn leaf_paths(nodes: &[HeaderNode], prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for node in nodes {
        prefix.push(node.label.clone());
        if node.children.is_empty() {
            out.push(prefix.clone());
        } else {
            leaf_paths(&node.children, prefix, out);
        }
        prefix.pop();
    }
}

fn header_cells(
    nodes: &[HeaderNode],
    depth: usize,
    position: &mut usize,
    height: usize,
    levels: &mut [Vec<HeaderCell>],
) {
    for node in nodes {
        let colspan = node.leaf_count();
        let rowspan = if node.children.is_empty() {
            height - depth
        } else {
            1
        };
        levels[depth].push(HeaderCell {
            label: node.label.clone(),
            colspan,
            rowspan,
            depth,
            position: *position,
        });
        if node.children.is_empty() {
            *position += 1;
        } else {
            header_cells(&node.children, depth + 1, position, height, levels);
        }
    }
}

/// Structured data → headers and rows.
pub struct Parser {
    config: ParserConfig,
    handlers: HashMap<Shape, Box<dyn ShapeHandler>>,
    header_cache: HashMap<String, Vec<HeaderNode>>,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shapes: Vec<String> = self.handlers.keys().map(ToString::to_string).collect();
        shapes.sort();
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("shapes", &shapes)
            .field("cached_shapes", &self.header_cache.len())
            .finish()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Parser {
    /// A parser with handlers for records, lists, keyed collections and
    /// documents.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let mut handlers: HashMap<Shape, Box<dyn ShapeHandler>> = HashMap::new();
        handlers.insert(Shape::Record, Box::new(RecordHandler));
        handlers.insert(Shape::List, Box::new(ListHandler));
        handlers.insert(Shape::Keyed, Box::new(KeyedHandler));
        handlers.insert(Shape::Document, Box::new(DocumentHandler));
        Self {
            config,
            handlers,
            header_cache: HashMap::new(),
        }
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Register (or replace) the handler of a shape.
    pub fn register_handler(
        &mut self,
        shape: Shape,
        handler: Box<dyn ShapeHandler>,
    ) -> Option<Box<dyn ShapeHandler>> {
        self.handlers.insert(shape, handler)
    }

    /// Remove the handler of a shape.
    pub fn remove_handler(&mut self, shape: Shape) -> Option<Box<dyn ShapeHandler>> {
        self.handlers.remove(&shape)
    }

    /// Number of distinct record shapes whose headers are cached.
    #[must_use]
    pub fn cached_shapes(&self) -> usize {
        self.header_cache.len()
    }

    /// Flatten `value` into headers, rows and column sizes.
    ///
    /// `filters` lists the top-level labels to keep; empty keeps all.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Capture`] when `value` fails to serialize and
    /// [`ParseError::UnsupportedShape`] when no handler takes its shape.
    pub fn parse<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
        filters: &[&str],
    ) -> Result<Parsed, ParseError> {
        let node = capture(value)?;
        self.parse_node(&node, filters)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Capture`] for invalid JSON, otherwise as
    /// [`Parser::parse`].
    #[cfg(feature = "json")]
    pub fn parse_json(&mut self, text: &str, filters: &[&str]) -> Result<Parsed, ParseError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| ParseError::Capture(err.to_string()))?;
        self.parse(&value, filters)
    }

    /// Flatten an already captured value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedShape`] when no handler takes the
    /// shape of `node` or of one of its elements.
    pub fn parse_node(&mut self, node: &Node, filters: &[&str]) -> Result<Parsed, ParseError> {
        let shape = Shape::of(node);
        let handler = self
            .handlers
            .get(&shape)
            .ok_or(ParseError::UnsupportedShape(shape))?;
        let items = handler.items(node)?;
        log::debug!("parsing {shape} with {} items", items.len());

        let mut tree = Vec::new();
        for item in &items {
            let nodes = self.headers_for(item.fields);
            merge_nodes(&mut tree, nodes);
        }
        if !filters.is_empty() {
            tree.retain(|node| filters.contains(&node.label.as_str()));
        }

        let mut paths = Vec::new();
        leaf_paths(&tree, &mut Vec::new(), &mut paths);

        let keyed = items.iter().any(|item| item.key.is_some());
        if keyed {
            tree.insert(0, HeaderNode::leaf(self.config.key_label.clone()));
        }
        if tree.is_empty() {
            return Ok(Parsed::default());
        }

        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|item| self.row_for(item, keyed, &paths))
            .collect();

        let height = tree.iter().map(HeaderNode::height).max().unwrap_or(1);
        let mut headers = vec![Vec::new(); height];
        header_cells(&tree, 0, &mut 0, height, &mut headers);

        let mut parsed = Parsed {
            headers,
            rows,
            column_sizes: Vec::new(),
        };
        let column_sizes = column_sizes(&parsed.leaf_labels(), &parsed.rows);
        parsed.column_sizes = column_sizes;
        Ok(parsed)
    }

    /// Header tree of one record, cached by the record's shape.
    fn headers_for(&mut self, fields: &[(String, Node)]) -> Vec<HeaderNode> {
        let mut signature = String::new();
        signature_of(fields, &mut signature);
        if let Some(cached) = self.header_cache.get(&signature) {
            log::trace!("header cache hit for {signature}");
            return cached.clone();
        }
        let nodes = self.header_nodes(fields, 0);
        self.header_cache.insert(signature, nodes.clone());
        nodes
    }

    fn visible<'a>(
        &self,
        fields: &'a [(String, Node)],
    ) -> impl Iterator<Item = (FieldTag<'a>, &'a Node)> {
        fields.iter().filter_map(|(name, value)| {
            let tag = parse_field_tag(name);
            let hidden = tag.omit
                || (tag.private && !self.config.include_private)
                || (self.config.tags_only && !tag.tagged);
            (!hidden).then_some((tag, value))
        })
    }

    /// Whether a nested record at `depth` gets its own header level.
    fn expands(&self, nested: &[(String, Node)], depth: usize) -> bool {
        depth + 1 < self.config.max_depth.max(1) && self.visible(nested).next().is_some()
    }

    fn header_nodes(&self, fields: &[(String, Node)], depth: usize) -> Vec<HeaderNode> {
        let mut nodes = Vec::new();
        for (tag, value) in self.visible(fields) {
            match value.fields() {
                Some(nested) if tag.inline => {
                    let spliced = self.header_nodes(nested, depth);
                    merge_nodes(&mut nodes, spliced);
                }
                Some(nested) if self.expands(nested, depth) => {
                    let node = HeaderNode {
                        label: tag.label.to_string(),
                        children: self.header_nodes(nested, depth + 1),
                    };
                    merge_nodes(&mut nodes, vec![node]);
                }
                _ => merge_nodes(&mut nodes, vec![HeaderNode::leaf(tag.label)]),
            }
        }
        nodes
    }

    fn row_for(&self, item: &Item<'_>, keyed: bool, paths: &[Vec<String>]) -> Vec<String> {
        let mut values = HashMap::new();
        self.flatten_values(item.fields, 0, &mut Vec::new(), &mut values);

        let mut row = Vec::with_capacity(paths.len() + usize::from(keyed));
        if keyed {
            row.push(item.key.unwrap_or_default().to_string());
        }
        row.extend(paths.iter().map(|path| values.remove(path).unwrap_or_default()));
        row
    }

    fn flatten_values(
        &self,
        fields: &[(String, Node)],
        depth: usize,
        prefix: &mut Vec<String>,
        out: &mut HashMap<Vec<String>, String>,
    ) {
        for (tag, value) in self.visible(fields) {
            match value.fields() {
                Some(nested) if tag.inline => self.flatten_values(nested, depth, prefix, out),
                Some(nested) if self.expands(nested, depth) => {
                    prefix.push(tag.label.to_string());
                    self.flatten_values(nested, depth + 1, prefix, out);
                    prefix.pop();
                }
                _ => {
                    let mut path = prefix.clone();
                    path.push(tag.label.to_string());
                    out.entry(path).or_insert_with(|| self.render_value(value));
                }
            }
        }
    }

    /// Text of a value that gets a single cell.
    fn render_value(&self, node: &Node) -> String {
        match node {
            Node::Unit => String::new(),
            Node::Scalar(value) => value.clone(),
            Node::Seq(items) => items
                .iter()
                .map(|item| self.render_value(item))
                .collect::<Vec<_>>()
                .join(", "),
            Node::Map(fields) | Node::Record { fields, .. } => {
                let entries: Vec<String> = self
                    .visible(fields)
                    .map(|(tag, value)| format!("{}: {}", tag.label, self.render_value(value)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

/// Widest of the label and the values of each column.
fn column_sizes(labels: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|value| cells::max_line_len(value))
                .fold(cells::max_line_len(label), usize::max)
        })
        .collect()
}

/// Field names and value kinds, recursively.
fn signature_of(fields: &[(String, Node)], out: &mut String) {
    for (name, value) in fields {
        out.push_str(name);
        match value.fields() {
            Some(nested) => {
                out.push('{');
                signature_of(nested, out);
                out.push('}');
            }
            None => out.push(';'),
        }
    }
}
