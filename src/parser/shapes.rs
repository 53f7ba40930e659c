//! Container shapes and their handlers.

use std::fmt;

use super::ParseError;
use super::capture::Node;

/// The container shape of a captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single struct.
    Record,
    /// A sequence of structs or maps.
    List,
    /// A non-empty map whose every value is a struct.
    Keyed,
    /// Any other map, e.g. a decoded JSON object.
    Document,
    /// Scalars and unit values.
    Scalar,
}

impl Shape {
    /// Classify a captured value.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Record { .. } => Self::Record,
            Node::Seq(_) => Self::List,
            Node::Map(entries)
                if !entries.is_empty() && entries.iter().all(|(_, v)| v.is_record()) =>
            {
                Self::Keyed
            }
            Node::Map(_) => Self::Document,
            Node::Unit | Node::Scalar(_) => Self::Scalar,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Record => "record",
            Self::List => "list",
            Self::Keyed => "keyed collection",
            Self::Document => "document",
            Self::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

/// One table row to be: its fields, plus the map key for keyed collections.
#[derive(Debug, Clone, Copy)]
pub struct Item<'a> {
    /// Key of the entry in a keyed collection.
    pub key: Option<&'a str>,
    /// Field name → value.
    pub fields: &'a [(String, Node)],
}

/// Turns a container of one shape into the items that become rows.
pub trait ShapeHandler: Send + Sync {
    /// Items of `node`, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnsupportedShape`] when an element cannot be
    /// turned into a row.
    fn items<'a>(&self, node: &'a Node) -> Result<Vec<Item<'a>>, ParseError>;
}

/// A struct is one row.
#[derive(Debug, Default)]
pub struct RecordHandler;

impl ShapeHandler for RecordHandler {
    fn items<'a>(&self, node: &'a Node) -> Result<Vec<Item<'a>>, ParseError> {
        let fields = node
            .fields()
            .ok_or(ParseError::UnsupportedShape(Shape::of(node)))?;
        Ok(vec![Item { key: None, fields }])
    }
}

/// Each struct or map element is one row; `None` elements are skipped.
#[derive(Debug, Default)]
pub struct ListHandler;

impl ShapeHandler for ListHandler {
    fn items<'a>(&self, node: &'a Node) -> Result<Vec<Item<'a>>, ParseError> {
        let Node::Seq(elements) = node else {
            return Err(ParseError::UnsupportedShape(Shape::of(node)));
        };
        elements
            .iter()
            .filter(|element| !matches!(element, Node::Unit))
            .map(|element| {
                element
                    .fields()
                    .map(|fields| Item { key: None, fields })
                    .ok_or(ParseError::UnsupportedShape(Shape::of(element)))
            })
            .collect()
    }
}

/// Each map entry is one row, led by its key.
#[derive(Debug, Default)]
pub struct KeyedHandler;

impl ShapeHandler for KeyedHandler {
    fn items<'a>(&self, node: &'a Node) -> Result<Vec<Item<'a>>, ParseError> {
        let Node::Map(entries) = node else {
            return Err(ParseError::UnsupportedShape(Shape::of(node)));
        };
        entries
            .iter()
            .map(|(key, value)| {
                value
                    .fields()
                    .map(|fields| Item {
                        key: Some(key.as_str()),
                        fields,
                    })
                    .ok_or(ParseError::UnsupportedShape(Shape::of(value)))
            })
            .collect()
    }
}

/// The whole document is one row; nested objects become nested headers.
#[derive(Debug, Default)]
pub struct DocumentHandler;

impl ShapeHandler for DocumentHandler {
    fn items<'a>(&self, node: &'a Node) -> Result<Vec<Item<'a>>, ParseError> {
        RecordHandler.items(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: Vec<(&str, Node)>) -> Node {
        Node::Record {
            name: "T",
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    fn scalar(value: &str) -> Node {
        Node::Scalar(value.to_string())
    }

    #[test]
    fn test_shape_of() {
        assert_eq!(Shape::of(&record(vec![])), Shape::Record);
        assert_eq!(Shape::of(&Node::Seq(vec![])), Shape::List);
        assert_eq!(
            Shape::of(&Node::Map(vec![("a".into(), record(vec![]))])),
            Shape::Keyed
        );
        assert_eq!(
            Shape::of(&Node::Map(vec![("a".into(), scalar("1"))])),
            Shape::Document
        );
        assert_eq!(Shape::of(&Node::Map(vec![])), Shape::Document);
        assert_eq!(Shape::of(&scalar("x")), Shape::Scalar);
        assert_eq!(Shape::of(&Node::Unit), Shape::Scalar);
    }

    #[test]
    fn test_list_skips_none_and_rejects_scalars() {
        let list = Node::Seq(vec![record(vec![("a", scalar("1"))]), Node::Unit]);
        assert_eq!(ListHandler.items(&list).unwrap().len(), 1);

        let bad = Node::Seq(vec![scalar("1")]);
        assert_eq!(
            ListHandler.items(&bad).unwrap_err(),
            ParseError::UnsupportedShape(Shape::Scalar)
        );
    }

    #[test]
    fn test_keyed_items_carry_keys() {
        let map = Node::Map(vec![
            ("first".into(), record(vec![("a", scalar("1"))])),
            ("second".into(), record(vec![("a", scalar("2"))])),
        ]);
        let keys: Vec<Option<&str>> = KeyedHandler.items(&map).unwrap().iter().map(|i| i.key).collect();
        assert_eq!(keys, vec![Some("first"), Some("second")]);
    }
}
