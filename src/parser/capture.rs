//! Capture any [`Serialize`] value as a [`Node`] tree.
//!
//! Unlike going through `serde_json::Value`, the capture keeps structs
//! apart from maps, which is what tells a record from a keyed collection.

use std::fmt;

use serde::Serialize;
use serde::ser::{self, Impossible};

/// A captured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `None`, `()` and unit structs.
    Unit,
    /// Any scalar, already formatted.
    Scalar(String),
    /// Sequences and tuples.
    Seq(Vec<Node>),
    /// Maps, in serialization order.
    Map(Vec<(String, Node)>),
    /// Structs: field name → value, in declaration order.
    Record {
        /// Type name.
        name: &'static str,
        /// Serialized fields.
        fields: Vec<(String, Node)>,
    },
}

impl Node {
    /// Fields of a struct or entries of a map.
    #[must_use]
    pub fn fields(&self) -> Option<&[(String, Node)]> {
        match self {
            Self::Map(fields) | Self::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Whether this is a struct.
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }
}

/// Failure while capturing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureError(String);

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CaptureError {}

impl ser::Error for CaptureError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Capture `value`.
///
/// # Errors
///
/// Propagates the value's own serialization errors and rejects map keys
/// that are not scalars.
pub fn capture<T: Serialize + ?Sized>(value: &T) -> Result<Node, CaptureError> {
    value.serialize(NodeSerializer)
}

struct NodeSerializer;

fn scalar(value: impl ToString) -> Result<Node, CaptureError> {
    Ok(Node::Scalar(value.to_string()))
}

fn tagged(variant: &str, node: Node) -> Node {
    Node::Map(vec![(variant.to_string(), node)])
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = CaptureError;
    type SerializeSeq = SeqCapture;
    type SerializeTuple = SeqCapture;
    type SerializeTupleStruct = SeqCapture;
    type SerializeTupleVariant = SeqCapture;
    type SerializeMap = MapCapture;
    type SerializeStruct = RecordCapture;
    type SerializeStructVariant = RecordCapture;

    fn serialize_bool(self, v: bool) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_str(self, v: &str) -> Result<Node, CaptureError> {
        scalar(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, CaptureError> {
        scalar(String::from_utf8_lossy(v))
    }

    fn serialize_none(self) -> Result<Node, CaptureError> {
        Ok(Node::Unit)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, CaptureError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, CaptureError> {
        Ok(Node::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, CaptureError> {
        Ok(Node::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Node, CaptureError> {
        scalar(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, CaptureError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, CaptureError> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqCapture, CaptureError> {
        Ok(SeqCapture {
            items: Vec::with_capacity(len.unwrap_or(0)),
            variant: None,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqCapture, CaptureError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqCapture, CaptureError> {
        Ok(SeqCapture {
            items: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapCapture, CaptureError> {
        Ok(MapCapture {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<RecordCapture, CaptureError> {
        Ok(RecordCapture {
            name,
            fields: Vec::with_capacity(len),
            variant: None,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordCapture, CaptureError> {
        Ok(RecordCapture {
            name,
            fields: Vec::with_capacity(len),
            variant: Some(variant),
        })
    }
}

struct SeqCapture {
    items: Vec<Node>,
    variant: Option<&'static str>,
}

impl SeqCapture {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn finish(self) -> Node {
        let node = Node::Seq(self.items);
        match self.variant {
            Some(variant) => tagged(variant, node),
            None => node,
        }
    }
}

impl ser::SerializeSeq for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        self.push(value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

struct MapCapture {
    entries: Vec<(String, Node)>,
    key: Option<String>,
}

impl ser::SerializeMap for MapCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CaptureError> {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CaptureError> {
        let key = self
            .key
            .take()
            .ok_or_else(|| CaptureError("map value without a key".to_string()))?;
        self.entries.push((key, value.serialize(NodeSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(Node::Map(self.entries))
    }
}

struct RecordCapture {
    name: &'static str,
    fields: Vec<(String, Node)>,
    variant: Option<&'static str>,
}

impl RecordCapture {
    fn push<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), CaptureError> {
        self.fields.push((key.to_string(), value.serialize(NodeSerializer)?));
        Ok(())
    }

    fn finish(self) -> Node {
        let node = Node::Record {
            name: self.name,
            fields: self.fields,
        };
        match self.variant {
            Some(variant) => tagged(variant, node),
            None => node,
        }
    }
}

impl ser::SerializeStruct for RecordCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.push(key, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for RecordCapture {
    type Ok = Node;
    type Error = CaptureError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CaptureError> {
        self.push(key, value)
    }

    fn end(self) -> Result<Node, CaptureError> {
        Ok(self.finish())
    }
}

/// Map keys must be scalars; they become the entry labels.
struct KeySerializer;

fn key_error() -> CaptureError {
    CaptureError("map keys must be scalars".to_string())
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = CaptureError;
    type SerializeSeq = Impossible<String, CaptureError>;
    type SerializeTuple = Impossible<String, CaptureError>;
    type SerializeTupleStruct = Impossible<String, CaptureError>;
    type SerializeTupleVariant = Impossible<String, CaptureError>;
    type SerializeMap = Impossible<String, CaptureError>;
    type SerializeStruct = Impossible<String, CaptureError>;
    type SerializeStructVariant = Impossible<String, CaptureError>;

    fn serialize_bool(self, v: bool) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, CaptureError> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String, CaptureError> {
        Ok(String::from_utf8_lossy(v).into_owned())
    }

    fn serialize_none(self) -> Result<String, CaptureError> {
        Ok(String::new())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CaptureError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, CaptureError> {
        Ok(String::new())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<String, CaptureError> {
        Ok(name.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, CaptureError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, CaptureError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, CaptureError> {
        Err(key_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, CaptureError> {
        Err(key_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, CaptureError> {
        Err(key_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, CaptureError> {
        Err(key_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, CaptureError> {
        Err(key_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, CaptureError> {
        Err(key_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, CaptureError> {
        Err(key_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, CaptureError> {
        Err(key_error())
    }
}
