//! YAML parsing into [`Node`] trees.
//!
//! `serde_yaml` resolves plain scalars into booleans and numbers, which loses the
//! source text (`0.10` becomes `0.1`) and rejects duplicate keys. Parsing runs in
//! two passes instead: the first records the shape of the document, the second
//! walks the same events again and reads every scalar with `deserialize_str`,
//! which yields the scalar exactly as written.

use super::{Mapping, Node};
use crate::error::{DetectError, Result};
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Parse a YAML document into a [`Node`].
pub fn parse_yaml(bytes: &[u8]) -> Result<Node> {
    let shape: Shape = serde_yaml::from_slice(bytes)
        .map_err(|e| DetectError::ParseError(format!("failed to parse YAML: {}", e)))?;

    if let Shape::Null = shape {
        return Ok(Node::Null);
    }

    NodeSeed(&shape)
        .deserialize(serde_yaml::Deserializer::from_slice(bytes))
        .map_err(|e| DetectError::ParseError(format!("failed to parse YAML: {}", e)))
}

/// Parse a YAML document whose top level must be a mapping.
///
/// An empty document is an empty mapping. `name` is used in error messages.
pub fn parse_mapping(bytes: &[u8], name: &str) -> Result<Mapping> {
    match parse_yaml(bytes).map_err(|e| DetectError::ParseError(format!("{}: {}", name, e)))? {
        Node::Mapping(mapping) => Ok(mapping),
        Node::Null => Ok(Mapping::new()),
        _ => Err(DetectError::ParseError(format!(
            "{}: expected a mapping at the top level",
            name
        ))),
    }
}

/// Structure of a document, without scalar values.
///
/// Mapping entries are kept in document order, duplicates included, so the
/// second pass can consume them one to one.
enum Shape {
    Null,
    Scalar,
    Sequence(Vec<Shape>),
    Mapping(Vec<Shape>),
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ShapeVisitor)
    }
}

struct ShapeVisitor;

impl<'de> Visitor<'de> for ShapeVisitor {
    type Value = Shape;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_i128<E: de::Error>(self, _: i128) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_u128<E: de::Error>(self, _: u128) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> std::result::Result<Shape, E> {
        Ok(Shape::Scalar)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Shape, E> {
        Ok(Shape::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Shape, E> {
        Ok(Shape::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Shape, D::Error> {
        Shape::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Shape, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Shape>()? {
            items.push(item);
        }
        Ok(Shape::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Shape, A::Error> {
        let mut values = Vec::new();
        while map.next_key::<IgnoredAny>()?.is_some() {
            values.push(map.next_value::<Shape>()?);
        }
        Ok(Shape::Mapping(values))
    }
}

/// Second pass: builds a [`Node`] guided by a previously recorded [`Shape`].
struct NodeSeed<'s>(&'s Shape);

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Node, D::Error> {
        match self.0 {
            Shape::Null => {
                IgnoredAny::deserialize(d)?;
                Ok(Node::Null)
            }
            Shape::Scalar => d.deserialize_str(RawScalar).map(Node::Scalar),
            Shape::Sequence(items) => d.deserialize_seq(SequenceVisitor(items)),
            Shape::Mapping(values) => d.deserialize_map(MappingVisitor(values)),
        }
    }
}

/// Reads a scalar's source text.
struct RawScalar;

impl Visitor<'_> for RawScalar {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
        Ok(v)
    }
}

struct KeySeed;

impl<'de> DeserializeSeed<'de> for KeySeed {
    type Value = String;

    fn deserialize<D: Deserializer<'de>>(self, d: D) -> std::result::Result<String, D::Error> {
        d.deserialize_str(RawScalar)
    }
}

struct SequenceVisitor<'s>(&'s [Shape]);

impl<'de> Visitor<'de> for SequenceVisitor<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Node, A::Error> {
        let mut items = Vec::with_capacity(self.0.len());
        for shape in self.0 {
            match seq.next_element_seed(NodeSeed(shape))? {
                Some(item) => items.push(item),
                None => return Err(de::Error::invalid_length(items.len(), &self)),
            }
        }
        Ok(Node::Sequence(items))
    }
}

struct MappingVisitor<'s>(&'s [Shape]);

impl<'de> Visitor<'de> for MappingVisitor<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Node, A::Error> {
        let mut mapping = Mapping::with_capacity(self.0.len());
        for shape in self.0 {
            let Some(key) = map.next_key_seed(KeySeed)? else {
                return Err(de::Error::invalid_length(mapping.len(), &self));
            };
            let value = map.next_value_seed(NodeSeed(shape))?;
            // Duplicate keys: the last value wins, the first position is kept.
            mapping.insert(key, value);
        }
        Ok(Node::Mapping(mapping))
    }
}
