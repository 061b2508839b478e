//! Schema construction attributes
//!
//! A [`SchemaAttributes`] collection is the structural accumulator behind every
//! builder. TYPE entries may repeat (one per union branch); every other entry
//! is an "option" that is replayed in insertion order when serializing.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value as JsonValue};

// =============================================================================
// Attribute Names
// =============================================================================

/// Recognized schema construction keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Type,
    Name,
    Namespace,
    Doc,
    Aliases,
    Fields,
    Default,
    Order,
    Size,
    Symbols,
    Items,
    Values,
    Precision,
    Scale,
    LogicalType,
}

impl AttributeName {
    /// Key used in the Avro schema grammar
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Type => "type",
            AttributeName::Name => "name",
            AttributeName::Namespace => "namespace",
            AttributeName::Doc => "doc",
            AttributeName::Aliases => "aliases",
            AttributeName::Fields => "fields",
            AttributeName::Default => "default",
            AttributeName::Order => "order",
            AttributeName::Size => "size",
            AttributeName::Symbols => "symbols",
            AttributeName::Items => "items",
            AttributeName::Values => "values",
            AttributeName::Precision => "precision",
            AttributeName::Scale => "scale",
            AttributeName::LogicalType => "logicalType",
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOrder::Ascending => "ascending",
            FieldOrder::Descending => "descending",
            FieldOrder::Ignore => "ignore",
        }
    }
}

// =============================================================================
// Schema Attribute
// =============================================================================

/// A single named construction instruction
///
/// Each variant knows its own [`AttributeName`] and value shape. Attributes
/// are never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaAttribute {
    /// A type tag, optionally wrapping the full definition of a complex type
    Type {
        tag: String,
        attributes: SchemaAttributes,
    },
    Name(String),
    Namespace(String),
    Doc(String),
    Aliases(Vec<String>),
    /// One attribute collection per record field
    Fields(Vec<SchemaAttributes>),
    Default(JsonValue),
    Order(FieldOrder),
    Size(i64),
    Symbols(Vec<String>),
    /// Type definition of array items
    Items(SchemaAttributes),
    /// Type definition of map values
    Values(SchemaAttributes),
    Precision(i64),
    Scale(i64),
    LogicalType(String),
}

/// Borrowed, tagged view of an attribute's payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue<'a> {
    Text(&'a str),
    Integer(i64),
    TextList(&'a [String]),
    Json(&'a JsonValue),
    Nested(&'a SchemaAttributes),
    NestedList(&'a [SchemaAttributes]),
}

impl SchemaAttribute {
    /// A plain type tag such as `"long"` or a reference to a named type
    pub fn type_tag(tag: impl Into<String>) -> Self {
        SchemaAttribute::Type {
            tag: tag.into(),
            attributes: SchemaAttributes::new(),
        }
    }

    pub fn name(&self) -> AttributeName {
        match self {
            SchemaAttribute::Type { .. } => AttributeName::Type,
            SchemaAttribute::Name(_) => AttributeName::Name,
            SchemaAttribute::Namespace(_) => AttributeName::Namespace,
            SchemaAttribute::Doc(_) => AttributeName::Doc,
            SchemaAttribute::Aliases(_) => AttributeName::Aliases,
            SchemaAttribute::Fields(_) => AttributeName::Fields,
            SchemaAttribute::Default(_) => AttributeName::Default,
            SchemaAttribute::Order(_) => AttributeName::Order,
            SchemaAttribute::Size(_) => AttributeName::Size,
            SchemaAttribute::Symbols(_) => AttributeName::Symbols,
            SchemaAttribute::Items(_) => AttributeName::Items,
            SchemaAttribute::Values(_) => AttributeName::Values,
            SchemaAttribute::Precision(_) => AttributeName::Precision,
            SchemaAttribute::Scale(_) => AttributeName::Scale,
            SchemaAttribute::LogicalType(_) => AttributeName::LogicalType,
        }
    }

    pub fn value(&self) -> AttributeValue<'_> {
        match self {
            SchemaAttribute::Type { tag, .. } => AttributeValue::Text(tag),
            SchemaAttribute::Name(text)
            | SchemaAttribute::Namespace(text)
            | SchemaAttribute::Doc(text)
            | SchemaAttribute::LogicalType(text) => AttributeValue::Text(text),
            SchemaAttribute::Order(order) => AttributeValue::Text(order.as_str()),
            SchemaAttribute::Aliases(list) | SchemaAttribute::Symbols(list) => {
                AttributeValue::TextList(list)
            }
            SchemaAttribute::Size(n)
            | SchemaAttribute::Precision(n)
            | SchemaAttribute::Scale(n) => AttributeValue::Integer(*n),
            SchemaAttribute::Default(json) => AttributeValue::Json(json),
            SchemaAttribute::Items(nested) | SchemaAttribute::Values(nested) => {
                AttributeValue::Nested(nested)
            }
            SchemaAttribute::Fields(fields) => AttributeValue::NestedList(fields),
        }
    }

    /// Nested attributes describing children; empty for scalar attributes
    pub fn attributes(&self) -> &SchemaAttributes {
        static EMPTY: std::sync::OnceLock<SchemaAttributes> = std::sync::OnceLock::new();
        match self {
            SchemaAttribute::Type { attributes, .. } => attributes,
            SchemaAttribute::Items(nested) | SchemaAttribute::Values(nested) => nested,
            _ => EMPTY.get_or_init(SchemaAttributes::new),
        }
    }

    fn serialize_value(&self) -> JsonValue {
        match self.value() {
            AttributeValue::Text(text) => JsonValue::from(text),
            AttributeValue::Integer(n) => JsonValue::from(n),
            AttributeValue::TextList(list) => JsonValue::from(list.to_vec()),
            AttributeValue::Json(json) => json.clone(),
            AttributeValue::Nested(nested) => nested.serialize(),
            AttributeValue::NestedList(list) => {
                JsonValue::Array(list.iter().map(SchemaAttributes::serialize).collect())
            }
        }
    }
}

// =============================================================================
// Type View
// =============================================================================

/// Tag of a TYPE entry whose nested attributes hold union branches
pub(crate) const UNION_TAG: &str = "union";

/// A type tag paired with its nested definition
///
/// Produced on demand from the TYPE entries of a [`SchemaAttributes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Type<'a> {
    tag: &'a str,
    attributes: &'a SchemaAttributes,
}

impl<'a> Type<'a> {
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    pub fn attributes(&self) -> &'a SchemaAttributes {
        self.attributes
    }

    /// Whether this entry wraps the branches of a union
    pub fn is_union(&self) -> bool {
        self.tag == UNION_TAG && !self.attributes.is_empty()
    }

    /// A bare tag serializes to a string, a union to the array of its branches,
    /// and any other wrapped definition to its own structure
    pub fn serialize(&self) -> JsonValue {
        if self.is_union() {
            JsonValue::Array(self.attributes.types().iter().map(Type::serialize).collect())
        } else if self.attributes.is_empty() {
            JsonValue::from(self.tag)
        } else {
            self.attributes.serialize()
        }
    }
}

// =============================================================================
// Schema Attributes
// =============================================================================

/// Insertion-ordered multimap from [`AttributeName`] to attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaAttributes {
    /// All attributes in insertion order
    entries: Vec<SchemaAttribute>,
    /// name -> positions in `entries`
    by_name: HashMap<AttributeName, Vec<usize>>,
    /// Positions of non-TYPE attributes in `entries`
    options: Vec<usize>,
}

impl SchemaAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, recording it as an option unless it is a TYPE
    pub fn add(&mut self, attribute: SchemaAttribute) {
        let position = self.entries.len();
        let name = attribute.name();
        self.by_name.entry(name).or_default().push(position);
        if name != AttributeName::Type {
            self.options.push(position);
        }
        self.entries.push(attribute);
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, attribute: SchemaAttribute) -> Self {
        self.add(attribute);
        self
    }

    /// TYPE entries in declaration order
    pub fn types(&self) -> Vec<Type<'_>> {
        self.positions(AttributeName::Type)
            .iter()
            .filter_map(|&position| match &self.entries[position] {
                SchemaAttribute::Type { tag, attributes } => Some(Type { tag, attributes }),
                _ => None,
            })
            .collect()
    }

    /// Non-TYPE attributes in insertion order
    pub fn options(&self) -> Vec<&SchemaAttribute> {
        self.options.iter().map(|&position| &self.entries[position]).collect()
    }

    pub fn has(&self, name: AttributeName) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Value of the first attribute with the given name
    pub fn get(&self, name: AttributeName) -> Option<AttributeValue<'_>> {
        self.positions(name)
            .first()
            .map(|&position| self.entries[position].value())
    }

    /// Number of distinct attribute names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical nested structure: `type` first, then options in insertion order
    ///
    /// Several TYPE entries serialize to a union array. A collection holding a
    /// single bare type and no options collapses to that type's tag.
    pub fn serialize(&self) -> JsonValue {
        let types = self.types();
        let type_value = match types.as_slice() {
            [] => None,
            [single] => Some(single.serialize()),
            many => Some(JsonValue::Array(many.iter().map(Type::serialize).collect())),
        };

        if self.options.is_empty() {
            return type_value.unwrap_or(JsonValue::Null);
        }

        let mut object = Map::new();
        if let Some(type_value) = type_value {
            object.insert(AttributeName::Type.as_str().to_string(), type_value);
        }
        for option in self.options() {
            object.insert(option.name().as_str().to_string(), option.serialize_value());
        }
        JsonValue::Object(object)
    }

    fn positions(&self, name: AttributeName) -> &[usize] {
        self.by_name.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl FromIterator<SchemaAttribute> for SchemaAttributes {
    fn from_iter<I: IntoIterator<Item = SchemaAttribute>>(iter: I) -> Self {
        let mut attributes = SchemaAttributes::new();
        for attribute in iter {
            attributes.add(attribute);
        }
        attributes
    }
}
