//! Fluent schema builders
//!
//! Builders are pure structural accumulators: every setter adds one
//! [`SchemaAttribute`] and nothing is validated until [`SchemaBuilder::parse`]
//! hands the serialized structure to the Avro schema parser.

use std::collections::HashSet;

use apache_avro::types::Value;
use apache_avro::Schema;
use serde_json::{Map, Value as JsonValue};

use super::attributes::{FieldOrder, SchemaAttribute, SchemaAttributes, Type, UNION_TAG};
use crate::error::{Result, SerdeError};

/// Common behaviour of every schema builder
pub trait SchemaBuilder {
    /// Attributes accumulated so far
    fn attributes(&self) -> &SchemaAttributes;

    /// Canonical nested structure matching the Avro schema grammar
    fn serialize(&self) -> JsonValue {
        self.attributes().serialize()
    }

    /// Serialize and validate through the Avro schema parser
    ///
    /// Fixed sizes, field name uniqueness and array/map defaults are checked
    /// here as well, since the parser lets those through.
    fn parse(&self) -> Result<Schema> {
        let definition = self.serialize();
        check_definition(&definition)?;
        let schema = Schema::parse(&definition).map_err(SerdeError::SchemaParse)?;
        check_default(&definition, &schema)?;
        Ok(schema)
    }

    /// The TYPE entries this builder contributes when nested inside another type
    ///
    /// Bare types contribute their tag and anything carrying options a single
    /// entry wrapping its full definition. Unions override this.
    fn type_definition(&self) -> SchemaAttributes {
        let attributes = self.attributes();
        let types = attributes.types();

        if types.len() > 1 || attributes.options().is_empty() {
            return types
                .iter()
                .map(|t| SchemaAttribute::Type {
                    tag: t.tag().to_string(),
                    attributes: t.attributes().clone(),
                })
                .collect();
        }

        let tag = types.first().map(|t| t.tag().to_string()).unwrap_or_default();
        SchemaAttributes::new().with(SchemaAttribute::Type {
            tag,
            attributes: attributes.clone(),
        })
    }
}

fn aliases<I, S>(aliases: I) -> SchemaAttribute
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SchemaAttribute::Aliases(aliases.into_iter().map(Into::into).collect())
}

fn definition_name(object: &Map<String, JsonValue>) -> &str {
    object
        .get("name")
        .and_then(JsonValue::as_str)
        .unwrap_or("<anonymous>")
}

/// Structural checks the Avro parser does not make
fn check_definition(definition: &JsonValue) -> Result<()> {
    let object = match definition {
        JsonValue::Array(branches) => return branches.iter().try_for_each(check_definition),
        JsonValue::Object(object) => object,
        _ => return Ok(()),
    };

    if object.get("type").and_then(JsonValue::as_str) == Some("fixed") {
        if let Some(size) = object.get("size").and_then(JsonValue::as_i64) {
            if size <= 0 {
                return Err(SerdeError::SchemaDefinition(format!(
                    "fixed type {} must have a positive size, got {}",
                    definition_name(object),
                    size
                )));
            }
        }
    }

    if let Some(fields) = object.get("fields").and_then(JsonValue::as_array) {
        let mut seen = HashSet::new();
        for field in fields {
            if let Some(name) = field.get("name").and_then(JsonValue::as_str) {
                if !seen.insert(name) {
                    return Err(SerdeError::SchemaDefinition(format!(
                        "record {} declares field {} more than once",
                        definition_name(object),
                        name
                    )));
                }
            }
            if let Some(field_type) = field.get("type") {
                check_definition(field_type)?;
            }
        }
    }

    for nested in ["items", "values"] {
        if let Some(nested) = object.get(nested) {
            check_definition(nested)?;
        }
    }
    Ok(())
}

/// Arrays and maps carry their own default; it must resolve against the type
fn check_default(definition: &JsonValue, schema: &Schema) -> Result<()> {
    let object = match definition.as_object() {
        Some(object) => object,
        None => return Ok(()),
    };
    let container = matches!(
        object.get("type").and_then(JsonValue::as_str),
        Some("array") | Some("map")
    );

    match object.get("default") {
        Some(default) if container => Value::from(default.clone())
            .resolve(schema)
            .map(|_| ())
            .map_err(|e| {
                SerdeError::SchemaDefinition(format!(
                    "default {} does not match the schema: {}",
                    default, e
                ))
            }),
        _ => Ok(()),
    }
}

// =============================================================================
// Primitive and Logical Types
// =============================================================================

/// A primitive type, a named type reference or a logical type over either
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveBuilder {
    attributes: SchemaAttributes,
}

impl PrimitiveBuilder {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag(tag)),
        }
    }

    pub(crate) fn logical(tag: &str, logical_type: &str) -> Self {
        Self::new(tag).logical_type(logical_type)
    }

    pub fn logical_type(mut self, logical_type: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::LogicalType(logical_type.into()));
        self
    }

    pub fn precision(mut self, precision: i64) -> Self {
        self.attributes.add(SchemaAttribute::Precision(precision));
        self
    }

    pub fn scale(mut self, scale: i64) -> Self {
        self.attributes.add(SchemaAttribute::Scale(scale));
        self
    }
}

impl SchemaBuilder for PrimitiveBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

// =============================================================================
// Records
// =============================================================================

/// A record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBuilder {
    attributes: SchemaAttributes,
    fields: Vec<SchemaAttributes>,
}

impl RecordBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag("record")),
            fields: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Name(name.into()));
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Namespace(namespace.into()));
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Doc(doc.into()));
        self
    }

    pub fn aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.add(aliases(names));
        self
    }

    /// Append a field; fields keep their declaration order
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field.attributes);
        self.refresh_fields();
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldBuilder>) -> Self {
        self.fields.extend(fields.into_iter().map(|f| f.attributes));
        self.refresh_fields();
        self
    }

    // The fields option is re-added at its first position so that appending
    // a field after another option does not reorder the serialized output.
    fn refresh_fields(&mut self) {
        let fields = SchemaAttribute::Fields(self.fields.clone());
        let rebuilt: SchemaAttributes = self
            .attributes
            .types()
            .iter()
            .map(|t| SchemaAttribute::Type {
                tag: t.tag().to_string(),
                attributes: t.attributes().clone(),
            })
            .chain(replace_option(self.attributes.options(), fields))
            .collect();
        self.attributes = rebuilt;
    }
}

fn replace_option(
    options: Vec<&SchemaAttribute>,
    replacement: SchemaAttribute,
) -> Vec<SchemaAttribute> {
    let name = replacement.name();
    let mut replaced = false;
    let mut result = Vec::with_capacity(options.len() + 1);
    for option in options {
        if option.name() == name {
            if !replaced {
                result.push(replacement.clone());
                replaced = true;
            }
        } else {
            result.push(option.clone());
        }
    }
    if !replaced {
        result.push(replacement);
    }
    result
}

impl SchemaBuilder for RecordBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

/// A single record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBuilder {
    attributes: SchemaAttributes,
}

impl FieldBuilder {
    pub(crate) fn new(name: impl Into<String>, field_type: &impl SchemaBuilder) -> Self {
        let mut attributes = SchemaAttributes::new().with(SchemaAttribute::Name(name.into()));
        for attribute in field_type.type_definition().types() {
            attributes.add(SchemaAttribute::Type {
                tag: attribute.tag().to_string(),
                attributes: attribute.attributes().clone(),
            });
        }
        Self { attributes }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Doc(doc.into()));
        self
    }

    pub fn default(mut self, default: impl Into<JsonValue>) -> Self {
        self.attributes.add(SchemaAttribute::Default(default.into()));
        self
    }

    pub fn order(mut self, order: FieldOrder) -> Self {
        self.attributes.add(SchemaAttribute::Order(order));
        self
    }

    pub fn aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.add(aliases(names));
        self
    }

    pub fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }

    pub fn serialize(&self) -> JsonValue {
        self.attributes.serialize()
    }
}

// =============================================================================
// Enums and Fixed
// =============================================================================

/// An enum type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumBuilder {
    attributes: SchemaAttributes,
}

impl EnumBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag("enum")),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Name(name.into()));
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Namespace(namespace.into()));
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Doc(doc.into()));
        self
    }

    pub fn aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.add(aliases(names));
        self
    }

    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.add(SchemaAttribute::Symbols(
            symbols.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn default(mut self, symbol: impl Into<String>) -> Self {
        self.attributes
            .add(SchemaAttribute::Default(JsonValue::String(symbol.into())));
        self
    }
}

impl SchemaBuilder for EnumBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

/// A fixed-length type
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBuilder {
    attributes: SchemaAttributes,
}

impl FixedBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag("fixed")),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Name(name.into()));
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::Namespace(namespace.into()));
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.attributes.add(SchemaAttribute::Size(size));
        self
    }

    pub fn aliases<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.add(aliases(names));
        self
    }

    pub fn logical_type(mut self, logical_type: impl Into<String>) -> Self {
        self.attributes.add(SchemaAttribute::LogicalType(logical_type.into()));
        self
    }
}

impl SchemaBuilder for FixedBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

// =============================================================================
// Arrays, Maps and Unions
// =============================================================================

/// An array type
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayBuilder {
    attributes: SchemaAttributes,
}

impl ArrayBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag("array")),
        }
    }

    pub fn items(mut self, items: impl SchemaBuilder) -> Self {
        self.attributes.add(SchemaAttribute::Items(items.type_definition()));
        self
    }

    pub fn default(mut self, default: impl Into<JsonValue>) -> Self {
        self.attributes.add(SchemaAttribute::Default(default.into()));
        self
    }
}

impl SchemaBuilder for ArrayBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

/// A map type
#[derive(Debug, Clone, PartialEq)]
pub struct MapBuilder {
    attributes: SchemaAttributes,
}

impl MapBuilder {
    pub(crate) fn new() -> Self {
        Self {
            attributes: SchemaAttributes::new().with(SchemaAttribute::type_tag("map")),
        }
    }

    pub fn values(mut self, values: impl SchemaBuilder) -> Self {
        self.attributes.add(SchemaAttribute::Values(values.type_definition()));
        self
    }

    pub fn default(mut self, default: impl Into<JsonValue>) -> Self {
        self.attributes.add(SchemaAttribute::Default(default.into()));
        self
    }
}

impl SchemaBuilder for MapBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }
}

/// A union type; branch order is the resolution priority
///
/// Always serializes to a JSON array, even with a single branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionBuilder {
    /// One TYPE entry per branch
    attributes: SchemaAttributes,
}

impl UnionBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a branch; a nested union contributes each of its branches
    pub fn branch(mut self, branch: impl SchemaBuilder) -> Self {
        for t in branch.type_definition().types() {
            if t.is_union() {
                for inner in t.attributes().types() {
                    self.add_branch(&inner);
                }
            } else {
                self.add_branch(&t);
            }
        }
        self
    }

    fn add_branch(&mut self, branch: &Type<'_>) {
        self.attributes.add(SchemaAttribute::Type {
            tag: branch.tag().to_string(),
            attributes: branch.attributes().clone(),
        });
    }
}

impl SchemaBuilder for UnionBuilder {
    fn attributes(&self) -> &SchemaAttributes {
        &self.attributes
    }

    fn serialize(&self) -> JsonValue {
        JsonValue::Array(self.attributes.types().iter().map(Type::serialize).collect())
    }

    fn type_definition(&self) -> SchemaAttributes {
        SchemaAttributes::new().with(SchemaAttribute::Type {
            tag: UNION_TAG.to_string(),
            attributes: self.attributes.clone(),
        })
    }
}

impl<B: SchemaBuilder + ?Sized> SchemaBuilder for &B {
    fn attributes(&self) -> &SchemaAttributes {
        (**self).attributes()
    }

    fn serialize(&self) -> JsonValue {
        (**self).serialize()
    }

    fn parse(&self) -> Result<Schema> {
        (**self).parse()
    }

    fn type_definition(&self) -> SchemaAttributes {
        (**self).type_definition()
    }
}
