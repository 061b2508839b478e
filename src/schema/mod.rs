//! Declarative schema construction
//!
//! ```
//! use avro_serde_registry::schema::{self, SchemaBuilder};
//!
//! let md5 = schema::fixed()
//!     .namespace("org.acme")
//!     .name("md5")
//!     .size(16)
//!     .aliases(["hash", "fileHash"]);
//!
//! let parsed = md5.parse().unwrap();
//! assert_eq!(schema::type_name(&parsed), "fixed");
//! ```

mod attributes;
mod builder;

use apache_avro::Schema;

pub use attributes::{
    AttributeName, AttributeValue, FieldOrder, SchemaAttribute, SchemaAttributes, Type,
};
pub use builder::{
    ArrayBuilder, EnumBuilder, FieldBuilder, FixedBuilder, MapBuilder, PrimitiveBuilder,
    RecordBuilder, SchemaBuilder, UnionBuilder,
};

// =============================================================================
// Primitive Types
// =============================================================================

pub fn null() -> PrimitiveBuilder {
    PrimitiveBuilder::new("null")
}

pub fn boolean() -> PrimitiveBuilder {
    PrimitiveBuilder::new("boolean")
}

pub fn int() -> PrimitiveBuilder {
    PrimitiveBuilder::new("int")
}

pub fn long() -> PrimitiveBuilder {
    PrimitiveBuilder::new("long")
}

pub fn float() -> PrimitiveBuilder {
    PrimitiveBuilder::new("float")
}

pub fn double() -> PrimitiveBuilder {
    PrimitiveBuilder::new("double")
}

pub fn bytes() -> PrimitiveBuilder {
    PrimitiveBuilder::new("bytes")
}

pub fn string() -> PrimitiveBuilder {
    PrimitiveBuilder::new("string")
}

/// Reference to a named type defined earlier in the same schema
pub fn named(name: &str) -> PrimitiveBuilder {
    PrimitiveBuilder::new(name)
}

// =============================================================================
// Complex Types
// =============================================================================

pub fn record() -> RecordBuilder {
    RecordBuilder::new()
}

pub fn field(name: impl Into<String>, field_type: impl SchemaBuilder) -> FieldBuilder {
    FieldBuilder::new(name, &field_type)
}

pub fn enumeration() -> EnumBuilder {
    EnumBuilder::new()
}

pub fn fixed() -> FixedBuilder {
    FixedBuilder::new()
}

pub fn array() -> ArrayBuilder {
    ArrayBuilder::new()
}

pub fn map() -> MapBuilder {
    MapBuilder::new()
}

pub fn union() -> UnionBuilder {
    UnionBuilder::new()
}

// =============================================================================
// Logical Types
// =============================================================================

pub fn decimal(precision: i64, scale: i64) -> PrimitiveBuilder {
    PrimitiveBuilder::logical("bytes", "decimal")
        .precision(precision)
        .scale(scale)
}

pub fn uuid() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("string", "uuid")
}

pub fn date() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("int", "date")
}

pub fn time_millis() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("int", "time-millis")
}

pub fn time_micros() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("long", "time-micros")
}

pub fn timestamp_millis() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("long", "timestamp-millis")
}

pub fn timestamp_micros() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("long", "timestamp-micros")
}

pub fn local_timestamp_millis() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("long", "local-timestamp-millis")
}

pub fn local_timestamp_micros() -> PrimitiveBuilder {
    PrimitiveBuilder::logical("long", "local-timestamp-micros")
}

/// Twelve byte fixed carrying months, days and milliseconds; still needs a name
pub fn duration() -> FixedBuilder {
    FixedBuilder::new().size(12).logical_type("duration")
}

/// Avro type tag of a parsed schema
pub fn type_name(schema: &Schema) -> &'static str {
    match schema {
        Schema::Null => "null",
        Schema::Boolean => "boolean",
        Schema::Int => "int",
        Schema::Long => "long",
        Schema::Float => "float",
        Schema::Double => "double",
        Schema::Bytes => "bytes",
        Schema::String => "string",
        Schema::Array(_) => "array",
        Schema::Map(_) => "map",
        Schema::Union(_) => "union",
        Schema::Record(_) => "record",
        Schema::Enum(_) => "enum",
        Schema::Fixed(_) => "fixed",
        Schema::Decimal(_) => "decimal",
        Schema::Uuid => "uuid",
        Schema::Date => "date",
        Schema::TimeMillis => "time-millis",
        Schema::TimeMicros => "time-micros",
        Schema::TimestampMillis => "timestamp-millis",
        Schema::TimestampMicros => "timestamp-micros",
        Schema::LocalTimestampMillis => "local-timestamp-millis",
        Schema::LocalTimestampMicros => "local-timestamp-micros",
        Schema::Duration => "duration",
        Schema::Ref { .. } => "ref",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}
