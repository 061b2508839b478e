//! Resolves schemas declared by the record type itself

use std::marker::PhantomData;

use apache_avro::Schema;

use super::SchemaResolver;
use crate::error::{Result, SerdeError};

/// Records that carry their own schema definitions
pub trait HasSchemaDefinition {
    /// JSON definition of the value schema
    fn value_schema_json() -> &'static str;

    /// JSON definition of the key schema, if keys are schema-bound
    fn key_schema_json() -> Option<&'static str> {
        None
    }
}

/// Parses the definitions a [`HasSchemaDefinition`] type declares
pub struct DefinitionResolver<T> {
    _record: PhantomData<fn(&T)>,
}

impl<T> DefinitionResolver<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for DefinitionResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HasSchemaDefinition> SchemaResolver<T> for DefinitionResolver<T> {
    fn value_schema_for(&self, _record: &T) -> Result<Schema> {
        Schema::parse_str(T::value_schema_json()).map_err(SerdeError::SchemaParse)
    }

    fn key_schema_for(&self, _record: &T) -> Result<Option<Schema>> {
        T::key_schema_json()
            .map(|json| Schema::parse_str(json).map_err(SerdeError::SchemaParse))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Heartbeat;

    impl HasSchemaDefinition for Heartbeat {
        fn value_schema_json() -> &'static str {
            r#"{"type": "record", "name": "Heartbeat", "fields": [{"name": "beat", "type": "long"}]}"#
        }
    }

    struct Keyed;

    impl HasSchemaDefinition for Keyed {
        fn value_schema_json() -> &'static str {
            r#""string""#
        }

        fn key_schema_json() -> Option<&'static str> {
            Some(r#""long""#)
        }
    }

    #[test]
    fn test_value_definition() {
        let resolver = DefinitionResolver::<Heartbeat>::new();
        let schema = resolver.value_schema_for(&Heartbeat).unwrap();
        assert_eq!(crate::schema::type_name(&schema), "record");
        assert!(resolver.key_schema_for(&Heartbeat).unwrap().is_none());
    }

    #[test]
    fn test_key_definition() {
        let resolver = DefinitionResolver::<Keyed>::new();
        assert_eq!(resolver.key_schema_for(&Keyed).unwrap(), Some(Schema::Long));
    }
}
