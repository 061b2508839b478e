//! Schema resolution
//!
//! A resolver decides which writer schema governs a record, and optionally
//! which schema governs its key. Resolvers are expected to be side-effect
//! free so they can be shared between threads.

mod callable;
mod chain;
mod definition;
mod file;

use apache_avro::Schema;

use crate::error::Result;

pub use callable::CallableResolver;
pub use chain::ChainResolver;
pub use definition::{DefinitionResolver, HasSchemaDefinition};
pub use file::FileResolver;

/// Yields the schemas governing a record of type `T`
pub trait SchemaResolver<T: ?Sized>: Send + Sync {
    /// Writer schema for the record's value
    fn value_schema_for(&self, record: &T) -> Result<Schema>;

    /// Schema for the record's key; `Ok(None)` when keys are not schema-bound
    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>>;
}

impl<T: ?Sized, R: SchemaResolver<T> + ?Sized> SchemaResolver<T> for Box<R> {
    fn value_schema_for(&self, record: &T) -> Result<Schema> {
        (**self).value_schema_for(record)
    }

    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>> {
        (**self).key_schema_for(record)
    }
}

impl<T: ?Sized, R: SchemaResolver<T> + ?Sized> SchemaResolver<T> for std::sync::Arc<R> {
    fn value_schema_for(&self, record: &T) -> Result<Schema> {
        (**self).value_schema_for(record)
    }

    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>> {
        (**self).key_schema_for(record)
    }
}
