//! Schema registry collaborators
//!
//! The serializer only needs three calls from a registry. Implementations
//! decide on transport, authentication and retries; none of that leaks into
//! the serializer.
//!
//! Two local implementations ship with the crate:
//!
//! - [`InMemoryRegistry`] for tests and single-process pipelines
//! - [`DirectoryRegistry`], an append-only registry on disk:
//!
//! ```text
//! registry/
//! ├── schemas/
//! │   ├── 1.avsc
//! │   └── 2.avsc
//! └── subjects/
//!     ├── users-value.json
//!     └── users-key.json
//! ```

mod directory;
mod memory;

use apache_avro::Schema;

use crate::error::RegistryError;

pub use directory::{DirectoryRegistry, SubjectManifest, SubjectVersion};
pub use memory::InMemoryRegistry;

/// Contract the serializer needs from a schema registry
///
/// Registration must be idempotent: identical schema content registered under
/// the same subject always yields the same id.
pub trait SchemaRegistry: Send + Sync {
    /// Register `schema` under `subject`, returning its id
    fn register(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError>;

    /// Fetch the schema registered with `id`
    fn schema_by_id(&self, id: i32) -> Result<Schema, RegistryError>;

    /// Look up the id of `schema` under `subject` without registering it
    fn schema_id(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError>;
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for std::sync::Arc<R> {
    fn register(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        (**self).register(subject, schema)
    }

    fn schema_by_id(&self, id: i32) -> Result<Schema, RegistryError> {
        (**self).schema_by_id(id)
    }

    fn schema_id(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        (**self).schema_id(subject, schema)
    }
}

/// Checksum of a schema's definition, as used for content addressing
pub(crate) fn definition_checksum(
    schema: &Schema,
) -> Result<crate::checksum::Checksum, RegistryError> {
    crate::checksum::Checksum::from_schema(schema)
        .map_err(|e| RegistryError::CorruptDefinition(e.to_string()))
}
