//! Record serializer
//!
//! Resolves schema ids through the registry, frames Avro payloads with them
//! and reverses the process on decode. Both lookups are cached for the
//! lifetime of the serializer, so a given `(subject, schema)` pair or schema
//! id costs one registry round trip.

use std::sync::Arc;

use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::{InMemorySchemaCache, SchemaCache};
use crate::checksum::Checksum;
use crate::config::{SerdeConfig, SerializerConfig};
use crate::error::{RegistryError, Result, SerdeError};
use crate::registry::SchemaRegistry;
use crate::resolver::SchemaResolver;
use crate::wire;

/// Encodes records into schema-id framed Avro messages and back
pub struct RecordSerializer {
    registry: Arc<dyn SchemaRegistry>,
    cache: Arc<dyn SchemaCache>,
    options: SerializerConfig,
}

impl RecordSerializer {
    /// Serializer with an in-memory cache and default options
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self {
            registry,
            cache: Arc::new(InMemorySchemaCache::new()),
            options: SerializerConfig::default(),
        }
    }

    /// Serializer over the registry and options described by `config`
    pub fn from_config(config: &SerdeConfig) -> Result<Self> {
        Ok(Self::new(config.build_registry()?).with_options(config.serializer.clone()))
    }

    pub fn with_options(mut self, options: SerializerConfig) -> Self {
        self.options = options;
        self
    }

    /// Replace the cache, e.g. to share one between serializers
    pub fn with_cache(mut self, cache: Arc<dyn SchemaCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn options(&self) -> &SerializerConfig {
        &self.options
    }

    /// Encode `record` against `writer_schema`, registering the schema under `subject`
    pub fn encode_record(
        &self,
        subject: &str,
        writer_schema: &Schema,
        record: Value,
    ) -> Result<Vec<u8>> {
        if subject.is_empty() {
            return Err(SerdeError::InvalidConfiguration(
                "subject must not be empty".to_string(),
            ));
        }

        let schema_id = self.schema_id_for(subject, writer_schema)?;
        let payload = to_avro_datum(writer_schema, record).map_err(SerdeError::Encoding)?;
        trace!(subject, schema_id, bytes = payload.len(), "encoded record");

        Ok(wire::frame(schema_id, &payload))
    }

    /// Decode a framed message, optionally projecting it onto `reader_schema`
    ///
    /// The payload must hold exactly one datum; trailing bytes are malformed.
    pub fn decode_message(
        &self,
        message: &[u8],
        reader_schema: Option<&Schema>,
    ) -> Result<Value> {
        let (schema_id, mut payload) = wire::unframe(message)?;
        let writer_schema = self.schema_for_id(schema_id)?;

        let value =
            from_avro_datum(&writer_schema, &mut payload, None).map_err(SerdeError::Decoding)?;
        if !payload.is_empty() {
            return Err(SerdeError::MalformedWireFormat(format!(
                "{} trailing bytes after the Avro payload of schema {}",
                payload.len(),
                schema_id
            )));
        }

        match reader_schema {
            None => Ok(value),
            Some(reader_schema) => value
                .resolve(reader_schema)
                .map_err(SerdeError::SchemaResolutionMismatch),
        }
    }

    /// Encode any serde-serializable record
    pub fn encode<T: Serialize>(
        &self,
        subject: &str,
        writer_schema: &Schema,
        record: &T,
    ) -> Result<Vec<u8>> {
        let value = apache_avro::to_value(record).map_err(SerdeError::Encoding)?;
        self.encode_record(subject, writer_schema, value)
    }

    /// Decode into any serde-deserializable type
    pub fn decode<T: DeserializeOwned>(
        &self,
        message: &[u8],
        reader_schema: Option<&Schema>,
    ) -> Result<T> {
        let value = self.decode_message(message, reader_schema)?;
        apache_avro::from_value(&value).map_err(SerdeError::Decoding)
    }

    /// Encode `record` with the value schema `resolver` picks for it
    pub fn encode_resolved<T, R>(&self, subject: &str, record: &T, resolver: &R) -> Result<Vec<u8>>
    where
        T: Serialize,
        R: SchemaResolver<T> + ?Sized,
    {
        let writer_schema = resolver.value_schema_for(record)?;
        self.encode(subject, &writer_schema, record)
    }

    fn schema_id_for(&self, subject: &str, schema: &Schema) -> Result<i32> {
        let checksum = Checksum::from_schema(schema)?;
        if let Some(id) = self.cache.schema_id(subject, &checksum) {
            trace!(subject, id, "schema id cache hit");
            return Ok(id);
        }

        let id = self.fetch_schema_id(subject, schema)?;
        debug!(subject, id, "resolved schema id from registry");

        self.cache.cache_schema_id(subject, checksum, id);
        self.cache.cache_schema(id, Arc::new(schema.clone()));
        Ok(id)
    }

    fn fetch_schema_id(&self, subject: &str, schema: &Schema) -> Result<i32> {
        let SerializerConfig {
            register_missing_schemas,
            register_missing_subjects,
        } = self.options;

        if register_missing_schemas && register_missing_subjects {
            return Ok(self.registry.register(subject, schema)?);
        }

        match self.registry.schema_id(subject, schema) {
            Ok(id) => Ok(id),
            Err(RegistryError::SubjectNotFound(_)) if register_missing_subjects => {
                Ok(self.registry.register(subject, schema)?)
            }
            Err(RegistryError::SchemaNotFound { .. }) if register_missing_schemas => {
                Ok(self.registry.register(subject, schema)?)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn schema_for_id(&self, id: i32) -> Result<Arc<Schema>> {
        if let Some(schema) = self.cache.schema(id) {
            trace!(id, "schema cache hit");
            return Ok(schema);
        }

        let schema = Arc::new(self.registry.schema_by_id(id)?);
        debug!(id, "fetched schema from registry");
        self.cache.cache_schema(id, Arc::clone(&schema));
        Ok(schema)
    }
}
