//! Ordered fallback over several resolvers

use apache_avro::Schema;
use tracing::trace;

use super::SchemaResolver;
use crate::error::{Result, SerdeError};

/// Tries resolvers in order; the first success wins
///
/// A failing resolver only means "try the next one". When the chain is
/// exhausted, value resolution fails with [`SerdeError::SchemaResolution`]
/// while key resolution yields `None`.
///
/// Key schemas are optional, value schemas are not. Callers depend on this
/// asymmetry; do not make the two methods consistent without checking them.
pub struct ChainResolver<T: ?Sized> {
    chain: Vec<Box<dyn SchemaResolver<T>>>,
}

impl<T: ?Sized> ChainResolver<T> {
    pub fn new(chain: Vec<Box<dyn SchemaResolver<T>>>) -> Self {
        Self { chain }
    }

    /// Append a resolver at the lowest priority
    pub fn push(mut self, resolver: impl SchemaResolver<T> + 'static) -> Self {
        self.chain.push(Box::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

impl<T: ?Sized> Default for ChainResolver<T> {
    fn default() -> Self {
        Self { chain: Vec::new() }
    }
}

impl<T: ?Sized> SchemaResolver<T> for ChainResolver<T> {
    fn value_schema_for(&self, record: &T) -> Result<Schema> {
        for (position, resolver) in self.chain.iter().enumerate() {
            match resolver.value_schema_for(record) {
                Ok(schema) => return Ok(schema),
                Err(error) => trace!(position, %error, "value schema resolver failed"),
            }
        }

        Err(SerdeError::SchemaResolution(
            "No schema resolver in the chain is able to resolve the schema for the record"
                .to_string(),
        ))
    }

    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>> {
        for (position, resolver) in self.chain.iter().enumerate() {
            match resolver.key_schema_for(record) {
                Ok(schema) => return Ok(schema),
                Err(error) => trace!(position, %error, "key schema resolver failed"),
            }
        }

        Ok(None)
    }
}
