//! Closure-backed resolver

use apache_avro::Schema;

use super::SchemaResolver;
use crate::error::Result;

type ResolveFn<T> = Box<dyn Fn(&T) -> Result<Schema> + Send + Sync>;

/// Delegates to a value function and an optional key function
///
/// Results are neither cached nor validated.
pub struct CallableResolver<T: ?Sized> {
    value: ResolveFn<T>,
    key: Option<ResolveFn<T>>,
}

impl<T: ?Sized> CallableResolver<T> {
    pub fn new<F>(value: F) -> Self
    where
        F: Fn(&T) -> Result<Schema> + Send + Sync + 'static,
    {
        Self {
            value: Box::new(value),
            key: None,
        }
    }

    pub fn with_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> Result<Schema> + Send + Sync + 'static,
    {
        self.key = Some(Box::new(key));
        self
    }
}

impl<T: ?Sized> SchemaResolver<T> for CallableResolver<T> {
    fn value_schema_for(&self, record: &T) -> Result<Schema> {
        (self.value)(record)
    }

    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>> {
        self.key.as_ref().map(|key| key(record)).transpose()
    }
}
