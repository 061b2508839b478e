//! Id and schema caches shared by a serializer
//!
//! Entries are never evicted; the number of distinct schemas a process sees
//! is expected to stay small compared to the number of messages.

use std::collections::HashMap;
use std::sync::Arc;

use apache_avro::Schema;
use parking_lot::RwLock;

use crate::checksum::Checksum;

/// Thread-safe store for `(subject, schema) -> id` and `id -> schema`
pub trait SchemaCache: Send + Sync {
    fn schema_id(&self, subject: &str, checksum: &Checksum) -> Option<i32>;

    fn cache_schema_id(&self, subject: &str, checksum: Checksum, id: i32);

    fn schema(&self, id: i32) -> Option<Arc<Schema>>;

    fn cache_schema(&self, id: i32, schema: Arc<Schema>);
}

/// [`SchemaCache`] over two lock-guarded hash maps
#[derive(Default)]
pub struct InMemorySchemaCache {
    ids: RwLock<HashMap<(String, Checksum), i32>>,
    schemas: RwLock<HashMap<i32, Arc<Schema>>>,
}

impl InMemorySchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached `(subject, schema)` ids
    pub fn id_count(&self) -> usize {
        self.ids.read().len()
    }

    /// Number of cached schemas
    pub fn schema_count(&self) -> usize {
        self.schemas.read().len()
    }
}

impl SchemaCache for InMemorySchemaCache {
    fn schema_id(&self, subject: &str, checksum: &Checksum) -> Option<i32> {
        self.ids
            .read()
            .get(&(subject.to_string(), checksum.clone()))
            .copied()
    }

    fn cache_schema_id(&self, subject: &str, checksum: Checksum, id: i32) {
        self.ids.write().insert((subject.to_string(), checksum), id);
    }

    fn schema(&self, id: i32) -> Option<Arc<Schema>> {
        self.schemas.read().get(&id).cloned()
    }

    fn cache_schema(&self, id: i32, schema: Arc<Schema>) {
        self.schemas.write().entry(id).or_insert(schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_keyed_by_subject() {
        let cache = InMemorySchemaCache::new();
        let checksum = Checksum::from_schema(&Schema::String).unwrap();

        cache.cache_schema_id("users-value", checksum.clone(), 1);

        assert_eq!(cache.schema_id("users-value", &checksum), Some(1));
        assert_eq!(cache.schema_id("orders-value", &checksum), None);
        assert_eq!(cache.id_count(), 1);
    }

    #[test]
    fn test_first_cached_schema_wins() {
        let cache = InMemorySchemaCache::new();
        cache.cache_schema(1, Arc::new(Schema::String));
        cache.cache_schema(1, Arc::new(Schema::Long));

        assert_eq!(cache.schema(1).as_deref(), Some(&Schema::String));
        assert!(cache.schema(2).is_none());
        assert_eq!(cache.schema_count(), 1);
    }
}
