//! In-process schema registry

use std::collections::HashMap;

use apache_avro::Schema;
use parking_lot::RwLock;
use tracing::debug;

use super::{definition_checksum, SchemaRegistry};
use crate::checksum::Checksum;
use crate::error::RegistryError;

#[derive(Default)]
struct State {
    /// id -> schema
    schemas: HashMap<i32, Schema>,
    /// content checksum -> id, shared across subjects
    ids: HashMap<Checksum, i32>,
    /// subject -> registered ids, oldest first
    subjects: HashMap<String, Vec<i32>>,
}

/// Content-addressed registry held in memory
#[derive(Default)]
pub struct InMemoryRegistry {
    state: RwLock<State>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All subjects, sorted
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<_> = self.state.read().subjects.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Ids registered under `subject`, oldest first
    pub fn versions(&self, subject: &str) -> Vec<i32> {
        self.state
            .read()
            .subjects
            .get(subject)
            .cloned()
            .unwrap_or_default()
    }
}

impl SchemaRegistry for InMemoryRegistry {
    fn register(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        let checksum = definition_checksum(schema)?;
        let mut state = self.state.write();

        let existing = state.ids.get(&checksum).copied();
        let id = match existing {
            Some(id) => id,
            None => {
                let id = state.ids.len() as i32 + 1;
                state.ids.insert(checksum, id);
                state.schemas.insert(id, schema.clone());
                debug!(subject, id, "registered new schema");
                id
            }
        };

        let versions = state.subjects.entry(subject.to_string()).or_default();
        if !versions.contains(&id) {
            versions.push(id);
        }
        Ok(id)
    }

    fn schema_by_id(&self, id: i32) -> Result<Schema, RegistryError> {
        self.state
            .read()
            .schemas
            .get(&id)
            .cloned()
            .ok_or(RegistryError::SchemaIdNotFound(id))
    }

    fn schema_id(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        let checksum = definition_checksum(schema)?;
        let state = self.state.read();

        let versions = state
            .subjects
            .get(subject)
            .ok_or_else(|| RegistryError::SubjectNotFound(subject.to_string()))?;

        state
            .ids
            .get(&checksum)
            .copied()
            .filter(|id| versions.contains(id))
            .ok_or_else(|| RegistryError::SchemaNotFound {
                subject: subject.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: &str) -> Schema {
        Schema::parse_str(json).unwrap()
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = InMemoryRegistry::new();
        let string = schema(r#""string""#);

        let first = registry.register("users-value", &string).unwrap();
        let second = registry.register("users-value", &string).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.versions("users-value"), vec![first]);
    }

    #[test]
    fn test_same_content_shares_id_across_subjects() {
        let registry = InMemoryRegistry::new();
        let string = schema(r#""string""#);

        let users = registry.register("users-value", &string).unwrap();
        let orders = registry.register("orders-value", &string).unwrap();
        let long = registry.register("orders-value", &schema(r#""long""#)).unwrap();

        assert_eq!(users, orders);
        assert_ne!(users, long);
        assert_eq!(registry.subjects(), vec!["orders-value", "users-value"]);
        assert_eq!(registry.versions("orders-value"), vec![orders, long]);
    }

    #[test]
    fn test_lookup() {
        let registry = InMemoryRegistry::new();
        let string = schema(r#""string""#);
        let id = registry.register("users-value", &string).unwrap();

        assert_eq!(registry.schema_by_id(id).unwrap(), string);
        assert_eq!(registry.schema_id("users-value", &string).unwrap(), id);
        assert!(matches!(
            registry.schema_id("users-value", &schema(r#""long""#)),
            Err(RegistryError::SchemaNotFound { .. })
        ));
        assert!(matches!(
            registry.schema_id("missing", &string),
            Err(RegistryError::SubjectNotFound(_))
        ));
        assert!(matches!(
            registry.schema_by_id(42),
            Err(RegistryError::SchemaIdNotFound(42))
        ));
    }
}
