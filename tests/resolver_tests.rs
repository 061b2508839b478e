//! Resolver Chain Tests
//!
//! Short-circuit and exhaustion behaviour of the chain, and the closure
//! resolver it is usually built from.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use avro_serde_registry::resolver::{CallableResolver, ChainResolver, SchemaResolver};
use avro_serde_registry::{Schema, SerdeError};

const RECORD: &str = "I am a record";

fn string_schema() -> Schema {
    Schema::parse_str(r#"{"type": "string"}"#).unwrap()
}

fn long_schema() -> Schema {
    Schema::parse_str(r#"{"type": "long"}"#).unwrap()
}

/// Resolver with scripted answers that counts its invocations
struct Scripted {
    value: Option<Schema>,
    key: Option<Schema>,
    value_calls: Arc<AtomicUsize>,
    key_calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(value: Option<Schema>, key: Option<Schema>) -> Self {
        Self {
            value,
            key,
            value_calls: Arc::new(AtomicUsize::new(0)),
            key_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self::new(None, None)
    }

    fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::clone(&self.value_calls), Arc::clone(&self.key_calls))
    }
}

impl SchemaResolver<str> for Scripted {
    fn value_schema_for(&self, record: &str) -> avro_serde_registry::Result<Schema> {
        assert_eq!(record, RECORD);
        self.value_calls.fetch_add(1, Ordering::SeqCst);
        self.value
            .clone()
            .ok_or_else(|| SerdeError::SchemaResolution("I am not thrown".to_string()))
    }

    fn key_schema_for(&self, record: &str) -> avro_serde_registry::Result<Option<Schema>> {
        assert_eq!(record, RECORD);
        self.key_calls.fetch_add(1, Ordering::SeqCst);
        match &self.key {
            Some(schema) => Ok(Some(schema.clone())),
            None => Err(SerdeError::SchemaResolution("I am not thrown".to_string())),
        }
    }
}

// =============================================================================
// Chain Resolver
// =============================================================================

#[test]
fn test_chain_exits_early_when_value_schema_resolved() {
    let first = Scripted::new(Some(string_schema()), None);
    let second = Scripted::new(Some(long_schema()), None);
    let (first_calls, _) = first.counters();
    let (second_calls, _) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    assert_eq!(chain.value_schema_for(RECORD).unwrap(), string_schema());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_chain_exits_early_when_key_schema_resolved() {
    let first = Scripted::new(None, Some(string_schema()));
    let second = Scripted::new(None, Some(long_schema()));
    let (_, first_calls) = first.counters();
    let (_, second_calls) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    assert_eq!(chain.key_schema_for(RECORD).unwrap(), Some(string_schema()));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_chain_calls_next_resolver_for_value() {
    let first = Scripted::failing();
    let second = Scripted::new(Some(string_schema()), None);
    let (first_calls, _) = first.counters();
    let (second_calls, _) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    assert_eq!(chain.value_schema_for(RECORD).unwrap(), string_schema());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chain_calls_next_resolver_for_key() {
    let first = Scripted::failing();
    let second = Scripted::new(None, Some(string_schema()));
    let (_, first_calls) = first.counters();
    let (_, second_calls) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    assert_eq!(chain.key_schema_for(RECORD).unwrap(), Some(string_schema()));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chain_fails_for_value_when_no_resolver_has_a_result() {
    let first = Scripted::failing();
    let second = Scripted::failing();
    let (first_calls, _) = first.counters();
    let (second_calls, _) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    match chain.value_schema_for(RECORD) {
        Err(SerdeError::SchemaResolution(message)) => assert_eq!(
            message,
            "No schema resolver in the chain is able to resolve the schema for the record"
        ),
        other => panic!("Expected SchemaResolution, got {:?}", other),
    }
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_chain_returns_none_for_key_when_no_resolver_has_a_result() {
    let first = Scripted::failing();
    let second = Scripted::failing();
    let (_, first_calls) = first.counters();
    let (_, second_calls) = second.counters();

    let chain = ChainResolver::<str>::default().push(first).push(second);

    assert!(chain.key_schema_for(RECORD).unwrap().is_none());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_chain() {
    let chain = ChainResolver::<str>::default();
    assert!(chain.is_empty());
    assert!(matches!(
        chain.value_schema_for(RECORD),
        Err(SerdeError::SchemaResolution(_))
    ));
    assert!(chain.key_schema_for(RECORD).unwrap().is_none());
}

// =============================================================================
// Callable Resolver
// =============================================================================

#[test]
fn test_callable_resolver_for_value_schemas() {
    let resolver = CallableResolver::<str>::new(|_| Ok(string_schema()));

    assert_eq!(resolver.value_schema_for("anyData").unwrap(), string_schema());
    assert!(resolver.key_schema_for("anyData").unwrap().is_none());
}

#[test]
fn test_callable_resolver_for_key_schemas() {
    let resolver =
        CallableResolver::<str>::new(|_| Ok(string_schema())).with_key(|_| Ok(long_schema()));

    assert_eq!(resolver.key_schema_for("anyData").unwrap(), Some(long_schema()));
}

#[test]
fn test_callable_resolvers_in_a_chain() {
    let users: Box<dyn SchemaResolver<str>> = Box::new(CallableResolver::<str>::new(|record: &str| {
        if record.starts_with("user") {
            Ok(string_schema())
        } else {
            Err(SerdeError::SchemaResolution(format!("not a user: {}", record)))
        }
    }));
    let fallback: Box<dyn SchemaResolver<str>> =
        Box::new(CallableResolver::<str>::new(|_| Ok(long_schema())));
    let chain = ChainResolver::new(vec![users, fallback]);

    assert_eq!(chain.len(), 2);
    assert_eq!(chain.value_schema_for("user-1").unwrap(), string_schema());
    assert_eq!(chain.value_schema_for("order-1").unwrap(), long_schema());
}
