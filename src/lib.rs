//! Avro SerDe with a Schema Registry
//!
//! Serializes records into a self-describing binary wire format and back,
//! resolving writer schemas through a versioned schema registry instead of
//! embedding them in every message.
//!
//! ## Features
//!
//! - **Schema Builder**: Fluent construction of records, enums, fixed, arrays,
//!   maps, unions and logical types, validated by the Avro parser
//! - **Resolver Chain**: Pluggable strategies deciding which schema governs a record
//! - **Wire Framing**: Magic byte and schema id in front of every Avro payload
//! - **Caching**: One registry round trip per schema for the serializer's lifetime
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────┬────────────────────┬─────────────────────┐
//! │ 0x00 │ schema id (i32 BE) │ Avro binary payload │
//! └──────┴────────────────────┴─────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use apache_avro::types::Value;
//! use avro_serde_registry::schema::{self, SchemaBuilder};
//! use avro_serde_registry::{InMemoryRegistry, RecordSerializer};
//!
//! let user = schema::record()
//!     .name("User")
//!     .field(schema::field("name", schema::string()))
//!     .parse()
//!     .unwrap();
//!
//! let serializer = RecordSerializer::new(Arc::new(InMemoryRegistry::new()));
//! let record = Value::Record(vec![("name".into(), Value::String("ada".into()))]);
//!
//! let message = serializer.encode_record("users-value", &user, record.clone()).unwrap();
//! assert_eq!(serializer.decode_message(&message, None).unwrap(), record);
//! ```

pub mod adapter;
pub mod cache;
pub mod checksum;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod serializer;
pub mod wire;

pub use apache_avro::Schema;

pub use adapter::{ContextEncoder, ContextValue, RecordCodec};
pub use cache::{InMemorySchemaCache, SchemaCache};
pub use checksum::Checksum;
pub use config::SerdeConfig;
pub use error::{RegistryError, Result, SerdeError};
pub use registry::{DirectoryRegistry, InMemoryRegistry, SchemaRegistry};
pub use resolver::{CallableResolver, ChainResolver, SchemaResolver};
pub use serializer::RecordSerializer;
