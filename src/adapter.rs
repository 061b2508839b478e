//! Context-driven encode/decode boundary
//!
//! Host frameworks usually hand over an untyped context map alongside the
//! data. [`ContextEncoder`] validates that map and translates it into the two
//! typed operations of a [`RecordCodec`]. Invalid contexts are rejected before
//! the codec (and therefore the registry) is touched.

use std::collections::HashMap;

use apache_avro::types::Value;
use apache_avro::Schema;

use crate::error::{Result, SerdeError};
use crate::serializer::RecordSerializer;

/// The only format tag this encoder handles
pub const FORMAT_AVRO: &str = "avro";

/// Context key holding the writer schema on encode
pub const CONTEXT_ENCODE_WRITERS_SCHEMA: &str = "writers_schema";

/// Context key holding the subject on encode
pub const CONTEXT_ENCODE_SUBJECT: &str = "subject";

/// Context key holding the optional reader schema on decode
pub const CONTEXT_DECODE_READERS_SCHEMA: &str = "readers_schema";

/// A value in a host-supplied context map
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Schema(Schema),
    Text(String),
    Json(serde_json::Value),
}

pub type Context = HashMap<String, ContextValue>;

/// The typed operations a [`ContextEncoder`] drives
pub trait RecordCodec {
    fn encode_record(
        &self,
        subject: &str,
        writer_schema: &Schema,
        record: Value,
    ) -> Result<Vec<u8>>;

    fn decode_message(&self, message: &[u8], reader_schema: Option<&Schema>) -> Result<Value>;
}

impl RecordCodec for RecordSerializer {
    fn encode_record(
        &self,
        subject: &str,
        writer_schema: &Schema,
        record: Value,
    ) -> Result<Vec<u8>> {
        RecordSerializer::encode_record(self, subject, writer_schema, record)
    }

    fn decode_message(&self, message: &[u8], reader_schema: Option<&Schema>) -> Result<Value> {
        RecordSerializer::decode_message(self, message, reader_schema)
    }
}

/// Translates context maps into typed [`RecordCodec`] calls
pub struct ContextEncoder<C> {
    codec: C,
}

impl<C: RecordCodec> ContextEncoder<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn supports_format(&self, format: &str) -> bool {
        format == FORMAT_AVRO
    }

    pub fn supports_encoding(&self, format: &str) -> bool {
        self.supports_format(format)
    }

    pub fn supports_decoding(&self, format: &str) -> bool {
        self.supports_format(format)
    }

    /// Encode `data` with the writer schema and subject found in `context`
    pub fn encode(&self, data: Value, format: &str, context: &Context) -> Result<Vec<u8>> {
        self.check_format(format)?;

        let writer_schema = match context.get(CONTEXT_ENCODE_WRITERS_SCHEMA) {
            Some(ContextValue::Schema(schema)) => schema,
            Some(_) => {
                return Err(invalid(CONTEXT_ENCODE_WRITERS_SCHEMA, "must be a parsed schema"))
            }
            None => return Err(invalid(CONTEXT_ENCODE_WRITERS_SCHEMA, "is missing")),
        };
        let subject = match context.get(CONTEXT_ENCODE_SUBJECT) {
            Some(ContextValue::Text(subject)) if !subject.is_empty() => subject,
            Some(ContextValue::Text(_)) => {
                return Err(invalid(CONTEXT_ENCODE_SUBJECT, "must not be empty"))
            }
            Some(_) => return Err(invalid(CONTEXT_ENCODE_SUBJECT, "must be a string")),
            None => return Err(invalid(CONTEXT_ENCODE_SUBJECT, "is missing")),
        };

        self.codec.encode_record(subject, writer_schema, data)
    }

    /// Decode `data`, resolving against the reader schema in `context` if present
    pub fn decode(&self, data: &[u8], format: &str, context: &Context) -> Result<Value> {
        self.check_format(format)?;

        let reader_schema = match context.get(CONTEXT_DECODE_READERS_SCHEMA) {
            Some(ContextValue::Schema(schema)) => Some(schema),
            Some(_) => {
                return Err(invalid(CONTEXT_DECODE_READERS_SCHEMA, "must be a parsed schema"))
            }
            None => None,
        };

        self.codec.decode_message(data, reader_schema)
    }

    fn check_format(&self, format: &str) -> Result<()> {
        if self.supports_format(format) {
            Ok(())
        } else {
            Err(SerdeError::InvalidConfiguration(format!(
                "unsupported format \"{}\"",
                format
            )))
        }
    }
}

fn invalid(key: &str, problem: &str) -> SerdeError {
    SerdeError::InvalidConfiguration(format!("context entry \"{}\" {}", key, problem))
}
