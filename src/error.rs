//! Error types for serialization, schema building and registry access

use thiserror::Error;

/// Result type for serializer operations
pub type Result<T> = std::result::Result<T, SerdeError>;

/// Serializer errors
#[derive(Error, Debug)]
pub enum SerdeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Schema parse error: {0}")]
    SchemaParse(#[source] apache_avro::Error),

    /// Definition accepted by the Avro parser but still not a usable schema
    #[error("Schema parse error: {0}")]
    SchemaDefinition(String),

    #[error("Schema resolution failed: {0}")]
    SchemaResolution(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Malformed wire format: {0}")]
    MalformedWireFormat(String),

    #[error("Record does not conform to the writer schema: {0}")]
    Encoding(#[source] apache_avro::Error),

    #[error("Could not decode payload with the writer schema: {0}")]
    Decoding(#[source] apache_avro::Error),

    #[error("Writer schema cannot be resolved against the reader schema: {0}")]
    SchemaResolutionMismatch(#[source] apache_avro::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SerdeError {
    /// Whether a schema definition was rejected, by the Avro parser or by
    /// the checks the builders add on top of it
    pub fn is_schema_parse(&self) -> bool {
        matches!(
            self,
            SerdeError::SchemaParse(_) | SerdeError::SchemaDefinition(_)
        )
    }
}

/// Errors reported by a schema registry collaborator
///
/// Transport failures and rejections are distinct variants here but reach
/// callers of the serializer as a single [`SerdeError::Registry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Schema not registered under subject {subject}")]
    SchemaNotFound { subject: String },

    #[error("Schema id not found: {0}")]
    SchemaIdNotFound(i32),

    #[error("Registration rejected for subject {subject}: {reason}")]
    Rejected { subject: String, reason: String },

    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Registry storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Corrupt schema definition: {0}")]
    CorruptDefinition(String),
}

impl RegistryError {
    /// Whether the registry does not know the subject or the schema under it
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::SubjectNotFound(_) | RegistryError::SchemaNotFound { .. }
        )
    }
}
