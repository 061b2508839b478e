//! Resolves schemas from `.avsc` files in a directory

use std::fs;
use std::path::{Path, PathBuf};

use apache_avro::Schema;

use super::SchemaResolver;
use crate::error::{Result, SerdeError};

type Inflector<T> = Box<dyn Fn(&T, bool) -> String + Send + Sync>;

/// Maps a record to a schema file through an inflector
///
/// The inflector receives the record and whether the key schema is wanted,
/// and returns a file name relative to the base directory. A missing value
/// schema file is a resolution failure; a missing key schema file is not.
pub struct FileResolver<T: ?Sized> {
    base_dir: PathBuf,
    inflector: Inflector<T>,
}

impl<T: ?Sized> FileResolver<T> {
    pub fn new<F>(base_dir: impl AsRef<Path>, inflector: F) -> Self
    where
        F: Fn(&T, bool) -> String + Send + Sync + 'static,
    {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            inflector: Box::new(inflector),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, record: &T, is_key: bool) -> PathBuf {
        self.base_dir.join((self.inflector)(record, is_key))
    }
}

fn read_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)?;
    Schema::parse_str(&content).map_err(SerdeError::SchemaParse)
}

impl<T: ?Sized> SchemaResolver<T> for FileResolver<T> {
    fn value_schema_for(&self, record: &T) -> Result<Schema> {
        let path = self.file_path(record, false);
        if !path.is_file() {
            return Err(SerdeError::SchemaResolution(format!(
                "Schema for inflected file \"{}\" does not exist",
                path.display()
            )));
        }
        read_schema(&path)
    }

    fn key_schema_for(&self, record: &T) -> Result<Option<Schema>> {
        let path = self.file_path(record, true);
        if !path.is_file() {
            return Ok(None);
        }
        read_schema(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn inflect(record: &str, is_key: bool) -> String {
        if is_key {
            format!("{}-key.avsc", record)
        } else {
            format!("{}.avsc", record)
        }
    }

    #[test]
    fn test_resolves_value_and_key_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("user.avsc"), r#"{"type": "string"}"#).unwrap();
        fs::write(dir.path().join("user-key.avsc"), r#"{"type": "long"}"#).unwrap();

        let resolver = FileResolver::<str>::new(dir.path(), inflect);

        assert_eq!(resolver.value_schema_for("user").unwrap(), Schema::String);
        assert_eq!(resolver.key_schema_for("user").unwrap(), Some(Schema::Long));
    }

    #[test]
    fn test_missing_files() {
        let dir = tempdir().unwrap();
        let resolver = FileResolver::<str>::new(dir.path(), inflect);

        assert!(matches!(
            resolver.value_schema_for("order"),
            Err(SerdeError::SchemaResolution(_))
        ));
        assert!(resolver.key_schema_for("order").unwrap().is_none());
    }

    #[test]
    fn test_invalid_schema_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.avsc"), r#"{"type": "fixed"}"#).unwrap();
        let resolver = FileResolver::<str>::new(dir.path(), inflect);

        assert!(matches!(
            resolver.value_schema_for("broken"),
            Err(SerdeError::SchemaParse(_))
        ));
    }
}
