//! Directory-backed schema registry
//!
//! Append-only: schema files and subject versions are written once and
//! never modified. Ids are content-addressed, so registering identical
//! content under any subject yields the id assigned the first time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use apache_avro::Schema;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{definition_checksum, SchemaRegistry};
use crate::checksum::Checksum;
use crate::error::RegistryError;

const SCHEMAS_DIR: &str = "schemas";
const SUBJECTS_DIR: &str = "subjects";

/// All versions registered under one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectManifest {
    pub subject: String,
    /// Versions in registration order, starting at 1
    pub versions: Vec<SubjectVersion>,
}

/// A single registered version of a subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectVersion {
    pub version: u32,
    pub id: i32,
    /// SHA256 of the schema definition
    pub checksum: Checksum,
    pub registered_at: DateTime<Utc>,
}

impl SubjectManifest {
    fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            versions: Vec::new(),
        }
    }

    /// Most recently registered version
    pub fn latest(&self) -> Option<&SubjectVersion> {
        self.versions.last()
    }

    fn find(&self, checksum: &Checksum) -> Option<&SubjectVersion> {
        self.versions.iter().find(|v| &v.checksum == checksum)
    }
}

struct State {
    /// content checksum -> id
    ids: HashMap<Checksum, i32>,
    next_id: i32,
    manifests: HashMap<String, SubjectManifest>,
}

/// Schema registry persisted under a root directory
pub struct DirectoryRegistry {
    root: PathBuf,
    state: Mutex<State>,
}

impl DirectoryRegistry {
    /// Open an existing registry or create a new one
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(root.join(SCHEMAS_DIR))?;
        fs::create_dir_all(root.join(SUBJECTS_DIR))?;

        let state = Self::load(&root)?;
        debug!(
            root = %root.display(),
            schemas = state.ids.len(),
            subjects = state.manifests.len(),
            "opened schema directory"
        );

        Ok(Self {
            root,
            state: Mutex::new(state),
        })
    }

    /// Get the root path of the registry
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All subjects, sorted
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<_> = self.state.lock().manifests.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Manifest of a subject
    pub fn manifest(&self, subject: &str) -> Option<SubjectManifest> {
        self.state.lock().manifests.get(subject).cloned()
    }

    /// Verify every subject version against the checksum of its schema file
    pub fn verify(&self) -> Result<bool, RegistryError> {
        let state = self.state.lock();
        for manifest in state.manifests.values() {
            for version in &manifest.versions {
                let definition = read_definition(&self.schema_path(version.id))?;
                if Checksum::from_json(&definition) != version.checksum {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn load(root: &Path) -> Result<State, RegistryError> {
        let mut ids = HashMap::new();
        let mut max_id = 0;

        for entry in fs::read_dir(root.join(SCHEMAS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("avsc") {
                continue;
            }
            let id: i32 = match path.file_stem().and_then(|s| s.to_str()).map(str::parse) {
                Some(Ok(id)) => id,
                _ => continue,
            };
            let definition = read_definition(&path)?;
            ids.insert(Checksum::from_json(&definition), id);
            max_id = max_id.max(id);
        }

        let mut manifests = HashMap::new();
        for entry in fs::read_dir(root.join(SUBJECTS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let manifest: SubjectManifest = serde_json::from_str(&content).map_err(|e| {
                RegistryError::CorruptDefinition(format!("{}: {}", path.display(), e))
            })?;
            manifests.insert(manifest.subject.clone(), manifest);
        }

        Ok(State {
            ids,
            next_id: max_id + 1,
            manifests,
        })
    }

    fn schema_path(&self, id: i32) -> PathBuf {
        self.root.join(SCHEMAS_DIR).join(format!("{}.avsc", id))
    }

    fn subject_path(&self, subject: &str) -> PathBuf {
        self.root.join(SUBJECTS_DIR).join(format!("{}.json", subject))
    }
}

fn read_definition(path: &Path) -> Result<serde_json::Value, RegistryError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| RegistryError::CorruptDefinition(format!("{}: {}", path.display(), e)))
}

/// Write through a sibling temp file so readers never see a partial file
fn write_atomically(path: &Path, content: &str) -> Result<(), RegistryError> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, content)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Subjects become file names, so path-like names are refused
fn validate_subject(subject: &str) -> Result<(), RegistryError> {
    let unsafe_name = subject.is_empty()
        || subject.starts_with('.')
        || subject.contains(&['/', '\\', '\0'][..]);
    if unsafe_name {
        return Err(RegistryError::Rejected {
            subject: subject.to_string(),
            reason: "subject is not a valid file name".to_string(),
        });
    }
    Ok(())
}

impl SchemaRegistry for DirectoryRegistry {
    fn register(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        validate_subject(subject)?;
        let definition = serde_json::to_value(schema)
            .map_err(|e| RegistryError::CorruptDefinition(e.to_string()))?;
        let checksum = Checksum::from_json(&definition);

        let mut state = self.state.lock();

        let existing = state.ids.get(&checksum).copied();
        let id = match existing {
            Some(id) => id,
            None => {
                let id = state.next_id;
                let content = serde_json::to_string_pretty(&definition)
                    .map_err(|e| RegistryError::CorruptDefinition(e.to_string()))?;
                write_atomically(&self.schema_path(id), &content)?;
                state.ids.insert(checksum.clone(), id);
                state.next_id += 1;
                info!(id, %checksum, "stored new schema");
                id
            }
        };

        let mut manifest = state
            .manifests
            .get(subject)
            .cloned()
            .unwrap_or_else(|| SubjectManifest::new(subject));
        if manifest.find(&checksum).is_some() {
            return Ok(id);
        }

        manifest.versions.push(SubjectVersion {
            version: manifest.versions.len() as u32 + 1,
            id,
            checksum,
            registered_at: Utc::now(),
        });
        let content = serde_json::to_string_pretty(&manifest)
            .map_err(|e| RegistryError::CorruptDefinition(e.to_string()))?;
        // Only a manifest that reached disk becomes visible
        write_atomically(&self.subject_path(subject), &content)?;

        let version = manifest.versions.len();
        state.manifests.insert(subject.to_string(), manifest);
        info!(subject, id, version, "registered subject version");

        Ok(id)
    }

    fn schema_by_id(&self, id: i32) -> Result<Schema, RegistryError> {
        let path = self.schema_path(id);
        if !path.is_file() {
            return Err(RegistryError::SchemaIdNotFound(id));
        }
        let content = fs::read_to_string(&path)?;
        Schema::parse_str(&content)
            .map_err(|e| RegistryError::CorruptDefinition(format!("{}: {}", path.display(), e)))
    }

    fn schema_id(&self, subject: &str, schema: &Schema) -> Result<i32, RegistryError> {
        let checksum = definition_checksum(schema)?;
        let state = self.state.lock();

        let manifest = state
            .manifests
            .get(subject)
            .ok_or_else(|| RegistryError::SubjectNotFound(subject.to_string()))?;

        manifest
            .find(&checksum)
            .map(|v| v.id)
            .ok_or_else(|| RegistryError::SchemaNotFound {
                subject: subject.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record_schema() -> Schema {
        Schema::parse_str(
            r#"{"type": "record", "name": "User", "fields": [{"name": "name", "type": "string"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_create_registry() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        assert!(registry.subjects().is_empty());
        assert!(dir.path().join("schemas").is_dir());
        assert!(dir.path().join("subjects").is_dir());
    }

    #[test]
    fn test_register_and_fetch() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        let schema = record_schema();

        let id = registry.register("users-value", &schema).unwrap();
        assert_eq!(id, 1);
        assert_eq!(registry.register("users-value", &schema).unwrap(), id);
        assert_eq!(registry.schema_by_id(id).unwrap(), schema);
        assert_eq!(registry.schema_id("users-value", &schema).unwrap(), id);

        let manifest = registry.manifest("users-value").unwrap();
        assert_eq!(manifest.versions.len(), 1);
        assert_eq!(manifest.latest().unwrap().id, id);
    }

    #[test]
    fn test_reopen_keeps_state() {
        let dir = tempdir().unwrap();
        let schema = record_schema();
        let id = {
            let registry = DirectoryRegistry::open(dir.path()).unwrap();
            registry.register("users-value", &Schema::String).unwrap();
            registry.register("users-value", &schema).unwrap()
        };

        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        assert_eq!(registry.schema_id("users-value", &schema).unwrap(), id);
        assert_eq!(registry.register("orders-value", &schema).unwrap(), id);
        assert_eq!(registry.register("orders-value", &Schema::Long).unwrap(), 3);
        assert_eq!(registry.manifest("users-value").unwrap().versions.len(), 2);
        assert!(registry.verify().unwrap());
    }

    #[test]
    fn test_unknown_id_and_subject() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();

        assert!(matches!(
            registry.schema_by_id(7),
            Err(RegistryError::SchemaIdNotFound(7))
        ));
        assert!(matches!(
            registry.schema_id("users-value", &Schema::String),
            Err(RegistryError::SubjectNotFound(_))
        ));
    }

    #[test]
    fn test_rejects_path_like_subjects() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();

        for subject in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                registry.register(subject, &Schema::String),
                Err(RegistryError::Rejected { .. })
            ));
        }
    }

    #[test]
    fn test_failed_manifest_write_is_not_committed() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        let blocker = dir.path().join("subjects").join("users-value.json");
        fs::create_dir(&blocker).unwrap();

        assert!(matches!(
            registry.register("users-value", &Schema::String),
            Err(RegistryError::Storage(_))
        ));
        assert!(registry.manifest("users-value").is_none());
        assert!(matches!(
            registry.schema_id("users-value", &Schema::String),
            Err(RegistryError::SubjectNotFound(_))
        ));

        fs::remove_dir(&blocker).unwrap();
        let id = registry.register("users-value", &Schema::String).unwrap();
        assert!(blocker.is_file());

        let reopened = DirectoryRegistry::open(dir.path()).unwrap();
        assert_eq!(reopened.subjects(), vec!["users-value".to_string()]);
        assert_eq!(reopened.schema_id("users-value", &Schema::String).unwrap(), id);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let dir = tempdir().unwrap();
        let registry = DirectoryRegistry::open(dir.path()).unwrap();
        let id = registry.register("users-value", &Schema::String).unwrap();

        fs::write(dir.path().join("schemas").join(format!("{}.avsc", id)), r#""long""#).unwrap();
        assert!(!registry.verify().unwrap());
    }
}
