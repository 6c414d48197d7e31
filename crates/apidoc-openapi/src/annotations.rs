//! Optional documentation annotations loaded from a file
//!
//! The file is JSON keyed by `operationId`:
//!
//! ```json
//! {
//!   "operations": {
//!     "GetUsers": {
//!       "summary": "List users",
//!       "description": "Returns every user.",
//!       "responses": { "200": "The users" }
//!     }
//!   }
//! }
//! ```
//!
//! A missing file is not an error. A file that cannot be read or parsed is
//! reported, and callers are expected to carry on without it.

use crate::spec::{OpenApiSpec, ResponseSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading an annotation file
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to read annotation file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse annotation file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Documentation overrides for a set of operations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub operations: BTreeMap<String, OperationAnnotation>,
}

/// Documentation overrides for one operation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationAnnotation {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Response descriptions keyed by status code
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
}

impl Annotations {
    /// Default location: `<executable name>.annotations.json` next to the
    /// running executable
    pub fn default_path() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        let stem = exe.file_stem()?.to_str()?.to_string();
        Some(exe.with_file_name(format!("{}.annotations.json", stem)))
    }

    /// Load annotations, returning `Ok(None)` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>, AnnotationError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AnnotationError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| AnnotationError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load annotations, logging instead of failing
    pub fn load_or_skip(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(Some(annotations)) => {
                tracing::debug!(
                    path = %path.display(),
                    operations = annotations.operations.len(),
                    "Loaded documentation annotations"
                );
                Some(annotations)
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "No documentation annotations found");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring documentation annotations");
                None
            }
        }
    }

    /// Apply the annotations to the operations of a document
    ///
    /// Entries whose `operationId` is not in the document are ignored.
    pub fn apply(&self, spec: &mut OpenApiSpec) {
        for (operation_id, annotation) in &self.operations {
            for operation in spec.operations_by_id_mut(operation_id) {
                if let Some(summary) = &annotation.summary {
                    operation.summary = Some(summary.clone());
                }
                if let Some(description) = &annotation.description {
                    operation.description = Some(description.clone());
                }
                for (status, description) in &annotation.responses {
                    operation
                        .responses
                        .entry(status.clone())
                        .and_modify(|r| r.description = description.clone())
                        .or_insert_with(|| ResponseSpec::empty(description.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Operation;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "apidoc-openapi-{}-{}.annotations.json",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn spec() -> OpenApiSpec {
        OpenApiSpec::new("Test", "1.0").path(
            "/users",
            "GET",
            Operation::new().operation_id("GetUsers").summary("Original"),
        )
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = std::env::temp_dir().join("apidoc-openapi-does-not-exist.annotations.json");
        assert!(Annotations::load(&path).unwrap().is_none());
        assert!(Annotations::load_or_skip(&path).is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_file("malformed", "{ not json");
        let err = Annotations::load(&path).unwrap_err();
        assert!(matches!(err, AnnotationError::Parse { .. }));
        assert!(Annotations::load_or_skip(&path).is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_apply_overrides_by_operation_id() {
        let path = temp_file(
            "valid",
            r#"{
                "operations": {
                    "GetUsers": {
                        "description": "Returns every user.",
                        "responses": { "200": "The users", "404": "Never" }
                    },
                    "Unknown": { "summary": "ignored" }
                }
            }"#,
        );
        let annotations = Annotations::load(&path).unwrap().unwrap();
        let _ = std::fs::remove_file(path);

        let mut spec = spec();
        annotations.apply(&mut spec);

        let json = spec.to_json();
        let get = &json["paths"]["/users"]["get"];
        assert_eq!(get["summary"], "Original");
        assert_eq!(get["description"], "Returns every user.");
        assert_eq!(get["responses"]["200"]["description"], "The users");
        assert_eq!(get["responses"]["404"]["description"], "Never");
    }
}
