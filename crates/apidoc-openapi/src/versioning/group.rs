//! Per-version OpenAPI documents
//!
//! Every declared version gets its own document, keyed by its group name
//! (`v1`, `v2`). A document holds the operations mapped to that version plus
//! every version-neutral operation.

use super::options::ApiVersionSet;
use super::reader::ApiVersionReader;
use super::version::ApiVersion;
use crate::spec::{OpenApiSpec, Operation, Parameter};
use std::collections::{BTreeMap, BTreeSet};

/// One operation mapped to a single API version
#[derive(Debug, Clone)]
pub struct VersionedOperation {
    /// Route templates the operation is reachable under
    pub paths: Vec<String>,
    /// HTTP method
    pub method: String,
    /// Version the operation implements
    pub version: ApiVersion,
    /// Whether the version is deprecated for this operation
    pub deprecated: bool,
    /// Documentation attached at registration
    pub operation: Operation,
}

/// Builds one OpenAPI document per API version group
#[derive(Debug, Clone)]
pub struct VersionedSpecBuilder {
    title: String,
    description: Option<String>,
    reader: ApiVersionReader,
    versions: ApiVersionSet,
    operations: Vec<VersionedOperation>,
    neutral: Vec<(String, String, Operation)>,
}

impl VersionedSpecBuilder {
    /// Create a new builder
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            reader: ApiVersionReader::default(),
            versions: ApiVersionSet::new(),
            operations: Vec::new(),
            neutral: Vec::new(),
        }
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Reader whose facets are documented as parameters
    pub fn reader(mut self, reader: ApiVersionReader) -> Self {
        self.reader = reader;
        self
    }

    /// Add an operation mapped to one version
    pub fn operation(mut self, operation: VersionedOperation) -> Self {
        self.versions
            .insert(operation.version, operation.deprecated);
        self.operations.push(operation);
        self
    }

    /// Add an operation that appears in every group
    pub fn version_neutral(mut self, path: &str, method: &str, operation: Operation) -> Self {
        self.neutral
            .push((path.to_string(), method.to_string(), operation));
        self
    }

    /// Group names that [`build`](Self::build) will produce, ascending by version
    pub fn group_names(&self) -> Vec<String> {
        self.versions
            .all()
            .iter()
            .map(ApiVersion::group_name)
            .collect()
    }

    /// Build every group document
    pub fn build(&self) -> BTreeMap<String, OpenApiSpec> {
        self.versions
            .all()
            .into_iter()
            .map(|version| (version.group_name(), self.build_group(version)))
            .collect()
    }

    fn build_group(&self, version: ApiVersion) -> OpenApiSpec {
        let mut spec = OpenApiSpec::new(self.title.clone(), version.to_string());
        if let Some(desc) = &self.description {
            spec = spec.description(desc.clone());
        }

        let group = version.group_name();
        let segment = self.reader.segment_param().map(|p| format!("{{{}}}", p));

        let mut segmented = Vec::new();
        let mut unversioned = Vec::new();
        for entry in self.operations.iter().filter(|op| op.version == version) {
            for path in &entry.paths {
                let mut operation = entry.operation.clone();
                if entry.deprecated {
                    operation.deprecated = true;
                }

                match &segment {
                    Some(placeholder) if path.contains(placeholder.as_str()) => {
                        let documented = path.replace(placeholder.as_str(), &group);
                        segmented.push((documented, entry.method.as_str(), operation));
                    }
                    _ => {
                        self.add_version_parameters(&mut operation, version);
                        unversioned.push((path.clone(), entry.method.as_str(), operation));
                    }
                }
            }
        }
        let neutral = self
            .neutral
            .iter()
            .map(|(path, method, op)| (path.clone(), method.as_str(), op.clone()));

        // Paths carrying the version keep the registered id; later copies are suffixed.
        let mut ids = BTreeSet::new();
        for (path, method, mut operation) in segmented.into_iter().chain(unversioned).chain(neutral)
        {
            claim_operation_id(&mut ids, &mut operation);
            spec.add_path(&path, method, operation);
        }

        spec
    }

    fn add_version_parameters(&self, operation: &mut Operation, version: ApiVersion) {
        let description = Some(format!("The requested API version (this document: {})", version));

        if let Some(param) = self.reader.query_param() {
            operation.push_parameter(Parameter::string(
                param,
                "query",
                false,
                description.clone(),
            ));
        }
        if let Some(name) = self.reader.header_name() {
            operation.push_parameter(Parameter::string(name, "header", false, description));
        }
    }
}

/// Give `operation` an id not yet used in the document
///
/// A repeated id becomes `{id}_2`, `{id}_3`, and so on. The registered id is
/// kept so annotations still find every copy.
fn claim_operation_id(used: &mut BTreeSet<String>, operation: &mut Operation) {
    let Some(id) = operation.operation_id.clone() else {
        return;
    };
    if used.insert(id.clone()) {
        return;
    }

    let unique = (2..)
        .map(|n| format!("{}_{}", id, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| id.clone());
    used.insert(unique.clone());
    operation.operation_id = Some(unique);
    operation.base_operation_id = Some(id);
}
