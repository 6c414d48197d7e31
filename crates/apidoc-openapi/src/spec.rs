//! OpenAPI specification types

use crate::schemas::{ErrorBodySchema, ErrorSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API information for OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI specification builder
#[derive(Debug, Clone)]
pub struct OpenApiSpec {
    pub info: ApiInfo,
    pub paths: BTreeMap<String, PathItem>,
    pub schemas: BTreeMap<String, serde_json::Value>,
}

/// Path item in OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Operations of this path item, keyed by upper-case method
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", self.get.as_ref()),
            ("POST", self.post.as_ref()),
            ("PUT", self.put.as_ref()),
            ("PATCH", self.patch.as_ref()),
            ("DELETE", self.delete.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }

    fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        [
            self.get.as_mut(),
            self.post.as_mut(),
            self.put.as_mut(),
            self.patch.as_mut(),
            self.delete.as_mut(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Operation (endpoint) in OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ResponseSpec>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub deprecated: bool,
    /// Component schemas referenced by this operation
    #[serde(skip)]
    pub(crate) components: BTreeMap<String, serde_json::Value>,
    /// Registered id when `operation_id` was renamed to stay unique
    #[serde(skip)]
    pub(crate) base_operation_id: Option<String>,
}

/// Parameter in OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: SchemaRef,
}

impl Parameter {
    /// A string parameter at the given location
    pub fn string(
        name: impl Into<String>,
        location: impl Into<String>,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            required,
            description,
            schema: SchemaRef::Inline(serde_json::json!({ "type": "string" })),
        }
    }
}

/// Request body in OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

/// Media type in OpenAPI spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

/// Response specification
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResponseSpec {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

impl ResponseSpec {
    /// A response without a body
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
        }
    }

    /// A JSON response with the given schema
    pub fn json(description: impl Into<String>, schema: SchemaRef) -> Self {
        let mut content = BTreeMap::new();
        content.insert("application/json".to_string(), MediaType { schema });
        Self {
            description: description.into(),
            content: Some(content),
        }
    }
}

/// Schema reference or inline schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(serde_json::Value),
}

impl SchemaRef {
    /// Reference to a component schema
    pub fn component(name: &str) -> Self {
        Self::Ref {
            reference: format!("#/components/schemas/{}", name),
        }
    }

    /// Inline array of a component schema
    pub fn array_of(name: &str) -> Self {
        Self::Inline(serde_json::json!({
            "type": "array",
            "items": { "$ref": format!("#/components/schemas/{}", name) }
        }))
    }
}

impl OpenApiSpec {
    /// Create a new OpenAPI specification
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ApiInfo {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            paths: BTreeMap::new(),
            schemas: BTreeMap::new(),
        }
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.info.description = Some(desc.into());
        self
    }

    /// Add a path operation
    ///
    /// Component schemas the operation references are registered as well.
    pub fn path(mut self, path: &str, method: &str, operation: Operation) -> Self {
        self.add_path(path, method, operation);
        self
    }

    /// Add a path operation in place
    pub fn add_path(&mut self, path: &str, method: &str, operation: Operation) {
        for (name, schema) in &operation.components {
            self.schemas
                .entry(name.clone())
                .or_insert_with(|| schema.clone());
        }

        let item = self.paths.entry(path.to_string()).or_default();
        match method.to_uppercase().as_str() {
            "GET" => item.get = Some(operation),
            "POST" => item.post = Some(operation),
            "PUT" => item.put = Some(operation),
            "PATCH" => item.patch = Some(operation),
            "DELETE" => item.delete = Some(operation),
            _ => {}
        }
    }

    /// Add a schema definition
    pub fn schema(mut self, name: &str, schema: serde_json::Value) -> Self {
        self.schemas.insert(name.to_string(), schema);
        self
    }

    /// Register a type that implements Schema (utoipa::ToSchema)
    pub fn register<T: for<'a> utoipa::ToSchema<'a>>(mut self) -> Self {
        if let Some((name, schema)) = schema_json::<T>() {
            self.schemas.insert(name, schema);
        }
        self
    }

    /// Operations carrying the given `operationId`
    ///
    /// One handler mounted on several paths shares its id across them.
    pub fn operations_by_id_mut<'a>(
        &'a mut self,
        operation_id: &'a str,
    ) -> impl Iterator<Item = &'a mut Operation> + 'a {
        self.paths
            .values_mut()
            .flat_map(PathItem::operations_mut)
            .filter(move |op| {
                op.base_operation_id.as_deref().or(op.operation_id.as_deref())
                    == Some(operation_id)
            })
    }

    /// Operation ids in path order, repeated ids included
    pub fn operation_ids(&self) -> Vec<&str> {
        self.paths
            .values()
            .flat_map(PathItem::operations)
            .filter_map(|(_, op)| op.operation_id.as_deref())
            .collect()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        let mut spec = serde_json::json!({
            "openapi": "3.0.3",
            "info": self.info,
            "paths": self.paths,
        });

        if !self.schemas.is_empty() {
            spec["components"] = serde_json::json!({
                "schemas": self.schemas
            });
        }

        spec
    }
}

impl Operation {
    /// Create a new operation
    pub fn new() -> Self {
        Self {
            operation_id: None,
            summary: None,
            description: None,
            tags: None,
            parameters: None,
            request_body: None,
            responses: BTreeMap::from([(
                "200".to_string(),
                ResponseSpec::empty("Successful response"),
            )]),
            deprecated: false,
            components: BTreeMap::new(),
            base_operation_id: None,
        }
    }

    /// Set the operation id
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Set summary
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add tags
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Add a single tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    /// Mark the operation deprecated
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Add a parameter unless one with the same name and location exists
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.push_parameter(parameter);
        self
    }

    pub(crate) fn push_parameter(&mut self, parameter: Parameter) {
        let params = self.parameters.get_or_insert_with(Vec::new);
        let exists = params
            .iter()
            .any(|p| p.location == parameter.location && p.name == parameter.name);
        if !exists {
            params.push(parameter);
        }
    }

    /// Set the response for a status code
    pub fn response(mut self, status: u16, response: ResponseSpec) -> Self {
        self.responses.insert(status.to_string(), response);
        self
    }

    /// Document a JSON response whose body is `T`
    pub fn json_response<T: for<'a> utoipa::ToSchema<'a>>(
        mut self,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        let name = self.register_component::<T>();
        self.response(status, ResponseSpec::json(description, SchemaRef::component(&name)))
    }

    /// Document a JSON response whose body is an array of `T`
    pub fn json_array_response<T: for<'a> utoipa::ToSchema<'a>>(
        mut self,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        let name = self.register_component::<T>();
        self.response(status, ResponseSpec::json(description, SchemaRef::array_of(&name)))
    }

    /// Document a 400 response using the standard error body
    pub fn bad_request_response(mut self, description: impl Into<String>) -> Self {
        let name = self.register_component::<ErrorSchema>();
        self.register_component::<ErrorBodySchema>();
        self.response(400, ResponseSpec::json(description, SchemaRef::component(&name)))
    }

    fn register_component<T: for<'a> utoipa::ToSchema<'a>>(&mut self) -> String {
        match schema_json::<T>() {
            Some((name, schema)) => {
                self.components.insert(name.clone(), schema);
                name
            }
            None => T::schema().0.to_string(),
        }
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_json<T: for<'a> utoipa::ToSchema<'a>>() -> Option<(String, serde_json::Value)> {
    let (name, schema) = T::schema();
    serde_json::to_value(schema)
        .ok()
        .map(|json| (name.to_string(), json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::ToSchema;

    #[derive(ToSchema)]
    #[allow(dead_code)]
    struct Widget {
        id: i32,
        label: String,
    }

    #[test]
    fn test_json_array_response_registers_component() {
        let op = Operation::new()
            .operation_id("ListWidgets")
            .json_array_response::<Widget>(200, "Widgets")
            .bad_request_response("Bad Request");

        let spec = OpenApiSpec::new("Widgets", "1.0").path("/widgets", "get", op);
        let json = spec.to_json();

        assert_eq!(json["openapi"], "3.0.3");
        let get = &json["paths"]["/widgets"]["get"];
        assert_eq!(get["operationId"], "ListWidgets");
        assert_eq!(
            get["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
            "#/components/schemas/Widget"
        );
        assert_eq!(
            get["responses"]["400"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ErrorSchema"
        );
        assert!(json["components"]["schemas"]["Widget"].is_object());
        assert!(json["components"]["schemas"]["ErrorBodySchema"].is_object());
    }

    #[test]
    fn test_parameters_are_deduplicated() {
        let op = Operation::new()
            .parameter(Parameter::string("version", "query", false, None))
            .parameter(Parameter::string("version", "query", false, None))
            .parameter(Parameter::string("version", "header", false, None));

        assert_eq!(op.parameters.map(|p| p.len()), Some(2));
    }

    #[test]
    fn test_deprecated_flag_serialization() {
        let json = serde_json::to_value(Operation::new()).unwrap();
        assert!(json.get("deprecated").is_none());

        let json = serde_json::to_value(Operation::new().deprecated()).unwrap();
        assert_eq!(json["deprecated"], true);
    }

    #[test]
    fn test_operation_lookup_by_id() {
        let mut spec = OpenApiSpec::new("T", "1.0")
            .path("/a", "GET", Operation::new().operation_id("A"))
            .path("/b", "DELETE", Operation::new().operation_id("B"));

        assert_eq!(spec.operations_by_id_mut("B").count(), 1);
        assert_eq!(spec.operations_by_id_mut("C").count(), 0);
    }

    #[test]
    fn test_renamed_operation_found_by_registered_id() {
        let mut renamed = Operation::new().operation_id("A_2");
        renamed.base_operation_id = Some("A".to_string());
        let mut spec = OpenApiSpec::new("T", "1.0")
            .path("/a", "GET", Operation::new().operation_id("A"))
            .path("/b", "GET", renamed);

        assert_eq!(spec.operations_by_id_mut("A").count(), 2);
        assert_eq!(spec.operations_by_id_mut("A_2").count(), 0);
        assert_eq!(spec.operation_ids(), vec!["A", "A_2"]);
    }
}
