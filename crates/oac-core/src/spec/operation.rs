use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::tree::lookup;

/// Parameter location, the `in` field of a parameter object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// Read-only view over one `(path template, method, operation object)`
/// triple, with parameter declarations grouped by location.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSpec {
    path: String,
    method: String,
    spec: Value,
    parameters: IndexMap<ParameterLocation, IndexMap<String, Value>>,
}

impl OperationSpec {
    /// Build the view. `declared` is the concatenation of path-item-level
    /// and operation-level parameter declarations, in that order; a later
    /// declaration with the same name and location wins.
    pub fn new(path: String, method: String, spec: Value, declared: Vec<Value>) -> Self {
        let mut parameters: IndexMap<ParameterLocation, IndexMap<String, Value>> = IndexMap::new();
        for param in declared {
            let Some(object) = param.as_object() else {
                continue;
            };
            let Some(name) = object.get("name").and_then(Value::as_str) else {
                warn!("skipping parameter without a name in {method} {path}");
                continue;
            };
            let location = object
                .get("in")
                .and_then(|v| serde_json::from_value::<ParameterLocation>(v.clone()).ok());
            let Some(location) = location else {
                warn!("skipping parameter {name:?} with unknown location in {method} {path}");
                continue;
            };
            parameters
                .entry(location)
                .or_default()
                .insert(name.to_string(), param.clone());
        }
        Self {
            path,
            method,
            spec,
            parameters,
        }
    }

    /// URL template with `{name}` placeholders.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Lowercase HTTP verb.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw operation object.
    pub fn spec(&self) -> &Value {
        &self.spec
    }

    /// Parameter declarations grouped by location, then keyed by name.
    pub fn parameters(&self) -> &IndexMap<ParameterLocation, IndexMap<String, Value>> {
        &self.parameters
    }

    /// Parameters declared at one location.
    pub fn params_in(&self, location: ParameterLocation) -> Option<&IndexMap<String, Value>> {
        self.parameters.get(&location)
    }

    /// Field lookup on the raw operation object: exact name first, then the
    /// camelCase transform.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.spec.as_object().and_then(|object| lookup(object, name))
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.field("operation_id").and_then(Value::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.field("summary").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.field("description").and_then(Value::as_str)
    }

    /// The `requestBody` object, if declared.
    pub fn request_body(&self) -> Option<&Map<String, Value>> {
        self.field("request_body").and_then(Value::as_object)
    }

    /// Documentation line(s) for the operation: summary, then a blank line
    /// and the description when present, falling back to the operation id.
    pub fn doc(&self) -> String {
        let mut doc = self
            .summary()
            .or_else(|| self.operation_id())
            .unwrap_or_default()
            .to_string();
        if let Some(description) = self.description() {
            doc.push_str("\n\n");
            doc.push_str(description);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn operation(spec: Value, declared: Vec<Value>) -> OperationSpec {
        OperationSpec::new("/items/{item_id}".to_string(), "get".to_string(), spec, declared)
    }

    #[test]
    fn field_lookup_camel_case_fallback() {
        let op = operation(json!({ "operationId": "getItem" }), Vec::new());
        assert_eq!(op.operation_id(), Some("getItem"));
        assert_eq!(op.field("operation_id"), op.field("operationId"));
    }

    #[test]
    fn parameters_grouped_by_location() {
        let op = operation(
            json!({ "operationId": "getItem" }),
            vec![
                json!({ "name": "item_id", "in": "path", "required": true }),
                json!({ "name": "verbose", "in": "query" }),
                json!({ "name": "x-trace", "in": "header" }),
            ],
        );
        assert!(
            op.params_in(ParameterLocation::Path)
                .unwrap()
                .contains_key("item_id")
        );
        assert!(
            op.params_in(ParameterLocation::Query)
                .unwrap()
                .contains_key("verbose")
        );
        assert!(
            op.params_in(ParameterLocation::Header)
                .unwrap()
                .contains_key("x-trace")
        );
        assert!(op.params_in(ParameterLocation::Cookie).is_none());
    }

    #[test]
    fn later_declaration_wins_for_same_name_and_location() {
        let op = operation(
            json!({}),
            vec![
                json!({ "name": "limit", "in": "query", "required": false }),
                json!({ "name": "limit", "in": "query", "required": true }),
            ],
        );
        let limit = &op.params_in(ParameterLocation::Query).unwrap()["limit"];
        assert_eq!(limit["required"], json!(true));
    }

    #[test]
    fn malformed_parameters_are_skipped() {
        let op = operation(
            json!({}),
            vec![
                json!("not an object"),
                json!({ "in": "query" }),
                json!({ "name": "weird", "in": "body" }),
            ],
        );
        assert!(op.parameters().is_empty());
    }

    #[test]
    fn doc_renders_summary_and_description() {
        let op = operation(
            json!({
                "operationId": "dummyTestEndpoint",
                "summary": "A dummy test endpoint.",
                "description": "A test endpoint that does nothing.",
            }),
            Vec::new(),
        );
        assert_eq!(
            op.doc(),
            "A dummy test endpoint.\n\nA test endpoint that does nothing."
        );
    }

    #[test]
    fn doc_falls_back_to_operation_id() {
        let op = operation(json!({ "operationId": "dummyTestEndpointWithArgument" }), Vec::new());
        assert_eq!(op.doc(), "dummyTestEndpointWithArgument");
    }
}
