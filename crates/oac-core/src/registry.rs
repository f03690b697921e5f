use heck::ToSnakeCase;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::SpecError;
use crate::spec::{OperationSpec, SpecTree};

/// HTTP methods recognized as path-item keys.
const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Mapping from `operationId` to its [`OperationSpec`], in declaration order.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: IndexMap<String, OperationSpec>,
}

impl OperationRegistry {
    /// Walk the document's paths and collect every operation that declares
    /// an `operationId`. Entries without one cannot be addressed by name and
    /// are skipped. A duplicate id is a spec authoring error.
    pub fn collect(tree: &SpecTree) -> Result<Self, SpecError> {
        let mut operations = IndexMap::new();

        for (path, path_item) in tree.paths() {
            let Some(item) = path_item.as_object() else {
                continue;
            };
            let path_level: Vec<Value> = item
                .get("parameters")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            for method in METHODS {
                let Some(op) = item.get(method) else {
                    continue;
                };
                let Some(id) = op.get("operationId").and_then(Value::as_str) else {
                    continue;
                };

                // path-item declarations first, operation-level appended after
                let mut declared = path_level.clone();
                if let Some(own) = op.get("parameters").and_then(Value::as_array) {
                    declared.extend(own.iter().cloned());
                }

                let op_spec =
                    OperationSpec::new(path.clone(), method.to_string(), op.clone(), declared);
                if operations.insert(id.to_string(), op_spec).is_some() {
                    return Err(SpecError::DuplicateOperationId(id.to_string()));
                }
            }
        }

        Ok(Self { operations })
    }

    /// Look up an operation by id. The exact id is tried first, then the id
    /// whose snake_case form matches `name`, so `get_item` finds `getItem`.
    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        if let Some(op) = self.operations.get(name) {
            return Some(op);
        }
        self.operations
            .iter()
            .find(|(id, _)| id.to_snake_case() == name)
            .map(|(_, op)| op)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate `(operation id, operation)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OperationSpec)> {
        self.operations.iter().map(|(id, op)| (id.as_str(), op))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tree() -> SpecTree {
        SpecTree::new(json!({
            "paths": {
                "/items/{item_id}": {
                    "parameters": [
                        { "name": "item_id", "in": "path", "required": true }
                    ],
                    "get": {
                        "operationId": "getItem",
                        "parameters": [
                            { "name": "verbose", "in": "query" }
                        ]
                    },
                    "delete": { "operationId": "deleteItem" }
                },
                "/items": {
                    "get": { "operationId": "listItems" },
                    "post": { "summary": "anonymous, skipped" }
                }
            }
        }))
    }

    #[test]
    fn collects_operations_with_ids() {
        let registry = OperationRegistry::collect(&tree()).unwrap();
        assert_eq!(registry.len(), 3);

        let get_item = registry.get("getItem").unwrap();
        assert_eq!(get_item.path(), "/items/{item_id}");
        assert_eq!(get_item.method(), "get");
    }

    #[test]
    fn skips_operations_without_id() {
        let registry = OperationRegistry::collect(&tree()).unwrap();
        assert!(!registry.contains("anonymous"));
        assert!(registry.contains("listItems"));
    }

    #[test]
    fn merges_path_level_parameters() {
        use crate::spec::ParameterLocation;

        let registry = OperationRegistry::collect(&tree()).unwrap();
        let get_item = registry.get("getItem").unwrap();
        assert!(
            get_item
                .params_in(ParameterLocation::Path)
                .unwrap()
                .contains_key("item_id")
        );
        assert!(
            get_item
                .params_in(ParameterLocation::Query)
                .unwrap()
                .contains_key("verbose")
        );

        // the sibling without its own declarations still sees path-level ones
        let delete_item = registry.get("deleteItem").unwrap();
        assert!(
            delete_item
                .params_in(ParameterLocation::Path)
                .unwrap()
                .contains_key("item_id")
        );
    }

    #[test]
    fn get_accepts_snake_case_names() {
        let registry = OperationRegistry::collect(&tree()).unwrap();
        let op = registry.get("get_item").unwrap();
        assert_eq!(op.operation_id(), Some("getItem"));
        assert!(registry.get("no_such_operation").is_none());
    }

    #[test]
    fn duplicate_operation_id_is_rejected() {
        let tree = SpecTree::new(json!({
            "paths": {
                "/a": { "get": { "operationId": "sameId" } },
                "/b": { "get": { "operationId": "sameId" } }
            }
        }));
        let error = OperationRegistry::collect(&tree).unwrap_err();
        assert!(matches!(error, SpecError::DuplicateOperationId(id) if id == "sameId"));
    }
}
