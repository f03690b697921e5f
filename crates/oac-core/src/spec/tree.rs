use heck::ToLowerCamelCase;
use serde_json::{Map, Value, json};

/// A parsed OpenAPI document.
///
/// The document is held as raw JSON so schema subtrees can be handed to a
/// validator unchanged. The only mutation supported after construction is
/// appending a server entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTree {
    root: Value,
}

impl SpecTree {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// The raw document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resolve a JSON pointer into the document.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.root.pointer(pointer)
    }

    /// The `servers` list, empty when the document declares none.
    pub fn servers(&self) -> &[Value] {
        self.root
            .get("servers")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// URL of the server at `index`, if present.
    pub fn server_url(&self, index: usize) -> Option<&str> {
        self.servers()
            .get(index)
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str)
    }

    /// Append `{"url": url}` to the `servers` list, creating the list if the
    /// document declares none.
    pub fn push_server(&mut self, url: &str) {
        if let Some(object) = self.root.as_object_mut() {
            let servers = object
                .entry("servers")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = servers {
                list.push(json!({ "url": url }));
            }
        }
    }

    /// Iterate the `paths` mapping in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.iter())
    }

    /// `info.title`, if present.
    pub fn info_title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }
}

/// Look up `name` in a spec object, falling back to its camelCase form.
///
/// OpenAPI documents favor camelCase keys while Rust callers favor
/// snake_case; trying both lets `request_body` find `requestBody`.
pub fn lookup<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = object.get(name) {
        return Some(value);
    }
    object.get(&name.to_lower_camel_case())
}
