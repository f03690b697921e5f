use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

use crate::error::BuildError;
use crate::spec::OperationSpec;

/// Content type assumed when the operation declares nothing else.
pub const DEFAULT_MIMETYPE: &str = "application/json";

/// Request body, tagged with how it serializes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured JSON payload.
    Json(Value),
    /// Form-encoded (or otherwise opaque) payload.
    Form(Value),
}

/// A transport-ready description of one outgoing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Lowercase HTTP verb.
    pub method: String,
    /// Fully resolved URL: scheme, authority, interpolated path, encoded
    /// query string.
    pub url: String,
    /// Path component of `url` (host base path + interpolated template).
    pub path: String,
    /// Negotiated content type.
    pub mimetype: String,
    /// Merged headers.
    pub headers: IndexMap<String, String>,
    /// Raw query parameters; already percent-encoded into `url`.
    pub query: IndexMap<String, Value>,
    pub body: Option<Body>,
}

/// Extract ordered `{name}` placeholders from a path template, by first
/// appearance.
pub fn path_placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + 1 + len];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &rest[start + 1 + len + 1..];
    }
    names
}

/// Build a transport-ready request descriptor for one operation call.
///
/// `path_args` bind positionally to the template's placeholders in
/// appearance order; the count must match exactly.
pub fn build(
    host_url: &str,
    op: &OperationSpec,
    path_args: &[String],
    query: IndexMap<String, Value>,
    body: Option<Value>,
    headers: IndexMap<String, String>,
) -> Result<RequestDescriptor, BuildError> {
    let placeholders = path_placeholders(op.path());
    if path_args.len() != placeholders.len() {
        return Err(BuildError::ArgumentCount {
            operation: op.operation_id().unwrap_or_else(|| op.path()).to_string(),
            placeholders,
            supplied: path_args.len(),
        });
    }

    let mut path = op.path().to_string();
    for (name, value) in placeholders.iter().zip(path_args) {
        path = path.replace(&format!("{{{name}}}"), &urlencoding::encode(value));
    }

    let mimetype = negotiate_mimetype(op, &headers);

    let mut base = Url::parse(host_url)?;
    let full_path = format!("{}{}", base.path().trim_end_matches('/'), path);
    base.set_path(&full_path);
    base.set_query(None);
    if !query.is_empty() {
        let mut pairs = base.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, &query_value(value));
        }
    }

    let body = body.map(|value| {
        if mimetype.contains("json") {
            Body::Json(value)
        } else {
            Body::Form(value)
        }
    });

    Ok(RequestDescriptor {
        method: op.method().to_string(),
        path: base.path().to_string(),
        url: base.into(),
        mimetype,
        headers,
        query,
        body,
    })
}

/// Pick the content type for a call: an explicit `content-type` header wins;
/// otherwise `application/json` unless the operation declares a request body
/// without a JSON entry, in which case the first declared content type wins.
fn negotiate_mimetype(op: &OperationSpec, headers: &IndexMap<String, String>) -> String {
    if let Some((_, explicit)) = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    {
        return explicit.clone();
    }

    let content = op
        .request_body()
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object);
    if let Some(content) = content
        && !content.is_empty()
        && !content.contains_key(DEFAULT_MIMETYPE)
        && let Some(first) = content.keys().next()
    {
        return first.clone();
    }
    DEFAULT_MIMETYPE.to_string()
}

/// Render a query value for URL encoding; strings stay bare, everything else
/// uses its JSON rendering.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
