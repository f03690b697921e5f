use log::debug;
use serde_json::{Map, Value, json};
use thiserror::Error;

use oac_core::request::{Body, RequestDescriptor};
use oac_core::spec::{OperationSpec, ParameterLocation, SpecTree};

use crate::transport::Response;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON location of the offending value within the instance.
    pub instance_path: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required {location} parameter: {name}")]
    MissingParameter { location: &'static str, name: String },

    #[error("schema compilation failed: {0}")]
    SchemaCompile(String),

    #[error("response body is not valid JSON: {0}")]
    ResponseBody(#[from] serde_json::Error),

    #[error("undeclared response status: {0}")]
    UndeclaredStatus(u16),

    #[error("{}", render_violations(.violations))]
    Schema { violations: Vec<Violation> },
}

fn render_violations(violations: &[Violation]) -> String {
    let lines: Vec<String> = violations
        .iter()
        .map(|violation| {
            if violation.instance_path.is_empty() {
                violation.message.clone()
            } else {
                format!("{}: {}", violation.instance_path, violation.message)
            }
        })
        .collect();
    format!("schema validation failed: {}", lines.join("; "))
}

/// Validates built requests and received responses against the spec.
///
/// Implementations own the validation algorithm; the client facade only
/// sequences the two calls around the transport round trip.
pub trait SchemaValidator {
    fn validate_request(
        &self,
        request: &RequestDescriptor,
        op: &OperationSpec,
        tree: &SpecTree,
    ) -> Result<(), ValidationError>;

    fn validate_response(
        &self,
        response: &Response,
        op: &OperationSpec,
        tree: &SpecTree,
    ) -> Result<(), ValidationError>;
}

/// Validator backed by the `jsonschema` crate.
///
/// Requests: declared-required parameters must be present, and a JSON body
/// must match the negotiated media type's schema. Responses: the status code
/// must be declared (exact, `NXX` wildcard, or `default`) and a JSON body
/// must match the matched media type's schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn validate_request(
        &self,
        request: &RequestDescriptor,
        op: &OperationSpec,
        tree: &SpecTree,
    ) -> Result<(), ValidationError> {
        for (location, params) in op.parameters() {
            for (name, param) in params {
                let required = param
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if !required {
                    continue;
                }
                let present = match location {
                    // arity checking already bound every placeholder
                    ParameterLocation::Path => true,
                    ParameterLocation::Query => request.query.contains_key(name),
                    ParameterLocation::Header | ParameterLocation::Cookie => request
                        .headers
                        .keys()
                        .any(|header| header.eq_ignore_ascii_case(name)),
                };
                if !present {
                    return Err(ValidationError::MissingParameter {
                        location: location.as_str(),
                        name: name.clone(),
                    });
                }
            }
        }

        if let Some(Body::Json(body)) = &request.body
            && let Some(schema) = body_schema(op, &request.mimetype)
        {
            debug!("validating request body for {}", request.url);
            validate_value(body, schema, tree)?;
        }
        Ok(())
    }

    fn validate_response(
        &self,
        response: &Response,
        op: &OperationSpec,
        tree: &SpecTree,
    ) -> Result<(), ValidationError> {
        let Some(responses) = op.field("responses").and_then(Value::as_object) else {
            return Ok(());
        };
        if responses.is_empty() {
            return Ok(());
        }

        let matched = match_status(responses, response.status)
            .ok_or(ValidationError::UndeclaredStatus(response.status))?;
        let Some(content) = matched.get("content").and_then(Value::as_object) else {
            return Ok(());
        };

        let mimetype = response.mimetype();
        let media = content
            .iter()
            .find(|(declared, _)| mimetype.starts_with(declared.as_str()));
        if let Some((declared, media)) = media
            && declared.contains("json")
            && let Some(schema) = media.get("schema")
        {
            let body = response.json()?;
            validate_value(&body, schema, tree)?;
        }
        Ok(())
    }
}

/// Validator that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl SchemaValidator for NoValidation {
    fn validate_request(
        &self,
        _request: &RequestDescriptor,
        _op: &OperationSpec,
        _tree: &SpecTree,
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    fn validate_response(
        &self,
        _response: &Response,
        _op: &OperationSpec,
        _tree: &SpecTree,
    ) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Schema of the request body for the negotiated content type.
fn body_schema<'a>(op: &'a OperationSpec, mimetype: &str) -> Option<&'a Value> {
    op.request_body()?
        .get("content")?
        .as_object()?
        .get(mimetype)?
        .get("schema")
}

/// Find the response spec for a status code: exact match first, then the
/// `NXX` class wildcard, then `default`.
fn match_status(responses: &Map<String, Value>, status: u16) -> Option<&Value> {
    if let Some(spec) = responses.get(&status.to_string()) {
        return Some(spec);
    }
    if let Some(spec) = responses.get(&format!("{}XX", status / 100)) {
        return Some(spec);
    }
    responses.get("default")
}

/// Validate `instance` against a schema subtree. The document's `components`
/// are grafted onto the schema so `#/components/...` references resolve.
fn validate_value(instance: &Value, schema: &Value, tree: &SpecTree) -> Result<(), ValidationError> {
    let document = match tree.get("/components") {
        Some(components) => json!({ "allOf": [schema], "components": components }),
        None => schema.clone(),
    };
    let validator = jsonschema::validator_for(&document)
        .map_err(|error| ValidationError::SchemaCompile(error.to_string()))?;

    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|error| Violation {
            instance_path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Schema { violations })
    }
}
