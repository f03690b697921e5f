use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use oac_core::request::{Body, RequestDescriptor};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed")]
    Http(#[source] reqwest::Error),

    #[error("failed to read response body")]
    Read(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unsupported HTTP method: {0}")]
    Method(String),
}

/// One HTTP response, as consumed by the client core.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `content-type` header, empty when absent.
    pub fn mimetype(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// The body decoded as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body parsed as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends a built request and returns the raw response.
///
/// The default implementation is [`ReqwestTransport`]; tests substitute an
/// in-memory one. Connection pooling, TLS, and timeouts are the transport's
/// concern, not the client's.
pub trait Transport {
    fn send(&self, request: &RequestDescriptor) -> Result<Response, TransportError>;
}

/// Blocking transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Transport with a per-request timeout, passed through to `reqwest`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &RequestDescriptor) -> Result<Response, TransportError> {
        let method: reqwest::Method = request
            .method
            .to_uppercase()
            .parse()
            .map_err(|_| TransportError::Method(request.method.clone()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(Body::Json(value)) => builder = builder.json(value),
            Some(Body::Form(value)) => builder = builder.form(&form_pairs(value)),
            None => {}
        }

        let response = builder.send().map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().map_err(TransportError::Read)?.to_vec();

        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Flatten a JSON object into form key/value pairs.
fn form_pairs(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), rendered)
            })
            .collect(),
        other => vec![("value".to_string(), other.to_string())],
    }
}

/// Fetch a URL as text. Used for loading a spec from the network.
pub fn fetch_text(url: &str) -> Result<String, TransportError> {
    let response = reqwest::blocking::get(url).map_err(TransportError::Http)?;
    let status = response.status().as_u16();
    let text = response.text().map_err(TransportError::Read)?;
    if !(200..300).contains(&status) {
        return Err(TransportError::Status { status, body: text });
    }
    Ok(text)
}
