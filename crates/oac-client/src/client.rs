use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use oac_core::error::SpecError;
use oac_core::registry::OperationRegistry;
use oac_core::request::{self, RequestDescriptor};
use oac_core::spec::{self, OperationSpec, SpecTree};

use crate::error::ClientError;
use crate::transport::{ReqwestTransport, Response, Transport, fetch_text};
use crate::validation::{JsonSchemaValidator, SchemaValidator};

/// One completed call: the request that was sent and the response received.
pub type HistoryRecord = (RequestDescriptor, Response);

/// Dynamic OpenAPI client.
///
/// Construction parses the spec into an operation registry; each operation
/// is then callable by name via [`Client::call`]. Calls are synchronous and
/// the history is shared mutable state, so concurrent use requires external
/// serialization or one client per user.
pub struct Client {
    tree: SpecTree,
    registry: OperationRegistry,
    server_url: String,
    transport: Box<dyn Transport>,
    validator: Box<dyn SchemaValidator>,
    common_headers: IndexMap<String, String>,
    history: Vec<HistoryRecord>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("tree", &self.tree)
            .field("registry", &self.registry)
            .field("server_url", &self.server_url)
            .field("common_headers", &self.common_headers)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client with the default transport and validator.
    pub fn new(tree: SpecTree) -> Result<Self, ClientError> {
        Self::builder(tree).build()
    }

    pub fn builder(tree: SpecTree) -> ClientBuilder {
        ClientBuilder::new(tree)
    }

    /// Load the spec from a local file; the extension picks the format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ClientBuilder, ClientError> {
        Ok(ClientBuilder::new(spec::from_file(path)?))
    }

    /// Fetch the spec from a URL, trying JSON first and YAML second.
    pub fn from_url(url: &str) -> Result<ClientBuilder, ClientError> {
        let source = fetch_text(url)?;
        Ok(ClientBuilder::new(spec::sniff(&source)?))
    }

    /// The specification document.
    pub fn spec(&self) -> &SpecTree {
        &self.tree
    }

    /// The resolved server URL; always a member of the spec's server list.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// The operation spec behind `name`, for introspection.
    pub fn operation(&self, name: &str) -> Result<&OperationSpec, ClientError> {
        self.registry
            .get(name)
            .ok_or_else(|| ClientError::UnknownOperation(name.to_string()))
    }

    /// Start a call to the named operation. The name may be the exact
    /// `operationId` or its snake_case form.
    pub fn call(&mut self, name: impl Into<String>) -> CallBuilder<'_> {
        CallBuilder {
            client: self,
            operation: name.into(),
            path_args: Vec::new(),
            query: IndexMap::new(),
            body: None,
            headers: IndexMap::new(),
        }
    }

    /// All completed calls, oldest first.
    pub fn request_history(&self) -> &[HistoryRecord] {
        &self.history
    }

    /// The most recent request/response pair, `None` before the first
    /// completed call. Calls that fail before send are never recorded.
    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.history.last()
    }

    fn execute(
        &mut self,
        operation: &str,
        path_args: Vec<String>,
        query: IndexMap<String, Value>,
        body: Option<Value>,
        headers: IndexMap<String, String>,
    ) -> Result<Response, ClientError> {
        let op = self
            .registry
            .get(operation)
            .ok_or_else(|| ClientError::UnknownOperation(operation.to_string()))?
            .clone();

        // common headers first; per-call entries win on conflict
        let mut merged = self.common_headers.clone();
        merged.extend(headers);

        let descriptor = request::build(&self.server_url, &op, &path_args, query, body, merged)?;
        self.validator
            .validate_request(&descriptor, &op, &self.tree)?;

        debug!("{} {}", descriptor.method, descriptor.url);
        let response = self.transport.send(&descriptor)?;
        self.history.push((descriptor, response.clone()));

        self.validator.validate_response(&response, &op, &self.tree)?;
        Ok(response)
    }
}

/// Builder for one operation call.
pub struct CallBuilder<'a> {
    client: &'a mut Client,
    operation: String,
    path_args: Vec<String>,
    query: IndexMap<String, Value>,
    body: Option<Value>,
    headers: IndexMap<String, String>,
}

impl CallBuilder<'_> {
    /// Append one positional path argument.
    pub fn path_arg(mut self, value: impl ToString) -> Self {
        self.path_args.push(value.to_string());
        self
    }

    /// Append positional path arguments, in placeholder order.
    pub fn path_args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.path_args
            .extend(values.into_iter().map(|value| value.to_string()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build, validate, send, record, and validate the response.
    pub fn send(self) -> Result<Response, ClientError> {
        self.client.execute(
            &self.operation,
            self.path_args,
            self.query,
            self.body,
            self.headers,
        )
    }
}

/// Configures and constructs a [`Client`].
pub struct ClientBuilder {
    tree: SpecTree,
    server_url: Option<String>,
    headers: IndexMap<String, String>,
    transport: Option<Box<dyn Transport>>,
    validator: Option<Box<dyn SchemaValidator>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("tree", &self.tree)
            .field("server_url", &self.server_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    fn new(tree: SpecTree) -> Self {
        Self {
            tree,
            server_url: None,
            headers: IndexMap::new(),
            transport: None,
            validator: None,
        }
    }

    /// Server URL to call. A trailing slash is stripped; a URL not already
    /// in the spec's server list is appended to it.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Header sent with every call.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn build(self) -> Result<Client, ClientError> {
        let mut tree = self.tree;

        let server_url = match self.server_url {
            None => tree
                .server_url(0)
                .ok_or_else(|| SpecError::MissingField("servers".to_string()))?
                .to_string(),
            Some(url) => {
                let url = url.trim_end_matches('/').to_string();
                let known = tree
                    .servers()
                    .iter()
                    .any(|server| server.get("url").and_then(Value::as_str) == Some(url.as_str()));
                if !known {
                    tree.push_server(&url);
                }
                url
            }
        };

        let registry = OperationRegistry::collect(&tree)?;
        debug!(
            "client for {:?} with {} operations, server {server_url}",
            tree.info_title().unwrap_or("unnamed spec"),
            registry.len()
        );

        Ok(Client {
            tree,
            registry,
            server_url,
            transport: self
                .transport
                .unwrap_or_else(|| Box::new(ReqwestTransport::new())),
            validator: self
                .validator
                .unwrap_or_else(|| Box::new(JsonSchemaValidator)),
            common_headers: self.headers,
            history: Vec::new(),
        })
    }
}
