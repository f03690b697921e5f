pub mod client;
pub mod error;
pub mod transport;
pub mod validation;

pub use client::{CallBuilder, Client, ClientBuilder, HistoryRecord};
pub use error::ClientError;
pub use transport::{ReqwestTransport, Response, Transport, TransportError};
pub use validation::{
    JsonSchemaValidator, NoValidation, SchemaValidator, ValidationError, Violation,
};
