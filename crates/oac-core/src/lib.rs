pub mod error;
pub mod registry;
pub mod request;
pub mod spec;

pub use error::{BuildError, SpecError};
pub use registry::OperationRegistry;
pub use request::{Body, RequestDescriptor};
pub use spec::{OperationSpec, ParameterLocation, SpecFormat, SpecTree};
