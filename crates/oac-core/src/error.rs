use thiserror::Error;

/// Errors raised while loading or interrogating a specification document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read spec file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown specification format. Accepted formats: json, yaml, yml")]
    UnknownFormat,

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("duplicate operationId: {0}")]
    DuplicateOperationId(String),
}

/// Errors raised while building a request from an operation spec.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{}", arity_message(.operation, .placeholders))]
    ArgumentCount {
        operation: String,
        placeholders: Vec<String>,
        supplied: usize,
    },

    #[error("invalid host url: {0}")]
    HostUrl(#[from] url::ParseError),
}

fn arity_message(operation: &str, placeholders: &[String]) -> String {
    let mut message = format!("Incorrect arguments: {operation} accepts");
    match placeholders.len() {
        0 => message.push_str(" no positional arguments"),
        n => {
            message.push_str(&format!(
                " {n} positional argument{}: {}",
                if n > 1 { "s" } else { "" },
                placeholders.join(", ")
            ));
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_error(operation: &str, placeholders: &[&str], supplied: usize) -> BuildError {
        BuildError::ArgumentCount {
            operation: operation.to_string(),
            placeholders: placeholders.iter().map(|p| p.to_string()).collect(),
            supplied,
        }
    }

    #[test]
    fn arity_message_no_arguments() {
        let error = count_error("dummyTestEndpoint", &[], 1);
        assert_eq!(
            error.to_string(),
            "Incorrect arguments: dummyTestEndpoint accepts no positional arguments"
        );
    }

    #[test]
    fn arity_message_singular() {
        let error = count_error("dummyTestEndpointWithArgument", &["test_arg"], 0);
        assert_eq!(
            error.to_string(),
            "Incorrect arguments: dummyTestEndpointWithArgument accepts 1 positional argument: test_arg"
        );
    }

    #[test]
    fn arity_message_plural_lists_placeholders_in_order() {
        let error = count_error("getUserMessage", &["user_id", "message_id"], 1);
        assert_eq!(
            error.to_string(),
            "Incorrect arguments: getUserMessage accepts 2 positional arguments: user_id, message_id"
        );
    }
}
