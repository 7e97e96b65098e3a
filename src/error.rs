use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Attributes binding at argument {position} expects a plain object, got {found}")]
    AttributesNotObject { position: usize, found: &'static str },
    #[error("Request override at argument {position} is invalid: {reason}")]
    InvalidRequestOverride { position: usize, reason: String },
    #[error("No endpoint declared for method '{method}' on API '{api}'")]
    EndpointNotDeclared { api: String, method: String },
    #[error("Transport '{name}' is not registered")]
    TransportNotFound { name: String },
    #[error("Missing path parameter '{name}'")]
    MissingPathParameter { name: String },
    #[error("Invalid header name '{name}': {reason}")]
    InvalidHeaderName { name: String, reason: String },
    #[error("Invalid header value for '{name}': {reason}")]
    InvalidHeaderValue { name: String, reason: String },
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Request was cancelled")]
    Cancelled,
    #[error("Exchange carries no response")]
    MissingResponse,
    #[error("Result extraction failed: {reason}")]
    Extraction { reason: String },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    /// Builds the misuse error raised when an attributes-bag argument is not an object.
    #[must_use]
    pub fn attributes_not_object(position: usize, value: &serde_json::Value) -> Self {
        let found = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "boolean",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        Self::AttributesNotObject { position, found }
    }

    /// Returns `true` for programmer errors detected before any request is dispatched.
    #[must_use]
    pub const fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::AttributesNotObject { .. }
                | Self::InvalidRequestOverride { .. }
                | Self::EndpointNotDeclared { .. }
                | Self::TransportNotFound { .. }
        )
    }

    /// Add context to an error for better user messaging
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Io(e) => Self::Config(format!("{context}: {e}")),
            Self::Toml(e) => Self::Config(format!("{context}: {e}")),
            _ => self,
        }
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context) = match self {
            Self::Config(msg) => ("Configuration", msg.clone(), None),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => Some("Check that the file path is correct and the file exists."),
                    std::io::ErrorKind::PermissionDenied => Some("Check file permissions or run with appropriate privileges."),
                    _ => None,
                };
                ("FileSystem", io_err.to_string(), context.map(str::to_string))
            }
            Self::Network(req_err) => {
                let context = if req_err.is_connect() {
                    Some("Check that the API server is running and accessible.")
                } else if req_err.is_timeout() {
                    Some("The API server may be slow or unresponsive. Try again later.")
                } else {
                    None
                };
                ("Network", req_err.to_string(), context.map(str::to_string))
            }
            Self::HttpStatus { status, .. } => {
                let context = match status {
                    401 => Some("Check your API credentials and authentication configuration."),
                    403 => Some("Your credentials may be valid but lack permission for this operation."),
                    404 => Some("Check that the API endpoint and parameters are correct."),
                    429 => Some("You're making requests too quickly. Wait before trying again."),
                    500..=599 => Some("The API server is experiencing issues. Try again later."),
                    _ => None,
                };
                ("HttpStatus", self.to_string(), context.map(str::to_string))
            }
            Self::Json(json_err) => ("JSONParsing", json_err.to_string(), Some("Check that the request body or response contains valid JSON.".to_string())),
            Self::Toml(toml_err) => ("TOMLParsing", toml_err.to_string(), Some("Check that your configuration file is valid TOML syntax.".to_string())),
            Self::AttributesNotObject { .. } | Self::InvalidRequestOverride { .. } => {
                ("Binding", self.to_string(), Some("Check the arguments passed to the endpoint against its parameter declaration.".to_string()))
            }
            Self::EndpointNotDeclared { .. } => ("Declaration", self.to_string(), None),
            Self::TransportNotFound { .. } => ("Transport", self.to_string(), Some("Register the transport on the client's transport registry.".to_string())),
            Self::MissingPathParameter { .. } | Self::InvalidHeaderName { .. } | Self::InvalidHeaderValue { .. } | Self::InvalidUrl { .. } => {
                ("Request", self.to_string(), None)
            }
            Self::Cancelled => ("Cancelled", self.to_string(), None),
            Self::MissingResponse | Self::Extraction { .. } => ("Extraction", self.to_string(), None),
            Self::Anyhow(err) => ("Unexpected", err.to_string(), None),
        };

        JsonError {
            error_type: error_type.to_string(),
            message,
            context,
        }
    }
}
