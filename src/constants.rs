//! Centralized string constants for tether
//!
//! This module contains commonly used string literals to:
//! - Reduce string duplication
//! - Keep attribute keys and environment variable names in one place

// Diagnostic attribute keys stamped by the executor before dispatch
pub const ATTR_CLIENT: &str = "__tether::client__";
pub const ATTR_CALL_METADATA: &str = "__tether::call_metadata__";

// Synthesized name prefix for unnamed path/query parameters
pub const UNNAMED_PARAM_PREFIX: &str = "param";

// HTTP Headers
pub const HEADER_ACCEPT: &str = "Accept";

// Content Types
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Built-in result extractor names
pub const EXTRACTOR_JSON: &str = "json";
pub const EXTRACTOR_TEXT: &str = "text";
pub const EXTRACTOR_RESPONSE: &str = "response";

// Transport registry
pub const DEFAULT_TRANSPORT: &str = "default";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("tether/", env!("CARGO_PKG_VERSION"));

// Environment variables
pub const ENV_BASE_URL: &str = "TETHER_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "TETHER_ENV";
pub const ENV_LOG: &str = "TETHER_LOG";
pub const ENV_LOG_FORMAT: &str = "TETHER_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "TETHER_LOG_FILE";
pub const ENV_LOG_MAX_BODY: &str = "TETHER_LOG_MAX_BODY";

// Placeholder used when an error response has no body
pub const EMPTY_RESPONSE: &str = "(empty response)";
