//! Request and response logging with secret redaction, plus subscriber setup.
//!
//! Requests and responses are logged under the `tether::transport` target:
//! method, URL and status at info, headers at debug (sensitive headers
//! redacted), bodies at trace with truncation.

use crate::constants;
use indexmap::IndexMap;
use std::sync::Mutex;
use tracing::{debug, info, trace};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Checks if a header name should be redacted
#[must_use]
pub fn should_redact_header(header_name: &str) -> bool {
    let lower = header_name.to_lowercase();
    matches!(
        lower.as_str(),
        "authorization"
            | "proxy-authorization"
            | "cookie"
            | "set-cookie"
            | "x-api-key"
            | "x-access-token"
            | "x-auth-token"
            | "api-key"
            | "api_key"
            | "token"
            | "secret"
            | "password"
    )
}

fn display_header_value(name: &str, value: &str) -> String {
    if should_redact_header(name) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

/// Logs an HTTP request with optional headers and body
pub fn log_request(
    method: &str,
    url: &str,
    headers: Option<&reqwest::header::HeaderMap>,
    body: Option<&str>,
) {
    info!(
        target: "tether::transport",
        "→ {} {}",
        method.to_uppercase(),
        url
    );

    if let Some(header_map) = headers {
        debug!(target: "tether::transport", "Request headers:");
        for (name, value) in header_map {
            let raw = String::from_utf8_lossy(value.as_bytes());
            debug!(
                target: "tether::transport",
                "  {}: {}",
                name.as_str(),
                display_header_value(name.as_str(), &raw)
            );
        }
    }

    if let Some(body_content) = body {
        trace!(target: "tether::transport", "Request body: {}", body_content);
    }
}

/// Logs an HTTP response with optional headers and body
pub fn log_response(
    status: u16,
    duration_ms: u128,
    headers: Option<&IndexMap<String, String>>,
    body: Option<&str>,
    max_body_len: usize,
) {
    info!(
        target: "tether::transport",
        "← {} ({}ms)",
        status,
        duration_ms
    );

    if let Some(header_map) = headers {
        debug!(target: "tether::transport", "Response headers:");
        for (name, value) in header_map {
            debug!(
                target: "tether::transport",
                "  {}: {}",
                name,
                display_header_value(name, value)
            );
        }
    }

    log_response_body(body, max_body_len);
}

/// Helper function to log response body with truncation
fn log_response_body(body: Option<&str>, max_body_len: usize) {
    let Some(body_content) = body else {
        return;
    };

    let truncated = truncate_at_char_boundary(body_content, max_body_len);
    if truncated.len() < body_content.len() {
        trace!(
            target: "tether::transport",
            "Response body: {} (truncated at {} chars)",
            truncated,
            max_body_len
        );
    } else {
        trace!(target: "tether::transport", "Response body: {}", body_content);
    }
}

fn truncate_at_char_boundary(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Gets the maximum body length from `TETHER_LOG_MAX_BODY` environment variable
#[must_use]
pub fn get_max_body_len() -> usize {
    std::env::var(constants::ENV_LOG_MAX_BODY)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1000)
}

/// Output encoding for [`init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to text.
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Filter directive: explicit verbosity wins over `TETHER_LOG`.
fn filter_directive(verbosity: u8, from_env: Option<String>) -> String {
    match verbosity {
        0 => from_env.unwrap_or_else(|| "error".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn log_writer(path: Option<String>) -> BoxMakeWriter {
    let Some(path) = path else {
        return BoxMakeWriter::new(std::io::stderr);
    };
    match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            // No subscriber is installed yet.
            eprintln!("Warning: Could not open log file '{path}': {e}. Using stderr.");
            BoxMakeWriter::new(std::io::stderr)
        }
    }
}

/// Installs a global `tracing` subscriber for applications embedding the
/// client.
///
/// `verbosity` 1 selects debug and 2+ trace; 0 defers to `TETHER_LOG`
/// (default `error`). `TETHER_LOG_FORMAT=json` switches to JSON lines and
/// `TETHER_LOG_FILE` appends to a file instead of stderr.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(verbosity: u8) -> bool {
    let directive = filter_directive(verbosity, std::env::var(constants::ENV_LOG).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("error"));
    let format = LogFormat::parse(std::env::var(constants::ENV_LOG_FORMAT).ok().as_deref());
    let writer = log_writer(std::env::var(constants::ENV_LOG_FILE).ok());

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(layer.json()).try_init().is_ok(),
        LogFormat::Text => registry.with(layer.compact()).try_init().is_ok(),
    }
}
