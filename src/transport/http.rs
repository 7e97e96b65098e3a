//! `reqwest`-backed transport.

use super::{Exchange, ExchangeOptions, HttpResponse, Transport};
use crate::config::settings::ClientSettings;
use crate::config::url_resolver::BaseUrlResolver;
use crate::constants;
use crate::error::Error;
use crate::logging;
use crate::metadata::UrlParams;
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Once;
use std::time::{Duration, Instant};

static CRYPTO_PROVIDER: Once = Once::new();

/// Installs the process-wide rustls crypto provider once.
fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        #[cfg(not(windows))]
        let _ = rustls::crypto::ring::default_provider().install_default();
        #[cfg(windows)]
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// Sends descriptors over HTTP, prefixing their URLs with a fixed origin.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ReqwestTransport {
    /// Creates a transport with the default client timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = build_http_client(
            Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            constants::DEFAULT_USER_AGENT,
        )?;
        Ok(Self {
            client,
            base_url: Some(base_url.into()),
        })
    }

    /// Creates a transport from settings, resolving the origin through
    /// [`BaseUrlResolver`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, Error> {
        let client = build_http_client(
            Duration::from_secs(settings.default_timeout_secs),
            settings
                .user_agent
                .as_deref()
                .unwrap_or(constants::DEFAULT_USER_AGENT),
        )?;
        Ok(Self {
            client,
            base_url: BaseUrlResolver::new(settings).resolve(None),
        })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: Some(base_url.into()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(
        &self,
        request: RequestDescriptor,
        options: ExchangeOptions,
    ) -> Result<Exchange, Error> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "No base URL configured; set {} or `base_url` in settings",
                constants::ENV_BASE_URL
            ))
        })?;
        let url = build_url(base_url, &request.url, &request.url_params)?;
        let headers = build_headers(&request.headers)?;
        let body = request.body.as_ref().map(Value::to_string);

        logging::log_request(request.method.as_str(), &url, Some(&headers), body.as_deref());

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(json_body) = &request.body {
            builder = builder.json(json_body);
        }

        let start = Instant::now();
        let response = match request.cancel_signal() {
            Some(signal) => {
                tokio::select! {
                    () = signal.cancelled() => return Err(Error::Cancelled),
                    response = send_request(builder) => response?,
                }
            }
            None => send_request(builder).await?,
        };

        logging::log_response(
            response.status,
            start.elapsed().as_millis(),
            Some(&response.headers),
            std::str::from_utf8(&response.body).ok(),
            logging::get_max_body_len(),
        );

        if !response.is_success() {
            return Err(handle_http_error(&response));
        }

        Ok(Exchange::new(request, options).with_response(response))
    }
}

/// Build HTTP client with default timeout
fn build_http_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, Error> {
    install_crypto_provider();
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))
}

/// Send HTTP request and buffer the response
async fn send_request(request: reqwest::RequestBuilder) -> Result<HttpResponse, Error> {
    let response = request.send().await?;

    let status = response.status().as_u16();
    let headers: IndexMap<String, String> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();
    let body = response.bytes().await?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn handle_http_error(response: &HttpResponse) -> Error {
    let body = String::from_utf8_lossy(&response.body).into_owned();
    Error::HttpStatus {
        status: response.status,
        body: if body.is_empty() {
            constants::EMPTY_RESPONSE.to_string()
        } else {
            body
        },
    }
}

/// Renders a url param value: strings verbatim, other scalars as JSON text.
fn param_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Builds the absolute URL: origin + path with `{name}` placeholders
/// substituted from `url_params.path`, then the query string.
fn build_url(base_url: &str, path: &str, url_params: &UrlParams) -> Result<String, Error> {
    let mut url = if path.is_empty() || path.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), path)
    };

    let mut start = 0;
    while let Some(open) = url[start..].find('{') {
        let open_pos = start + open;
        let Some(close) = url[open_pos..].find('}') else {
            break;
        };
        let close_pos = open_pos + close;
        let param_name = &url[open_pos + 1..close_pos];

        let value = url_params
            .path
            .get(param_name)
            .and_then(param_to_string)
            .ok_or_else(|| Error::MissingPathParameter {
                name: param_name.to_string(),
            })?;
        let encoded = urlencoding::encode(&value).into_owned();
        url.replace_range(open_pos..=close_pos, &encoded);
        start = open_pos + encoded.len();
    }

    let query_params: Vec<String> = url_params
        .query
        .iter()
        .filter_map(|(name, value)| {
            param_to_string(value)
                .map(|v| format!("{}={}", urlencoding::encode(name), urlencoding::encode(&v)))
        })
        .collect();

    if !query_params.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query_params.join("&"));
    }

    reqwest::Url::parse(&url).map_err(|e| Error::InvalidUrl {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    Ok(url)
}

/// Validates that a header value doesn't contain control characters
fn validate_header_value(name: &str, value: &str) -> Result<(), Error> {
    if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
        return Err(Error::InvalidHeaderValue {
            name: name.to_string(),
            reason: "Header value contains invalid control characters (newline, carriage return, or null)".to_string(),
        });
    }
    Ok(())
}

fn build_headers(headers: &IndexMap<String, String>) -> Result<HeaderMap, Error> {
    let mut header_map = HeaderMap::new();
    header_map.insert(
        constants::HEADER_ACCEPT,
        HeaderValue::from_static(constants::CONTENT_TYPE_JSON),
    );

    for (name, value) in headers {
        validate_header_value(name, value)?;
        let header_name = HeaderName::from_str(name).map_err(|e| Error::InvalidHeaderName {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeaderValue {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        header_map.insert(header_name, header_value);
    }

    Ok(header_map)
}
