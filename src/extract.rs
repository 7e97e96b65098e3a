//! Result extractors turn a completed exchange into the caller-visible value.

use crate::constants;
use crate::error::Error;
use crate::transport::Exchange;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

#[async_trait]
pub trait ResultExtractor: Send + Sync {
    /// Short name used in logs and configuration (`json`, `text`, ...).
    fn name(&self) -> &str;

    /// Produces the call's result from the exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange has no response or its body cannot be
    /// converted.
    async fn extract(&self, exchange: &Exchange) -> Result<Value, Error>;
}

/// Parses the response body as JSON. An empty body yields `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

#[async_trait]
impl ResultExtractor for JsonExtractor {
    fn name(&self) -> &str {
        constants::EXTRACTOR_JSON
    }

    async fn extract(&self, exchange: &Exchange) -> Result<Value, Error> {
        let response = exchange.required_response()?;
        if response.body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Returns the response body as a JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

#[async_trait]
impl ResultExtractor for TextExtractor {
    fn name(&self) -> &str {
        constants::EXTRACTOR_TEXT
    }

    async fn extract(&self, exchange: &Exchange) -> Result<Value, Error> {
        let response = exchange.required_response()?;
        Ok(Value::String(response.text()?))
    }
}

/// Returns status, headers and body text as one JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtractor;

#[async_trait]
impl ResultExtractor for ResponseExtractor {
    fn name(&self) -> &str {
        constants::EXTRACTOR_RESPONSE
    }

    async fn extract(&self, exchange: &Exchange) -> Result<Value, Error> {
        let response = exchange.required_response()?;
        Ok(json!({
            "status": response.status,
            "headers": response.headers,
            "body": String::from_utf8_lossy(&response.body),
        }))
    }
}

/// Wraps a closure as an extractor.
pub struct FnExtractor<F> {
    name: String,
    extract: F,
}

#[async_trait]
impl<F> ResultExtractor for FnExtractor<F>
where
    F: Fn(&Exchange) -> anyhow::Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(&self, exchange: &Exchange) -> Result<Value, Error> {
        Ok((self.extract)(exchange)?)
    }
}

/// Shared handle to a result extractor. Defaults to [`JsonExtractor`].
#[derive(Clone)]
pub struct ExtractorRef(Arc<dyn ResultExtractor>);

impl ExtractorRef {
    pub fn new(extractor: impl ResultExtractor + 'static) -> Self {
        Self(Arc::new(extractor))
    }

    #[must_use]
    pub fn json() -> Self {
        Self::new(JsonExtractor)
    }

    #[must_use]
    pub fn text() -> Self {
        Self::new(TextExtractor)
    }

    #[must_use]
    pub fn response() -> Self {
        Self::new(ResponseExtractor)
    }

    pub fn from_fn<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&Exchange) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self::new(FnExtractor {
            name: name.into(),
            extract,
        })
    }

    /// Looks up a built-in extractor by its configuration name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            constants::EXTRACTOR_JSON => Some(Self::json()),
            constants::EXTRACTOR_TEXT => Some(Self::text()),
            constants::EXTRACTOR_RESPONSE => Some(Self::response()),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// # Errors
    ///
    /// Propagates the extractor's failure unchanged.
    pub async fn extract(&self, exchange: &Exchange) -> Result<Value, Error> {
        self.0.extract(exchange).await
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ExtractorRef {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for ExtractorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtractorRef").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestDescriptor;
    use crate::transport::{ExchangeOptions, HttpResponse};
    use bytes::Bytes;
    use reqwest::Method;

    fn exchange_with_body(body: &'static str) -> Exchange {
        let options = ExchangeOptions {
            result_extractor: ExtractorRef::json(),
            attributes: crate::request::AttributeBag::new(),
        };
        Exchange::new(RequestDescriptor::new(Method::GET, "/x"), options)
            .with_response(HttpResponse::new(200, Bytes::from_static(body.as_bytes())))
    }

    #[tokio::test]
    async fn test_json_extractor_parses_body() {
        let exchange = exchange_with_body(r#"{"id": 1}"#);
        let value = ExtractorRef::json().extract(&exchange).await.expect("json");
        assert_eq!(value, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_json_extractor_empty_body_is_null() {
        let exchange = exchange_with_body("");
        let value = JsonExtractor.extract(&exchange).await.expect("json");
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_json_extractor_invalid_body_fails() {
        let exchange = exchange_with_body("not json");
        let err = JsonExtractor.extract(&exchange).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_text_and_response_extractors() {
        let exchange = exchange_with_body("hello");
        assert_eq!(TextExtractor.extract(&exchange).await.expect("text"), json!("hello"));

        let raw = ResponseExtractor.extract(&exchange).await.expect("response");
        assert_eq!(raw["status"], json!(200));
        assert_eq!(raw["body"], json!("hello"));
    }

    #[tokio::test]
    async fn test_missing_response_fails() {
        let options = ExchangeOptions {
            result_extractor: ExtractorRef::json(),
            attributes: crate::request::AttributeBag::new(),
        };
        let exchange = Exchange::new(RequestDescriptor::new(Method::GET, "/x"), options);
        let err = JsonExtractor.extract(&exchange).await.unwrap_err();
        assert!(matches!(err, Error::MissingResponse));
    }

    #[tokio::test]
    async fn test_fn_extractor_propagates_errors() {
        let extractor = ExtractorRef::from_fn("failing", |_| anyhow::bail!("stream unsupported"));
        assert_eq!(extractor.name(), "failing");
        let err = extractor.extract(&exchange_with_body("")).await.unwrap_err();
        assert_eq!(err.to_string(), "stream unsupported");
    }

    #[test]
    fn test_by_name() {
        assert_eq!(ExtractorRef::by_name("text").map(|e| e.name().to_string()), Some("text".to_string()));
        assert!(ExtractorRef::by_name("stream").is_none());
        assert_eq!(ExtractorRef::default().name(), "json");
    }
}
