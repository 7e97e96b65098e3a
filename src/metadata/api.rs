//! API-wide defaults and the url-parameter maps shared by every layer.

use crate::extract::ExtractorRef;
use crate::transport::TransportRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Whether a call yields the extracted result or the raw exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnShape {
    /// Run the result extractor and return its value.
    #[default]
    Result,
    /// Return the transport's exchange object unmodified.
    Exchange,
}

/// Path and query parameters carried alongside a request.
///
/// Path entries fill `{name}` placeholders of the path template; query entries
/// become the query string. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlParams {
    #[serde(default)]
    pub path: IndexMap<String, Value>,
    #[serde(default)]
    pub query: IndexMap<String, Value>,
}

impl UrlParams {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty()
    }

    /// Overlays `other` on top of `self`, key by key.
    pub fn merge(&mut self, other: &Self) {
        merge_into(&mut self.path, &other.path);
        merge_into(&mut self.query, &other.query);
    }
}

/// Defaults shared by every endpoint of one API.
///
/// Every field is optional; empty maps mean "nothing declared at this level".
/// Endpoint metadata carries the same structure as its overrides.
#[derive(Debug, Clone, Default)]
pub struct ApiMetadata {
    pub base_path: Option<String>,
    pub headers: IndexMap<String, String>,
    pub timeout: Option<Duration>,
    pub transport: Option<TransportRef>,
    pub result_extractor: Option<ExtractorRef>,
    pub attributes: IndexMap<String, Value>,
    pub return_shape: Option<ReturnShape>,
    pub url_params: UrlParams,
}

impl ApiMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_timeout_ms(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn with_transport(mut self, transport: impl Into<TransportRef>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    #[must_use]
    pub fn with_result_extractor(mut self, extractor: ExtractorRef) -> Self {
        self.result_extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_return_shape(mut self, shape: ReturnShape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url_params.path.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url_params.query.insert(name.into(), value.into());
        self
    }
}

/// Shallow key-by-key merge: keys in `overlay` replace keys in `base`.
pub(crate) fn merge_into<V: Clone>(base: &mut IndexMap<String, V>, overlay: &IndexMap<String, V>) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_params_merge_overrides_keys() {
        let mut base = UrlParams::default();
        base.path.insert("id".to_string(), json!("1"));
        base.query.insert("page".to_string(), json!(1));

        let mut overlay = UrlParams::default();
        overlay.path.insert("id".to_string(), json!("2"));
        overlay.query.insert("limit".to_string(), json!(10));

        base.merge(&overlay);
        assert_eq!(base.path["id"], json!("2"));
        assert_eq!(base.query["page"], json!(1));
        assert_eq!(base.query["limit"], json!(10));
    }

    #[test]
    fn test_builder_sets_fields() {
        let meta = ApiMetadata::new()
            .with_base_path("/api/v1")
            .with_header("X-API", "a")
            .with_timeout_ms(5000)
            .with_return_shape(ReturnShape::Exchange)
            .with_attribute("trace", true);

        assert_eq!(meta.base_path.as_deref(), Some("/api/v1"));
        assert_eq!(meta.headers["X-API"], "a");
        assert_eq!(meta.timeout, Some(Duration::from_millis(5000)));
        assert_eq!(meta.return_shape, Some(ReturnShape::Exchange));
        assert_eq!(meta.attributes["trace"], json!(true));
    }

    #[test]
    fn test_return_shape_defaults_to_result() {
        assert_eq!(ReturnShape::default(), ReturnShape::Result);
    }
}
