//! Effective per-method configuration.
//!
//! [`ResolvedCallMetadata`] merges an endpoint's declaration over its API
//! defaults once, when the executor for that method is built. Scalars take the
//! endpoint value when set and fall back to the API value; maps merge key by
//! key with endpoint keys winning.

use super::api::{merge_into, ApiMetadata, ReturnShape, UrlParams};
use super::endpoint::EndpointMetadata;
use super::parameter::ParameterMap;
use crate::extract::ExtractorRef;
use crate::transport::TransportRef;
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
pub struct ResolvedCallMetadata {
    method_name: String,
    api: Arc<ApiMetadata>,
    endpoint: Arc<EndpointMetadata>,
    parameters: Arc<ParameterMap>,
    base_path: String,
    timeout: Option<Duration>,
    result_extractor: ExtractorRef,
    return_shape: ReturnShape,
    transport: Option<TransportRef>,
    headers: IndexMap<String, String>,
    url_params: UrlParams,
    attributes: IndexMap<String, Value>,
}

impl ResolvedCallMetadata {
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        api: Arc<ApiMetadata>,
        endpoint: Arc<EndpointMetadata>,
        parameters: Arc<ParameterMap>,
    ) -> Self {
        let overrides = &endpoint.overrides;

        let base_path = overrides
            .base_path
            .as_ref()
            .or(api.base_path.as_ref())
            .cloned()
            .unwrap_or_default();
        let timeout = overrides.timeout.or(api.timeout);
        let result_extractor = overrides
            .result_extractor
            .as_ref()
            .or(api.result_extractor.as_ref())
            .cloned()
            .unwrap_or_default();
        let return_shape = overrides
            .return_shape
            .or(api.return_shape)
            .unwrap_or_default();
        let transport = overrides
            .transport
            .as_ref()
            .or(api.transport.as_ref())
            .cloned();

        let mut headers = api.headers.clone();
        merge_into(&mut headers, &overrides.headers);

        let mut url_params = api.url_params.clone();
        url_params.merge(&overrides.url_params);

        let mut attributes = api.attributes.clone();
        merge_into(&mut attributes, &overrides.attributes);

        Self {
            method_name: method_name.into(),
            api,
            endpoint,
            parameters,
            base_path,
            timeout,
            result_extractor,
            return_shape,
            transport,
            headers,
            url_params,
            attributes,
        }
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The API metadata visible when this call metadata was built.
    #[must_use]
    pub const fn api(&self) -> &Arc<ApiMetadata> {
        &self.api
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Arc<EndpointMetadata> {
        &self.endpoint
    }

    #[must_use]
    pub const fn parameters(&self) -> &Arc<ParameterMap> {
        &self.parameters
    }

    #[must_use]
    pub fn http_method(&self) -> &Method {
        &self.endpoint.method
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Declared path template, empty when the endpoint has none.
    #[must_use]
    pub fn path_template(&self) -> &str {
        self.endpoint.path.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub const fn result_extractor(&self) -> &ExtractorRef {
        &self.result_extractor
    }

    #[must_use]
    pub const fn return_shape(&self) -> ReturnShape {
        self.return_shape
    }

    /// Selected transport; `None` means the registry default.
    #[must_use]
    pub const fn transport(&self) -> Option<&TransportRef> {
        self.transport.as_ref()
    }

    /// Static headers (API then endpoint).
    #[must_use]
    pub const fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Static url params (API then endpoint).
    #[must_use]
    pub const fn url_params(&self) -> &UrlParams {
        &self.url_params
    }

    /// Static attributes (API then endpoint).
    #[must_use]
    pub const fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Final URL for this call: `base_path` joined with the override path or
    /// the declared template.
    #[must_use]
    pub fn url_for(&self, path_override: Option<&str>) -> String {
        join_path(&self.base_path, path_override.unwrap_or_else(|| self.path_template()))
    }
}

/// Joins a base path and a path with exactly one separating slash.
///
/// When either side is empty the other is returned unchanged.
#[must_use]
pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
