//! Per-method declaration: HTTP method, path template and overrides.

use super::api::{ApiMetadata, ReturnShape};
use crate::extract::ExtractorRef;
use crate::transport::TransportRef;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Declared configuration of one endpoint method.
///
/// `overrides` mirrors the API-level fields; any value set here wins over the
/// API default when the two are merged.
#[derive(Debug, Clone)]
pub struct EndpointMetadata {
    pub method: Method,
    pub path: Option<String>,
    pub overrides: ApiMetadata,
}

impl EndpointMetadata {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            path: None,
            overrides: ApiMetadata::default(),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET).with_path(path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST).with_path(path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT).with_path(path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH).with_path(path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE).with_path(path)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.overrides = self.overrides.with_base_path(base_path);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides = self.overrides.with_header(name, value);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.overrides = self.overrides.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn with_timeout_ms(self, millis: u64) -> Self {
        self.with_timeout(Duration::from_millis(millis))
    }

    #[must_use]
    pub fn with_transport(mut self, transport: impl Into<TransportRef>) -> Self {
        self.overrides = self.overrides.with_transport(transport);
        self
    }

    #[must_use]
    pub fn with_result_extractor(mut self, extractor: ExtractorRef) -> Self {
        self.overrides = self.overrides.with_result_extractor(extractor);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides = self.overrides.with_attribute(key, value);
        self
    }

    #[must_use]
    pub fn with_return_shape(mut self, shape: ReturnShape) -> Self {
        self.overrides = self.overrides.with_return_shape(shape);
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides = self.overrides.with_path_param(name, value);
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides = self.overrides.with_query_param(name, value);
        self
    }
}
