//! Per-call request descriptor and attribute bag.

use crate::cancel::{CancelController, CancelSignal};
use crate::client::ApiClient;
use crate::metadata::{ResolvedCallMetadata, UrlParams};
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Everything a transport needs to perform one request.
///
/// `url` is relative to the transport's origin and may still contain `{name}`
/// placeholders; `url_params.path` holds their values.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub url_params: UrlParams,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
    pub signal: Option<CancelSignal>,
    pub controller: Option<CancelController>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            url_params: UrlParams::default(),
            body: None,
            timeout: None,
            signal: None,
            controller: None,
        }
    }

    /// The signal the transport should observe: the explicit signal, else one
    /// derived from the controller.
    #[must_use]
    pub fn cancel_signal(&self) -> Option<CancelSignal> {
        self.signal
            .clone()
            .or_else(|| self.controller.as_ref().map(CancelController::signal))
    }
}

/// One attribute value.
///
/// Caller attributes are JSON; the executor adds the calling client and the
/// call metadata under fixed keys.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Json(Value),
    Client(ApiClient),
    Metadata(Arc<ResolvedCallMetadata>),
}

impl AttributeValue {
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Client(_) | Self::Metadata(_) => None,
        }
    }

    #[must_use]
    pub const fn as_client(&self) -> Option<&ApiClient> {
        match self {
            Self::Client(client) => Some(client),
            Self::Json(_) | Self::Metadata(_) => None,
        }
    }

    #[must_use]
    pub const fn as_metadata(&self) -> Option<&Arc<ResolvedCallMetadata>> {
        match self {
            Self::Metadata(metadata) => Some(metadata),
            Self::Json(_) | Self::Client(_) => None,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Ordered side-channel attributes of one call.
#[derive(Debug, Clone, Default)]
pub struct AttributeBag {
    entries: IndexMap<String, AttributeValue>,
}

impl AttributeBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Copies every entry of a JSON map, replacing existing keys.
    pub fn extend_json<'a>(&mut self, values: impl IntoIterator<Item = (&'a String, &'a Value)>) {
        for (key, value) in values {
            self.entries
                .insert(key.clone(), AttributeValue::Json(value.clone()));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    /// Shortcut for a JSON attribute.
    #[must_use]
    pub fn get_json(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(AttributeValue::as_json)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key, AttributeValue::Json(value)))
                .collect(),
        }
    }
}
