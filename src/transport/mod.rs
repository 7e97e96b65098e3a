//! Transport seam: the one place a request leaves the process.
//!
//! The core never performs I/O itself. It hands a [`RequestDescriptor`] plus
//! [`ExchangeOptions`] to a [`Transport`] and receives an [`Exchange`].

pub mod http;
pub mod registry;

use crate::error::Error;
use crate::extract::ExtractorRef;
use crate::request::{AttributeBag, RequestDescriptor};
use async_trait::async_trait;
use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub use http::ReqwestTransport;
pub use registry::TransportRegistry;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request and returns the completed exchange.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses, cancellation and invalid
    /// request data are reported as errors and propagate unchanged to the caller.
    async fn exchange(
        &self,
        request: RequestDescriptor,
        options: ExchangeOptions,
    ) -> Result<Exchange, Error>;
}

/// Per-call options handed to the transport next to the descriptor.
#[derive(Debug, Clone)]
pub struct ExchangeOptions {
    pub result_extractor: ExtractorRef,
    pub attributes: AttributeBag,
}

/// Buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an extraction error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, Error> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Extraction {
            reason: format!("response body is not valid UTF-8: {e}"),
        })
    }

    /// Body parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// A performed call: the request that was sent, its attributes, the selected
/// result extractor and, once available, the response.
#[derive(Debug)]
pub struct Exchange {
    request: RequestDescriptor,
    attributes: AttributeBag,
    result_extractor: ExtractorRef,
    response: Option<HttpResponse>,
}

impl Exchange {
    #[must_use]
    pub fn new(request: RequestDescriptor, options: ExchangeOptions) -> Self {
        Self {
            request,
            attributes: options.attributes,
            result_extractor: options.result_extractor,
            response: None,
        }
    }

    #[must_use]
    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    #[must_use]
    pub const fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    #[must_use]
    pub const fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    #[must_use]
    pub const fn result_extractor(&self) -> &ExtractorRef {
        &self.result_extractor
    }

    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// The response, failing when the transport attached none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingResponse`] when no response is attached.
    pub fn required_response(&self) -> Result<&HttpResponse, Error> {
        self.response.as_ref().ok_or(Error::MissingResponse)
    }

    /// Applies the exchange's result extractor.
    ///
    /// # Errors
    ///
    /// Propagates the extractor's failure unchanged.
    pub async fn extract_result(&self) -> Result<Value, Error> {
        self.result_extractor.extract(self).await
    }
}

/// Transport selection: by registry name or by direct reference.
#[derive(Clone)]
pub enum TransportRef {
    Named(String),
    Shared(Arc<dyn Transport>),
}

impl TransportRef {
    pub fn shared(transport: impl Transport + 'static) -> Self {
        Self::Shared(Arc::new(transport))
    }
}

impl From<&str> for TransportRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TransportRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Transport>> for TransportRef {
    fn from(transport: Arc<dyn Transport>) -> Self {
        Self::Shared(transport)
    }
}

impl fmt::Debug for TransportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}
