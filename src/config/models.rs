//! Config-file form of API metadata, with extractor and transport by name.

use crate::error::Error;
use crate::extract::ExtractorRef;
use crate::metadata::{ApiMetadata, ReturnShape, UrlParams};
use crate::transport::TransportRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Configuration-file form of [`ApiMetadata`].
///
/// Extractors and transports are referenced by name: `result` must be one of
/// the built-in extractor names, `transport` a name registered on the client's
/// transport registry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ApiMetadataConfig {
    pub base_path: Option<String>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    pub timeout_ms: Option<u64>,
    pub transport: Option<String>,
    pub result: Option<String>,
    pub return_shape: Option<ReturnShape>,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub url_params: UrlParams,
}

impl ApiMetadataConfig {
    /// Converts the configured values into API metadata.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown extractor name.
    pub fn to_api_metadata(&self) -> Result<ApiMetadata, Error> {
        let result_extractor = self
            .result
            .as_deref()
            .map(|name| {
                ExtractorRef::by_name(name).ok_or_else(|| {
                    Error::Config(format!(
                        "Unknown result extractor '{name}'. Valid values: json, text, response"
                    ))
                })
            })
            .transpose()?;

        Ok(ApiMetadata {
            base_path: self.base_path.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            transport: self.transport.clone().map(TransportRef::Named),
            result_extractor,
            attributes: self.attributes.clone(),
            return_shape: self.return_shape,
            url_params: self.url_params.clone(),
        })
    }
}
