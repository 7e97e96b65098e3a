//! Client instances of a declared API.

use crate::config::settings::ClientSettings;
use crate::engine::{Executor, ExecutorCache};
use crate::error::Error;
use crate::invocation::{CallArg, CallOutput};
use crate::metadata::{ApiDeclaration, ApiMetadata};
use crate::transport::{ReqwestTransport, Transport, TransportRegistry};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A client of one declared API.
///
/// Cloning is cheap and clones share the executor cache: each declared
/// method gets one executor for the lifetime of the client, built on its
/// first call.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    declaration: Arc<ApiDeclaration>,
    api_override: Option<Arc<ApiMetadata>>,
    transports: TransportRegistry,
    executors: ExecutorCache,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api", &self.inner.declaration.name())
            .field("overridden", &self.inner.api_override.is_some())
            .field("executors", &self.inner.executors.len())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn builder(declaration: Arc<ApiDeclaration>) -> ApiClientBuilder {
        ApiClientBuilder::new(declaration)
    }

    /// The executor for `method_name`, built on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndpointNotDeclared`] if the API declares no such method.
    pub fn executor(&self, method_name: &str) -> Result<Arc<Executor>, Error> {
        let declaration = &self.inner.declaration;
        let declared = declaration
            .endpoint(method_name)
            .ok_or_else(|| Error::EndpointNotDeclared {
                api: declaration.name().to_string(),
                method: method_name.to_string(),
            })?;
        Ok(self.inner.executors.get_or_create(
            method_name,
            declared,
            declaration.api(),
            self.inner.api_override.as_ref(),
        ))
    }

    /// Calls a declared method with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns any error from resolution, the transport or the result
    /// extractor; see [`Executor::execute`].
    pub async fn call(&self, method_name: &str, args: Vec<CallArg>) -> Result<CallOutput, Error> {
        let executor = self.executor(method_name)?;
        executor.execute(self, args).await
    }

    /// Calls a method declared with the result shape and deserializes its value.
    ///
    /// # Errors
    ///
    /// Fails like [`ApiClient::call`], with [`Error::Extraction`] when the
    /// method returns an exchange, and [`Error::Json`] when the value does
    /// not deserialize into `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        method_name: &str,
        args: Vec<CallArg>,
    ) -> Result<T, Error> {
        match self.call(method_name, args).await? {
            CallOutput::Result(value) => Ok(serde_json::from_value(value)?),
            CallOutput::Exchange(_) => Err(Error::Extraction {
                reason: format!("method '{method_name}' returns an exchange, not a result"),
            }),
        }
    }

    #[must_use]
    pub fn declaration(&self) -> &Arc<ApiDeclaration> {
        &self.inner.declaration
    }

    #[must_use]
    pub fn transports(&self) -> &TransportRegistry {
        &self.inner.transports
    }

    /// Instance-level API metadata replacing the declared defaults, if any.
    #[must_use]
    pub fn api_override(&self) -> Option<&Arc<ApiMetadata>> {
        self.inner.api_override.as_ref()
    }

    /// Whether two handles share one client instance and its executor cache.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    declaration: Arc<ApiDeclaration>,
    api_override: Option<ApiMetadata>,
    transports: Option<TransportRegistry>,
    settings: Option<ClientSettings>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn new(declaration: Arc<ApiDeclaration>) -> Self {
        Self {
            declaration,
            api_override: None,
            transports: None,
            settings: None,
        }
    }

    /// Replaces the declared API metadata for this client. Takes precedence
    /// over an override found in settings.
    #[must_use]
    pub fn api_override(mut self, api: ApiMetadata) -> Self {
        self.api_override = Some(api);
        self
    }

    /// Applies settings: the `[apis.<name>]` table matching the declaration
    /// becomes the API override, and when no transports are given the default
    /// transport is a [`ReqwestTransport`] configured from them.
    #[must_use]
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn transports(mut self, transports: TransportRegistry) -> Self {
        self.transports = Some(transports);
        self
    }

    /// Uses `transport` as the default transport.
    #[must_use]
    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.transports(TransportRegistry::new(transport))
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the settings' API table is invalid,
    /// when no transport was given and none can be built from settings.
    pub fn build(self) -> Result<ApiClient, Error> {
        let Self {
            declaration,
            api_override,
            transports,
            settings,
        } = self;

        let api_override = match (api_override, &settings) {
            (Some(api), _) => Some(api),
            (None, Some(settings)) => settings.api_override(declaration.name())?,
            (None, None) => None,
        };

        let transports = match (transports, &settings) {
            (Some(transports), _) => transports,
            (None, Some(settings)) => TransportRegistry::new(ReqwestTransport::from_settings(settings)?),
            (None, None) => {
                return Err(Error::Config(format!(
                    "No transport configured for API '{}'",
                    declaration.name()
                )))
            }
        };

        debug!(
            target: "tether::client",
            api = declaration.name(),
            methods = declaration.method_names().count(),
            overridden = api_override.is_some(),
            "built client"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                declaration,
                api_override: api_override.map(Arc::new),
                transports,
                executors: ExecutorCache::new(),
            }),
        })
    }
}
