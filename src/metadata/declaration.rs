//! Explicit registration of an API and its endpoint methods.
//!
//! A declaration is built once, typically into a `static LazyLock`, and shared
//! by every client of that API:
//!
//! ```ignore
//! static USERS: LazyLock<Arc<ApiDeclaration>> = LazyLock::new(|| {
//!     ApiDeclaration::builder("users")
//!         .api(ApiMetadata::new().with_base_path("/api/v1"))
//!         .endpoint(
//!             "get_user",
//!             EndpointMetadata::get("/users/{id}"),
//!             ParameterMap::new().path(0, "id"),
//!         )
//!         .build()
//! });
//! ```

use super::api::ApiMetadata;
use super::endpoint::EndpointMetadata;
use super::parameter::ParameterMap;
use indexmap::IndexMap;
use std::sync::Arc;

/// Statically declared endpoint: its metadata and parameter bindings.
#[derive(Debug, Clone)]
pub struct DeclaredEndpoint {
    pub endpoint: Arc<EndpointMetadata>,
    pub parameters: Arc<ParameterMap>,
}

/// API metadata plus every declared endpoint, keyed by method name.
#[derive(Debug)]
pub struct ApiDeclaration {
    name: String,
    api: Arc<ApiMetadata>,
    endpoints: IndexMap<String, DeclaredEndpoint>,
}

impl ApiDeclaration {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ApiDeclarationBuilder {
        ApiDeclarationBuilder {
            name: name.into(),
            api: ApiMetadata::default(),
            endpoints: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static API-level defaults.
    #[must_use]
    pub const fn api(&self) -> &Arc<ApiMetadata> {
        &self.api
    }

    /// Returns the declared endpoint, or `None` when the method is not declared.
    #[must_use]
    pub fn endpoint(&self, method_name: &str) -> Option<&DeclaredEndpoint> {
        self.endpoints.get(method_name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }
}

pub struct ApiDeclarationBuilder {
    name: String,
    api: ApiMetadata,
    endpoints: IndexMap<String, DeclaredEndpoint>,
}

impl ApiDeclarationBuilder {
    #[must_use]
    pub fn api(mut self, api: ApiMetadata) -> Self {
        self.api = api;
        self
    }

    /// Declares an endpoint method. Declaring the same name twice keeps the last one.
    #[must_use]
    pub fn endpoint(
        mut self,
        method_name: impl Into<String>,
        endpoint: EndpointMetadata,
        parameters: ParameterMap,
    ) -> Self {
        self.endpoints.insert(
            method_name.into(),
            DeclaredEndpoint {
                endpoint: Arc::new(endpoint),
                parameters: Arc::new(parameters),
            },
        );
        self
    }

    #[must_use]
    pub fn build(self) -> Arc<ApiDeclaration> {
        Arc::new(ApiDeclaration {
            name: self.name,
            api: Arc::new(self.api),
            endpoints: self.endpoints,
        })
    }
}
