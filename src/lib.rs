//! Declarative HTTP API clients.
//!
//! An API is declared once as data: API-wide defaults ([`ApiMetadata`]), one
//! [`EndpointMetadata`] per method, and a [`ParameterMap`] binding each
//! positional argument to a role (path, query, header, body, request
//! override, attribute, attributes bag). An [`ApiClient`] turns calls into
//! request descriptors and hands them to a pluggable [`Transport`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use tether::{
//!     ApiClient, ApiDeclaration, ApiMetadata, EndpointMetadata, ParameterMap, ReqwestTransport,
//! };
//!
//! # async fn run() -> Result<(), tether::Error> {
//! let users: Arc<ApiDeclaration> = ApiDeclaration::builder("users")
//!     .api(ApiMetadata::new().with_base_path("/api/v1").with_timeout_ms(5000))
//!     .endpoint(
//!         "get_user",
//!         EndpointMetadata::get("/users/{id}"),
//!         ParameterMap::new().path(0, "id"),
//!     )
//!     .build();
//!
//! let client = ApiClient::builder(users)
//!     .transport(ReqwestTransport::new("https://api.example.com")?)
//!     .build()?;
//! let user: serde_json::Value = client.call_json("get_user", vec!["42".into()]).await?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod extract;
pub mod invocation;
pub mod logging;
pub mod metadata;
pub mod request;
pub mod transport;

pub use cancel::{CancelController, CancelSignal};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{BaseUrlResolver, ClientSettings};
pub use engine::{Executor, ExecutorCache, ResolvedRequest};
pub use error::Error;
pub use extract::{ExtractorRef, ResultExtractor};
pub use invocation::{CallArg, CallOutput};
pub use metadata::{
    join_path, ApiDeclaration, ApiMetadata, EndpointMetadata, ParameterMap, ParameterMetadata,
    ParameterRole, ResolvedCallMetadata, ReturnShape, UrlParams,
};
pub use request::{AttributeBag, AttributeValue, RequestDescriptor};
pub use transport::{
    Exchange, ExchangeOptions, HttpResponse, ReqwestTransport, Transport, TransportRef,
    TransportRegistry,
};
