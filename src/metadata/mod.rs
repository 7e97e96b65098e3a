//! Declarative metadata: API defaults, endpoint declarations, parameter
//! bindings, and their merged per-method view.

pub mod api;
pub mod declaration;
pub mod endpoint;
pub mod parameter;
pub mod resolved;

pub use api::{ApiMetadata, ReturnShape, UrlParams};
pub use declaration::{ApiDeclaration, ApiDeclarationBuilder, DeclaredEndpoint};
pub use endpoint::EndpointMetadata;
pub use parameter::{ParameterMap, ParameterMetadata, ParameterRole};
pub use resolved::{join_path, ResolvedCallMetadata};
