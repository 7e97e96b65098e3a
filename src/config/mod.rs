pub mod models;
pub mod settings;
pub mod url_resolver;

pub use models::ApiMetadataConfig;
pub use settings::ClientSettings;
pub use url_resolver::BaseUrlResolver;
