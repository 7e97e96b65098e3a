//! Call pipeline: resolution, execution and per-client executor caching.

pub mod cache;
pub mod executor;
pub mod resolver;

pub use cache::ExecutorCache;
pub use executor::Executor;
pub use resolver::{resolve, RequestOverride, ResolvedRequest};
