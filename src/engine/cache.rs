//! Per-client executor cache.

use super::executor::Executor;
use crate::metadata::{ApiMetadata, DeclaredEndpoint, ResolvedCallMetadata};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Write-once map from method name to its executor.
///
/// The lock is held only for map access; executors are built outside it.
/// Two callers racing on the same cold method may both build one, and the
/// later insert wins. Both builds are pure, so either executor is correct.
#[derive(Debug, Default)]
pub struct ExecutorCache {
    executors: RwLock<HashMap<String, Arc<Executor>>>,
}

impl ExecutorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached executor for `method_name`, building it on first use.
    ///
    /// `api_override`, when present, replaces `static_api` wholesale. It is
    /// read only on the first build; later calls never see a different
    /// override.
    pub fn get_or_create(
        &self,
        method_name: &str,
        declared: &DeclaredEndpoint,
        static_api: &Arc<ApiMetadata>,
        api_override: Option<&Arc<ApiMetadata>>,
    ) -> Arc<Executor> {
        if let Some(executor) = self
            .executors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method_name)
        {
            return Arc::clone(executor);
        }

        let api = Arc::clone(api_override.unwrap_or(static_api));
        let metadata = ResolvedCallMetadata::new(
            method_name,
            api,
            Arc::clone(&declared.endpoint),
            Arc::clone(&declared.parameters),
        );
        let executor = Arc::new(Executor::new(Arc::new(metadata)));
        debug!(
            target: "tether::cache",
            method = method_name,
            overridden = api_override.is_some(),
            "built executor"
        );

        self.executors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method_name.to_string(), Arc::clone(&executor));
        executor
    }

    /// Number of methods with a built executor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EndpointMetadata, ParameterMap};

    fn declared() -> DeclaredEndpoint {
        DeclaredEndpoint {
            endpoint: Arc::new(EndpointMetadata::get("/users")),
            parameters: Arc::new(ParameterMap::new()),
        }
    }

    #[test]
    fn test_executor_is_built_once_per_method() {
        let cache = ExecutorCache::new();
        let api = Arc::new(ApiMetadata::new().with_base_path("/v1"));
        let declared = declared();

        let first = cache.get_or_create("list", &declared, &api, None);
        let second = cache.get_or_create("list", &declared, &api, None);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let other = cache.get_or_create("other", &declared, &api, None);
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_override_replaces_static_api_wholesale() {
        let cache = ExecutorCache::new();
        let static_api = Arc::new(
            ApiMetadata::new()
                .with_base_path("/static")
                .with_header("X-Static", "1"),
        );
        let override_api = Arc::new(ApiMetadata::new().with_base_path("/override"));

        let executor = cache.get_or_create("list", &declared(), &static_api, Some(&override_api));
        let metadata = executor.metadata();
        assert!(Arc::ptr_eq(metadata.api(), &override_api));
        assert_eq!(metadata.base_path(), "/override");
        assert!(!metadata.headers().contains_key("X-Static"));
    }

    #[test]
    fn test_override_is_not_reread_after_first_build() {
        let cache = ExecutorCache::new();
        let static_api = Arc::new(ApiMetadata::new().with_base_path("/static"));
        let late_override = Arc::new(ApiMetadata::new().with_base_path("/late"));

        let first = cache.get_or_create("list", &declared(), &static_api, None);
        let second = cache.get_or_create("list", &declared(), &static_api, Some(&late_override));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.metadata().base_path(), "/static");
    }
}
