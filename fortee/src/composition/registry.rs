//! The composed, read-only table of guarded operations.

use crate::core::{Classified, GuardPolicy};
use crate::errors::{FortError, FortResult};
use crate::interceptors::GuardInterceptor;
use std::collections::HashMap;
use std::future::Future;

/// Interceptors for every guarded operation, keyed by group and operation.
///
/// Only obtainable from [`super::Composer::compose`], so every entry has
/// passed contract validation. Never mutated afterwards; share it behind an
/// `Arc` for concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct GuardRegistry {
    groups: HashMap<String, HashMap<String, GuardInterceptor>>,
    group_order: Vec<String>,
}

impl GuardRegistry {
    pub(super) fn new(
        groups: HashMap<String, HashMap<String, GuardInterceptor>>,
        group_order: Vec<String>,
    ) -> Self {
        Self {
            groups,
            group_order,
        }
    }

    /// Looks up the interceptor of a guarded operation.
    pub fn interceptor(&self, group: &str, operation: &str) -> FortResult<&GuardInterceptor> {
        self.groups
            .get(group)
            .and_then(|ops| ops.get(operation))
            .ok_or_else(|| FortError::UnknownOperation {
                group: group.to_string(),
                operation: operation.to_string(),
            })
    }

    /// Returns the resolved policy of a guarded operation.
    #[must_use]
    pub fn policy(&self, group: &str, operation: &str) -> Option<&GuardPolicy> {
        self.interceptor(group, operation).ok().map(GuardInterceptor::policy)
    }

    /// Invocation hook: runs `proceed` under the operation's guard.
    ///
    /// The outer result reports lookup problems; the inner one is what the
    /// guarded operation yields to its caller.
    pub fn invoke<T, E, F>(&self, group: &str, operation: &str, proceed: F) -> FortResult<Result<Option<T>, E>>
    where
        F: FnOnce() -> Result<Option<T>, E>,
        E: Classified,
    {
        Ok(self.interceptor(group, operation)?.intercept(proceed))
    }

    /// Async counterpart of [`GuardRegistry::invoke`].
    pub async fn invoke_async<T, E, Fut>(
        &self,
        group: &str,
        operation: &str,
        proceed: Fut,
    ) -> FortResult<Result<Option<T>, E>>
    where
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Classified,
    {
        let interceptor = self.interceptor(group, operation)?;
        Ok(interceptor.intercept_async(proceed).await)
    }

    /// Returns true if the operation is guarded.
    #[must_use]
    pub fn is_guarded(&self, group: &str, operation: &str) -> bool {
        self.interceptor(group, operation).is_ok()
    }

    /// Group names, in discovery order.
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.group_order
    }

    /// Names of the guarded operations in `group`, sorted.
    #[must_use]
    pub fn operations(&self, group: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .groups
            .get(group)
            .map(|ops| ops.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Number of registered groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of guarded operations across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is guarded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composer;
    use crate::contracts::{GroupDeclaration, OperationDeclaration};
    use crate::core::{Failure, GuardMarker, KindHierarchy};

    fn registry() -> GuardRegistry {
        let hierarchy = KindHierarchy::builder()
            .root("NotFound")
            .extends("UserNotFound", "NotFound")
            .build()
            .unwrap();
        let group = GroupDeclaration::new("Users")
            .with_marker(GuardMarker::semisafe(["NotFound"]))
            .operation(OperationDeclaration::returning::<Option<u64>>("find_id"))
            .operation(
                OperationDeclaration::returning::<Option<String>>("nickname")
                    .with_marker(GuardMarker::Failsafe),
            );

        let mut composer = Composer::new(hierarchy);
        composer.discover(&group).unwrap();
        composer.compose().unwrap()
    }

    #[test]
    fn test_group_policy_applies_to_unmarked_operation() {
        let registry = registry();
        let result: Result<Option<u64>, Failure> = registry
            .invoke("Users", "find_id", || Err(Failure::new("UserNotFound", "42")))
            .unwrap();
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_operation_marker_overrides_group_marker() {
        let registry = registry();
        assert_eq!(registry.policy("Users", "nickname"), Some(&GuardPolicy::SwallowAll));

        let result: Result<Option<String>, Failure> = registry
            .invoke("Users", "nickname", || Err(Failure::new("Io", "socket closed")))
            .unwrap();
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_unknown_operation() {
        let registry = registry();
        let err = registry
            .invoke::<u8, Failure, _>("Users", "delete", || Ok(None))
            .unwrap_err();
        assert!(matches!(err, FortError::UnknownOperation { .. }));
        assert!(!registry.is_guarded("Orders", "find_id"));
    }

    #[test]
    fn test_listing() {
        let registry = registry();
        assert_eq!(registry.groups(), &["Users".to_string()]);
        assert_eq!(registry.operations("Users"), vec!["find_id", "nickname"]);
        assert!(registry.operations("Orders").is_empty());
        assert_eq!(registry.len(), 2);
        assert!(GuardRegistry::default().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_async() {
        let registry = registry();
        let result: Result<Option<u64>, Failure> = registry
            .invoke_async("Users", "find_id", async { Ok(Some(7)) })
            .await
            .unwrap();
        assert_eq!(result.unwrap(), Some(7));
    }
}
