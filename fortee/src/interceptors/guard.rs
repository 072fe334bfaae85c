//! The guard interceptor: swallow allow-listed failures, return the rest.

use crate::core::{Classified, GuardMarker, GuardPolicy, KindHierarchy, GUARD_INTERCEPTOR_GROUP};
use std::fmt;
use std::future::Future;

/// Terminal state of one guarded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome<T, E> {
    /// The operation returned normally; its value is passed through.
    Completed(Option<T>),
    /// The operation failed with a swallowed kind.
    Swallowed,
    /// The operation failed with a kind the policy does not cover.
    Propagated(E),
}

impl<T, E> InvocationOutcome<T, E> {
    /// Returns true if a failure was swallowed.
    #[must_use]
    pub fn is_swallowed(&self) -> bool {
        matches!(self, Self::Swallowed)
    }

    /// Returns true if a failure is being handed back.
    #[must_use]
    pub fn is_propagated(&self) -> bool {
        matches!(self, Self::Propagated(_))
    }

    /// Converts to what the caller of the guarded operation sees.
    pub fn into_result(self) -> Result<Option<T>, E> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Swallowed => Ok(None),
            Self::Propagated(error) => Err(error),
        }
    }
}

/// Context of a single call: the proceed handle and the policy governing it.
///
/// Consumed by [`Invocation::proceed`]; the wrapped operation runs exactly once.
pub struct Invocation<'a, F> {
    operation: &'a str,
    policy: &'a GuardPolicy,
    proceed: F,
}

impl<'a, F> Invocation<'a, F> {
    /// Captures a call to `operation`.
    pub fn new(operation: &'a str, policy: &'a GuardPolicy, proceed: F) -> Self {
        Self {
            operation,
            policy,
            proceed,
        }
    }

    /// Name of the target operation.
    #[must_use]
    pub fn operation(&self) -> &str {
        self.operation
    }

    /// Runs the real operation and decides on its outcome.
    pub fn proceed<T, E>(self) -> InvocationOutcome<T, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
        E: Classified,
    {
        decide(self.policy, (self.proceed)())
    }

    /// Awaits the real operation and decides on its outcome.
    pub async fn proceed_async<T, E>(self) -> InvocationOutcome<T, E>
    where
        F: Future<Output = Result<Option<T>, E>>,
        E: Classified,
    {
        decide(self.policy, self.proceed.await)
    }
}

impl<F> fmt::Debug for Invocation<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("operation", &self.operation)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn decide<T, E: Classified>(policy: &GuardPolicy, result: Result<Option<T>, E>) -> InvocationOutcome<T, E> {
    match result {
        Ok(value) => InvocationOutcome::Completed(value),
        Err(error) if policy.swallows(&error.failure_kind()) => InvocationOutcome::Swallowed,
        Err(error) => InvocationOutcome::Propagated(error),
    }
}

/// Wraps calls to one guarded operation.
///
/// Holds no mutable state, so one interceptor may serve any number of
/// concurrent callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardInterceptor {
    operation: String,
    policy: GuardPolicy,
}

impl GuardInterceptor {
    /// Group name the interceptor is declared under.
    pub const GROUP_NAME: &'static str = GUARD_INTERCEPTOR_GROUP;

    /// Creates an interceptor for `operation` with a resolved policy.
    #[must_use]
    pub fn new(operation: impl Into<String>, policy: GuardPolicy) -> Self {
        Self {
            operation: operation.into(),
            policy,
        }
    }

    /// Creates an interceptor from a marker and the kind table.
    #[must_use]
    pub fn from_marker(
        operation: impl Into<String>,
        marker: &GuardMarker,
        hierarchy: &KindHierarchy,
    ) -> Self {
        Self::new(operation, GuardPolicy::from_marker(marker, hierarchy))
    }

    /// Name of the guarded operation.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Policy applied to failures.
    #[must_use]
    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Runs `proceed` once and reports which terminal state it reached.
    pub fn decide<T, E, F>(&self, proceed: F) -> InvocationOutcome<T, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
        E: Classified,
    {
        Invocation::new(&self.operation, &self.policy, proceed).proceed()
    }

    /// Runs `proceed` once, turning swallowed failures into `Ok(None)`.
    ///
    /// Failures outside the policy come back as the same value `proceed`
    /// returned.
    pub fn intercept<T, E, F>(&self, proceed: F) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
        E: Classified,
    {
        self.decide(proceed).into_result()
    }

    /// Async counterpart of [`GuardInterceptor::intercept`].
    pub async fn intercept_async<T, E, Fut>(&self, proceed: Fut) -> Result<Option<T>, E>
    where
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Classified,
    {
        Invocation::new(&self.operation, &self.policy, proceed)
            .proceed_async()
            .await
            .into_result()
    }
}
