//! Guarded service fixtures.
//!
//! The services stand in for what a host container would generate: each
//! method forwards its real body through the interceptor registered for it.

use crate::composition::GuardRegistry;
use crate::contracts::{GroupDeclaration, OperationDeclaration};
use crate::core::{Failure, GuardMarker, KindHierarchy, KindHierarchyError};
use crate::errors::FortResult;
use crate::interceptors::GuardInterceptor;

/// Failure kinds of the standard table.
pub mod kinds {
    use crate::core::FailureKind;

    /// Root of every standard kind.
    pub const THROWABLE: FailureKind = FailureKind::from_static("Throwable");
    /// Serious problems.
    pub const ERROR: FailureKind = FailureKind::from_static("Error");
    /// A failed assertion.
    pub const ASSERTION: FailureKind = FailureKind::from_static("Assertion");
    /// A more specific failed assertion, derived from [`ASSERTION`].
    pub const ASSERTION_FAILED: FailureKind = FailureKind::from_static("AssertionFailed");
    /// Malformed input that is unrelated to assertions.
    pub const CLASS_FORMAT: FailureKind = FailureKind::from_static("ClassFormat");
    /// Recoverable conditions.
    pub const EXCEPTION: FailureKind = FailureKind::from_static("Exception");
    /// Unchecked runtime failures.
    pub const RUNTIME: FailureKind = FailureKind::from_static("Runtime");
}

/// Builds the standard kind table:
///
/// ```text
/// Throwable
/// ├── Error
/// │   ├── Assertion
/// │   │   └── AssertionFailed
/// │   └── ClassFormat
/// └── Exception
///     └── Runtime
/// ```
pub fn standard_hierarchy() -> Result<KindHierarchy, KindHierarchyError> {
    KindHierarchy::builder()
        .root(kinds::THROWABLE)
        .extends(kinds::ERROR, kinds::THROWABLE)
        .extends(kinds::ASSERTION, kinds::ERROR)
        .extends(kinds::ASSERTION_FAILED, kinds::ASSERTION)
        .extends(kinds::CLASS_FORMAT, kinds::ERROR)
        .extends(kinds::EXCEPTION, kinds::THROWABLE)
        .extends(kinds::RUNTIME, kinds::EXCEPTION)
        .build()
}

/// Declaration of [`SemiGuardedService`]: operation-level allow-lists only.
#[must_use]
pub fn semi_guarded_group() -> GroupDeclaration {
    let op = |name: &str, marker: GuardMarker| {
        OperationDeclaration::returning::<Option<String>>(name).with_marker(marker)
    };
    GroupDeclaration::new(SemiGuardedService::GROUP)
        .operation(op("let_through", GuardMarker::semisafe([kinds::ASSERTION])))
        .operation(op("let_inherited_through", GuardMarker::semisafe([kinds::ASSERTION])))
        .operation(op("do_not_let_through", GuardMarker::semisafe([kinds::ASSERTION])))
        .operation(op("return_something", GuardMarker::semisafe(Vec::<&str>::new())))
        .operation(op("throw_silent", GuardMarker::semisafe([kinds::RUNTIME])))
        .operation(op("convert_silent", GuardMarker::semisafe(Vec::<&str>::new())))
}

/// Declaration of [`GuardedService`]: a failsafe marker on the whole group.
#[must_use]
pub fn guarded_group() -> GroupDeclaration {
    GroupDeclaration::new(GuardedService::GROUP)
        .with_marker(GuardMarker::Failsafe)
        .operation(OperationDeclaration::returning::<Option<String>>("throw_error"))
        .operation(OperationDeclaration::returning::<Option<String>>("return_something"))
}

/// A group that breaks the `Option<T>` contract twice.
#[must_use]
pub fn misdeclared_group() -> GroupDeclaration {
    GroupDeclaration::new("MisdeclaredService")
        .with_marker(GuardMarker::Failsafe)
        .operation(OperationDeclaration::returning::<Option<String>>("fine"))
        .operation(OperationDeclaration::returning::<String>("returns_string"))
        .operation(OperationDeclaration::returning::<Vec<Option<String>>>("returns_list"))
}

fn lookup(registry: &GuardRegistry, group: &str, operation: &str) -> FortResult<GuardInterceptor> {
    registry.interceptor(group, operation).cloned()
}

/// Service whose operations each carry their own allow-list.
#[derive(Debug, Clone)]
pub struct SemiGuardedService {
    let_through: GuardInterceptor,
    let_inherited_through: GuardInterceptor,
    do_not_let_through: GuardInterceptor,
    return_something: GuardInterceptor,
    throw_silent: GuardInterceptor,
    convert_silent: GuardInterceptor,
}

impl SemiGuardedService {
    /// Group name of the service.
    pub const GROUP: &'static str = "SemiGuardedService";

    /// Binds the service to the interceptors composed for it.
    pub fn new(registry: &GuardRegistry) -> FortResult<Self> {
        Ok(Self {
            let_through: lookup(registry, Self::GROUP, "let_through")?,
            let_inherited_through: lookup(registry, Self::GROUP, "let_inherited_through")?,
            do_not_let_through: lookup(registry, Self::GROUP, "do_not_let_through")?,
            return_something: lookup(registry, Self::GROUP, "return_something")?,
            throw_silent: lookup(registry, Self::GROUP, "throw_silent")?,
            convert_silent: lookup(registry, Self::GROUP, "convert_silent")?,
        })
    }

    /// Fails with an allow-listed kind.
    pub fn let_through(&self) -> Result<Option<String>, Failure> {
        self.let_through
            .intercept(|| Err(Failure::new(kinds::ASSERTION, "assertion")))
    }

    /// Fails with a kind derived from the allow-listed one.
    pub fn let_inherited_through(&self) -> Result<Option<String>, Failure> {
        self.let_inherited_through
            .intercept(|| Err(Failure::new(kinds::ASSERTION_FAILED, "assertion failed")))
    }

    /// Fails with a kind outside the allow-list.
    pub fn do_not_let_through(&self) -> Result<Option<String>, Failure> {
        self.do_not_let_through
            .intercept(|| Err(Failure::new(kinds::CLASS_FORMAT, "class format")))
    }

    /// Returns a value under an empty allow-list.
    pub fn return_something(&self) -> Result<Option<String>, Failure> {
        self.return_something
            .intercept(|| Ok(Some("Something".to_string())))
    }

    /// Fails with an allow-listed runtime failure.
    pub fn throw_silent(&self) -> Result<Option<String>, Failure> {
        self.throw_silent
            .intercept(|| Err(Failure::new(kinds::RUNTIME, "silent")))
    }

    /// Fails with a runtime failure under an empty allow-list.
    pub fn convert_silent(&self) -> Result<Option<String>, Failure> {
        self.convert_silent
            .intercept(|| Err(Failure::new(kinds::RUNTIME, "silent")))
    }
}

/// Service guarded as a whole by a failsafe marker.
#[derive(Debug, Clone)]
pub struct GuardedService {
    throw_error: GuardInterceptor,
    return_something: GuardInterceptor,
}

impl GuardedService {
    /// Group name of the service.
    pub const GROUP: &'static str = "GuardedService";

    /// Binds the service to the interceptors composed for it.
    pub fn new(registry: &GuardRegistry) -> FortResult<Self> {
        Ok(Self {
            throw_error: lookup(registry, Self::GROUP, "throw_error")?,
            return_something: lookup(registry, Self::GROUP, "return_something")?,
        })
    }

    /// Fails with an arbitrary kind.
    pub fn throw_error(&self) -> Result<Option<String>, Failure> {
        self.throw_error
            .intercept(|| Err(Failure::new(kinds::CLASS_FORMAT, "unexpected")))
    }

    /// Returns a value.
    pub fn return_something(&self) -> Result<Option<String>, Failure> {
        self.return_something
            .intercept(|| Ok(Some("Something".to_string())))
    }
}
