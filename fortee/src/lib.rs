//! # Fortee
//!
//! Guards that keep selected failures from crossing an API boundary.
//!
//! An operation marked for guarding must return `Option<T>`. When it fails,
//! the guard checks the failure's kind against the operation's allow-list:
//!
//! - **Swallowed**: the kind is, or derives from, an allow-listed kind. The
//!   caller receives `Ok(None)`.
//! - **Propagated**: anything else. The caller receives the original error
//!   value, untouched.
//!
//! Result types are checked once, when groups are composed. A guarded
//! operation that does not return `Option<T>` aborts composition, with every
//! offending operation reported.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fortee::prelude::*;
//!
//! let hierarchy = KindHierarchy::builder()
//!     .root("NotFound")
//!     .extends("UserNotFound", "NotFound")
//!     .build()?;
//!
//! let users = GroupDeclaration::new("Users").operation(
//!     OperationDeclaration::returning::<Option<User>>("find")
//!         .with_marker(GuardMarker::semisafe(["NotFound"])),
//! );
//!
//! let mut composer = Composer::new(hierarchy);
//! composer.discover(&users)?;
//! let registry = composer.compose()?;
//!
//! let user = registry
//!     .interceptor("Users", "find")?
//!     .intercept(|| repo.find(id))?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod composition;
pub mod config;
pub mod contracts;
pub mod core;
pub mod errors;
pub mod interceptors;
pub mod observability;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::composition::{Composer, GuardRegistry};
    pub use crate::config::{FortConfig, GuardManifest};
    pub use crate::contracts::{
        ContractValidator, GroupDeclaration, OperationDeclaration, TracingViolationLogger,
        ViolationLogger, ViolationRecord,
    };
    pub use crate::core::{
        AllowList, Classified, Failure, FailureKind, GuardMarker, GuardPolicy, KindHierarchy,
        ResultShape, ResultType,
    };
    pub use crate::errors::{FortError, FortResult, IncorrectSignatureError};
    pub use crate::interceptors::{GuardInterceptor, InvocationOutcome};
    pub use crate::observability::init_tracing;
}
