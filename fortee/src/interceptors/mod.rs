//! Interceptors wrapped around guarded operations.

mod guard;

pub use guard::{GuardInterceptor, Invocation, InvocationOutcome};
