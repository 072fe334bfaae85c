//! Composition of guarded groups.
//!
//! Groups are discovered once, validated on arrival, and frozen into a
//! [`GuardRegistry`] that serves invocations.

mod composer;
#[cfg(test)]
mod integration_tests;
mod registry;

pub use composer::Composer;
pub use registry::GuardRegistry;
