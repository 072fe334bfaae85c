//! Testing utilities for guarded operations.
//!
//! This module provides:
//! - A ready-made failure kind table
//! - Guarded service fixtures covering swallow and propagate paths
//! - Assertions for guarded results

mod assertions;
mod fixtures;

pub use assertions::{assert_absent, assert_present, assert_propagated};
pub use fixtures::{
    guarded_group, kinds, misdeclared_group, semi_guarded_group, standard_hierarchy,
    GuardedService, SemiGuardedService,
};
