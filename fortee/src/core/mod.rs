//! Core domain model types for fortee.
//!
//! This module contains the vocabulary shared by validation and interception:
//! - Failure kinds and their inheritance table
//! - Classified failures
//! - Guard markers, policies and resolved allow-lists
//! - Declared result types

mod failure;
mod kind;
mod marker;
mod result_type;

pub use failure::{Classified, Failure};
pub use kind::{
    FailureKind, KindDeclaration, KindHierarchy, KindHierarchyBuilder, KindHierarchyError,
};
pub use marker::{AllowList, GuardMarker, GuardPolicy, GUARD_INTERCEPTOR_GROUP};
pub use result_type::{ResultShape, ResultType};
