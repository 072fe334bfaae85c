//! Guard contracts.
//!
//! This module provides:
//! - Group and operation declarations
//! - Composition-time validation of guarded result types
//! - Violation reporting

mod declarations;
mod validator;

pub use declarations::{GroupDeclaration, OperationDeclaration};
pub use validator::{ContractValidator, TracingViolationLogger, ViolationLogger, ViolationRecord};
