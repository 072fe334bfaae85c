//! Error types for the fortee framework.
//!
//! Only configuration problems live here. Failures raised by guarded
//! operations are never wrapped into these types; they are either swallowed
//! or handed back to the caller as they were raised.

use crate::contracts::ViolationRecord;
use crate::core::KindHierarchyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for fortee operations.
#[derive(Debug, Error)]
pub enum FortError {
    /// Guarded operations violate the maybe-absent result contract.
    #[error("{0}")]
    IncorrectSignature(#[from] IncorrectSignatureError),

    /// The failure kind table is malformed.
    #[error("{0}")]
    KindHierarchy(#[from] KindHierarchyError),

    /// A group was discovered twice.
    #[error("Group '{0}' is already registered")]
    DuplicateGroup(String),

    /// A group declares the same operation name more than once.
    #[error("Operation '{operation}' is declared more than once in group '{group}'")]
    DuplicateOperation {
        /// The group name.
        group: String,
        /// The repeated operation name.
        operation: String,
    },

    /// A group was declared without a name.
    #[error("Group name must not be empty")]
    EmptyGroupName,

    /// `compose` was called on a composer that rejected a group.
    #[error("Composition aborted: rejected group(s) {}", .rejected.join(", "))]
    CompositionAborted {
        /// Names of the rejected groups, in discovery order.
        rejected: Vec<String>,
    },

    /// An invocation named an operation the registry does not guard.
    #[error("Operation '{operation}' in group '{group}' is not registered for guarding")]
    UnknownOperation {
        /// The group name.
        group: String,
        /// The operation name.
        operation: String,
    },

    /// Manifest or configuration parsing failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for fortee results.
pub type FortResult<T> = Result<T, FortError>;

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-005-SIGNATURE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Common contract error codes.
pub mod codes {
    /// Guarded operation without a maybe-absent result type.
    pub const SIGNATURE: &str = "CONTRACT-005-SIGNATURE";
}

/// Raised when composition finds guarded operations that do not return
/// `Option<T>`. Carries every violation found, not only the first.
#[derive(Debug, Clone, Error)]
#[error(
    "Found {} operation(s) that violate the Option<T> return contract: {}",
    .violations.len(),
    violation_list(.violations)
)]
pub struct IncorrectSignatureError {
    /// All violations, in discovery order.
    pub violations: Vec<ViolationRecord>,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

fn violation_list(violations: &[ViolationRecord]) -> String {
    violations
        .iter()
        .map(|v| format!("{}::{}", v.group, v.operation))
        .collect::<Vec<_>>()
        .join(", ")
}

impl IncorrectSignatureError {
    /// Creates the error from a non-empty violation list.
    #[must_use]
    pub fn new(violations: Vec<ViolationRecord>) -> Self {
        let info = ContractErrorInfo::new(
            codes::SIGNATURE,
            "Guarded operations must declare an Option<T> result type.",
        )
        .with_fix_hint(
            "Change the listed operations to return Option<T>, or remove their guard marker.",
        )
        .with_context_entry("violations", violations.len().to_string());

        Self {
            violations,
            error_info: info,
        }
    }

    /// Returns the `group::operation` identities of all violations.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|v| format!("{}::{}", v.group, v.operation))
            .collect()
    }
}
