//! Static declarations of groups and their operations.

use crate::core::{GuardMarker, ResultShape, ResultType};
use crate::errors::{FortError, FortResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A callable unit that may be guarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDeclaration {
    /// Operation name, unique within its group.
    pub name: String,
    /// Declared result type.
    pub result_type: ResultType,
    /// Marker carried by the operation itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<GuardMarker>,
}

impl OperationDeclaration {
    /// Declares an operation with an explicit result type.
    #[must_use]
    pub fn new(name: impl Into<String>, result_type: ResultType) -> Self {
        Self {
            name: name.into(),
            result_type,
            marker: None,
        }
    }

    /// Declares an operation returning `R`.
    #[must_use]
    pub fn returning<R: ResultShape + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, ResultType::of::<R>())
    }

    /// Places a guard marker on the operation.
    #[must_use]
    pub fn with_marker(mut self, marker: GuardMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Returns true if the operation itself is marked.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }
}

/// A containing unit of operations, such as a service or repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDeclaration {
    /// Group name.
    pub name: String,
    /// Marker carried by the group; guards every operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<GuardMarker>,
    /// Declared operations, in declaration order.
    #[serde(default)]
    pub operations: Vec<OperationDeclaration>,
}

impl GroupDeclaration {
    /// Creates an unmarked group with no operations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            marker: None,
            operations: Vec::new(),
        }
    }

    /// Places a guard marker on the whole group.
    #[must_use]
    pub fn with_marker(mut self, marker: GuardMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationDeclaration) -> Self {
        self.operations.push(operation);
        self
    }

    /// Returns true if the group itself is marked.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// Looks up an operation by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&OperationDeclaration> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Returns true if `operation` is guarded, directly or through the group.
    #[must_use]
    pub fn guards(&self, operation: &OperationDeclaration) -> bool {
        self.is_marked() || operation.is_marked()
    }

    /// Checks that the group is named and its operation names are unique.
    pub fn check_names(&self) -> FortResult<()> {
        if self.name.trim().is_empty() {
            return Err(FortError::EmptyGroupName);
        }
        let mut seen = HashSet::new();
        for op in &self.operations {
            if !seen.insert(op.name.as_str()) {
                return Err(FortError::DuplicateOperation {
                    group: self.name.clone(),
                    operation: op.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Iterates over guarded operations with the marker that governs each.
    pub fn guarded_operations(&self) -> impl Iterator<Item = (&OperationDeclaration, GuardMarker)> + '_ {
        self.operations
            .iter()
            .filter(|op| self.guards(op))
            .map(|op| {
                let marker = GuardMarker::resolve(op.marker.as_ref(), self.marker.as_ref());
                (op, marker)
            })
    }
}
