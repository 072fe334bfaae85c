//! Composition-time validation of guarded result types.

use super::declarations::{GroupDeclaration, OperationDeclaration};
use crate::core::{ResultType, GUARD_INTERCEPTOR_GROUP};
use crate::errors::IncorrectSignatureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// A guarded operation whose declared result type is not `Option<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Declaring group.
    pub group: String,
    /// Offending operation.
    pub operation: String,
    /// The result type it declares instead.
    pub declared: ResultType,
}

impl ViolationRecord {
    /// Creates a violation record.
    #[must_use]
    pub fn new(group: impl Into<String>, operation: impl Into<String>, declared: ResultType) -> Self {
        Self {
            group: group.into(),
            operation: operation.into(),
            declared,
        }
    }

    fn from_operation(group: &GroupDeclaration, op: &OperationDeclaration) -> Self {
        Self::new(&group.name, &op.name, op.result_type.clone())
    }

    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> String {
        format!("declares '{}' instead of Option<T>", self.declared)
    }
}

impl fmt::Display for ViolationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A guarded operation {} in group {} does not return Option<T>",
            self.operation, self.group
        )
    }
}

/// Sink for violations reported before composition aborts.
#[cfg_attr(test, mockall::automock)]
pub trait ViolationLogger: Send + Sync {
    /// Reports a single violation.
    fn log_violation(&self, violation: &ViolationRecord);
}

/// Reports violations as `tracing` errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingViolationLogger;

impl ViolationLogger for TracingViolationLogger {
    fn log_violation(&self, violation: &ViolationRecord) {
        error!(
            operation = %violation.operation,
            group = %violation.group,
            declared = %violation.declared,
            "{violation}"
        );
    }
}

/// Checks that guarded operations declare `Option<T>`.
///
/// A marked group constrains all of its operations. In an unmarked group
/// only individually marked operations are constrained.
#[derive(Clone)]
pub struct ContractValidator {
    skip_groups: HashSet<String>,
    logger: Arc<dyn ViolationLogger>,
}

impl fmt::Debug for ContractValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractValidator")
            .field("skip_groups", &self.skip_groups)
            .finish_non_exhaustive()
    }
}

impl ContractValidator {
    /// Creates a validator that logs through `tracing` and skips the guard
    /// interceptor's own group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            skip_groups: HashSet::from([GUARD_INTERCEPTOR_GROUP.to_string()]),
            logger: Arc::new(TracingViolationLogger),
        }
    }

    /// Replaces the violation logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ViolationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Adds a group that is never inspected.
    #[must_use]
    pub fn skip_group(mut self, name: impl Into<String>) -> Self {
        self.skip_groups.insert(name.into());
        self
    }

    /// Returns true if the group is exempt from validation.
    #[must_use]
    pub fn is_skipped(&self, group: &str) -> bool {
        self.skip_groups.contains(group)
    }

    /// Collects every violation in `group`, in declaration order.
    #[must_use]
    pub fn find_violations(&self, group: &GroupDeclaration) -> Vec<ViolationRecord> {
        if self.is_skipped(&group.name) {
            debug!(group = %group.name, "Skipping contract validation");
            return Vec::new();
        }

        group
            .operations
            .iter()
            .filter(|op| group.guards(op))
            .filter(|op| !op.result_type.is_maybe_absent())
            .map(|op| ViolationRecord::from_operation(group, op))
            .collect()
    }

    /// Validates one group, logging every violation before failing.
    pub fn enforce(&self, group: &GroupDeclaration) -> Result<(), IncorrectSignatureError> {
        self.report(self.find_violations(group))
    }

    /// Validates several groups and fails once with all of their violations.
    pub fn enforce_all<'a, I>(&self, groups: I) -> Result<(), IncorrectSignatureError>
    where
        I: IntoIterator<Item = &'a GroupDeclaration>,
    {
        let violations = groups
            .into_iter()
            .flat_map(|group| self.find_violations(group))
            .collect();
        self.report(violations)
    }

    fn report(&self, violations: Vec<ViolationRecord>) -> Result<(), IncorrectSignatureError> {
        if violations.is_empty() {
            return Ok(());
        }
        for violation in &violations {
            self.logger.log_violation(violation);
        }
        Err(IncorrectSignatureError::new(violations))
    }
}

impl Default for ContractValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GuardMarker;
    use pretty_assertions::assert_eq;

    fn names(violations: &[ViolationRecord]) -> Vec<&str> {
        violations.iter().map(|v| v.operation.as_str()).collect()
    }

    fn mixed_group() -> GroupDeclaration {
        GroupDeclaration::new("Accounts")
            .operation(OperationDeclaration::returning::<Option<u64>>("balance"))
            .operation(OperationDeclaration::returning::<String>("owner"))
            .operation(OperationDeclaration::returning::<u32>("count"))
            .operation(
                OperationDeclaration::returning::<bool>("close")
                    .with_marker(GuardMarker::semisafe(["Io"])),
            )
    }

    #[test]
    fn test_marked_group_reports_every_non_optional_operation() {
        let group = mixed_group().with_marker(GuardMarker::Failsafe);
        let violations = ContractValidator::new().find_violations(&group);

        assert_eq!(names(&violations), vec!["owner", "count", "close"]);
        assert!(violations.iter().all(|v| v.group == "Accounts"));
    }

    #[test]
    fn test_unmarked_group_reports_only_marked_operations() {
        let violations = ContractValidator::new().find_violations(&mixed_group());
        assert_eq!(names(&violations), vec!["close"]);
    }

    #[test]
    fn test_unguarded_group_is_unconstrained() {
        let group = GroupDeclaration::new("Plain")
            .operation(OperationDeclaration::returning::<String>("name"));
        assert!(ContractValidator::new().enforce(&group).is_ok());
    }

    #[test]
    fn test_conforming_group_passes() {
        let group = GroupDeclaration::new("Lookup")
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<Option<String>>("find"));
        assert!(ContractValidator::new().enforce(&group).is_ok());
    }

    #[test]
    fn test_guard_interceptor_group_is_skipped() {
        let group = GroupDeclaration::new(GUARD_INTERCEPTOR_GROUP)
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<String>("intercept"));

        assert!(ContractValidator::new().find_violations(&group).is_empty());
    }

    #[test]
    fn test_custom_skip_group() {
        let group = mixed_group().with_marker(GuardMarker::Failsafe);
        let validator = ContractValidator::new().skip_group("Accounts");
        assert!(validator.enforce(&group).is_ok());
    }

    #[test]
    fn test_enforce_logs_each_violation_then_fails() {
        let mut logger = MockViolationLogger::new();
        logger
            .expect_log_violation()
            .withf(|v| v.group == "Accounts")
            .times(3)
            .return_const(());

        let validator = ContractValidator::new().with_logger(Arc::new(logger));
        let err = validator
            .enforce(&mixed_group().with_marker(GuardMarker::Failsafe))
            .unwrap_err();

        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn test_enforce_all_aggregates_groups() {
        let mut logger = MockViolationLogger::new();
        logger.expect_log_violation().times(2).return_const(());

        let other = GroupDeclaration::new("Profiles").operation(
            OperationDeclaration::returning::<String>("avatar")
                .with_marker(GuardMarker::Failsafe),
        );
        let groups = [mixed_group(), other];

        let err = ContractValidator::new()
            .with_logger(Arc::new(logger))
            .enforce_all(&groups)
            .unwrap_err();

        assert_eq!(err.operations(), vec!["Accounts::close", "Profiles::avatar"]);
    }

    #[test]
    fn test_violation_message_names_operation_and_group() {
        let record = ViolationRecord::new("Accounts", "owner", ResultType::named("String"));
        assert_eq!(
            record.to_string(),
            "A guarded operation owner in group Accounts does not return Option<T>"
        );
        assert!(record.reason().contains("String"));
    }
}
