//! Discovery of guarded groups at composition time.

use super::GuardRegistry;
use crate::contracts::{ContractValidator, GroupDeclaration};
use crate::core::KindHierarchy;
use crate::errors::{FortError, FortResult};
use crate::interceptors::GuardInterceptor;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Collects group declarations, validates each one on arrival and produces
/// the immutable [`GuardRegistry`].
///
/// Once any group is rejected the composer is poisoned: later groups are
/// still validated so every problem gets reported, but [`Composer::compose`]
/// fails.
#[derive(Debug, Clone)]
pub struct Composer {
    hierarchy: KindHierarchy,
    validator: ContractValidator,
    groups: HashMap<String, HashMap<String, GuardInterceptor>>,
    group_order: Vec<String>,
    rejected: Vec<String>,
}

impl Composer {
    /// Creates a composer resolving allow-lists against `hierarchy`.
    #[must_use]
    pub fn new(hierarchy: KindHierarchy) -> Self {
        Self {
            hierarchy,
            validator: ContractValidator::new(),
            groups: HashMap::new(),
            group_order: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Replaces the contract validator.
    #[must_use]
    pub fn with_validator(mut self, validator: ContractValidator) -> Self {
        self.validator = validator;
        self
    }

    /// The kind table allow-lists are resolved against.
    #[must_use]
    pub fn hierarchy(&self) -> &KindHierarchy {
        &self.hierarchy
    }

    /// Names of the groups rejected so far.
    #[must_use]
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Discovery hook: validates one group and registers its guarded
    /// operations.
    ///
    /// # Errors
    ///
    /// Returns [`FortError::IncorrectSignature`] with every violation in the
    /// group, [`FortError::DuplicateGroup`] if the name was seen before, or
    /// the naming errors of [`GroupDeclaration::check_names`]. Any error
    /// poisons the composer.
    pub fn discover(&mut self, group: &GroupDeclaration) -> FortResult<()> {
        let accepted = self.accept(group);
        if let Err(e) = &accepted {
            warn!(group = %group.name, error = %e, "Group rejected, composition will abort");
            self.rejected.push(group.name.clone());
        }
        accepted
    }

    fn accept(&mut self, group: &GroupDeclaration) -> FortResult<()> {
        if self.validator.is_skipped(&group.name) {
            debug!(group = %group.name, "Group exempt from guarding");
            return Ok(());
        }
        group.check_names()?;
        if self.groups.contains_key(&group.name) {
            return Err(FortError::DuplicateGroup(group.name.clone()));
        }

        self.validator.enforce(group)?;

        let interceptors: HashMap<_, _> = group
            .guarded_operations()
            .map(|(op, marker)| {
                let interceptor = GuardInterceptor::from_marker(&op.name, &marker, &self.hierarchy);
                (op.name.clone(), interceptor)
            })
            .collect();

        debug!(
            group = %group.name,
            guarded = interceptors.len(),
            "Group accepted"
        );

        self.group_order.push(group.name.clone());
        self.groups.insert(group.name.clone(), interceptors);
        Ok(())
    }

    /// Discovers several groups, stopping at the first rejected one.
    pub fn discover_all<'a, I>(&mut self, groups: I) -> FortResult<()>
    where
        I: IntoIterator<Item = &'a GroupDeclaration>,
    {
        for group in groups {
            self.discover(group)?;
        }
        Ok(())
    }

    /// Finishes composition.
    ///
    /// # Errors
    ///
    /// Returns [`FortError::CompositionAborted`] if any group was rejected.
    pub fn compose(self) -> FortResult<GuardRegistry> {
        if !self.rejected.is_empty() {
            return Err(FortError::CompositionAborted {
                rejected: self.rejected,
            });
        }

        let registry = GuardRegistry::new(self.groups, self.group_order);
        info!(
            groups = registry.group_count(),
            operations = registry.len(),
            "Guard registry composed"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::OperationDeclaration;
    use crate::core::GuardMarker;

    fn repository() -> GroupDeclaration {
        GroupDeclaration::new("Repository")
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<Option<String>>("find"))
    }

    #[test]
    fn test_discover_registers_guarded_operations() {
        let mut composer = Composer::new(KindHierarchy::new());
        composer.discover(&repository()).unwrap();

        let registry = composer.compose().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.interceptor("Repository", "find").is_ok());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut composer = Composer::new(KindHierarchy::new());
        composer.discover(&repository()).unwrap();

        let err = composer.discover(&repository()).unwrap_err();
        assert!(matches!(err, FortError::DuplicateGroup(name) if name == "Repository"));
        assert!(composer.compose().is_err());
    }

    #[test]
    fn test_violations_abort_discovery() {
        let bad = repository().operation(OperationDeclaration::returning::<String>("name"));
        let mut composer = Composer::new(KindHierarchy::new());

        let err = composer.discover(&bad).unwrap_err();
        match err {
            FortError::IncorrectSignature(e) => assert_eq!(e.operations(), vec!["Repository::name"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(composer.rejected(), ["Repository".to_string()]);
        assert!(matches!(
            composer.compose(),
            Err(FortError::CompositionAborted { rejected }) if rejected == vec!["Repository"]
        ));
    }

    #[test]
    fn test_accepted_groups_do_not_survive_a_rejection() {
        let good = GroupDeclaration::new("Good")
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<Option<u8>>("get"));
        let bad = GroupDeclaration::new("Bad")
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<String>("name"));

        let mut composer = Composer::new(KindHierarchy::new());
        composer.discover(&good).unwrap();
        assert!(composer.discover(&bad).is_err());
        assert!(composer.discover(&repository()).is_ok());

        let err = composer.compose().unwrap_err();
        assert_eq!(err.to_string(), "Composition aborted: rejected group(s) Bad");
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        let group = GroupDeclaration::new("Users")
            .operation(OperationDeclaration::returning::<Option<u8>>("find").with_marker(GuardMarker::Failsafe))
            .operation(
                OperationDeclaration::returning::<Option<u8>>("find")
                    .with_marker(GuardMarker::Semisafe(Vec::new())),
            );

        let mut composer = Composer::new(KindHierarchy::new());
        let err = composer.discover(&group).unwrap_err();
        assert!(matches!(
            err,
            FortError::DuplicateOperation { ref group, ref operation } if group == "Users" && operation == "find"
        ));
        assert!(composer.compose().is_err());
    }

    #[test]
    fn test_unnamed_group_rejected() {
        let mut composer = Composer::new(KindHierarchy::new());
        let err = composer.discover(&GroupDeclaration::new("")).unwrap_err();
        assert!(matches!(err, FortError::EmptyGroupName));
    }

    #[test]
    fn test_interceptor_group_is_not_registered() {
        let own = GroupDeclaration::new(GuardInterceptor::GROUP_NAME)
            .with_marker(GuardMarker::Failsafe)
            .operation(OperationDeclaration::returning::<String>("intercept"));

        let mut composer = Composer::new(KindHierarchy::new());
        composer.discover(&own).unwrap();
        assert!(composer.compose().unwrap().is_empty());
    }
}
