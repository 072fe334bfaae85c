//! End-to-end tests: declare, compose, invoke.

use crate::composition::{Composer, GuardRegistry};
use crate::contracts::{
    ContractValidator, GroupDeclaration, OperationDeclaration, ViolationLogger, ViolationRecord,
};
use crate::core::{Failure, GuardMarker};
use crate::errors::FortError;
use crate::testing::{
    assert_absent, assert_present, assert_propagated, guarded_group, kinds, misdeclared_group,
    semi_guarded_group, standard_hierarchy, GuardedService, SemiGuardedService,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingLogger {
    seen: Mutex<Vec<String>>,
}

impl ViolationLogger for RecordingLogger {
    fn log_violation(&self, violation: &ViolationRecord) {
        self.seen.lock().unwrap().push(violation.to_string());
    }
}

fn composed() -> GuardRegistry {
    let mut composer = Composer::new(standard_hierarchy().unwrap());
    composer
        .discover_all(&[semi_guarded_group(), guarded_group()])
        .unwrap();
    composer.compose().unwrap()
}

#[test]
fn test_allow_listed_kind_becomes_absent() {
    let service = SemiGuardedService::new(&composed()).unwrap();
    assert_absent(&service.let_through());
}

#[test]
fn test_inherited_kind_becomes_absent() {
    let service = SemiGuardedService::new(&composed()).unwrap();
    assert_absent(&service.let_inherited_through());
}

#[test]
fn test_unrelated_kind_propagates_with_message() {
    let service = SemiGuardedService::new(&composed()).unwrap();
    let result = service.do_not_let_through();

    assert_propagated(&result, &kinds::CLASS_FORMAT);
    assert_eq!(result.unwrap_err().message(), "class format");
}

#[test]
fn test_present_value_passes_through() {
    let service = SemiGuardedService::new(&composed()).unwrap();
    assert_present(&service.return_something(), &"Something".to_string());
}

#[test]
fn test_runtime_failure_allow_listed_vs_empty_list() {
    let service = SemiGuardedService::new(&composed()).unwrap();
    assert_absent(&service.throw_silent());
    assert_propagated(&service.convert_silent(), &kinds::RUNTIME);
}

#[test]
fn test_failsafe_group_swallows_everything() {
    let service = GuardedService::new(&composed()).unwrap();
    assert_absent(&service.throw_error());
    assert_present(&service.return_something(), &"Something".to_string());
}

#[test]
fn test_supertype_on_allow_list_covers_subtree() {
    let group = GroupDeclaration::new("Reports").operation(
        OperationDeclaration::returning::<Option<u32>>("pages")
            .with_marker(GuardMarker::semisafe([kinds::ERROR])),
    );
    let mut composer = Composer::new(standard_hierarchy().unwrap());
    composer.discover(&group).unwrap();
    let registry = composer.compose().unwrap();

    for kind in [kinds::ASSERTION, kinds::ASSERTION_FAILED, kinds::CLASS_FORMAT] {
        let result: Result<Option<u32>, Failure> = registry
            .invoke("Reports", "pages", || Err(Failure::new(kind.clone(), "")))
            .unwrap();
        assert_absent(&result);
    }

    let result: Result<Option<u32>, Failure> = registry
        .invoke("Reports", "pages", || Err(Failure::new(kinds::RUNTIME, "")))
        .unwrap();
    assert_propagated(&result, &kinds::RUNTIME);
}

#[test]
fn test_misdeclared_group_reports_all_violations_before_abort() {
    let logger = Arc::new(RecordingLogger::default());
    let validator = ContractValidator::new().with_logger(logger.clone());
    let mut composer = Composer::new(standard_hierarchy().unwrap()).with_validator(validator);

    let err = composer
        .discover_all(&[semi_guarded_group(), misdeclared_group(), guarded_group()])
        .unwrap_err();

    let FortError::IncorrectSignature(err) = err else {
        panic!("expected a signature error");
    };
    assert_eq!(
        err.operations(),
        vec!["MisdeclaredService::returns_string", "MisdeclaredService::returns_list"]
    );

    let seen = logger.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].contains("returns_string"));
    assert!(seen[0].contains("MisdeclaredService"));
    drop(seen);

    assert!(matches!(
        composer.compose(),
        Err(FortError::CompositionAborted { rejected }) if rejected == vec!["MisdeclaredService"]
    ));
}

#[test]
fn test_registry_is_shared_across_threads() {
    let registry = Arc::new(composed());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let service = SemiGuardedService::new(&registry).unwrap();
                if i % 2 == 0 {
                    service.let_inherited_through().map(|v| v.is_none())
                } else {
                    service.do_not_let_through().map(|v| v.is_none())
                }
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        if i % 2 == 0 {
            assert!(result.unwrap());
        } else {
            assert!(result.is_err());
        }
    }
}

#[tokio::test]
async fn test_concurrent_async_invocations() {
    let registry = Arc::new(composed());

    let calls = (0..4).map(|i| {
        let registry = Arc::clone(&registry);
        async move {
            registry
                .invoke_async(SemiGuardedService::GROUP, "let_through", async move {
                    if i == 0 {
                        Ok(Some(i))
                    } else {
                        Err(Failure::new(kinds::ASSERTION, "async"))
                    }
                })
                .await
                .unwrap()
        }
    });

    let results = futures::future::join_all(calls).await;
    assert_present(&results[0], &0);
    for result in &results[1..] {
        assert_absent(result);
    }
}
