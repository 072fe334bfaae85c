//! Test assertions for guarded results.

use crate::core::{Classified, FailureKind};
use std::fmt::Debug;

/// Asserts that a guarded call produced an absent result.
pub fn assert_absent<T: Debug, E: Debug>(result: &Result<Option<T>, E>) {
    assert!(
        matches!(result, Ok(None)),
        "Expected an absent result, got {:?}",
        result
    );
}

/// Asserts that a guarded call produced the expected value.
pub fn assert_present<T: Debug + PartialEq, E: Debug>(result: &Result<Option<T>, E>, expected: &T) {
    match result {
        Ok(Some(value)) => assert_eq!(value, expected, "Unexpected present value"),
        other => panic!("Expected present({:?}), got {:?}", expected, other),
    }
}

/// Asserts that a guarded call handed back a failure of exactly `kind`.
pub fn assert_propagated<T: Debug, E: Classified + Debug>(
    result: &Result<Option<T>, E>,
    kind: &FailureKind,
) {
    match result {
        Err(error) => assert_eq!(
            &error.failure_kind(),
            kind,
            "Propagated failure has the wrong kind: {:?}",
            error
        ),
        Ok(value) => panic!("Expected a propagated {} failure, got Ok({:?})", kind, value),
    }
}
