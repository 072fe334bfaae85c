//! Classified failures.
//!
//! A guarded operation may fail with any error type that can name its
//! [`FailureKind`]. The guard only reads the kind; the error value itself is
//! handed back untouched when it is not swallowed.

use super::kind::FailureKind;
use std::error::Error as StdError;
use std::fmt;

/// Errors that report the failure kind they belong to.
pub trait Classified {
    /// Returns the runtime kind of this failure.
    fn failure_kind(&self) -> FailureKind;
}

impl<T: Classified + ?Sized> Classified for &T {
    fn failure_kind(&self) -> FailureKind {
        (**self).failure_kind()
    }
}

impl<T: Classified + ?Sized> Classified for Box<T> {
    fn failure_kind(&self) -> FailureKind {
        (**self).failure_kind()
    }
}

/// Looks through the `anyhow` chain for the outermost [`Failure`].
impl Classified for anyhow::Error {
    fn failure_kind(&self) -> FailureKind {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<Failure>())
            .map_or(FailureKind::UNCLASSIFIED, |failure| failure.kind.clone())
    }
}

/// A general purpose classified error.
#[derive(Debug)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Failure {
    /// Creates a failure of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<FailureKind>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the failure kind.
    #[must_use]
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl Classified for Failure {
    fn failure_kind(&self) -> FailureKind {
        self.kind.clone()
    }
}
