//! Guard markers and resolved allow-lists.

use super::kind::{FailureKind, KindHierarchy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Group name under which the guard interceptor itself is declared.
///
/// Validation never inspects this group.
pub const GUARD_INTERCEPTOR_GROUP: &str = "fortee::GuardInterceptor";

/// Marker placed on a group or an operation to guard it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "allow", rename_all = "snake_case")]
pub enum GuardMarker {
    /// Every failure becomes an absent result.
    Failsafe,
    /// Only failures that are-a listed kind become an absent result.
    ///
    /// An empty list swallows nothing.
    Semisafe(Vec<FailureKind>),
}

impl GuardMarker {
    /// Shorthand for [`GuardMarker::Failsafe`].
    #[must_use]
    pub fn failsafe() -> Self {
        Self::Failsafe
    }

    /// Builds a semisafe marker from an ordered list of kinds.
    #[must_use]
    pub fn semisafe<I, K>(kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FailureKind>,
    {
        Self::Semisafe(kinds.into_iter().map(Into::into).collect())
    }

    /// Picks the marker that governs an operation.
    ///
    /// The operation's own marker wins over its group's. With neither, the
    /// result is an empty semisafe list.
    #[must_use]
    pub fn resolve(operation: Option<&Self>, group: Option<&Self>) -> Self {
        operation
            .or(group)
            .cloned()
            .unwrap_or_else(|| Self::Semisafe(Vec::new()))
    }
}

/// Runtime policy derived from a [`GuardMarker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Swallow every failure.
    SwallowAll,
    /// Swallow only kinds in the allow-list.
    AllowListed(AllowList),
}

impl GuardPolicy {
    /// Resolves a marker against a kind hierarchy.
    #[must_use]
    pub fn from_marker(marker: &GuardMarker, hierarchy: &KindHierarchy) -> Self {
        match marker {
            GuardMarker::Failsafe => Self::SwallowAll,
            GuardMarker::Semisafe(kinds) => Self::AllowListed(AllowList::resolve(kinds, hierarchy)),
        }
    }

    /// Returns true if a failure of `kind` should be swallowed.
    #[must_use]
    pub fn swallows(&self, kind: &FailureKind) -> bool {
        match self {
            Self::SwallowAll => true,
            Self::AllowListed(list) => list.matches(kind),
        }
    }
}

/// An allow-list with inheritance already expanded.
///
/// Holds every listed kind plus each kind the hierarchy knows to derive from
/// one of them, so matching is a set lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    declared: Vec<FailureKind>,
    accepted: HashSet<FailureKind>,
}

impl AllowList {
    /// An allow-list that matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Expands `kinds` through `hierarchy`.
    #[must_use]
    pub fn resolve(kinds: &[FailureKind], hierarchy: &KindHierarchy) -> Self {
        let accepted = kinds
            .iter()
            .flat_map(|kind| hierarchy.descendants_of(kind))
            .collect();
        Self {
            declared: kinds.to_vec(),
            accepted,
        }
    }

    /// Returns true if `kind` is-a listed kind.
    #[must_use]
    pub fn matches(&self, kind: &FailureKind) -> bool {
        self.accepted.contains(kind)
    }

    /// The kinds as declared, in order.
    #[must_use]
    pub fn declared(&self) -> &[FailureKind] {
        &self.declared
    }

    /// Returns true if nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}
