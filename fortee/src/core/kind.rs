//! Failure kinds and the "kind extends kind" relation.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Identifier of a failure kind.
///
/// Kinds are plain names. Their inheritance lives in a [`KindHierarchy`],
/// so the same identifier can be declared in code or in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureKind(Cow<'static, str>);

impl FailureKind {
    /// Kind reported for errors that carry no classification.
    pub const UNCLASSIFIED: Self = Self::from_static("Unclassified");

    /// Creates a kind from a static name, usable in `const` items.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a kind from any name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the kind name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FailureKind {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for FailureKind {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Errors raised while building a [`KindHierarchy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KindHierarchyError {
    /// The kind was declared twice.
    #[error("Failure kind '{kind}' is already declared")]
    Duplicate {
        /// The duplicated kind.
        kind: FailureKind,
    },

    /// A kind extends a parent that was never declared.
    #[error("Failure kind '{kind}' extends undeclared kind '{parent}'")]
    UnknownParent {
        /// The declaring kind.
        kind: FailureKind,
        /// The missing parent.
        parent: FailureKind,
    },

    /// A kind (transitively) extends itself.
    #[error("Failure kind hierarchy contains a cycle: {}", path_display(.path))]
    Cycle {
        /// The kinds forming the cycle.
        path: Vec<FailureKind>,
    },
}

fn path_display(path: &[FailureKind]) -> String {
    path.iter()
        .map(FailureKind::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Table of failure kinds and the kind each one extends.
#[derive(Debug, Clone, Default)]
pub struct KindHierarchy {
    parents: HashMap<FailureKind, Option<FailureKind>>,
}

impl KindHierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> KindHierarchyBuilder {
        KindHierarchyBuilder::default()
    }

    /// Returns true if the kind was declared.
    #[must_use]
    pub fn contains(&self, kind: &FailureKind) -> bool {
        self.parents.contains_key(kind)
    }

    /// Returns the direct parent of a kind.
    #[must_use]
    pub fn parent(&self, kind: &FailureKind) -> Option<&FailureKind> {
        self.parents.get(kind).and_then(Option::as_ref)
    }

    /// Walks from `kind` up to its root, `kind` itself first.
    pub fn ancestry<'a>(&'a self, kind: &'a FailureKind) -> impl Iterator<Item = &'a FailureKind> + 'a {
        std::iter::successors(Some(kind), move |k| self.parent(k))
    }

    /// Returns true if `kind` equals `ancestor` or derives from it.
    #[must_use]
    pub fn is_a(&self, kind: &FailureKind, ancestor: &FailureKind) -> bool {
        self.ancestry(kind).any(|k| k == ancestor)
    }

    /// Returns `kind` together with every declared kind that derives from it.
    #[must_use]
    pub fn descendants_of(&self, kind: &FailureKind) -> HashSet<FailureKind> {
        let mut found: HashSet<FailureKind> = self
            .parents
            .keys()
            .filter(|k| self.is_a(k, kind))
            .cloned()
            .collect();
        found.insert(kind.clone());
        found
    }

    /// Returns the number of declared kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if no kinds are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// One entry of a kind table, as written in manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDeclaration {
    /// The kind being declared.
    pub kind: FailureKind,
    /// The kind it extends, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<FailureKind>,
}

/// Builder for [`KindHierarchy`].
///
/// Declarations may appear in any order; parents are checked in `build`.
#[derive(Debug, Clone, Default)]
pub struct KindHierarchyBuilder {
    declarations: Vec<KindDeclaration>,
}

impl KindHierarchyBuilder {
    /// Declares a kind with no parent.
    #[must_use]
    pub fn root(mut self, kind: impl Into<FailureKind>) -> Self {
        self.declarations.push(KindDeclaration {
            kind: kind.into(),
            extends: None,
        });
        self
    }

    /// Declares `kind` as deriving from `parent`.
    #[must_use]
    pub fn extends(mut self, kind: impl Into<FailureKind>, parent: impl Into<FailureKind>) -> Self {
        self.declarations.push(KindDeclaration {
            kind: kind.into(),
            extends: Some(parent.into()),
        });
        self
    }

    /// Adds declarations loaded from elsewhere.
    #[must_use]
    pub fn declarations(mut self, declarations: impl IntoIterator<Item = KindDeclaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// Validates the table and builds the hierarchy.
    pub fn build(self) -> Result<KindHierarchy, KindHierarchyError> {
        let mut parents = HashMap::with_capacity(self.declarations.len());
        for decl in self.declarations {
            if parents.contains_key(&decl.kind) {
                return Err(KindHierarchyError::Duplicate { kind: decl.kind });
            }
            parents.insert(decl.kind, decl.extends);
        }

        for (kind, parent) in &parents {
            if let Some(parent) = parent {
                if !parents.contains_key(parent) {
                    return Err(KindHierarchyError::UnknownParent {
                        kind: kind.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        for start in parents.keys() {
            let mut path = vec![start.clone()];
            let mut current = parents.get(start).and_then(Option::as_ref);
            while let Some(next) = current {
                if let Some(pos) = path.iter().position(|k| k == next) {
                    let mut cycle = path.split_off(pos);
                    cycle.push(next.clone());
                    return Err(KindHierarchyError::Cycle { path: cycle });
                }
                path.push(next.clone());
                current = parents.get(next).and_then(Option::as_ref);
            }
        }

        Ok(KindHierarchy { parents })
    }
}
