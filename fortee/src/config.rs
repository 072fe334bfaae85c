//! Configuration and manifest loading.
//!
//! A manifest is a JSON document that declares the failure kind table and the
//! guarded groups, so a host can register its operations without code:
//!
//! ```json
//! {
//!   "config": { "log_filter": "fortee=debug" },
//!   "kinds": [
//!     { "kind": "Assertion" },
//!     { "kind": "AssertionFailed", "extends": "Assertion" }
//!   ],
//!   "groups": [
//!     {
//!       "name": "Profiles",
//!       "operations": [
//!         {
//!           "name": "avatar",
//!           "result_type": { "type_name": "Option<Avatar>", "maybe_absent": true },
//!           "marker": { "mode": "semisafe", "allow": ["Assertion"] }
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::composition::{Composer, GuardRegistry};
use crate::contracts::{ContractValidator, GroupDeclaration};
use crate::core::{KindDeclaration, KindHierarchy, GUARD_INTERCEPTOR_GROUP};
use crate::errors::FortResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "fortee=info";

fn default_skip_groups() -> Vec<String> {
    vec![GUARD_INTERCEPTOR_GROUP.to_string()]
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortConfig {
    /// Groups never inspected by the contract validator.
    #[serde(default = "default_skip_groups")]
    pub skip_groups: Vec<String>,
    /// Filter used by [`crate::observability::init_tracing`] when
    /// `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for FortConfig {
    fn default() -> Self {
        Self {
            skip_groups: default_skip_groups(),
            log_filter: default_log_filter(),
            json_logs: false,
        }
    }
}

impl FortConfig {
    /// Builds a contract validator honoring `skip_groups`.
    #[must_use]
    pub fn validator(&self) -> ContractValidator {
        self.skip_groups
            .iter()
            .fold(ContractValidator::new(), |validator, group| validator.skip_group(group))
    }
}

/// Declarative description of everything a composer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardManifest {
    /// Runtime settings.
    #[serde(default)]
    pub config: FortConfig,
    /// Failure kind table.
    #[serde(default)]
    pub kinds: Vec<KindDeclaration>,
    /// Group declarations.
    #[serde(default)]
    pub groups: Vec<GroupDeclaration>,
}

impl GuardManifest {
    /// Parses a manifest from JSON.
    pub fn from_json_str(json: &str) -> FortResult<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.check()?;
        Ok(manifest)
    }

    /// Reads and parses a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> FortResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading guard manifest");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serializes the manifest to pretty JSON.
    pub fn to_json_string(&self) -> FortResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check(&self) -> FortResult<()> {
        self.groups.iter().try_for_each(GroupDeclaration::check_names)
    }

    /// Builds the kind table.
    pub fn hierarchy(&self) -> FortResult<KindHierarchy> {
        Ok(KindHierarchy::builder()
            .declarations(self.kinds.iter().cloned())
            .build()?)
    }

    /// Builds a composer and discovers every declared group.
    pub fn into_composer(self) -> FortResult<Composer> {
        let hierarchy = self.hierarchy()?;
        let mut composer = Composer::new(hierarchy).with_validator(self.config.validator());
        composer.discover_all(&self.groups)?;
        Ok(composer)
    }

    /// Discovers every declared group and freezes the result.
    pub fn compose(self) -> FortResult<GuardRegistry> {
        self.into_composer()?.compose()
    }
}
