//! Declared result types of operations.

use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::fmt;

/// Description of an operation's declared result type.
///
/// Whether the type is maybe-absent is derived from the type itself, never
/// stated separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DeclaredResultType")]
pub struct ResultType {
    type_name: String,
    maybe_absent: bool,
}

/// Manifest form. `maybe_absent` is optional and must agree with the name.
#[derive(Deserialize)]
struct DeclaredResultType {
    type_name: String,
    #[serde(default)]
    maybe_absent: Option<bool>,
}

impl TryFrom<DeclaredResultType> for ResultType {
    type Error = String;

    fn try_from(declared: DeclaredResultType) -> Result<Self, Self::Error> {
        let result_type = Self::named(declared.type_name);
        match declared.maybe_absent {
            Some(flag) if flag != result_type.maybe_absent => Err(format!(
                "result type '{}' declares maybe_absent = {flag}, but its name says {}",
                result_type.type_name, result_type.maybe_absent
            )),
            _ => Ok(result_type),
        }
    }
}

fn is_option_name(name: &str) -> bool {
    let name = name.trim();
    let name = name.strip_prefix("::").unwrap_or(name);
    let name = ["core::option::", "std::option::"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);
    name.starts_with("Option<") && name.ends_with('>')
}

impl ResultType {
    /// Describes `R` through its [`ResultShape`] implementation.
    #[must_use]
    pub fn of<R: ResultShape + ?Sized>() -> Self {
        R::result_type()
    }

    /// A maybe-absent wrapper around the named value type.
    #[must_use]
    pub fn maybe_absent(value_type: impl AsRef<str>) -> Self {
        Self {
            type_name: format!("Option<{}>", value_type.as_ref()),
            maybe_absent: true,
        }
    }

    /// Describes a type by name. `Option<..>` names, with or without the
    /// `std::option::` / `core::option::` path, are maybe-absent.
    #[must_use]
    pub fn named(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let maybe_absent = is_option_name(&type_name);
        Self {
            type_name,
            maybe_absent,
        }
    }

    /// Readable type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns true for the maybe-absent wrapper.
    #[must_use]
    pub fn is_maybe_absent(&self) -> bool {
        self.maybe_absent
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

/// Types that can appear as a declared operation result.
///
/// Only `Option<T>` reports itself as maybe-absent. Other types use the
/// default; downstream types opt in with an empty `impl ResultShape for X {}`.
pub trait ResultShape {
    /// Returns the description of `Self`.
    fn result_type() -> ResultType {
        ResultType::named(type_name::<Self>())
    }
}

impl<T> ResultShape for Option<T> {
    fn result_type() -> ResultType {
        ResultType::maybe_absent(type_name::<T>())
    }
}

macro_rules! plain_result_shape {
    ($($ty:ty),* $(,)?) => {
        $(impl ResultShape for $ty {})*
    };
}

plain_result_shape!(
    (), bool, char, String, str,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    serde_json::Value,
);

impl<T> ResultShape for Vec<T> {}
impl<T: ?Sized> ResultShape for Box<T> {}
impl<T, E> ResultShape for Result<T, E> {}
impl<K, V, S> ResultShape for std::collections::HashMap<K, V, S> {}
