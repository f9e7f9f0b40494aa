//! Access-profile tags that let an agent enter restricted cells.

use std::collections::BTreeSet;

/// The set of access-profile tags (e.g. `"ICU"`, `"PHARMACY"`) an agent holds.
///
/// Kept sorted so iteration, display and serialization are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AccessProfiles(BTreeSet<String>);

impl AccessProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// `true` if any of `required` is held.  An empty `required` list is a
    /// vacuous restriction and always passes.
    pub fn permits(&self, required: &[String]) -> bool {
        required.is_empty() || required.iter().any(|r| self.0.contains(r))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AccessProfiles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
