use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display names for the agents the research crew runs.
const CREW_ROLES: &[(&str, &str)] = &[
    ("manager", "Crew Manager"),
    ("web_researcher", "Expert Web Researcher"),
    ("aggregator", "Analytical Aggregator"),
    ("synthesizer", "Innovative Synthesizer"),
];

/// Read-only mapping from raw agent ids to the role shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAliases(BTreeMap<String, String>);

impl Default for RoleAliases {
    fn default() -> Self {
        Self::crew()
    }
}

impl RoleAliases {
    /// No aliases: every agent is shown by its raw id.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// The roles of the research crew.
    #[must_use]
    pub fn crew() -> Self {
        CREW_ROLES
            .iter()
            .map(|(id, role)| ((*id).to_string(), (*role).to_string()))
            .collect()
    }

    /// Builder: add or replace one alias
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, role: impl Into<String>) -> Self {
        self.0.insert(id.into(), role.into());
        self
    }

    pub(crate) fn extend(&mut self, overrides: BTreeMap<String, String>) {
        self.0.extend(overrides);
    }

    /// Display role for `id`, or `id` itself when no alias exists.
    #[must_use]
    pub fn resolve(&self, id: &str) -> String {
        self.0.get(id).cloned().unwrap_or_else(|| id.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, role)| (id.as_str(), role.as_str()))
    }
}

impl FromIterator<(String, String)> for RoleAliases {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
