use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a section, e.g. `S-003`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        SectionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a top-level view (board). Section ordering and item membership are
/// only meaningful within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        ScopeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named grouping of items within a scope (a kanban column or list heading).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub scope: ScopeId,
    pub name: String,
    /// Unique within the scope
    pub order: i64,
}

/// Label used wherever the unassigned pseudo-container is shown
pub const UNASSIGNED_LABEL: &str = "Unsorted";
