use std::fmt;

use serde::{Deserialize, Serialize};

use super::section::{ScopeId, SectionId};

/// Identifier of a task, e.g. `T-014`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task on the board.
///
/// `order` is local to the item's container (its section, or the unassigned
/// pseudo-container when `section` is `None`) and is not globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// The view this item belongs to
    pub scope: ScopeId,
    /// Owning section, `None` for unassigned
    #[serde(default)]
    pub section: Option<SectionId>,
    pub order: i64,
    /// `added: 2025-05-14`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, scope: ScopeId, title: impl Into<String>) -> Self {
        Item {
            id,
            title: title.into(),
            scope,
            section: None,
            order: 0,
            added: None,
        }
    }

    /// Whether this item currently lives in the given container of its scope
    pub fn is_in(&self, section: Option<&SectionId>, scope: &ScopeId) -> bool {
        &self.scope == scope && self.section.as_ref() == section
    }
}
