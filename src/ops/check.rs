use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::board::Board;
use crate::model::item::ItemId;
use crate::model::section::{ScopeId, SectionId};

/// Structured result from `sb check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Two or more items of one concrete container share an order value
    #[serde(rename = "duplicate_item_order")]
    DuplicateItemOrder {
        scope: ScopeId,
        section: SectionId,
        order: i64,
        items: Vec<ItemId>,
    },
    /// Two or more sections of one scope share an order value
    #[serde(rename = "duplicate_section_order")]
    DuplicateSectionOrder {
        scope: ScopeId,
        order: i64,
        sections: Vec<SectionId>,
    },
    /// An item references a section that doesn't exist
    #[serde(rename = "dangling_section")]
    DanglingSection { item: ItemId, section: SectionId },
    /// An item references a section that belongs to another scope
    #[serde(rename = "cross_scope")]
    CrossScope {
        item: ItemId,
        item_scope: ScopeId,
        section: SectionId,
        section_scope: ScopeId,
    },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A container's orders are unique but not exactly 0..n
    #[serde(rename = "non_contiguous")]
    NonContiguous {
        scope: ScopeId,
        #[serde(skip_serializing_if = "Option::is_none")]
        section: Option<SectionId>,
        orders: Vec<i64>,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a board and return structured results. Read-only.
///
/// Checks performed:
/// 1. Every item's section exists and lives in the item's scope
/// 2. Item orders are unique within each concrete container
/// 3. Section orders are unique within each scope
/// 4. Warnings for containers whose orders have gaps
///
/// The unassigned pseudo-container never reports duplicate orders: unsorted
/// items may legitimately share an order and fall back to storage order.
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();

    for item in board.items() {
        let Some(section_id) = &item.section else {
            continue;
        };
        match board.section(section_id) {
            None => result.errors.push(CheckError::DanglingSection {
                item: item.id.clone(),
                section: section_id.clone(),
            }),
            Some(section) if section.scope != item.scope => {
                result.errors.push(CheckError::CrossScope {
                    item: item.id.clone(),
                    item_scope: item.scope.clone(),
                    section: section_id.clone(),
                    section_scope: section.scope.clone(),
                })
            }
            Some(_) => {}
        }
    }

    for scope in board.scopes() {
        check_scope(board, &scope, &mut result);
    }

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Per-scope validation
// ---------------------------------------------------------------------------

fn check_scope(board: &Board, scope: &ScopeId, result: &mut CheckResult) {
    let sections = board.sections_of(scope);

    let by_order = group_by_order(sections.iter().map(|s| (s.order, s.id.clone())));
    for (order, ids) in by_order {
        if ids.len() > 1 {
            result.errors.push(CheckError::DuplicateSectionOrder {
                scope: scope.clone(),
                order,
                sections: ids,
            });
        }
    }

    check_container(board, None, scope, result);
    for section in &sections {
        check_container(board, Some(&section.id), scope, result);
    }
}

fn check_container(
    board: &Board,
    section: Option<&SectionId>,
    scope: &ScopeId,
    result: &mut CheckResult,
) {
    let members = board.members_of(section, scope);
    if members.is_empty() {
        return;
    }

    let by_order = group_by_order(members.iter().map(|i| (i.order, i.id.clone())));
    let mut duplicated = false;
    if let Some(section_id) = section {
        for (order, ids) in &by_order {
            if ids.len() > 1 {
                duplicated = true;
                result.errors.push(CheckError::DuplicateItemOrder {
                    scope: scope.clone(),
                    section: section_id.clone(),
                    order: *order,
                    items: ids.clone(),
                });
            }
        }
    }

    // Gaps only matter once the container is otherwise sound
    if duplicated {
        return;
    }
    let orders: Vec<i64> = members.iter().map(|i| i.order).collect();
    let contiguous = orders.iter().enumerate().all(|(idx, &o)| o == idx as i64);
    if !contiguous {
        result.warnings.push(CheckWarning::NonContiguous {
            scope: scope.clone(),
            section: section.cloned(),
            orders,
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn group_by_order<T>(entries: impl Iterator<Item = (i64, T)>) -> BTreeMap<i64, Vec<T>> {
    let mut groups: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for (order, id) in entries {
        groups.entry(order).or_default().push(id);
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
