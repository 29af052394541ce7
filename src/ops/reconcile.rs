use crate::drag::gesture::DragEntity;
use crate::drag::hit_test::Hover;
use crate::model::board::Board;
use crate::model::item::{Item, ItemId};
use crate::model::section::{ScopeId, SectionId};
use crate::ops::store_ops::{self, Mutation};

/// Where a dragged item would land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub section: Option<SectionId>,
    /// Insertion index among the container's members, the dragged item
    /// excluded
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Optimistic membership update for a drag in progress. Applies and returns
/// the mutations (at most one). Only a change of container moves the item;
/// orders may collide until the drop.
pub fn drag_over(board: &mut Board, entity: &DragEntity, hover: &Hover) -> Vec<Mutation> {
    let plan = plan_drag_over(board, entity, hover);
    apply_plan(board, plan)
}

/// Final commit for a finished drag. Applies and returns the mutations.
///
/// An item drop renumbers the target container to `0..n` and leaves the
/// source container's orders alone. A section drop renumbers every section
/// of the scope. Stale or meaningless drops produce no mutations.
pub fn drag_end(board: &mut Board, entity: &DragEntity, hover: &Hover) -> Vec<Mutation> {
    let plan = plan_drag_end(board, entity, hover);
    if !plan.is_empty() {
        tracing::info!(?entity, ?hover, mutations = plan.len(), "committing drop");
    }
    apply_plan(board, plan)
}

/// Mutations `drag_over` would apply, without applying them.
pub fn plan_drag_over(board: &Board, entity: &DragEntity, hover: &Hover) -> Vec<Mutation> {
    // Sections are only reordered on drop
    let DragEntity::Item(item_id) = entity else {
        return Vec::new();
    };
    let Some(item) = board.item(item_id) else {
        tracing::debug!(item = %item_id, "drag over: item no longer exists");
        return Vec::new();
    };
    let Some(placement) = item_placement(board, item, hover) else {
        return Vec::new();
    };
    if placement.section == item.section {
        return Vec::new();
    }
    vec![Mutation::MoveItem {
        item: item_id.clone(),
        section: placement.section,
        order: placement.index as i64,
    }]
}

/// Mutations `drag_end` would apply, without applying them.
pub fn plan_drag_end(board: &Board, entity: &DragEntity, hover: &Hover) -> Vec<Mutation> {
    match entity {
        DragEntity::Item(item_id) => plan_item_commit(board, item_id, hover),
        DragEntity::Section(section_id) => plan_section_commit(board, section_id, hover),
    }
}

/// Commit an item drop onto an explicit slot of a container.
pub fn move_item_to_slot(
    board: &mut Board,
    item_id: &ItemId,
    section: Option<&SectionId>,
    slot: usize,
) -> Vec<Mutation> {
    drag_end(
        board,
        &DragEntity::Item(item_id.clone()),
        &Hover::OverSlot(section.cloned(), slot),
    )
}

/// Commit a section drop onto whichever section currently sits at
/// `position` (clamped to the last one).
pub fn move_section_to_position(
    board: &mut Board,
    section_id: &SectionId,
    position: usize,
) -> Vec<Mutation> {
    let Some(scope) = board.section(section_id).map(|s| s.scope.clone()) else {
        return Vec::new();
    };
    let current = section_ids(board, &scope);
    let Some(target) = current.get(position.min(current.len().saturating_sub(1))) else {
        return Vec::new();
    };
    let hover = Hover::OverContainer(Some(target.clone()));
    drag_end(board, &DragEntity::Section(section_id.clone()), &hover)
}

// ---------------------------------------------------------------------------
// Item placement
// ---------------------------------------------------------------------------

/// Resolve the container and insertion index a hover implies for `item`.
///
/// Returns `None` for self-drops, hovering nothing, unknown targets and
/// targets in another scope.
pub fn item_placement(board: &Board, item: &Item, hover: &Hover) -> Option<Placement> {
    match hover {
        Hover::None => None,
        Hover::OverContainer(section) => {
            container_in_scope(board, section.as_ref(), &item.scope)?;
            let index = board.members_of(section.as_ref(), &item.scope).len();
            Some(Placement {
                section: section.clone(),
                index,
            })
        }
        Hover::OverItem(other_id) => {
            if other_id == &item.id {
                return None;
            }
            let other = board.item(other_id)?;
            if other.scope != item.scope {
                return None;
            }
            container_in_scope(board, other.section.as_ref(), &item.scope)?;
            let index = board
                .members_of(other.section.as_ref(), &item.scope)
                .iter()
                .position(|m| m.id == other.id)?;
            Some(Placement {
                section: other.section.clone(),
                index,
            })
        }
        Hover::OverSlot(section, slot) => {
            container_in_scope(board, section.as_ref(), &item.scope)?;
            let members = board.member_ids(section.as_ref(), &item.scope);
            let mut index = (*slot).min(members.len());
            // Slots are laid out around the rendered list, which still shows
            // the dragged item in its old place.
            if let Some(current) = members.iter().position(|id| id == &item.id)
                && index > current
            {
                index -= 1;
            }
            Some(Placement {
                section: section.clone(),
                index,
            })
        }
    }
}

/// `Some(())` if `section` is the pseudo-container or a section of `scope`
fn container_in_scope(board: &Board, section: Option<&SectionId>, scope: &ScopeId) -> Option<()> {
    match section {
        None => Some(()),
        Some(id) => {
            let section = board.section(id)?;
            (&section.scope == scope).then_some(())
        }
    }
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

fn plan_item_commit(board: &Board, item_id: &ItemId, hover: &Hover) -> Vec<Mutation> {
    let Some(item) = board.item(item_id) else {
        tracing::debug!(item = %item_id, "drop: item no longer exists");
        return Vec::new();
    };
    let Some(placement) = item_placement(board, item, hover) else {
        tracing::debug!(item = %item_id, ?hover, "drop: no valid target");
        return Vec::new();
    };

    let members = board.members_of(placement.section.as_ref(), &item.scope);
    let mut sequence: Vec<&ItemId> = members
        .iter()
        .map(|m| &m.id)
        .filter(|id| *id != item_id)
        .collect();
    let index = placement.index.min(sequence.len());
    sequence.insert(index, item_id);

    // Entries already at their position emit nothing, so an in-place drop
    // onto a contiguous container plans no mutations
    let mut plan = Vec::new();
    for (position, id) in sequence.into_iter().enumerate() {
        let order = position as i64;
        if id == item_id {
            if item.section != placement.section {
                plan.push(Mutation::MoveItem {
                    item: id.clone(),
                    section: placement.section.clone(),
                    order,
                });
            } else if item.order != order {
                plan.push(Mutation::ReorderItem {
                    item: id.clone(),
                    order,
                });
            }
        } else if let Some(sibling) = board.item(id)
            && sibling.order != order
        {
            plan.push(Mutation::ReorderItem {
                item: id.clone(),
                order,
            });
        }
    }
    plan
}

fn plan_section_commit(board: &Board, section_id: &SectionId, hover: &Hover) -> Vec<Mutation> {
    let Some(dragged) = board.section(section_id) else {
        tracing::debug!(section = %section_id, "drop: section no longer exists");
        return Vec::new();
    };

    let target = match hover {
        Hover::None => None,
        Hover::OverContainer(section) | Hover::OverSlot(section, _) => section.clone(),
        Hover::OverItem(item_id) => board.item(item_id).and_then(|item| item.section.clone()),
    };
    // The pseudo-container never moves and nothing can be placed before it
    let Some(target) = target else {
        return Vec::new();
    };
    if &target == section_id {
        return Vec::new();
    }
    match board.section(&target) {
        Some(t) if t.scope == dragged.scope => {}
        _ => {
            tracing::debug!(section = %section_id, target = %target, "drop: target outside scope");
            return Vec::new();
        }
    }

    let current = section_ids(board, &dragged.scope);
    let Some(position) = current.iter().position(|id| id == &target) else {
        return Vec::new();
    };
    let mut sequence: Vec<&SectionId> = current.iter().filter(|id| *id != section_id).collect();
    sequence.insert(position.min(sequence.len()), section_id);

    sequence
        .into_iter()
        .enumerate()
        .filter_map(|(position, id)| {
            let order = position as i64;
            let section = board.section(id)?;
            (section.order != order).then(|| Mutation::ReorderSection {
                section: id.clone(),
                order,
            })
        })
        .collect()
}

fn section_ids(board: &Board, scope: &ScopeId) -> Vec<SectionId> {
    board
        .sections_of(scope)
        .into_iter()
        .map(|s| s.id.clone())
        .collect()
}

/// Apply a plan, stopping at the first failure. Returns what was applied.
fn apply_plan(board: &mut Board, plan: Vec<Mutation>) -> Vec<Mutation> {
    let mut applied = Vec::with_capacity(plan.len());
    for mutation in plan {
        if let Err(e) = store_ops::apply(board, &mutation) {
            tracing::warn!(error = %e, ?mutation, "aborting commit");
            break;
        }
        tracing::debug!(?mutation, "applied");
        applied.push(mutation);
    }
    applied
}
