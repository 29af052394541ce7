use chrono::Local;
use serde::Serialize;

use crate::model::board::Board;
use crate::model::item::{Item, ItemId};
use crate::model::section::{ScopeId, Section, SectionId};

/// Error type for store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),
    #[error("section {section} belongs to scope {section_scope}, not {scope}")]
    CrossScope {
        section: SectionId,
        section_scope: ScopeId,
        scope: ScopeId,
    },
    #[error("section name cannot be empty")]
    EmptyName,
    #[error("item title cannot be empty")]
    EmptyTitle,
}

/// A single field-level change to the store. The reconciliation engine
/// expresses every commit as a list of these; the host observes them to
/// persist and notify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// Item changes container (and takes a new order in it)
    MoveItem {
        item: ItemId,
        section: Option<SectionId>,
        order: i64,
    },
    /// Item keeps its container, order changes
    ReorderItem { item: ItemId, order: i64 },
    ReorderSection { section: SectionId, order: i64 },
}

// ---------------------------------------------------------------------------
// Field updates
// ---------------------------------------------------------------------------

/// Set an item's container and order. Siblings are not touched; the caller
/// is responsible for having computed a consistent order.
pub fn apply_item_move(
    board: &mut Board,
    item_id: &ItemId,
    section: Option<&SectionId>,
    order: i64,
) -> Result<(), StoreError> {
    let scope = board
        .item(item_id)
        .map(|item| item.scope.clone())
        .ok_or_else(|| StoreError::ItemNotFound(item_id.clone()))?;

    if let Some(section_id) = section {
        let target = board
            .section(section_id)
            .ok_or_else(|| StoreError::SectionNotFound(section_id.clone()))?;
        if target.scope != scope {
            return Err(StoreError::CrossScope {
                section: section_id.clone(),
                section_scope: target.scope.clone(),
                scope,
            });
        }
    }

    let item = board
        .item_mut(item_id)
        .ok_or_else(|| StoreError::ItemNotFound(item_id.clone()))?;
    item.section = section.cloned();
    item.order = order;
    Ok(())
}

/// Update an item's order within its current container.
pub fn apply_item_reorder(board: &mut Board, item_id: &ItemId, order: i64) -> Result<(), StoreError> {
    let item = board
        .item_mut(item_id)
        .ok_or_else(|| StoreError::ItemNotFound(item_id.clone()))?;
    item.order = order;
    Ok(())
}

pub fn apply_section_reorder(
    board: &mut Board,
    section_id: &SectionId,
    order: i64,
) -> Result<(), StoreError> {
    let section = board
        .section_mut(section_id)
        .ok_or_else(|| StoreError::SectionNotFound(section_id.clone()))?;
    section.order = order;
    Ok(())
}

/// Dispatch a mutation command to the matching field update.
pub fn apply(board: &mut Board, mutation: &Mutation) -> Result<(), StoreError> {
    match mutation {
        Mutation::MoveItem {
            item,
            section,
            order,
        } => apply_item_move(board, item, section.as_ref(), *order),
        Mutation::ReorderItem { item, order } => apply_item_reorder(board, item, *order),
        Mutation::ReorderSection { section, order } => {
            apply_section_reorder(board, section, *order)
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Create a section at the end of its scope.
///
/// The new order is one past the current maximum (or 1 in an empty scope), so
/// existing sections never need renumbering.
pub fn create_section(board: &mut Board, scope: &ScopeId, name: &str) -> Result<SectionId, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }

    let max_order = board
        .sections_of(scope)
        .iter()
        .map(|s| s.order)
        .max()
        .unwrap_or(0);

    board.section_seq += 1;
    let id = SectionId(format!("S-{:03}", board.section_seq));
    board.sections.insert(
        id.clone(),
        Section {
            id: id.clone(),
            scope: scope.clone(),
            name: name.to_string(),
            order: max_order + 1,
        },
    );
    Ok(id)
}

/// Remove a section. Its members become unassigned and keep their order
/// values. Returns the former members in their visual order.
pub fn delete_section(board: &mut Board, section_id: &SectionId) -> Result<Vec<ItemId>, StoreError> {
    let section = board
        .sections
        .shift_remove(section_id)
        .ok_or_else(|| StoreError::SectionNotFound(section_id.clone()))?;

    let members = board.member_ids(Some(section_id), &section.scope);
    for id in &members {
        if let Some(item) = board.item_mut(id) {
            item.section = None;
        }
    }
    Ok(members)
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Create an item at the end of a container.
///
/// The order is the container's member count, bumped past the current maximum
/// when earlier moves have left gaps.
pub fn create_item(
    board: &mut Board,
    scope: &ScopeId,
    section: Option<&SectionId>,
    title: &str,
) -> Result<ItemId, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::EmptyTitle);
    }
    if let Some(section_id) = section {
        let target = board
            .section(section_id)
            .ok_or_else(|| StoreError::SectionNotFound(section_id.clone()))?;
        if &target.scope != scope {
            return Err(StoreError::CrossScope {
                section: section_id.clone(),
                section_scope: target.scope.clone(),
                scope: scope.clone(),
            });
        }
    }

    let siblings = board.members_of(section, scope);
    let count = siblings.len() as i64;
    let next_after_max = siblings.last().map(|item| item.order + 1).unwrap_or(0);
    let order = count.max(next_after_max);

    board.item_seq += 1;
    let id = ItemId(format!("T-{:03}", board.item_seq));
    let mut item = Item::new(id.clone(), scope.clone(), title);
    item.section = section.cloned();
    item.order = order;
    item.added = Some(today_str());
    board.items.insert(id.clone(), item);
    Ok(id)
}

/// Remove an item. Remaining siblings keep their order values.
pub fn delete_item(board: &mut Board, item_id: &ItemId) -> Result<Item, StoreError> {
    board
        .items
        .shift_remove(item_id)
        .ok_or_else(|| StoreError::ItemNotFound(item_id.clone()))
}

fn today_str() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn work() -> ScopeId {
        ScopeId::new("work")
    }

    fn orders(board: &Board, section: Option<&SectionId>) -> Vec<(String, i64)> {
        board
            .members_of(section, &work())
            .iter()
            .map(|item| (item.title.clone(), item.order))
            .collect()
    }

    #[test]
    fn create_section_appends_after_max() {
        let mut board = Board::new();
        let a = create_section(&mut board, &work(), "Todo").unwrap();
        let b = create_section(&mut board, &work(), "Doing").unwrap();
        assert_eq!(board.section(&a).unwrap().order, 1);
        assert_eq!(board.section(&b).unwrap().order, 2);

        apply_section_reorder(&mut board, &a, 7).unwrap();
        let c = create_section(&mut board, &work(), "Done").unwrap();
        assert_eq!(board.section(&c).unwrap().order, 8);
    }

    #[test]
    fn create_section_orders_are_per_scope() {
        let mut board = Board::new();
        create_section(&mut board, &work(), "Todo").unwrap();
        let home = create_section(&mut board, &ScopeId::new("home"), "Chores").unwrap();
        assert_eq!(board.section(&home).unwrap().order, 1);
    }

    #[test]
    fn create_section_rejects_blank_name() {
        let mut board = Board::new();
        assert_eq!(
            create_section(&mut board, &work(), "   "),
            Err(StoreError::EmptyName)
        );
    }

    #[test]
    fn section_ids_are_sequential() {
        let mut board = Board::new();
        let a = create_section(&mut board, &work(), "Todo").unwrap();
        let b = create_section(&mut board, &work(), "Doing").unwrap();
        assert_eq!(a.as_str(), "S-001");
        assert_eq!(b.as_str(), "S-002");
    }

    #[test]
    fn create_item_uses_sibling_count() {
        let mut board = Board::new();
        let s = create_section(&mut board, &work(), "Todo").unwrap();
        create_item(&mut board, &work(), Some(&s), "a").unwrap();
        create_item(&mut board, &work(), Some(&s), "b").unwrap();
        create_item(&mut board, &work(), None, "loose").unwrap();
        assert_eq!(
            orders(&board, Some(&s)),
            vec![("a".to_string(), 0), ("b".to_string(), 1)]
        );
        assert_eq!(orders(&board, None), vec![("loose".to_string(), 0)]);
    }

    #[test]
    fn create_item_skips_past_gaps() {
        let mut board = Board::new();
        let a = create_item(&mut board, &work(), None, "a").unwrap();
        create_item(&mut board, &work(), None, "b").unwrap();
        delete_item(&mut board, &a).unwrap();
        // remaining: b(1); count is 1 but 1 is taken
        create_item(&mut board, &work(), None, "c").unwrap();
        assert_eq!(
            orders(&board, None),
            vec![("b".to_string(), 1), ("c".to_string(), 2)]
        );
    }

    #[test]
    fn create_item_rejects_cross_scope_section() {
        let mut board = Board::new();
        let home = create_section(&mut board, &ScopeId::new("home"), "Chores").unwrap();
        let err = create_item(&mut board, &work(), Some(&home), "x").unwrap_err();
        assert!(matches!(err, StoreError::CrossScope { .. }));
        assert_eq!(board.item_count(), 0);
    }

    #[test]
    fn apply_item_move_leaves_siblings_alone() {
        let mut board = Board::new();
        let s = create_section(&mut board, &work(), "Todo").unwrap();
        let a = create_item(&mut board, &work(), None, "a").unwrap();
        create_item(&mut board, &work(), None, "b").unwrap();
        create_item(&mut board, &work(), Some(&s), "x").unwrap();

        apply_item_move(&mut board, &a, Some(&s), 0).unwrap();
        assert_eq!(orders(&board, None), vec![("b".to_string(), 1)]);
        // a and x share order 0 until a commit renumbers the section
        assert_eq!(board.item(&a).unwrap().section.as_ref(), Some(&s));
        assert_eq!(board.item(&a).unwrap().order, 0);
    }

    #[test]
    fn apply_item_move_rejects_other_scope() {
        let mut board = Board::new();
        let home = create_section(&mut board, &ScopeId::new("home"), "Chores").unwrap();
        let a = create_item(&mut board, &work(), None, "a").unwrap();
        let err = apply_item_move(&mut board, &a, Some(&home), 0).unwrap_err();
        assert!(matches!(err, StoreError::CrossScope { .. }));
        assert_eq!(board.item(&a).unwrap().section, None);
    }

    #[test]
    fn apply_unknown_ids_not_found() {
        let mut board = Board::new();
        assert_eq!(
            apply_item_reorder(&mut board, &ItemId::new("T-404"), 1),
            Err(StoreError::ItemNotFound(ItemId::new("T-404")))
        );
        assert_eq!(
            apply_section_reorder(&mut board, &SectionId::new("S-404"), 1),
            Err(StoreError::SectionNotFound(SectionId::new("S-404")))
        );
    }

    #[test]
    fn apply_dispatches_mutations() {
        let mut board = Board::new();
        let s = create_section(&mut board, &work(), "Todo").unwrap();
        let a = create_item(&mut board, &work(), None, "a").unwrap();

        apply(
            &mut board,
            &Mutation::MoveItem {
                item: a.clone(),
                section: Some(s.clone()),
                order: 3,
            },
        )
        .unwrap();
        apply(&mut board, &Mutation::ReorderItem { item: a.clone(), order: 4 }).unwrap();
        apply(&mut board, &Mutation::ReorderSection { section: s.clone(), order: 0 }).unwrap();

        let item = board.item(&a).unwrap();
        assert_eq!(item.section.as_ref(), Some(&s));
        assert_eq!(item.order, 4);
        assert_eq!(board.section(&s).unwrap().order, 0);
    }

    #[test]
    fn delete_section_unassigns_members() {
        let mut board = Board::new();
        let s = create_section(&mut board, &work(), "Todo").unwrap();
        create_item(&mut board, &work(), Some(&s), "a").unwrap();
        create_item(&mut board, &work(), Some(&s), "b").unwrap();
        create_item(&mut board, &work(), Some(&s), "c").unwrap();
        let before = board.item_count();

        let former = delete_section(&mut board, &s).unwrap();
        assert_eq!(former.len(), 3);
        assert_eq!(board.item_count(), before);
        assert!(board.section(&s).is_none());
        assert_eq!(
            orders(&board, None),
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2)
            ]
        );
    }

    #[test]
    fn delete_missing_section_is_not_found() {
        let mut board = Board::new();
        assert_eq!(
            delete_section(&mut board, &SectionId::new("S-009")),
            Err(StoreError::SectionNotFound(SectionId::new("S-009")))
        );
    }

    #[test]
    fn delete_item_keeps_sibling_orders() {
        let mut board = Board::new();
        create_item(&mut board, &work(), None, "a").unwrap();
        let b = create_item(&mut board, &work(), None, "b").unwrap();
        create_item(&mut board, &work(), None, "c").unwrap();
        let removed = delete_item(&mut board, &b).unwrap();
        assert_eq!(removed.title, "b");
        assert_eq!(
            orders(&board, None),
            vec![("a".to_string(), 0), ("c".to_string(), 2)]
        );
    }

    #[test]
    fn mutation_json_shape() {
        let m = Mutation::MoveItem {
            item: ItemId::new("T-001"),
            section: None,
            order: 2,
        };
        assert_eq!(
            serde_json::to_string(&m).unwrap(),
            r#"{"type":"move_item","item":"T-001","section":null,"order":2}"#
        );
    }
}
