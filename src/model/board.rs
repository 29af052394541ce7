use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId};
use super::section::{ScopeId, Section, SectionId};

/// The ordered entity store: every item and section on the board, keyed by id.
///
/// Storage order (insertion order of the maps) is preserved across save/load
/// and is the tie-break when two members of a container share an order value
/// mid-gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub(crate) items: IndexMap<ItemId, Item>,
    #[serde(default)]
    pub(crate) sections: IndexMap<SectionId, Section>,
    /// Last assigned item number (`T-001` → 1)
    #[serde(default)]
    pub(crate) item_seq: u64,
    /// Last assigned section number (`S-001` → 1)
    #[serde(default)]
    pub(crate) section_seq: u64,
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.get(id)
    }

    pub(crate) fn item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub(crate) fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    /// All items in storage order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// All sections in storage order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Members of a container, ascending by order.
    ///
    /// `None` is the scope's unassigned pseudo-container.
    pub fn members_of(&self, section: Option<&SectionId>, scope: &ScopeId) -> Vec<&Item> {
        let mut members: Vec<&Item> = self
            .items
            .values()
            .filter(|item| item.is_in(section, scope))
            .collect();
        // stable: equal orders keep storage order
        members.sort_by_key(|item| item.order);
        members
    }

    /// Ids of a container's members, ascending by order
    pub fn member_ids(&self, section: Option<&SectionId>, scope: &ScopeId) -> Vec<ItemId> {
        self.members_of(section, scope)
            .into_iter()
            .map(|item| item.id.clone())
            .collect()
    }

    /// Sections of a scope, ascending by order. The pseudo-container is not
    /// included.
    pub fn sections_of(&self, scope: &ScopeId) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self
            .sections
            .values()
            .filter(|section| &section.scope == scope)
            .collect();
        sections.sort_by_key(|section| section.order);
        sections
    }

    /// Every scope mentioned by an item or a section, sorted by name
    pub fn scopes(&self) -> Vec<ScopeId> {
        let mut scopes: Vec<ScopeId> = self
            .items
            .values()
            .map(|item| item.scope.clone())
            .chain(self.sections.values().map(|section| section.scope.clone()))
            .collect();
        scopes.sort();
        scopes.dedup();
        scopes
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, scope: &str, section: Option<&str>, order: i64) -> Item {
        let mut item = Item::new(ItemId::new(id), ScopeId::new(scope), id);
        item.section = section.map(SectionId::new);
        item.order = order;
        item
    }

    fn section(id: &str, scope: &str, order: i64) -> Section {
        Section {
            id: SectionId::new(id),
            scope: ScopeId::new(scope),
            name: id.to_string(),
            order,
        }
    }

    fn board_with(items: Vec<Item>, sections: Vec<Section>) -> Board {
        let mut board = Board::new();
        for s in sections {
            board.sections.insert(s.id.clone(), s);
        }
        for i in items {
            board.items.insert(i.id.clone(), i);
        }
        board
    }

    #[test]
    fn members_sorted_by_order() {
        let board = board_with(
            vec![
                item("c", "work", Some("A"), 2),
                item("a", "work", Some("A"), 0),
                item("b", "work", Some("A"), 1),
            ],
            vec![section("A", "work", 1)],
        );
        let ids = board.member_ids(Some(&SectionId::new("A")), &ScopeId::new("work"));
        assert_eq!(ids, vec![ItemId::new("a"), ItemId::new("b"), ItemId::new("c")]);
    }

    #[test]
    fn members_of_pseudo_container_is_per_scope() {
        let board = board_with(
            vec![
                item("a", "work", None, 0),
                item("b", "home", None, 0),
                item("c", "work", Some("A"), 0),
            ],
            vec![section("A", "work", 1)],
        );
        let ids = board.member_ids(None, &ScopeId::new("work"));
        assert_eq!(ids, vec![ItemId::new("a")]);
    }

    #[test]
    fn equal_orders_keep_storage_order() {
        let board = board_with(
            vec![item("x", "work", Some("A"), 1), item("y", "work", Some("A"), 1)],
            vec![section("A", "work", 1)],
        );
        let ids = board.member_ids(Some(&SectionId::new("A")), &ScopeId::new("work"));
        assert_eq!(ids, vec![ItemId::new("x"), ItemId::new("y")]);
    }

    #[test]
    fn sections_of_filters_scope_and_sorts() {
        let board = board_with(
            vec![],
            vec![
                section("B", "work", 2),
                section("H", "home", 0),
                section("A", "work", 1),
            ],
        );
        let names: Vec<&str> = board
            .sections_of(&ScopeId::new("work"))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn scopes_are_deduplicated() {
        let board = board_with(
            vec![item("a", "work", None, 0), item("b", "home", None, 0)],
            vec![section("A", "work", 1)],
        );
        assert_eq!(board.scopes(), vec![ScopeId::new("home"), ScopeId::new("work")]);
    }

    #[test]
    fn json_round_trip_keeps_storage_order() {
        let board = board_with(
            vec![item("z", "work", None, 0), item("a", "work", None, 0)],
            vec![],
        );
        let text = serde_json::to_string(&board).unwrap();
        let loaded: Board = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.member_ids(None, &ScopeId::new("work")), vec![
            ItemId::new("z"),
            ItemId::new("a")
        ]);
    }
}
