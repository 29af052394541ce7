use regex::Regex;
use serde::Serialize;

use crate::model::board::Board;
use crate::model::item::Item;
use crate::model::section::{ScopeId, Section, SectionId, UNASSIGNED_LABEL};
use crate::ops::store_ops::Mutation;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ItemJson {
    pub id: String,
    pub title: String,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
}

#[derive(Serialize)]
pub struct ContainerJson {
    /// `None` for the unassigned pseudo-container
    pub section: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct BoardListJson {
    pub scope: String,
    pub containers: Vec<ContainerJson>,
}

#[derive(Serialize)]
pub struct SectionJson {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub items: usize,
}

#[derive(Serialize)]
pub struct MutationsJson<'a> {
    pub mutations: &'a [Mutation],
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn item_to_json(item: &Item) -> ItemJson {
    ItemJson {
        id: item.id.to_string(),
        title: item.title.clone(),
        order: item.order,
        added: item.added.clone(),
    }
}

fn matches_filter(item: &Item, filter: Option<&Regex>) -> bool {
    filter.is_none_or(|re| re.is_match(&item.title))
}

/// Every container of a scope, pseudo-container first, members filtered by
/// title.
pub fn board_to_json(board: &Board, scope: &ScopeId, filter: Option<&Regex>) -> BoardListJson {
    let container = |section: Option<&Section>| {
        let items = board
            .members_of(section.map(|s| &s.id), scope)
            .into_iter()
            .filter(|item| matches_filter(item, filter))
            .map(item_to_json)
            .collect();
        ContainerJson {
            section: section.map(|s| s.id.to_string()),
            name: section
                .map(|s| s.name.clone())
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string()),
            order: section.map(|s| s.order),
            items,
        }
    };

    let mut containers = vec![container(None)];
    containers.extend(board.sections_of(scope).into_iter().map(|s| container(Some(s))));
    BoardListJson {
        scope: scope.to_string(),
        containers,
    }
}

pub fn section_to_json(board: &Board, section: &Section) -> SectionJson {
    SectionJson {
        id: section.id.to_string(),
        name: section.name.clone(),
        order: section.order,
        items: board.members_of(Some(&section.id), &section.scope).len(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single item as a one-line summary
pub fn format_item_line(item: &Item) -> String {
    format!("  {} {}", item.id, item.title)
}

pub fn format_container_header(section: Option<&Section>) -> String {
    match section {
        Some(s) => format!("== {} ({}) ==", s.name, s.id),
        None => format!("== {} ==", UNASSIGNED_LABEL),
    }
}

/// Format a scope's full listing: the pseudo-container, then each section
/// in order. Containers left empty by the filter are still shown.
pub fn format_board_listing(board: &Board, scope: &ScopeId, filter: Option<&Regex>) -> Vec<String> {
    let mut lines = vec![format!("# {}", scope)];

    let push_container = |lines: &mut Vec<String>, section: Option<&Section>| {
        lines.push(String::new());
        lines.push(format_container_header(section));
        let members: Vec<&Item> = board
            .members_of(section.map(|s| &s.id), scope)
            .into_iter()
            .filter(|item| matches_filter(item, filter))
            .collect();
        if members.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for item in members {
            lines.push(format_item_line(item));
        }
    };

    push_container(&mut lines, None);
    for section in board.sections_of(scope) {
        push_container(&mut lines, Some(section));
    }
    lines
}

/// Format a section for the `sections` listing
pub fn format_section_info(board: &Board, section: &Section) -> String {
    let count = board.members_of(Some(&section.id), &section.scope).len();
    format!(
        "  {} {} [{}] {} item{}",
        section.id,
        section.name,
        section.order,
        count,
        if count == 1 { "" } else { "s" }
    )
}

pub fn format_mutation(mutation: &Mutation) -> String {
    match mutation {
        Mutation::MoveItem {
            item,
            section,
            order,
        } => format!("move {} -> {} @{}", item, section_label(section.as_ref()), order),
        Mutation::ReorderItem { item, order } => format!("reorder {} @{}", item, order),
        Mutation::ReorderSection { section, order } => {
            format!("reorder section {} @{}", section, order)
        }
    }
}

fn section_label(section: Option<&SectionId>) -> String {
    section
        .map(|s| s.to_string())
        .unwrap_or_else(|| UNASSIGNED_LABEL.to_lowercase())
}
