use std::time::Instant;

use super::gesture::{DragEntity, GestureConfig, GestureEvent, GestureRecognizer, InputEvent, Phase};
use super::hit_test::{DropRegistry, Hover};
use crate::model::board::Board;
use crate::model::config::BoardConfig;
use crate::model::item::ItemId;
use crate::model::section::SectionId;
use crate::ops::reconcile;
use crate::ops::store_ops::{self, Mutation};

/// Where the dragged item sat when its drag started
#[derive(Debug, Clone, PartialEq)]
struct Origin {
    item: ItemId,
    section: Option<SectionId>,
    order: i64,
}

/// Owns the gesture recognizer and turns raw input into board mutations,
/// resolving each pointer position against the host's [`DropRegistry`].
#[derive(Debug)]
pub struct DragController {
    recognizer: GestureRecognizer,
    revert_on_cancel: bool,
    origin: Option<Origin>,
    hover: Hover,
}

impl DragController {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        DragController {
            recognizer: GestureRecognizer::new(config),
            revert_on_cancel: false,
            origin: None,
            hover: Hover::None,
        }
    }

    /// Build a controller from the board's `[gesture]` and `[drag]` settings
    #[must_use]
    pub fn from_config(config: &BoardConfig) -> Self {
        DragController::new(GestureConfig::from(&config.gesture))
            .with_revert_on_cancel(config.drag.revert_on_cancel)
    }

    /// Restore the dragged item to where it started when a drag is cancelled.
    #[must_use]
    pub fn with_revert_on_cancel(mut self, revert: bool) -> Self {
        self.revert_on_cancel = revert;
        self
    }

    pub fn phase(&self) -> Phase {
        self.recognizer.phase()
    }

    pub fn is_dragging(&self) -> bool {
        self.recognizer.is_dragging()
    }

    /// The target under the pointer at the last start/over event
    pub fn hover(&self) -> &Hover {
        &self.hover
    }

    /// Feed one raw input event. Returns the mutations applied to `board`.
    pub fn handle(
        &mut self,
        board: &mut Board,
        registry: &DropRegistry,
        event: &InputEvent,
        now: Instant,
    ) -> Vec<Mutation> {
        match self.recognizer.process(event, now) {
            Some(gesture) => self.dispatch(board, registry, gesture),
            None => Vec::new(),
        }
    }

    /// Advance time without input, so a stationary touch hold can activate.
    pub fn tick(&mut self, board: &mut Board, registry: &DropRegistry, now: Instant) -> Vec<Mutation> {
        match self.recognizer.tick(now) {
            Some(gesture) => self.dispatch(board, registry, gesture),
            None => Vec::new(),
        }
    }

    /// Route a lifecycle event to the matching callback.
    pub fn dispatch(
        &mut self,
        board: &mut Board,
        registry: &DropRegistry,
        gesture: GestureEvent,
    ) -> Vec<Mutation> {
        match gesture {
            GestureEvent::DragStart { entity, pos } => {
                self.drag_start(board, &entity, registry.resolve(pos));
                Vec::new()
            }
            GestureEvent::DragOver { entity, pos } => {
                self.drag_over(board, &entity, registry.resolve(pos))
            }
            GestureEvent::DragEnd { entity, pos } => {
                self.drag_end(board, &entity, registry.resolve(pos))
            }
            GestureEvent::DragCancel { entity } => self.drag_cancel(board, &entity),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle callbacks, usable directly by hosts with their own gesture
    // detection
    // -----------------------------------------------------------------------

    pub fn drag_start(&mut self, board: &Board, entity: &DragEntity, hover: Hover) {
        tracing::debug!(?entity, ?hover, "drag start");
        self.origin = match entity {
            DragEntity::Item(id) => board.item(id).map(|item| Origin {
                item: id.clone(),
                section: item.section.clone(),
                order: item.order,
            }),
            DragEntity::Section(_) => None,
        };
        self.hover = hover;
    }

    pub fn drag_over(&mut self, board: &mut Board, entity: &DragEntity, hover: Hover) -> Vec<Mutation> {
        let mutations = reconcile::drag_over(board, entity, &hover);
        self.hover = hover;
        mutations
    }

    pub fn drag_end(&mut self, board: &mut Board, entity: &DragEntity, hover: Hover) -> Vec<Mutation> {
        let mutations = reconcile::drag_end(board, entity, &hover);
        self.finish();
        mutations
    }

    /// End the drag without a commit. Optimistic moves stay in place unless
    /// `revert_on_cancel` is set.
    pub fn drag_cancel(&mut self, board: &mut Board, entity: &DragEntity) -> Vec<Mutation> {
        tracing::debug!(?entity, revert = self.revert_on_cancel, "drag cancelled");
        let origin = self.origin.take();
        self.finish();

        if !self.revert_on_cancel {
            return Vec::new();
        }
        let Some(origin) = origin else {
            return Vec::new();
        };
        if !matches!(entity, DragEntity::Item(id) if *id == origin.item) {
            return Vec::new();
        }
        let Some(item) = board.item(&origin.item) else {
            return Vec::new();
        };
        if item.section == origin.section && item.order == origin.order {
            return Vec::new();
        }

        let mutation = Mutation::MoveItem {
            item: origin.item,
            section: origin.section,
            order: origin.order,
        };
        match store_ops::apply(board, &mutation) {
            Ok(()) => vec![mutation],
            Err(e) => {
                tracing::warn!(error = %e, "could not restore item after cancelled drag");
                Vec::new()
            }
        }
    }

    /// Abort any active drag, as on focus loss.
    pub fn cancel(&mut self, board: &mut Board) -> Vec<Mutation> {
        match self.recognizer.cancel() {
            Some(GestureEvent::DragCancel { entity }) => self.drag_cancel(board, &entity),
            _ => Vec::new(),
        }
    }

    fn finish(&mut self) {
        self.origin = None;
        self.hover = Hover::None;
    }
}

impl Default for DragController {
    fn default() -> Self {
        DragController::new(GestureConfig::default())
    }
}
