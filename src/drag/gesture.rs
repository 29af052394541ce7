//! Gesture recognition: turns raw pointer/touch input into drag lifecycle
//! events.
//!
//! # State Machine
//!
//! ```text
//!  Idle ──press on entity──▶ Armed ──threshold met──▶ Active
//!   ▲                         │                         │
//!   └──release / scroll───────┘                         │
//!   └──────────────release (DragEnd) / cancel (DragCancel)┘
//! ```
//!
//! - Mouse contacts activate once they travel `pointer_distance` from the
//!   press point.
//! - Touch contacts activate once they have been held for `touch_delay`
//!   without drifting more than `touch_tolerance`. Drifting further before
//!   the delay is a scroll, and the contact is dropped.
//!
//! # Invariants
//!
//! 1. A contact released before activation produces no event, so a tap or
//!    click on a draggable element still behaves as a tap or click.
//! 2. Every `DragStart` is followed by exactly one `DragEnd` or `DragCancel`.
//! 3. Only one contact is tracked at a time. Input from any other contact is
//!    ignored until the tracked one ends.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::model::config::GestureSettings;
use crate::model::item::ItemId;
use crate::model::section::SectionId;

// ---------------------------------------------------------------------------
// Input and output
// ---------------------------------------------------------------------------

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragEntity {
    Item(ItemId),
    Section(SectionId),
}

/// Input device class of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Raw input as delivered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    /// A contact went down. `entity` is the draggable under it, if any.
    Press {
        contact: u32,
        kind: PointerKind,
        pos: Point,
        #[serde(default)]
        entity: Option<DragEntity>,
    },
    Move {
        contact: u32,
        pos: Point,
    },
    Release {
        contact: u32,
        pos: Point,
    },
    /// Focus loss or an explicit abort (Escape)
    Cancel,
}

/// Drag lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureEvent {
    DragStart { entity: DragEntity, pos: Point },
    DragOver { entity: DragEntity, pos: Point },
    DragEnd { entity: DragEntity, pos: Point },
    DragCancel { entity: DragEntity },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Activation thresholds
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Travel before a mouse press becomes a drag (default: 8)
    pub pointer_distance: f32,
    /// Hold before a touch becomes a drag (default: 250ms)
    pub touch_delay: Duration,
    /// Drift allowed during the hold (default: 5)
    pub touch_tolerance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig::from(&GestureSettings::default())
    }
}

impl From<&GestureSettings> for GestureConfig {
    fn from(settings: &GestureSettings) -> Self {
        GestureConfig {
            pointer_distance: settings.pointer.distance,
            touch_delay: Duration::from_millis(settings.touch.delay_ms),
            touch_tolerance: settings.touch.tolerance,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Contact {
    id: u32,
    kind: PointerKind,
    entity: DragEntity,
    start: Point,
    pressed_at: Instant,
}

#[derive(Debug, Clone)]
enum Session {
    Idle,
    Armed(Contact),
    Active(Contact),
}

/// Outcome of a move while armed
enum ArmedStep {
    Wait,
    Activate,
    /// Touch moved too far before the hold completed
    Scroll,
}

/// Externally visible session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
    Active,
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Stateful recognizer for a single drag contact.
///
/// Call [`process`](GestureRecognizer::process) for every input event and
/// [`tick`](GestureRecognizer::tick) periodically so that a stationary touch
/// hold can activate without further movement.
#[derive(Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    session: Session,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        GestureRecognizer {
            config,
            session: Session::Idle,
        }
    }

    /// Process one input event. At most one lifecycle event results.
    pub fn process(&mut self, event: &InputEvent, now: Instant) -> Option<GestureEvent> {
        match event {
            InputEvent::Press {
                contact,
                kind,
                pos,
                entity,
            } => {
                self.on_press(*contact, *kind, *pos, entity.as_ref(), now);
                None
            }
            InputEvent::Move { contact, pos } => self.on_move(*contact, *pos, now),
            InputEvent::Release { contact, pos } => self.on_release(*contact, *pos),
            InputEvent::Cancel => self.cancel(),
        }
    }

    /// Activate a touch contact whose hold delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<GestureEvent> {
        let Session::Armed(contact) = &self.session else {
            return None;
        };
        if contact.kind != PointerKind::Touch
            || now.duration_since(contact.pressed_at) < self.config.touch_delay
        {
            return None;
        }
        let contact = contact.clone();
        let event = GestureEvent::DragStart {
            entity: contact.entity.clone(),
            pos: contact.start,
        };
        tracing::debug!(contact = contact.id, "touch hold activated drag");
        self.session = Session::Active(contact);
        Some(event)
    }

    /// Abort the tracked contact. Emits `DragCancel` only if a drag was active.
    pub fn cancel(&mut self) -> Option<GestureEvent> {
        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Active(contact) => Some(GestureEvent::DragCancel {
                entity: contact.entity,
            }),
            _ => None,
        }
    }

    /// Return to Idle without emitting anything.
    pub fn reset(&mut self) {
        self.session = Session::Idle;
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.session {
            Session::Idle => Phase::Idle,
            Session::Armed(_) => Phase::Armed,
            Session::Active(_) => Phase::Active,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.session, Session::Active(_))
    }

    /// The entity of the active drag, if any
    #[must_use]
    pub fn active_entity(&self) -> Option<&DragEntity> {
        match &self.session {
            Session::Active(contact) => Some(&contact.entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureRecognizer {
    fn on_press(
        &mut self,
        id: u32,
        kind: PointerKind,
        pos: Point,
        entity: Option<&DragEntity>,
        now: Instant,
    ) {
        if !matches!(self.session, Session::Idle) {
            tracing::debug!(contact = id, "ignoring press while another contact is tracked");
            return;
        }
        // Nothing draggable under the press: nothing to arm
        let Some(entity) = entity else {
            return;
        };
        self.session = Session::Armed(Contact {
            id,
            kind,
            entity: entity.clone(),
            start: pos,
            pressed_at: now,
        });
    }

    fn on_move(&mut self, id: u32, pos: Point, now: Instant) -> Option<GestureEvent> {
        match &self.session {
            Session::Idle => None,
            Session::Active(contact) => {
                if contact.id != id {
                    return None;
                }
                Some(GestureEvent::DragOver {
                    entity: contact.entity.clone(),
                    pos,
                })
            }
            Session::Armed(contact) => {
                if contact.id != id {
                    return None;
                }
                match self.armed_step(contact, pos, now) {
                    ArmedStep::Wait => None,
                    ArmedStep::Scroll => {
                        tracing::debug!(contact = id, "touch drifted before hold; treating as scroll");
                        self.session = Session::Idle;
                        None
                    }
                    ArmedStep::Activate => {
                        let contact = contact.clone();
                        let event = GestureEvent::DragStart {
                            entity: contact.entity.clone(),
                            pos: contact.start,
                        };
                        self.session = Session::Active(contact);
                        Some(event)
                    }
                }
            }
        }
    }

    fn armed_step(&self, contact: &Contact, pos: Point, now: Instant) -> ArmedStep {
        let displacement = contact.start.distance(pos);
        match contact.kind {
            PointerKind::Mouse if displacement >= self.config.pointer_distance => {
                ArmedStep::Activate
            }
            PointerKind::Mouse => ArmedStep::Wait,
            PointerKind::Touch => {
                if now.duration_since(contact.pressed_at) >= self.config.touch_delay {
                    ArmedStep::Activate
                } else if displacement > self.config.touch_tolerance {
                    ArmedStep::Scroll
                } else {
                    ArmedStep::Wait
                }
            }
        }
    }

    fn on_release(&mut self, id: u32, pos: Point) -> Option<GestureEvent> {
        let tracked = match &self.session {
            Session::Idle => return None,
            Session::Armed(contact) | Session::Active(contact) => contact.id,
        };
        if tracked != id {
            return None;
        }
        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Active(contact) => Some(GestureEvent::DragEnd {
                entity: contact.entity,
                pos,
            }),
            // Released before activation: a plain tap/click
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
