use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::controller::DragController;
use super::gesture::InputEvent;
use super::hit_test::{DropRegistry, DropZone};
use crate::model::board::Board;
use crate::ops::store_ops::Mutation;

/// Error type for gesture scripts
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("could not read script {path}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse script: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("step {index} at {at_ms}ms comes before the previous step at {previous_ms}ms")]
    OutOfOrder {
        index: usize,
        at_ms: u64,
        previous_ms: u64,
    },
}

/// Drop-target geometry plus timed input events, replayed through a
/// [`DragController`] against a board.
///
/// ```json
/// {
///   "targets": [
///     { "target": { "container": { "section": "S-002" } },
///       "rect": { "x": 120, "y": 0, "width": 100, "height": 300 } }
///   ],
///   "events": [
///     { "at_ms": 0, "event": { "press": { "contact": 1, "kind": "mouse",
///         "pos": { "x": 50, "y": 20 }, "entity": { "item": "T-001" } } } },
///     { "at_ms": 40, "event": { "move": { "contact": 1, "pos": { "x": 170, "y": 150 } } } },
///     { "at_ms": 80, "event": { "release": { "contact": 1, "pos": { "x": 170, "y": 150 } } } }
///   ]
/// }
/// ```
///
/// A step without an `event` only advances the clock, which is how a
/// stationary touch hold is recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureScript {
    #[serde(default)]
    pub targets: Vec<DropZone>,
    #[serde(default)]
    pub events: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Milliseconds since the start of the script
    pub at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<InputEvent>,
}

impl GestureScript {
    /// Parse a script and check that its steps are in time order.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        let script: GestureScript = serde_json::from_str(text)?;
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|e| ScriptError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let mut previous_ms = 0;
        for (index, step) in self.events.iter().enumerate() {
            if step.at_ms < previous_ms {
                return Err(ScriptError::OutOfOrder {
                    index,
                    at_ms: step.at_ms,
                    previous_ms,
                });
            }
            previous_ms = step.at_ms;
        }
        Ok(())
    }

    pub fn registry(&self) -> DropRegistry {
        self.targets.iter().cloned().collect()
    }

    /// Replay every step through `controller`. Returns all mutations applied
    /// to `board`, in order.
    pub fn run(&self, board: &mut Board, controller: &mut DragController) -> Vec<Mutation> {
        let registry = self.registry();
        let base = Instant::now();
        let mut applied = Vec::new();

        for step in &self.events {
            let now = base + Duration::from_millis(step.at_ms);
            applied.extend(controller.tick(board, &registry, now));
            if let Some(event) = &step.event {
                applied.extend(controller.handle(board, &registry, event, now));
            }
        }

        tracing::info!(
            steps = self.events.len(),
            mutations = applied.len(),
            "replayed gesture script"
        );
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::ItemId;
    use crate::model::section::{ScopeId, SectionId};
    use crate::ops::store_ops::{create_item, create_section};
    use pretty_assertions::assert_eq;

    fn board() -> (Board, SectionId, SectionId, ItemId) {
        let scope = ScopeId::new("inbox");
        let mut board = Board::new();
        let a = create_section(&mut board, &scope, "A").unwrap();
        let b = create_section(&mut board, &scope, "B").unwrap();
        let item = create_item(&mut board, &scope, Some(&a), "task").unwrap();
        (board, a, b, item)
    }

    const TOUCH_SCRIPT: &str = r#"{
        "targets": [
            { "target": { "container": { "section": "S-001" } },
              "rect": { "x": 0, "y": 0, "width": 100, "height": 300 } },
            { "target": { "container": { "section": "S-002" } },
              "rect": { "x": 120, "y": 0, "width": 100, "height": 300 } }
        ],
        "events": [
            { "at_ms": 0, "event": { "press": { "contact": 7, "kind": "touch",
                "pos": { "x": 50, "y": 20 }, "entity": { "item": "T-001" } } } },
            { "at_ms": 300 },
            { "at_ms": 320, "event": { "move": { "contact": 7, "pos": { "x": 170, "y": 150 } } } },
            { "at_ms": 340, "event": { "release": { "contact": 7, "pos": { "x": 170, "y": 150 } } } }
        ]
    }"#;

    #[test]
    fn touch_script_moves_item() {
        let (mut board, _, b, item) = board();
        let script = GestureScript::from_json(TOUCH_SCRIPT).unwrap();
        let mut ctl = DragController::default();

        let applied = script.run(&mut board, &mut ctl);
        assert_eq!(
            applied,
            vec![Mutation::MoveItem {
                item: item.clone(),
                section: Some(b.clone()),
                order: 0,
            }]
        );
        assert_eq!(board.item(&item).unwrap().section, Some(b));
    }

    #[test]
    fn touch_moved_before_hold_is_a_scroll() {
        let (mut board, a, _, item) = board();
        // same gesture without the hold step: the drift at 20ms cancels it
        let text = TOUCH_SCRIPT.replace(r#"{ "at_ms": 300 },"#, "").replace("320", "20");
        let script = GestureScript::from_json(&text).unwrap();

        let applied = script.run(&mut board, &mut DragController::default());
        assert!(applied.is_empty());
        assert_eq!(board.item(&item).unwrap().section, Some(a));
    }

    #[test]
    fn steps_must_be_in_time_order() {
        let text = r#"{ "events": [ { "at_ms": 50 }, { "at_ms": 10 } ] }"#;
        let err = GestureScript::from_json(text).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::OutOfOrder {
                index: 1,
                at_ms: 10,
                previous_ms: 50
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GestureScript::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScriptError::ParseError(_)));
    }

    #[test]
    fn empty_script_does_nothing() {
        let (mut board, _, _, _) = board();
        let before = board.clone();
        let script = GestureScript::from_json("{}").unwrap();
        assert!(script.run(&mut board, &mut DragController::default()).is_empty());
        assert_eq!(board, before);
    }
}
