use serde::{Deserialize, Serialize};

/// Configuration from board.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardInfo,
    #[serde(default)]
    pub gesture: GestureSettings,
    #[serde(default)]
    pub drag: DragSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default = "default_name")]
    pub name: String,
    /// Scope used by commands that omit one
    #[serde(default = "default_scope")]
    pub default_scope: String,
}

impl Default for BoardInfo {
    fn default() -> Self {
        BoardInfo {
            name: default_name(),
            default_scope: default_scope(),
        }
    }
}

/// Activation thresholds for the two input kinds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureSettings {
    #[serde(default)]
    pub pointer: PointerSettings,
    #[serde(default)]
    pub touch: TouchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerSettings {
    /// Distance (px) a pressed mouse must travel before a drag starts.
    /// Default: 8
    #[serde(default = "default_pointer_distance")]
    pub distance: f32,
}

impl Default for PointerSettings {
    fn default() -> Self {
        PointerSettings {
            distance: default_pointer_distance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchSettings {
    /// Hold time (ms) before a touch becomes a drag. Default: 250
    #[serde(default = "default_touch_delay_ms")]
    pub delay_ms: u64,
    /// Drift (px) allowed while holding; more than this is a scroll. Default: 5
    #[serde(default = "default_touch_tolerance")]
    pub tolerance: f32,
}

impl Default for TouchSettings {
    fn default() -> Self {
        TouchSettings {
            delay_ms: default_touch_delay_ms(),
            tolerance: default_touch_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DragSettings {
    /// Put an item back where it started when its drag is cancelled.
    /// Off by default: cancelled drags keep the last live preview placement.
    #[serde(default)]
    pub revert_on_cancel: bool,
}

fn default_name() -> String {
    "board".to_string()
}

fn default_scope() -> String {
    "inbox".to_string()
}

fn default_pointer_distance() -> f32 {
    8.0
}

fn default_touch_delay_ms() -> u64 {
    250
}

fn default_touch_tolerance() -> f32 {
    5.0
}
