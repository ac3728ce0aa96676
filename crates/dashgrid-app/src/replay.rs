//! Scripted pointer and viewport steps.
//!
//! A script is a JSON array of steps, for example:
//!
//! ```json
//! [
//!   { "step": "down", "widget": "system-health", "handle": "drag",
//!     "input": { "source": "mouse", "client_x": 40.0, "client_y": 30.0 } },
//!   { "step": "move", "input": { "source": "mouse", "client_x": 40.0, "client_y": 530.0 } },
//!   { "step": "tick" },
//!   { "step": "up" }
//! ]
//! ```

use dashgrid_core::{Dashboard, InteractionKind, PointerInput, Storage};
use serde::Deserialize;

/// Which handle a pointer-down lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Drag,
    Resize,
}

impl From<Handle> for InteractionKind {
    fn from(handle: Handle) -> Self {
        match handle {
            Handle::Drag => InteractionKind::Drag,
            Handle::Resize => InteractionKind::Resize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
    Down {
        widget: String,
        handle: Handle,
        input: PointerInput,
    },
    Move {
        input: PointerInput,
    },
    Tick,
    Up,
    Cancel,
    Resize {
        width: u32,
    },
    Add {
        widget_type: String,
    },
    Remove {
        widget: String,
    },
}

/// Parse a script.
pub fn parse_script(json: &str) -> Result<Vec<Step>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Apply steps in order. Steps that do not apply are logged and skipped.
pub fn run_script<S: Storage>(dashboard: &mut Dashboard<S>, steps: &[Step]) {
    for (index, step) in steps.iter().enumerate() {
        match step {
            Step::Down { widget, handle, input } => {
                if !dashboard.pointer_down(widget, (*handle).into(), input) {
                    log::info!("Step {}: pointer-down on {} ignored", index, widget);
                }
            }
            Step::Move { input } => {
                if let Some(proposal) = dashboard.pointer_move(input) {
                    log::debug!("Step {}: {:?}", index, proposal);
                }
            }
            Step::Tick => {
                dashboard.tick();
            }
            Step::Up => {
                let outcome = dashboard.pointer_up();
                log::info!("Step {}: release {:?}", index, outcome);
            }
            Step::Cancel => {
                let outcome = dashboard.pointer_cancel();
                log::info!("Step {}: cancel {:?}", index, outcome);
            }
            Step::Resize { width } => {
                dashboard.resize_viewport(*width);
            }
            Step::Add { widget_type } => {
                if let Err(e) = dashboard.add_widget(widget_type) {
                    log::warn!("Step {}: {}", index, e);
                }
            }
            Step::Remove { widget } => {
                if let Err(e) = dashboard.remove_widget(widget) {
                    log::warn!("Step {}: {}", index, e);
                }
            }
        }
    }
}
