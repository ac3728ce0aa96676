//! Pointer input from mouse and touch sources.
//!
//! Both modalities feed the same interaction state machine; only client
//! coordinates are consumed.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A single touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Raw pointer input as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum PointerInput {
    Mouse { client_x: f64, client_y: f64 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerInput {
    /// Mouse input at the given client coordinates.
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self::Mouse { client_x, client_y }
    }

    /// Single-finger touch input.
    pub fn touch(client_x: f64, client_y: f64) -> Self {
        Self::Touch {
            touches: vec![TouchPoint { client_x, client_y }],
        }
    }

    /// Extract client coordinates. Touch input uses the first contact.
    ///
    /// Returns `None` for a touch event without contacts (e.g. a `touchend`
    /// that already lifted every finger).
    pub fn client_point(&self) -> Option<Point> {
        match self {
            PointerInput::Mouse { client_x, client_y } => Some(Point::new(*client_x, *client_y)),
            PointerInput::Touch { touches } => touches
                .first()
                .map(|t| Point::new(t.client_x, t.client_y)),
        }
    }
}
