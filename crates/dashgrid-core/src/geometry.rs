//! Integer pixel geometry, collision testing and grid snapping.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Top-left position of a widget in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a widget in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum with `min`.
    pub fn clamp_min(self, min: GridSize) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
        }
    }
}

/// An axis-aligned rectangle made of a position and a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub position: GridPoint,
    pub size: GridSize,
}

impl Bounds {
    pub const fn new(position: GridPoint, size: GridSize) -> Self {
        Self { position, size }
    }

    /// Build bounds from raw `x, y, width, height`.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(GridPoint::new(x, y), GridSize::new(width, height))
    }

    /// Get the bounds as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.position.x),
            f64::from(self.position.y),
            f64::from(self.position.x) + f64::from(self.size.width),
            f64::from(self.position.y) + f64::from(self.size.height),
        )
    }
}

/// Check whether two rectangles overlap with positive area.
///
/// Rectangles that only share an edge or a corner do not intersect.
pub fn intersects(a: &Bounds, b: &Bounds) -> bool {
    let rect_a = a.as_rect();
    let rect_b = b.as_rect();
    if rect_a.area() <= 0.0 || rect_b.area() <= 0.0 {
        return false;
    }
    rect_a.intersect(rect_b).area() > 0.0
}

/// Snap a single value to the nearest multiple of `grid_size`.
///
/// Ties round away from zero. A non-positive grid leaves the value alone.
/// Results saturate at the largest grid multiple that fits in an `i32`, and
/// NaN snaps to 0.
pub fn snap_value(value: f64, grid_size: i32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    if grid_size <= 0 {
        return value.round() as i32;
    }
    let grid = f64::from(grid_size);
    let limit = f64::from(i32::MAX / grid_size);
    let cells = (value / grid).round().clamp(-limit, limit);
    cells as i32 * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: i32) -> GridPoint {
    GridPoint::new(snap_value(point.x, grid_size), snap_value(point.y, grid_size))
}

/// Check whether a value lies exactly on the grid.
pub fn is_on_grid(value: i32, grid_size: i32) -> bool {
    grid_size <= 0 || value % grid_size == 0
}
