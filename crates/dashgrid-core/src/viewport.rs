//! Viewport classification and per-class layout parameters.

use crate::geometry::{GridPoint, GridSize};
use crate::layout::{LayoutSnapshot, WidgetPlacement};
use crate::registry::WidgetRegistry;
use serde::{Deserialize, Serialize};

/// Widths at or below this are treated as mobile.
pub const DEFAULT_MOBILE_MAX_WIDTH: u32 = 768;

/// Grid size for desktop viewports (matches the visual grid).
pub const DESKTOP_GRID_SIZE: i32 = 20;

/// Grid size for mobile viewports.
pub const MOBILE_GRID_SIZE: i32 = 10;

/// Device-width category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    /// Classify a viewport width against the mobile threshold.
    pub fn classify(width: u32, mobile_max_width: u32) -> Self {
        if width <= mobile_max_width {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }
}

/// Layout parameters for one viewport class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportProfile {
    /// Snapping unit in pixels.
    pub grid_size: i32,
    /// Minimum widget width, in grid cells.
    pub min_width_cells: i32,
    /// Minimum widget height, in grid cells.
    pub min_height_cells: i32,
    /// Where auto-placement starts.
    pub origin: GridPoint,
    /// Auto-placement wraps to a new row past this x extent.
    pub wrap_width: i32,
}

impl ViewportProfile {
    /// Minimum widget size in pixels.
    pub fn min_size(&self) -> GridSize {
        GridSize::new(
            self.grid_size * self.min_width_cells,
            self.grid_size * self.min_height_cells,
        )
    }

    pub fn desktop() -> Self {
        Self {
            grid_size: DESKTOP_GRID_SIZE,
            min_width_cells: 10,
            min_height_cells: 8,
            origin: GridPoint::new(20, 20),
            wrap_width: 1200,
        }
    }

    pub fn mobile() -> Self {
        Self {
            grid_size: MOBILE_GRID_SIZE,
            min_width_cells: 2,
            min_height_cells: 2,
            origin: GridPoint::new(10, 10),
            wrap_width: 360,
        }
    }
}

/// Thresholds and per-class profiles.
///
/// Tablet widths fall into whichever class `mobile_max_width` puts them in.
/// When deserializing, any omitted field (including single profile fields)
/// keeps its class default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialViewportConfig")]
pub struct ViewportConfig {
    pub mobile_max_width: u32,
    pub mobile: ViewportProfile,
    pub desktop: ViewportProfile,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mobile_max_width: DEFAULT_MOBILE_MAX_WIDTH,
            mobile: ViewportProfile::mobile(),
            desktop: ViewportProfile::desktop(),
        }
    }
}

impl ViewportConfig {
    pub fn profile(&self, class: ViewportClass) -> &ViewportProfile {
        match class {
            ViewportClass::Mobile => &self.mobile,
            ViewportClass::Desktop => &self.desktop,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialViewportConfig {
    mobile_max_width: Option<u32>,
    mobile: PartialViewportProfile,
    desktop: PartialViewportProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialViewportProfile {
    grid_size: Option<i32>,
    min_width_cells: Option<i32>,
    min_height_cells: Option<i32>,
    origin: Option<GridPoint>,
    wrap_width: Option<i32>,
}

impl PartialViewportProfile {
    fn over(self, base: ViewportProfile) -> ViewportProfile {
        ViewportProfile {
            grid_size: self.grid_size.unwrap_or(base.grid_size),
            min_width_cells: self.min_width_cells.unwrap_or(base.min_width_cells),
            min_height_cells: self.min_height_cells.unwrap_or(base.min_height_cells),
            origin: self.origin.unwrap_or(base.origin),
            wrap_width: self.wrap_width.unwrap_or(base.wrap_width),
        }
    }
}

impl From<PartialViewportConfig> for ViewportConfig {
    fn from(partial: PartialViewportConfig) -> Self {
        Self {
            mobile_max_width: partial.mobile_max_width.unwrap_or(DEFAULT_MOBILE_MAX_WIDTH),
            mobile: partial.mobile.over(ViewportProfile::mobile()),
            desktop: partial.desktop.over(ViewportProfile::desktop()),
        }
    }
}

/// Tracks the current viewport width and its class.
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    config: ViewportConfig,
    width: u32,
    class: ViewportClass,
}

impl ViewportAdapter {
    pub fn new(config: ViewportConfig, width: u32) -> Self {
        let class = ViewportClass::classify(width, config.mobile_max_width);
        Self { config, width, class }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn class(&self) -> ViewportClass {
        self.class
    }

    /// Profile of the active class.
    pub fn profile(&self) -> &ViewportProfile {
        self.config.profile(self.class)
    }

    /// Active snapping unit.
    pub fn grid_size(&self) -> i32 {
        self.profile().grid_size
    }

    /// Active minimum widget size.
    pub fn min_size(&self) -> GridSize {
        self.profile().min_size()
    }

    /// Record a new width. Returns the new class only if it changed.
    pub fn set_width(&mut self, width: u32) -> Option<ViewportClass> {
        self.width = width;
        let class = ViewportClass::classify(width, self.config.mobile_max_width);
        if class == self.class {
            return None;
        }
        log::info!("Viewport class changed: {:?} -> {:?} (width {})", self.class, class, width);
        self.class = class;
        Some(class)
    }
}

/// Widgets shown on first launch: id, type, desktop position, mobile position.
const DEFAULT_WIDGETS: [(&str, &str, GridPoint, GridPoint); 2] = [
    ("system-health", "SystemHealth", GridPoint::new(20, 20), GridPoint::new(10, 10)),
    ("whale-alerts", "WhaleAlerts", GridPoint::new(440, 20), GridPoint::new(10, 320)),
];

/// Canonical layout for a viewport class.
pub fn default_layout(class: ViewportClass, registry: &WidgetRegistry) -> LayoutSnapshot {
    let mut z_index = 0;
    let placements = DEFAULT_WIDGETS
        .iter()
        .filter_map(|&(id, widget_type, desktop, mobile)| {
            let Some(descriptor) = registry.get(widget_type) else {
                log::warn!("Default layout skips unregistered widget type {}", widget_type);
                return None;
            };
            let position = match class {
                ViewportClass::Desktop => desktop,
                ViewportClass::Mobile => mobile,
            };
            z_index += 1;
            Some(WidgetPlacement::new(
                id,
                widget_type,
                position,
                descriptor.size_for(class),
                z_index,
            ))
        })
        .collect::<Vec<_>>();
    LayoutSnapshot::new(placements)
}

/// Overwrite every placement's size with its class-specific descriptor size.
///
/// Positions are left alone and no collision check is made, so this may
/// introduce overlaps.
pub fn apply_class_sizes(
    snapshot: &LayoutSnapshot,
    class: ViewportClass,
    registry: &WidgetRegistry,
) -> LayoutSnapshot {
    let placements = snapshot
        .iter()
        .map(|placement| {
            let mut placement = placement.clone();
            match registry.get(&placement.widget_type) {
                Some(descriptor) => placement.size = descriptor.size_for(class),
                None => log::warn!(
                    "Keeping size of {}: unknown widget type {}",
                    placement.id,
                    placement.widget_type
                ),
            }
            placement
        })
        .collect::<Vec<_>>();
    LayoutSnapshot::new(placements)
}
