//! Catalog of addable widget types and collision-avoiding placement.

use crate::geometry::{Bounds, GridPoint, GridSize, intersects};
use crate::layout::LayoutSnapshot;
use crate::render::RefreshInterval;
use crate::viewport::{ViewportClass, ViewportProfile};
use uuid::Uuid;

/// Upper bound on candidate positions tried by [`place_new`].
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 256;

/// Auto-placement advances by this many grid cells per attempt.
pub const PLACEMENT_STEP_CELLS: i32 = 3;

/// Static metadata for a widget type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetTypeDescriptor {
    /// Registry key, stored in each placement's `type`.
    pub key: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub desktop_size: GridSize,
    pub mobile_size: GridSize,
    pub refresh_interval: RefreshInterval,
}

impl WidgetTypeDescriptor {
    /// Size used for this widget on the given viewport class.
    pub fn size_for(&self, class: ViewportClass) -> GridSize {
        match class {
            ViewportClass::Desktop => self.desktop_size,
            ViewportClass::Mobile => self.mobile_size,
        }
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.key, &self.title, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Widget types known to the dashboard, in registration order.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    descriptors: Vec<WidgetTypeDescriptor>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock status, activity and leaderboard panels.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(WidgetTypeDescriptor {
            key: "SystemHealth".to_string(),
            title: "System Health".to_string(),
            description: "Service status and API latency".to_string(),
            category: "status".to_string(),
            desktop_size: GridSize::new(400, 300),
            mobile_size: GridSize::new(340, 300),
            refresh_interval: RefreshInterval::from_millis(30_000),
        });
        registry.register(WidgetTypeDescriptor {
            key: "WhaleAlerts".to_string(),
            title: "Whale Alerts".to_string(),
            description: "Large transfers as they happen".to_string(),
            category: "activity".to_string(),
            desktop_size: GridSize::new(500, 400),
            mobile_size: GridSize::new(340, 400),
            refresh_interval: RefreshInterval::from_millis(60_000),
        });
        registry.register(WidgetTypeDescriptor {
            key: "EcosystemLeaderboard".to_string(),
            title: "Ecosystem Leaderboard".to_string(),
            description: "Top ecosystem participants".to_string(),
            category: "leaderboards".to_string(),
            desktop_size: GridSize::new(500, 500),
            mobile_size: GridSize::new(340, 500),
            refresh_interval: RefreshInterval::from_millis(300_000),
        });
        registry
    }

    /// Add a descriptor, replacing any existing one with the same key.
    pub fn register(&mut self, descriptor: WidgetTypeDescriptor) {
        match self.descriptors.iter().position(|d| d.key == descriptor.key) {
            Some(index) => self.descriptors[index] = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn get(&self, key: &str) -> Option<&WidgetTypeDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Case-insensitive search over key, title and category.
    pub fn search(&self, query: &str) -> Vec<&WidgetTypeDescriptor> {
        self.descriptors.iter().filter(|d| d.matches(query)).collect()
    }
}

/// Find a position for a new widget that avoids existing placements.
///
/// Scans from the profile origin in steps of three grid cells, wrapping to a
/// new row once the widget would extend past `wrap_width`. `reserved`
/// rectangles count as occupied alongside the placements. Gives up after
/// `max_attempts` candidates and returns the last one, which may still
/// collide.
pub fn place_new(
    descriptor: &WidgetTypeDescriptor,
    snapshot: &LayoutSnapshot,
    reserved: &[Bounds],
    class: ViewportClass,
    profile: &ViewportProfile,
    max_attempts: usize,
) -> GridPoint {
    let size = descriptor.size_for(class);
    let step = profile.grid_size.max(1) * PLACEMENT_STEP_CELLS;
    let mut candidate = profile.origin;

    for _ in 0..max_attempts {
        let bounds = Bounds::new(candidate, size);
        let occupied = snapshot
            .iter()
            .map(|p| p.bounds())
            .chain(reserved.iter().copied())
            .any(|other| intersects(&bounds, &other));
        if !occupied {
            return candidate;
        }

        candidate.x += step;
        if candidate.x + size.width > profile.wrap_width {
            candidate.x = profile.origin.x;
            candidate.y += step;
        }
    }

    log::warn!(
        "No free slot for {} after {} attempts, placing at ({}, {})",
        descriptor.key,
        max_attempts,
        candidate.x,
        candidate.y
    );
    candidate
}

/// Generate an id for a new widget of `widget_type` that is unused in `snapshot`.
pub fn new_widget_id(widget_type: &str, snapshot: &LayoutSnapshot) -> String {
    let prefix = kebab_case(widget_type);
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", prefix, &suffix[..8]);
        if !snapshot.contains(&id) {
            return id;
        }
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() {
            out.push(c);
        } else {
            out.push('-');
        }
    }
    out
}
