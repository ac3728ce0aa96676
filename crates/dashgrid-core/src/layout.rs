//! Widget placements and the layout store.

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{Bounds, GridPoint, GridSize, intersects};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where a single widget sits on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    /// Unique widget identifier.
    pub id: String,
    /// Registry key of the widget type.
    #[serde(rename = "type")]
    pub widget_type: String,
    /// Top-left corner in pixels.
    pub position: GridPoint,
    /// Size in pixels.
    pub size: GridSize,
    /// Stacking order; higher is drawn on top.
    #[serde(default)]
    pub z_index: i32,
}

impl WidgetPlacement {
    /// Create a new placement.
    pub fn new(
        id: impl Into<String>,
        widget_type: impl Into<String>,
        position: GridPoint,
        size: GridSize,
        z_index: i32,
    ) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            position,
            size,
            z_index,
        }
    }

    /// The rectangle covered by this placement.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }
}

/// An ordered list of placements. Order is render order, not stacking order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutSnapshot {
    placements: Vec<WidgetPlacement>,
}

impl LayoutSnapshot {
    /// Create a snapshot from placements in render order.
    pub fn new(placements: Vec<WidgetPlacement>) -> Self {
        Self { placements }
    }

    /// Placements in render order.
    pub fn placements(&self) -> &[WidgetPlacement] {
        &self.placements
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetPlacement> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Find a placement by id.
    pub fn find(&self, id: &str) -> Option<&WidgetPlacement> {
        self.placements.iter().find(|p| p.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut WidgetPlacement> {
        self.placements.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Highest z-index in the snapshot, or 0 when empty.
    pub fn max_z_index(&self) -> i32 {
        self.placements.iter().map(|p| p.z_index).max().unwrap_or(0).max(0)
    }

    /// First id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.placements
            .iter()
            .find(|p| !seen.insert(p.id.as_str()))
            .map(|p| p.id.as_str())
    }

    /// First placement other than `id` whose rectangle overlaps `bounds`.
    pub fn collides(&self, id: &str, bounds: &Bounds) -> Option<&WidgetPlacement> {
        self.placements
            .iter()
            .filter(|p| p.id != id)
            .find(|p| intersects(bounds, &p.bounds()))
    }

    /// Whether any two distinct placements overlap.
    pub fn has_overlaps(&self) -> bool {
        self.placements.iter().enumerate().any(|(i, a)| {
            self.placements[i + 1..]
                .iter()
                .any(|b| intersects(&a.bounds(), &b.bounds()))
        })
    }

    /// Ids sorted back to front by z-index; ties keep render order.
    pub fn stacking_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&WidgetPlacement> = self.placements.iter().collect();
        ordered.sort_by_key(|p| p.z_index);
        ordered.into_iter().map(|p| p.id.as_str()).collect()
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Vec<WidgetPlacement>> for LayoutSnapshot {
    fn from(placements: Vec<WidgetPlacement>) -> Self {
        Self::new(placements)
    }
}

impl<'a> IntoIterator for &'a LayoutSnapshot {
    type Item = &'a WidgetPlacement;
    type IntoIter = std::slice::Iter<'a, WidgetPlacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// Handle returned by [`LayoutStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&LayoutSnapshot)>;

/// Owns the current layout and notifies subscribers after every change.
///
/// Mutations are synchronous: once a method returns `Ok`, [`LayoutStore::get`]
/// reflects it.
pub struct LayoutStore {
    snapshot: LayoutSnapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("snapshot", &self.snapshot)
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new(LayoutSnapshot::default())
    }
}

impl LayoutStore {
    /// Create a store holding `snapshot`.
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self {
            snapshot,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current layout.
    pub fn get(&self) -> &LayoutSnapshot {
        &self.snapshot
    }

    pub fn find(&self, id: &str) -> Option<&WidgetPlacement> {
        self.snapshot.find(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.contains(id)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Register a callback invoked after every successful mutation.
    pub fn subscribe(&mut self, callback: impl FnMut(&LayoutSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        let snapshot = &self.snapshot;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(snapshot);
        }
    }

    fn placement_mut(&mut self, id: &str) -> LayoutResult<&mut WidgetPlacement> {
        self.snapshot
            .find_mut(id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))
    }

    /// Move a widget.
    pub fn upsert_position(&mut self, id: &str, position: GridPoint) -> LayoutResult<()> {
        self.placement_mut(id)?.position = position;
        self.notify();
        Ok(())
    }

    /// Resize a widget. Non-positive dimensions are clamped to one pixel.
    pub fn upsert_size(&mut self, id: &str, size: GridSize) -> LayoutResult<()> {
        let size = size.clamp_min(GridSize::new(1, 1));
        self.placement_mut(id)?.size = size;
        self.notify();
        Ok(())
    }

    /// Raise a widget above every other one (`max + 1`).
    pub fn bring_to_front(&mut self, id: &str) -> LayoutResult<()> {
        let top = self.snapshot.max_z_index() + 1;
        self.placement_mut(id)?.z_index = top;
        self.notify();
        Ok(())
    }

    /// Append a placement at the end of the render order.
    pub fn add(&mut self, placement: WidgetPlacement) -> LayoutResult<()> {
        if self.snapshot.contains(&placement.id) {
            return Err(LayoutError::DuplicateId(placement.id));
        }
        self.snapshot.placements.push(placement);
        self.notify();
        Ok(())
    }

    /// Remove a placement, returning it.
    pub fn remove(&mut self, id: &str) -> LayoutResult<WidgetPlacement> {
        let index = self
            .snapshot
            .placements
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LayoutError::UnknownWidget(id.to_string()))?;
        let removed = self.snapshot.placements.remove(index);
        self.notify();
        Ok(removed)
    }

    /// Replace the whole layout.
    pub fn replace_all(&mut self, snapshot: LayoutSnapshot) -> LayoutResult<()> {
        if let Some(id) = snapshot.duplicate_id() {
            return Err(LayoutError::DuplicateId(id.to_string()));
        }
        self.snapshot = snapshot;
        self.notify();
        Ok(())
    }
}
