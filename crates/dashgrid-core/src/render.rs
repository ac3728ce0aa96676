//! Contract with the widget render surface.
//!
//! The engine never looks inside a widget. It hands each renderer its
//! placement and a refresh interval; fetching and error states belong to the
//! widget.

use crate::layout::{LayoutSnapshot, WidgetPlacement};
use crate::registry::{WidgetRegistry, WidgetTypeDescriptor};
use std::time::Duration;

/// How often a widget refreshes its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshInterval {
    Every(Duration),
    Disabled,
}

impl RefreshInterval {
    pub const fn from_millis(millis: u64) -> Self {
        RefreshInterval::Every(Duration::from_millis(millis))
    }

    /// Interval in milliseconds, or `None` when disabled.
    pub fn as_millis(&self) -> Option<u128> {
        match self {
            RefreshInterval::Every(duration) => Some(duration.as_millis()),
            RefreshInterval::Disabled => None,
        }
    }
}

/// A placement paired with what its renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    pub placement: &'a WidgetPlacement,
    pub descriptor: &'a WidgetTypeDescriptor,
    pub refresh: RefreshInterval,
}

/// Resolve every placement against the registry, in render order.
///
/// Placements with an unregistered type are skipped; the rest still render.
pub fn render_plan<'a>(snapshot: &'a LayoutSnapshot, registry: &'a WidgetRegistry) -> Vec<RenderItem<'a>> {
    snapshot
        .iter()
        .filter_map(|placement| match registry.get(&placement.widget_type) {
            Some(descriptor) => Some(RenderItem {
                placement,
                descriptor,
                refresh: descriptor.refresh_interval,
            }),
            None => {
                log::warn!(
                    "Skipping widget {}: unknown widget type {}",
                    placement.id,
                    placement.widget_type
                );
                None
            }
        })
        .collect()
}
