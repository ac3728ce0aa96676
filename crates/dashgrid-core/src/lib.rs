//! DashGrid Core Library
//!
//! Platform-agnostic layout engine for dashboards made of draggable,
//! resizable panels: collision detection, grid snapping, z-order,
//! viewport-adaptive defaults and auto-placement of new widgets.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod registry;
pub mod render;
pub mod storage;
pub mod viewport;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::{LayoutError, LayoutResult};
pub use geometry::{Bounds, GridPoint, GridSize, intersects, snap_to_grid, snap_value};
pub use input::{PointerInput, TouchPoint};
pub use interaction::{
    GeometryUpdate, InteractionController, InteractionKind, InteractionOutcome, InteractionSession,
    PendingWrite, Proposal,
};
pub use layout::{LayoutSnapshot, LayoutStore, SubscriptionId, WidgetPlacement};
pub use registry::{WidgetRegistry, WidgetTypeDescriptor, new_widget_id, place_new};
pub use render::{RefreshInterval, RenderItem, render_plan};
pub use storage::{LayoutPersistence, MemoryStorage, Storage, StorageError, StorageResult};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use viewport::{ViewportAdapter, ViewportClass, ViewportConfig, ViewportProfile};
