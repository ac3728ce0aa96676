//! The dashboard: layout store, interaction, viewport and persistence wired
//! together.

use crate::config::DashboardConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::input::PointerInput;
use crate::interaction::{InteractionController, InteractionKind, InteractionOutcome, Proposal};
use crate::layout::{LayoutSnapshot, LayoutStore, SubscriptionId, WidgetPlacement};
use crate::registry::{WidgetRegistry, new_widget_id, place_new};
use crate::render::{RenderItem, render_plan};
use crate::storage::{LayoutPersistence, Storage};
use crate::viewport::{ViewportAdapter, ViewportClass, apply_class_sizes, default_layout};
use std::sync::Arc;

/// A dashboard session.
///
/// Every mutation is followed by a best-effort save; save failures are
/// logged and the in-memory layout stays authoritative.
pub struct Dashboard<S: Storage> {
    store: LayoutStore,
    viewport: ViewportAdapter,
    registry: WidgetRegistry,
    controller: InteractionController,
    persistence: LayoutPersistence<S>,
    max_placement_attempts: usize,
}

impl<S: Storage> Dashboard<S> {
    /// Open the dashboard, restoring the saved layout when possible.
    ///
    /// Missing, unreadable or malformed layouts fall back to the default for
    /// the viewport class of `width`.
    pub fn open(storage: Arc<S>, registry: WidgetRegistry, config: DashboardConfig, width: u32) -> Self {
        let viewport = ViewportAdapter::new(config.viewport, width);
        let persistence = LayoutPersistence::new(storage);
        let snapshot = restore_layout(&persistence, &viewport, &registry);

        Self {
            store: LayoutStore::new(snapshot),
            viewport,
            registry,
            controller: InteractionController::new(),
            persistence,
            max_placement_attempts: config.max_placement_attempts,
        }
    }

    /// Current layout in render order.
    pub fn snapshot(&self) -> &LayoutSnapshot {
        self.store.get()
    }

    pub fn viewport(&self) -> &ViewportAdapter {
        &self.viewport
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn persistence(&self) -> &LayoutPersistence<S> {
        &self.persistence
    }

    /// Be notified after every layout change.
    pub fn subscribe(&mut self, callback: impl FnMut(&LayoutSnapshot) + 'static) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Pointer-down on a widget's drag or resize handle.
    pub fn pointer_down(&mut self, widget_id: &str, kind: InteractionKind, input: &PointerInput) -> bool {
        let started = self.controller.pointer_down(&mut self.store, widget_id, kind, input);
        if started {
            self.persist();
        }
        started
    }

    /// Pointer-move while a session is active. The write lands on the next
    /// [`Dashboard::tick`].
    pub fn pointer_move(&mut self, input: &PointerInput) -> Option<Proposal> {
        self.controller.pointer_move(
            &self.store,
            input,
            self.viewport.grid_size(),
            self.viewport.min_size(),
        )
    }

    /// Scheduling tick: apply at most one pending geometry write.
    pub fn tick(&mut self) -> bool {
        let applied = self.controller.flush(&mut self.store);
        if applied {
            self.persist();
        }
        applied
    }

    pub fn pointer_up(&mut self) -> InteractionOutcome {
        let outcome = self.controller.pointer_up(&mut self.store);
        self.persist_outcome(outcome);
        outcome
    }

    pub fn pointer_cancel(&mut self) -> InteractionOutcome {
        let outcome = self.controller.pointer_cancel(&mut self.store);
        self.persist_outcome(outcome);
        outcome
    }

    /// React to a viewport width change.
    ///
    /// On a class change every placement takes its class-specific size.
    /// Positions are kept and overlaps introduced this way are accepted. An
    /// active interaction is abandoned first and its widget restored to the
    /// origin geometry, so no stale write lands after the rewrite.
    pub fn resize_viewport(&mut self, width: u32) -> Option<ViewportClass> {
        let class = self.viewport.set_width(width)?;
        if self.controller.is_capturing() {
            self.controller.revert(&mut self.store);
        }
        let resized = apply_class_sizes(self.store.get(), class, &self.registry);
        match self.store.replace_all(resized) {
            Ok(()) => self.persist(),
            Err(e) => log::warn!("Failed to apply {:?} sizes: {}", class, e),
        }
        Some(class)
    }

    /// Add a widget of `widget_type`, auto-placed away from existing ones
    /// and from wherever an active interaction may still settle.
    ///
    /// Returns the new widget's id.
    pub fn add_widget(&mut self, widget_type: &str) -> LayoutResult<String> {
        let descriptor = self
            .registry
            .get(widget_type)
            .ok_or_else(|| LayoutError::UnknownWidgetType(widget_type.to_string()))?;
        let class = self.viewport.class();
        let snapshot = self.store.get();
        let reserved = self.controller.reserved_bounds(&self.store);

        let position = place_new(
            descriptor,
            snapshot,
            &reserved,
            class,
            self.viewport.profile(),
            self.max_placement_attempts,
        );
        let id = new_widget_id(widget_type, snapshot);
        let placement = WidgetPlacement::new(
            id.clone(),
            widget_type,
            position,
            descriptor.size_for(class),
            snapshot.max_z_index() + 1,
        );

        self.store.add(placement)?;
        log::debug!("Added {} at ({}, {})", id, position.x, position.y);
        self.persist();
        Ok(id)
    }

    /// Remove a widget, aborting any interaction that targets it.
    pub fn remove_widget(&mut self, widget_id: &str) -> LayoutResult<WidgetPlacement> {
        self.controller.forget(widget_id);
        let removed = self.store.remove(widget_id)?;
        self.persist();
        Ok(removed)
    }

    /// Replace the layout with the default for the current viewport class.
    pub fn reset_layout(&mut self) {
        if let Some(id) = self.controller.session().map(|s| s.widget_id.clone()) {
            self.controller.forget(&id);
        }
        let layout = default_layout(self.viewport.class(), &self.registry);
        match self.store.replace_all(layout) {
            Ok(()) => {
                log::info!("Layout reset to {:?} default", self.viewport.class());
                self.persist();
            }
            Err(e) => log::warn!("Failed to reset layout: {}", e),
        }
    }

    /// Placements resolved against the registry, unknown types skipped.
    pub fn render_plan(&self) -> Vec<RenderItem<'_>> {
        render_plan(self.store.get(), &self.registry)
    }

    fn persist_outcome(&mut self, outcome: InteractionOutcome) {
        if matches!(outcome, InteractionOutcome::Committed | InteractionOutcome::Reverted) {
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.persistence.save(self.store.get()) {
            log::warn!("Could not save dashboard layout: {}", e);
        }
    }
}

fn restore_layout<S: Storage>(
    persistence: &LayoutPersistence<S>,
    viewport: &ViewportAdapter,
    registry: &WidgetRegistry,
) -> LayoutSnapshot {
    let fallback = || default_layout(viewport.class(), registry);
    match persistence.load() {
        Ok(Some(snapshot)) => {
            if let Some(id) = snapshot.duplicate_id() {
                log::warn!("Saved layout has duplicate widget id {}, using default", id);
                return fallback();
            }
            let min = viewport.min_size();
            let placements = snapshot
                .iter()
                .map(|p| WidgetPlacement {
                    size: p.size.clamp_min(min),
                    ..p.clone()
                })
                .collect::<Vec<_>>();
            LayoutSnapshot::new(placements)
        }
        Ok(None) => {
            log::debug!("No saved layout, using {:?} default", viewport.class());
            fallback()
        }
        Err(e) => {
            log::warn!("Could not load dashboard layout: {}", e);
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bounds, GridPoint, GridSize, intersects, is_on_grid};
    use crate::registry::WidgetTypeDescriptor;
    use crate::render::RefreshInterval;
    use crate::storage::{LAYOUT_KEY, MemoryStorage, StorageError, StorageResult};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const DESKTOP: u32 = 1280;
    const MOBILE: u32 = 390;

    /// Storage whose reads and writes can be made to fail.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_load: Cell<bool>,
        fail_save: Cell<bool>,
    }

    impl Storage for FlakyStorage {
        fn save(&self, key: &str, blob: &str) -> StorageResult<()> {
            if self.fail_save.get() {
                return Err(StorageError::Io("disk full".to_string()));
            }
            self.inner.save(key, blob)
        }

        fn load(&self, key: &str) -> StorageResult<String> {
            if self.fail_load.get() {
                return Err(StorageError::Io("permission denied".to_string()));
            }
            self.inner.load(key)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key)
        }

        fn exists(&self, key: &str) -> StorageResult<bool> {
            self.inner.exists(key)
        }
    }

    fn open(storage: &Arc<MemoryStorage>, width: u32) -> Dashboard<MemoryStorage> {
        Dashboard::open(
            Arc::clone(storage),
            WidgetRegistry::builtin(),
            DashboardConfig::default(),
            width,
        )
    }

    fn two_widget_blob() -> String {
        LayoutSnapshot::new(vec![
            WidgetPlacement::new("a", "SystemHealth", GridPoint::new(0, 0), GridSize::new(400, 300), 1),
            WidgetPlacement::new("b", "WhaleAlerts", GridPoint::new(440, 0), GridSize::new(500, 400), 2),
        ])
        .to_json()
        .unwrap()
    }

    #[test]
    fn test_open_without_saved_layout_uses_default() {
        let storage = Arc::new(MemoryStorage::new());
        let dashboard = open(&storage, DESKTOP);
        assert_eq!(
            *dashboard.snapshot(),
            default_layout(ViewportClass::Desktop, &WidgetRegistry::builtin())
        );

        let mobile = open(&Arc::new(MemoryStorage::new()), MOBILE);
        assert_eq!(mobile.viewport().class(), ViewportClass::Mobile);
        assert_eq!(mobile.snapshot().find("whale-alerts").unwrap().position, GridPoint::new(10, 320));
    }

    #[test]
    fn test_open_with_malformed_blob_uses_default() {
        let storage = Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, "[{\"id\": 3}"));
        let dashboard = open(&storage, DESKTOP);
        assert!(dashboard.snapshot().contains("system-health"));
    }

    #[test]
    fn test_open_with_duplicate_ids_uses_default() {
        let blob = LayoutSnapshot::new(vec![
            WidgetPlacement::new("x", "SystemHealth", GridPoint::new(0, 0), GridSize::new(400, 300), 1),
            WidgetPlacement::new("x", "SystemHealth", GridPoint::new(0, 400), GridSize::new(400, 300), 2),
        ])
        .to_json()
        .unwrap();
        let dashboard = open(&Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, &blob)), DESKTOP);
        assert!(!dashboard.snapshot().contains("x"));
    }

    #[test]
    fn test_open_clamps_undersized_widgets() {
        let blob = LayoutSnapshot::new(vec![WidgetPlacement::new(
            "tiny",
            "SystemHealth",
            GridPoint::new(0, 0),
            GridSize::new(0, -40),
            1,
        )])
        .to_json()
        .unwrap();
        let dashboard = open(&Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, &blob)), DESKTOP);
        assert_eq!(dashboard.snapshot().find("tiny").unwrap().size, GridSize::new(200, 160));
    }

    #[test]
    fn test_load_failure_falls_back_to_default() {
        let storage = Arc::new(FlakyStorage::default());
        storage.fail_load.set(true);
        let dashboard = Dashboard::open(storage, WidgetRegistry::builtin(), DashboardConfig::default(), DESKTOP);
        assert_eq!(dashboard.snapshot().len(), 2);
    }

    #[test]
    fn test_save_failure_keeps_in_memory_state() {
        let storage = Arc::new(FlakyStorage::default());
        storage.fail_save.set(true);
        let mut dashboard =
            Dashboard::open(Arc::clone(&storage), WidgetRegistry::builtin(), DashboardConfig::default(), DESKTOP);

        let id = dashboard.add_widget("EcosystemLeaderboard").unwrap();
        assert!(dashboard.snapshot().contains(&id));
        assert!(dashboard.persistence().is_dirty());
        assert!(!storage.exists(LAYOUT_KEY).unwrap());

        storage.fail_save.set(false);
        dashboard.remove_widget(&id).unwrap();
        assert!(!dashboard.persistence().is_dirty());
        assert!(storage.exists(LAYOUT_KEY).unwrap());
    }

    #[test]
    fn test_invalid_drag_reverts_and_persists() {
        let storage = Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, &two_widget_blob()));
        let mut dashboard = open(&storage, DESKTOP);

        assert!(dashboard.pointer_down("a", InteractionKind::Drag, &PointerInput::mouse(200.0, 10.0)));
        let proposal = dashboard.pointer_move(&PointerInput::mouse(510.0, 10.0)).unwrap();
        assert!(proposal.invalid);
        assert!(dashboard.tick());
        assert_eq!(dashboard.snapshot().find("a").unwrap().position, GridPoint::new(320, 0));

        assert_eq!(dashboard.pointer_up(), InteractionOutcome::Reverted);
        assert_eq!(dashboard.snapshot().find("a").unwrap().position, GridPoint::new(0, 0));

        let reopened = open(&storage, DESKTOP);
        let a = reopened.snapshot().find("a").unwrap();
        assert_eq!(a.position, GridPoint::new(0, 0));
        // Focus from the pointer-down survives the revert
        assert_eq!(a.z_index, 3);
    }

    #[test]
    fn test_save_then_load_reproduces_layout() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        dashboard.add_widget("EcosystemLeaderboard").unwrap();
        dashboard.pointer_down("system-health", InteractionKind::Resize, &PointerInput::touch(420.0, 320.0));
        dashboard.pointer_move(&PointerInput::touch(380.0, 300.0));
        dashboard.pointer_up();

        let reopened = open(&storage, DESKTOP);
        assert_eq!(reopened.snapshot(), dashboard.snapshot());
        assert_eq!(reopened.snapshot().stacking_order(), dashboard.snapshot().stacking_order());
    }

    #[test]
    fn test_committed_layout_has_no_overlaps_and_is_on_grid() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        let moves = [
            ("system-health", InteractionKind::Drag, 600.0, 0.0),
            ("whale-alerts", InteractionKind::Drag, -421.0, 333.0),
            ("system-health", InteractionKind::Resize, 250.0, 250.0),
            ("whale-alerts", InteractionKind::Resize, -999.0, -999.0),
        ];
        for (id, kind, dx, dy) in moves {
            dashboard.pointer_down(id, kind, &PointerInput::mouse(0.0, 0.0));
            dashboard.pointer_move(&PointerInput::mouse(dx, dy));
            dashboard.tick();
            dashboard.pointer_up();

            assert!(!dashboard.snapshot().has_overlaps());
            for p in dashboard.snapshot() {
                for value in [p.position.x, p.position.y, p.size.width, p.size.height] {
                    assert!(is_on_grid(value, 20), "{} not on grid in {:?}", value, p);
                }
            }
        }
    }

    #[test]
    fn test_viewport_switch_rewrites_sizes_without_collision_check() {
        let mut registry = WidgetRegistry::new();
        registry.register(WidgetTypeDescriptor {
            key: "Chart".to_string(),
            title: "Chart".to_string(),
            description: String::new(),
            category: "charts".to_string(),
            desktop_size: GridSize::new(200, 200),
            mobile_size: GridSize::new(400, 400),
            refresh_interval: RefreshInterval::Disabled,
        });
        let blob = LayoutSnapshot::new(vec![
            WidgetPlacement::new("c1", "Chart", GridPoint::new(0, 0), GridSize::new(200, 200), 1),
            WidgetPlacement::new("c2", "Chart", GridPoint::new(220, 0), GridSize::new(200, 200), 2),
        ])
        .to_json()
        .unwrap();
        let storage = Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, &blob));
        let mut dashboard = Dashboard::open(Arc::clone(&storage), registry, DashboardConfig::default(), DESKTOP);

        assert_eq!(dashboard.resize_viewport(1100), None);
        assert_eq!(dashboard.resize_viewport(600), Some(ViewportClass::Mobile));
        for p in dashboard.snapshot() {
            assert_eq!(p.size, GridSize::new(400, 400));
        }
        assert_eq!(dashboard.snapshot().find("c2").unwrap().position, GridPoint::new(220, 0));
        assert!(dashboard.snapshot().has_overlaps());

        let saved = LayoutSnapshot::from_json(&storage.load(LAYOUT_KEY).unwrap()).unwrap();
        assert_eq!(&saved, dashboard.snapshot());
        assert_eq!(dashboard.viewport().grid_size(), 10);
    }

    #[test]
    fn test_class_change_mid_resize_restores_origin() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        dashboard.pointer_down("system-health", InteractionKind::Resize, &PointerInput::mouse(0.0, 0.0));
        dashboard.pointer_move(&PointerInput::mouse(200.0, 100.0));
        dashboard.tick();
        dashboard.pointer_move(&PointerInput::mouse(300.0, 200.0));

        assert_eq!(dashboard.resize_viewport(MOBILE), Some(ViewportClass::Mobile));
        assert!(!dashboard.controller().is_capturing());
        assert!(dashboard.controller().pending().is_none());
        assert!(!dashboard.tick());
        assert_eq!(dashboard.pointer_up(), InteractionOutcome::Ignored);

        let health = dashboard.snapshot().find("system-health").unwrap();
        assert_eq!(health.size, GridSize::new(340, 300));
        assert_eq!(health.position, GridPoint::new(20, 20));
        assert_eq!(*open(&storage, MOBILE).snapshot(), *dashboard.snapshot());
    }

    #[test]
    fn test_add_widget_mid_drag_keeps_layout_disjoint() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        assert!(dashboard.pointer_down("system-health", InteractionKind::Drag, &PointerInput::mouse(0.0, 0.0)));
        let proposal = dashboard.pointer_move(&PointerInput::mouse(0.0, 400.0)).unwrap();
        assert!(!proposal.invalid);

        let id = dashboard.add_widget("SystemHealth").unwrap();
        let added = dashboard.snapshot().find(&id).unwrap().bounds();
        assert!(!intersects(&added, &Bounds::from_xywh(20, 20, 400, 300)));
        assert!(!intersects(&added, &Bounds::from_xywh(20, 420, 400, 300)));

        assert_eq!(dashboard.pointer_up(), InteractionOutcome::Committed);
        assert_eq!(
            dashboard.snapshot().find("system-health").unwrap().position,
            GridPoint::new(20, 420)
        );
        assert!(!dashboard.snapshot().has_overlaps());
    }

    #[test]
    fn test_widget_removed_mid_drag() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        dashboard.pointer_down("whale-alerts", InteractionKind::Drag, &PointerInput::mouse(500.0, 30.0));
        dashboard.pointer_move(&PointerInput::mouse(100.0, 30.0));

        dashboard.remove_widget("whale-alerts").unwrap();
        assert!(!dashboard.controller().is_capturing());
        assert!(!dashboard.tick());
        assert_eq!(dashboard.pointer_up(), InteractionOutcome::Ignored);
        assert!(!dashboard.snapshot().contains("whale-alerts"));
        assert_eq!(dashboard.snapshot().find("system-health").unwrap().position, GridPoint::new(20, 20));
    }

    #[test]
    fn test_add_widget_auto_places_on_top() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        let id = dashboard.add_widget("EcosystemLeaderboard").unwrap();

        let added = dashboard.snapshot().find(&id).unwrap();
        assert_eq!(added.size, GridSize::new(500, 500));
        assert_eq!(added.z_index, 3);
        assert!(!dashboard.snapshot().has_overlaps());
        assert_eq!(dashboard.snapshot().placements().last().unwrap().id, id);
    }

    #[test]
    fn test_add_unknown_widget_type() {
        let mut dashboard = open(&Arc::new(MemoryStorage::new()), DESKTOP);
        let result = dashboard.add_widget("Nope");
        assert_eq!(result, Err(LayoutError::UnknownWidgetType("Nope".to_string())));
        assert_eq!(dashboard.snapshot().len(), 2);
    }

    #[test]
    fn test_reset_layout() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        dashboard.add_widget("WhaleAlerts").unwrap();
        dashboard.remove_widget("system-health").unwrap();
        dashboard.pointer_down("whale-alerts", InteractionKind::Drag, &PointerInput::mouse(0.0, 0.0));

        dashboard.reset_layout();
        assert!(!dashboard.controller().is_capturing());
        assert_eq!(
            *dashboard.snapshot(),
            default_layout(ViewportClass::Desktop, dashboard.registry())
        );
        assert_eq!(*open(&storage, DESKTOP).snapshot(), *dashboard.snapshot());
    }

    #[test]
    fn test_render_plan_skips_unknown_placements() {
        let blob = r#"[
            {"id":"gone","type":"Retired","position":{"x":0,"y":0},"size":{"width":200,"height":160},"zIndex":1},
            {"id":"ok","type":"WhaleAlerts","position":{"x":220,"y":0},"size":{"width":500,"height":400},"zIndex":2}
        ]"#;
        let dashboard = open(&Arc::new(MemoryStorage::with_blob(LAYOUT_KEY, blob)), DESKTOP);
        let plan = dashboard.render_plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].placement.id, "ok");
        // Unknown placements remain in the layout
        assert!(dashboard.snapshot().contains("gone"));
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let storage = Arc::new(MemoryStorage::new());
        let mut dashboard = open(&storage, DESKTOP);
        let events = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&events);
        dashboard.subscribe(move |_| *counter.borrow_mut() += 1);

        dashboard.pointer_down("system-health", InteractionKind::Drag, &PointerInput::mouse(0.0, 0.0));
        dashboard.pointer_move(&PointerInput::mouse(0.0, 500.0));
        dashboard.tick();
        dashboard.pointer_up();
        // bring-to-front, tick write, final commit
        assert_eq!(*events.borrow(), 3);
    }
}
