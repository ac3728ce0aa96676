//! Drag and resize interaction state machine.
//!
//! A session starts on pointer-down over a widget's drag or resize handle and
//! ends on pointer-up or cancel. While it runs, every pointer move produces a
//! grid-snapped proposal that is checked for collisions and parked in a
//! single pending-write slot; [`InteractionController::flush`] applies the
//! slot once per scheduling tick. Invalid proposals are still shown live and
//! only rolled back on release.

use crate::geometry::{Bounds, GridPoint, GridSize, snap_value};
use crate::input::PointerInput;
use crate::layout::{LayoutStore, WidgetPlacement};
use kurbo::{Point, Vec2};

/// Which handle started the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Title-bar drag handle: moves the widget.
    Drag,
    /// Corner resize handle: changes width and height.
    Resize,
}

/// Geometry captured when the session started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    Drag { position: GridPoint },
    Resize { size: GridSize, position: GridPoint },
}

/// A geometry change for a single widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryUpdate {
    Position(GridPoint),
    Size(GridSize),
}

impl GeometryUpdate {
    fn apply(&self, store: &mut LayoutStore, widget_id: &str) -> bool {
        let result = match *self {
            GeometryUpdate::Position(position) => store.upsert_position(widget_id, position),
            GeometryUpdate::Size(size) => store.upsert_size(widget_id, size),
        };
        result.is_ok()
    }
}

/// An in-flight drag or resize.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    pub widget_id: String,
    pub origin_pointer: Point,
    pub origin: SessionOrigin,
    /// Whether the latest proposal collides with another widget.
    pub invalid: bool,
    last_proposal: Option<GeometryUpdate>,
}

impl InteractionSession {
    pub fn kind(&self) -> InteractionKind {
        match self.origin {
            SessionOrigin::Drag { .. } => InteractionKind::Drag,
            SessionOrigin::Resize { .. } => InteractionKind::Resize,
        }
    }

    /// The most recent proposal, if the pointer has moved.
    pub fn last_proposal(&self) -> Option<GeometryUpdate> {
        self.last_proposal
    }

    fn restore(&self) -> GeometryUpdate {
        match self.origin {
            SessionOrigin::Drag { position } => GeometryUpdate::Position(position),
            SessionOrigin::Resize { size, .. } => GeometryUpdate::Size(size),
        }
    }

    /// Rectangle `placement` would occupy after `update`.
    fn bounds_after(&self, update: GeometryUpdate, placement: &WidgetPlacement) -> Bounds {
        match update {
            GeometryUpdate::Position(position) => Bounds::new(position, placement.size),
            GeometryUpdate::Size(size) => Bounds::new(placement.position, size),
        }
    }
}

/// A geometry write waiting for the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub widget_id: String,
    pub update: GeometryUpdate,
}

/// Result of evaluating a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub update: GeometryUpdate,
    pub invalid: bool,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// The last proposal was valid and kept (or the pointer never moved).
    Committed,
    /// The last proposal collided; origin geometry was restored.
    Reverted,
    /// The widget disappeared; nothing was rolled back.
    Aborted,
    /// There was no session to end.
    Ignored,
}

/// Converts pointer events into snapped, collision-checked geometry.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    session: Option<InteractionSession>,
    pending: Option<PendingWrite>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active session, or `None` when idle.
    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    /// Whether pointer move/up events should be routed here.
    ///
    /// True exactly while a session is active, mirroring document-level
    /// listeners that are attached on pointer-down and removed on release.
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the live proposal is currently colliding.
    pub fn is_invalid(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.invalid)
    }

    /// Write waiting for the next tick, if any.
    pub fn pending(&self) -> Option<&PendingWrite> {
        self.pending.as_ref()
    }

    /// Rectangles the active session may still settle on: its origin and
    /// its latest proposal.
    pub fn reserved_bounds(&self, store: &LayoutStore) -> Vec<Bounds> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let Some(placement) = store.find(&session.widget_id) else {
            return Vec::new();
        };
        std::iter::once(session.restore())
            .chain(session.last_proposal)
            .map(|update| session.bounds_after(update, placement))
            .collect()
    }

    /// Start a session on `widget_id` and raise it to the front.
    ///
    /// Ignored while another session is active, when the widget does not
    /// exist, or when the input carries no coordinates.
    pub fn pointer_down(
        &mut self,
        store: &mut LayoutStore,
        widget_id: &str,
        kind: InteractionKind,
        input: &PointerInput,
    ) -> bool {
        if self.session.is_some() {
            log::debug!("Ignoring pointer-down on {}: session already active", widget_id);
            return false;
        }
        let Some(origin_pointer) = input.client_point() else {
            return false;
        };
        let Some(placement) = store.find(widget_id) else {
            return false;
        };

        let origin = match kind {
            InteractionKind::Drag => SessionOrigin::Drag {
                position: placement.position,
            },
            InteractionKind::Resize => SessionOrigin::Resize {
                size: placement.size,
                position: placement.position,
            },
        };

        // Focus wins regardless of how the interaction ends.
        if store.bring_to_front(widget_id).is_err() {
            return false;
        }

        log::debug!("Starting {:?} on {}", kind, widget_id);
        self.session = Some(InteractionSession {
            widget_id: widget_id.to_string(),
            origin_pointer,
            origin,
            invalid: false,
            last_proposal: None,
        });
        true
    }

    /// Evaluate a pointer move and park the result in the pending slot.
    ///
    /// A newer move replaces any write still waiting for its tick.
    pub fn pointer_move(
        &mut self,
        store: &LayoutStore,
        input: &PointerInput,
        grid_size: i32,
        min_size: GridSize,
    ) -> Option<Proposal> {
        let session = self.session.as_mut()?;
        let current = input.client_point()?;

        let Some(placement) = store.find(&session.widget_id) else {
            log::debug!("Aborting session: widget {} no longer exists", session.widget_id);
            self.abort();
            return None;
        };

        let delta = current - session.origin_pointer;
        let (update, bounds) = match session.origin {
            SessionOrigin::Drag { position } => {
                let proposed = offset_position(position, delta, grid_size);
                (GeometryUpdate::Position(proposed), Bounds::new(proposed, placement.size))
            }
            SessionOrigin::Resize { size, position } => {
                let proposed = resize(size, delta, grid_size, min_size);
                (GeometryUpdate::Size(proposed), Bounds::new(position, proposed))
            }
        };

        let invalid = store.get().collides(&session.widget_id, &bounds).is_some();
        session.invalid = invalid;
        session.last_proposal = Some(update);
        self.pending = Some(PendingWrite {
            widget_id: session.widget_id.clone(),
            update,
        });

        Some(Proposal { update, invalid })
    }

    /// Apply the pending write, if any. Call once per scheduling tick.
    ///
    /// Returns true if the store changed.
    pub fn flush(&mut self, store: &mut LayoutStore) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.update.apply(store, &pending.widget_id) {
            return true;
        }
        log::debug!("Dropping pending write for removed widget {}", pending.widget_id);
        self.forget(&pending.widget_id);
        false
    }

    /// End the session on pointer-up.
    ///
    /// A colliding proposal restores the origin geometry; otherwise the last
    /// proposal is kept. The proposal is checked again against the current
    /// layout, since other widgets may have changed since the last move. Any
    /// write still pending is superseded by the final geometry.
    pub fn pointer_up(&mut self, store: &mut LayoutStore) -> InteractionOutcome {
        self.pending = None;
        let Some(session) = self.session.take() else {
            return InteractionOutcome::Ignored;
        };

        let Some(placement) = store.find(&session.widget_id).cloned() else {
            log::debug!("Session on {} ended after widget removal", session.widget_id);
            return InteractionOutcome::Aborted;
        };

        let collides_now = session.last_proposal.is_some_and(|update| {
            let bounds = session.bounds_after(update, &placement);
            store.get().collides(&session.widget_id, &bounds).is_some()
        });
        if collides_now && !session.invalid {
            log::debug!("Proposal for {} collides at release", session.widget_id);
        }

        if session.invalid || collides_now {
            session.restore().apply(store, &session.widget_id);
            log::debug!("Reverted {:?} on {}", session.kind(), session.widget_id);
            return InteractionOutcome::Reverted;
        }

        if let Some(update) = session.last_proposal {
            update.apply(store, &session.widget_id);
        }
        log::debug!("Committed {:?} on {}", session.kind(), session.widget_id);
        InteractionOutcome::Committed
    }

    /// End the session on pointer-cancel. Behaves like pointer-up.
    pub fn pointer_cancel(&mut self, store: &mut LayoutStore) -> InteractionOutcome {
        self.pointer_up(store)
    }

    /// End the session by restoring its origin geometry, whatever the last
    /// proposal was.
    pub fn revert(&mut self, store: &mut LayoutStore) -> InteractionOutcome {
        self.pending = None;
        let Some(session) = self.session.take() else {
            return InteractionOutcome::Ignored;
        };
        if !session.restore().apply(store, &session.widget_id) {
            return InteractionOutcome::Aborted;
        }
        log::debug!("Abandoned {:?} on {}", session.kind(), session.widget_id);
        InteractionOutcome::Reverted
    }

    /// Drop any session or pending write that targets `widget_id`.
    ///
    /// Used when a widget is removed mid-interaction; no rollback happens.
    pub fn forget(&mut self, widget_id: &str) {
        if self.pending.as_ref().is_some_and(|p| p.widget_id == widget_id) {
            self.pending = None;
        }
        if self.session.as_ref().is_some_and(|s| s.widget_id == widget_id) {
            log::debug!("Aborting session on removed widget {}", widget_id);
            self.session = None;
        }
    }

    fn abort(&mut self) {
        self.session = None;
        self.pending = None;
    }
}

fn offset_position(origin: GridPoint, delta: Vec2, grid_size: i32) -> GridPoint {
    GridPoint::new(
        snap_value(f64::from(origin.x) + delta.x, grid_size),
        snap_value(f64::from(origin.y) + delta.y, grid_size),
    )
}

fn resize(origin: GridSize, delta: Vec2, grid_size: i32, min_size: GridSize) -> GridSize {
    let floor = GridSize::new(min_size.width.max(1), min_size.height.max(1));
    GridSize::new(
        snap_value(f64::from(origin.width) + delta.x, grid_size),
        snap_value(f64::from(origin.height) + delta.y, grid_size),
    )
    .clamp_min(floor)
}
