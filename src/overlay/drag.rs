use crate::geometry::{clamp_position, Geometry, Position, Viewport};
use crate::host::{HostPage, PointerId};
use crate::overlay::document::OverlayNode;
use crate::overlay::session::{
    acquire_capture, release_capture, GestureKind, InteractionSession, PointerButton,
    PointerEvent, PointerTarget,
};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

pub const DRAG_THRESHOLD: i32 = 8;
pub const CLICK_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Tracking,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    /// Pressed on the header, not yet far enough to count as a drag.
    Tracking {
        pointer: PointerId,
        start: (i32, i32),
        initial: Geometry,
        since: Instant,
    },
    Dragging(InteractionSession),
}

/// Header drag. Capture is taken only once the threshold is crossed, so a
/// plain click on the header never grabs the pointer.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold: i32,
    click_timeout: Duration,
}

impl DragController {
    pub fn attach(node: &OverlayNode, threshold: i32, click_timeout: Duration) -> Result<Self> {
        node.header
            .as_ref()
            .context("overlay header missing; drag unavailable")?;
        Ok(Self {
            state: DragState::Idle,
            threshold,
            click_timeout,
        })
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Tracking { .. } => DragPhase::Tracking,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn pointer(&self) -> Option<PointerId> {
        match self.state {
            DragState::Idle => None,
            DragState::Tracking { pointer, .. } => Some(pointer),
            DragState::Dragging(session) => Some(session.pointer),
        }
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Starts tracking for a primary press on the header itself. Presses on
    /// header buttons are clicks and are left alone.
    pub fn on_pointer_down(&mut self, node: &OverlayNode, event: &PointerEvent) -> bool {
        if self.is_active()
            || event.button != PointerButton::Primary
            || event.target != PointerTarget::Header
        {
            return false;
        }
        self.state = DragState::Tracking {
            pointer: event.pointer,
            start: event.point(),
            initial: node.geometry,
            since: event.now,
        };
        true
    }

    pub fn on_pointer_move<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: &mut OverlayNode,
        event: &PointerEvent,
    ) -> bool {
        match self.state {
            DragState::Idle => false,
            DragState::Tracking { pointer, .. } | DragState::Dragging(InteractionSession { pointer, .. })
                if pointer != event.pointer =>
            {
                false
            }
            DragState::Tracking {
                pointer,
                start,
                initial,
                since,
            } => {
                if event.now.saturating_duration_since(since) >= self.click_timeout {
                    tracing::debug!("header press timed out without a drag");
                    self.state = DragState::Idle;
                    return false;
                }
                if !exceeds_threshold(start, event.point(), self.threshold) {
                    return true;
                }

                let capture = acquire_capture(host, pointer);
                node.transitions_enabled = false;
                node.user_select = false;
                host.set_document_user_select(false);

                let session = InteractionSession {
                    pointer,
                    start,
                    initial,
                    kind: GestureKind::Drag,
                    capture,
                };
                self.state = DragState::Dragging(session);
                tracing::debug!(?capture, "drag started");
                move_to(node, &session, event.point(), host.viewport());
                true
            }
            DragState::Dragging(session) => {
                move_to(node, &session, event.point(), host.viewport());
                true
            }
        }
    }

    /// Drops a header press that never moved far enough.
    pub fn tick(&mut self, now: Instant) {
        if let DragState::Tracking { since, .. } = self.state {
            if now.saturating_duration_since(since) >= self.click_timeout {
                tracing::debug!("header press treated as click");
                self.state = DragState::Idle;
            }
        }
    }

    /// Ends the gesture from any exit path (release, cancel, blur, Escape).
    /// Safe to call repeatedly. Returns the position to persist when the
    /// overlay was actually dragged.
    pub fn finish<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<&mut OverlayNode>,
    ) -> Option<Position> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging(session) = state else {
            return None;
        };

        release_capture(host, &session);
        host.set_document_user_select(true);
        let node = node?;
        node.transitions_enabled = true;
        node.user_select = true;
        let position = node.geometry.position();
        tracing::debug!(?position, "drag finished");
        Some(position)
    }

    /// Ends any drag in flight and hands back its dropped position, exactly
    /// like [`finish`](Self::finish).
    pub fn dispose<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<&mut OverlayNode>,
    ) -> Option<Position> {
        self.finish(host, node)
    }
}

fn exceeds_threshold(start: (i32, i32), point: (i32, i32), threshold: i32) -> bool {
    let dx = i64::from(point.0) - i64::from(start.0);
    let dy = i64::from(point.1) - i64::from(start.1);
    let threshold = i64::from(threshold);
    dx * dx + dy * dy > threshold * threshold
}

fn move_to(node: &mut OverlayNode, session: &InteractionSession, point: (i32, i32), viewport: Viewport) {
    let (dx, dy) = session.delta(point);
    let position = clamp_position(
        session.initial.left + dx,
        session.initial.top + dy,
        node.geometry.width,
        node.geometry.height,
        viewport,
    );
    node.geometry = node.geometry.with_position(position);
}
