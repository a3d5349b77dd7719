use crate::geometry::{clamp_position, clamp_size, Geometry, Size, Viewport};
use crate::host::{HostPage, PointerId};
use crate::overlay::document::OverlayNode;
use crate::overlay::session::{
    acquire_capture, release_capture, GestureKind, InteractionSession, PointerButton,
    PointerEvent,
};
use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeDirection {
    pub const ALL: [ResizeDirection; 8] = [
        ResizeDirection::NorthWest,
        ResizeDirection::NorthEast,
        ResizeDirection::SouthWest,
        ResizeDirection::SouthEast,
        ResizeDirection::North,
        ResizeDirection::South,
        ResizeDirection::West,
        ResizeDirection::East,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ResizeDirection::North => "n",
            ResizeDirection::South => "s",
            ResizeDirection::East => "e",
            ResizeDirection::West => "w",
            ResizeDirection::NorthEast => "ne",
            ResizeDirection::NorthWest => "nw",
            ResizeDirection::SouthEast => "se",
            ResizeDirection::SouthWest => "sw",
        }
    }

    pub fn cursor(self) -> &'static str {
        match self {
            ResizeDirection::North => "n-resize",
            ResizeDirection::South => "s-resize",
            ResizeDirection::East => "e-resize",
            ResizeDirection::West => "w-resize",
            ResizeDirection::NorthEast => "ne-resize",
            ResizeDirection::NorthWest => "nw-resize",
            ResizeDirection::SouthEast => "se-resize",
            ResizeDirection::SouthWest => "sw-resize",
        }
    }

    fn moves_west_edge(self) -> bool {
        matches!(
            self,
            ResizeDirection::West | ResizeDirection::NorthWest | ResizeDirection::SouthWest
        )
    }

    fn moves_east_edge(self) -> bool {
        matches!(
            self,
            ResizeDirection::East | ResizeDirection::NorthEast | ResizeDirection::SouthEast
        )
    }

    fn moves_north_edge(self) -> bool {
        matches!(
            self,
            ResizeDirection::North | ResizeDirection::NorthEast | ResizeDirection::NorthWest
        )
    }

    fn moves_south_edge(self) -> bool {
        matches!(
            self,
            ResizeDirection::South | ResizeDirection::SouthEast | ResizeDirection::SouthWest
        )
    }

    /// Size the pointer displacement asks for, before any bounds.
    pub fn raw_size(self, initial: Geometry, dx: i32, dy: i32) -> Size {
        let mut size = initial.size();
        if self.moves_east_edge() {
            size.width += dx;
        } else if self.moves_west_edge() {
            size.width -= dx;
        }
        if self.moves_south_edge() {
            size.height += dy;
        } else if self.moves_north_edge() {
            size.height -= dy;
        }
        size
    }

    /// Applies the displacement and the viewport bounds. Moving a west or
    /// north edge shifts the origin so the opposite edge stays put.
    pub fn apply(self, initial: Geometry, dx: i32, dy: i32, viewport: Viewport) -> Geometry {
        let raw = self.raw_size(initial, dx, dy);
        let size = clamp_size(raw.width, raw.height, viewport);
        let left = if self.moves_west_edge() {
            initial.right() - size.width
        } else {
            initial.left
        };
        let top = if self.moves_north_edge() {
            initial.bottom() - size.height
        } else {
            initial.top
        };
        let position = clamp_position(left, top, size.width, size.height, viewport);
        Geometry::from_parts(position, size)
    }
}

/// Result of a finished resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub geometry: Geometry,
    /// Persisted instead of the displayed size so a later, larger viewport
    /// can restore it.
    pub intended: Size,
}

#[derive(Debug, Clone, Default)]
pub struct ResizeController {
    session: Option<InteractionSession>,
}

impl ResizeController {
    pub fn attach(node: &OverlayNode) -> Result<Self> {
        if node.resize_handles.is_empty() {
            bail!("overlay has no resize handles; resize unavailable");
        }
        Ok(Self::default())
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer(&self) -> Option<PointerId> {
        self.session.map(|session| session.pointer)
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    pub fn on_pointer_down<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: &mut OverlayNode,
        event: &PointerEvent,
        direction: ResizeDirection,
    ) -> bool {
        if self.is_active() || event.button != PointerButton::Primary || node.minimized {
            return false;
        }
        if !node.resize_handles.contains(&direction) {
            tracing::error!(direction = direction.code(), "resize handle missing");
            return false;
        }

        let capture = acquire_capture(host, event.pointer);
        node.transitions_enabled = false;
        node.user_select = false;
        if let Some(frame) = node.frame.as_mut() {
            frame.pointer_events = false;
        }
        host.set_document_user_select(false);
        host.set_document_cursor(Some(direction.cursor()));

        self.session = Some(InteractionSession {
            pointer: event.pointer,
            start: event.point(),
            initial: node.geometry,
            kind: GestureKind::Resize(direction),
            capture,
        });
        tracing::debug!(direction = direction.code(), ?capture, "resize started");
        true
    }

    pub fn on_pointer_move<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: &mut OverlayNode,
        event: &PointerEvent,
    ) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if session.pointer != event.pointer {
            return false;
        }
        let GestureKind::Resize(direction) = session.kind else {
            return false;
        };

        let (dx, dy) = session.delta(event.point());
        node.geometry = direction.apply(session.initial, dx, dy, host.viewport());
        node.intended_size = direction.raw_size(session.initial, dx, dy).at_least_min();
        true
    }

    /// Ends the gesture from any exit path. Cancelled gestures keep the size
    /// reached so far. Safe to call repeatedly.
    pub fn finish<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<&mut OverlayNode>,
    ) -> Option<ResizeOutcome> {
        let session = self.session.take()?;

        release_capture(host, &session);
        host.set_document_cursor(None);
        host.set_document_user_select(true);
        host.dispatch_viewport_resize();

        let node = node?;
        node.transitions_enabled = true;
        node.user_select = true;
        if let Some(frame) = node.frame.as_mut() {
            frame.pointer_events = true;
        }
        let outcome = ResizeOutcome {
            geometry: node.geometry,
            intended: node.intended_size,
        };
        tracing::debug!(?outcome, "resize finished");
        Some(outcome)
    }

    /// Ends any resize in flight and hands back its outcome, exactly like
    /// [`finish`](Self::finish).
    pub fn dispose<H: HostPage + ?Sized>(
        &mut self,
        host: &mut H,
        node: Option<&mut OverlayNode>,
    ) -> Option<ResizeOutcome> {
        self.finish(host, node)
    }
}
