use crate::geometry::Geometry;
use crate::host::{HostPage, PointerId};
use crate::overlay::document::ControlButton;
use crate::overlay::resize::ResizeDirection;
use crate::settings::SettingKey;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Hit-test result for a pointer event, resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Header,
    Control(ControlButton),
    ResizeHandle(ResizeDirection),
    Frame,
    SettingsPanel,
    /// The dimmed area around the settings panel content.
    SettingsBackdrop,
    SettingsClose,
    Checkbox(SettingKey),
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub button: PointerButton,
    pub x: i32,
    pub y: i32,
    pub target: PointerTarget,
    pub now: Instant,
}

impl PointerEvent {
    pub fn point(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeDirection),
}

/// How moves reach the active gesture. When capture fails the gesture keeps
/// working off document-level moves, which stop at the window edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Pointer,
    DocumentFallback,
}

/// One pointer-down-to-release interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionSession {
    pub pointer: PointerId,
    pub start: (i32, i32),
    pub initial: Geometry,
    pub kind: GestureKind,
    pub capture: CaptureMode,
}

impl InteractionSession {
    pub fn delta(&self, point: (i32, i32)) -> (i32, i32) {
        (point.0 - self.start.0, point.1 - self.start.1)
    }
}

pub fn acquire_capture<H: HostPage + ?Sized>(host: &mut H, pointer: PointerId) -> CaptureMode {
    match host.capture_pointer(pointer) {
        Ok(()) => CaptureMode::Pointer,
        Err(err) => {
            tracing::warn!(?pointer, %err, "pointer capture unavailable, tracking document moves");
            CaptureMode::DocumentFallback
        }
    }
}

pub fn release_capture<H: HostPage + ?Sized>(host: &mut H, session: &InteractionSession) {
    if session.capture != CaptureMode::Pointer {
        return;
    }
    if let Err(err) = host.release_pointer(session.pointer) {
        tracing::warn!(pointer = ?session.pointer, %err, "pointer release failed");
    }
}
