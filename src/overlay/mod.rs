pub mod bridge;
pub mod content;
pub mod controls;
pub mod document;
pub mod drag;
pub mod factory;
pub mod keyboard;
pub mod lifecycle;
pub mod resize;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

pub use document::{Document, OverlayNode, OVERLAY_ID};
pub use factory::{CreateOutcome, OverlayHandle};
pub use keyboard::{Key, KeyEvent, KeyOutcome};
pub use lifecycle::OverlayManager;
pub use resize::ResizeDirection;
pub use session::{GestureKind, PointerButton, PointerEvent, PointerTarget};

/// Timings and thresholds for the lifecycle manager and its controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub fullscreen_debounce: Duration,
    pub resize_throttle: Duration,
    /// Pointer travel, in pixels, before a header press becomes a drag.
    pub drag_threshold: i32,
    pub click_timeout: Duration,
    pub nudge_step: i32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fullscreen_debounce: crate::watchers::FULLSCREEN_DEBOUNCE,
            resize_throttle: crate::watchers::RESIZE_THROTTLE,
            drag_threshold: drag::DRAG_THRESHOLD,
            click_timeout: drag::CLICK_TIMEOUT,
            nudge_step: keyboard::NUDGE_STEP,
        }
    }
}
