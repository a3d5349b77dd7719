use crate::geometry::Viewport;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("pointer capture failed for pointer {pointer:?}: {reason}")]
    PointerCapture { pointer: PointerId, reason: String },

    /// The content frame is on another origin; its document is unreachable.
    #[error("content frame document is cross-origin")]
    CrossOrigin,

    #[error("content frame has no document yet")]
    FrameNotLoaded,

    #[error("liveness check failed: {0}")]
    Liveness(String),
}

/// Vendor-prefixed fullscreen element queries. Any one being set means the
/// page is fullscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullscreenSignals {
    pub standard: bool,
    pub webkit: bool,
    pub moz: bool,
    pub ms: bool,
}

impl FullscreenSignals {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        Self {
            standard: true,
            ..Self::default()
        }
    }

    pub fn is_fullscreen(self) -> bool {
        self.standard || self.webkit || self.moz || self.ms
    }
}

/// Display state of one piece of chat chrome inside the content frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeElement {
    pub hidden: bool,
    /// Pulled out of flow and pinned to the top edge of the frame.
    pub pinned_to_top: bool,
}

/// The parts of the live-chat document the overlay may restyle when the
/// frame happens to be same-origin. Absent elements are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatDocument {
    pub message_list: Option<ChromeElement>,
    pub input_renderer: Option<ChromeElement>,
    pub header: Option<ChromeElement>,
    pub banner: Option<ChromeElement>,
    pub super_chat_buttons: Option<ChromeElement>,
    pub ticker: Option<ChromeElement>,
}

impl ChatDocument {
    pub fn with_all_elements() -> Self {
        Self {
            message_list: Some(ChromeElement::default()),
            input_renderer: Some(ChromeElement::default()),
            header: Some(ChromeElement::default()),
            banner: Some(ChromeElement::default()),
            super_chat_buttons: Some(ChromeElement::default()),
            ticker: Some(ChromeElement::default()),
        }
    }
}

/// Everything the overlay needs from the hosting page.
pub trait HostPage {
    fn viewport(&self) -> Viewport;

    fn fullscreen_signals(&self) -> FullscreenSignals;

    fn is_fullscreen(&self) -> bool {
        self.fullscreen_signals().is_fullscreen()
    }

    fn location(&self) -> String;

    fn is_live_stream(&mut self, video_id: &str) -> Result<bool, HostError>;

    fn capture_pointer(&mut self, pointer: PointerId) -> Result<(), HostError>;

    fn release_pointer(&mut self, pointer: PointerId) -> Result<(), HostError>;

    /// Fires a synthetic viewport `resize` so layout-reactive listeners
    /// (including the content frame) re-evaluate.
    fn dispatch_viewport_resize(&mut self);

    fn set_document_cursor(&mut self, cursor: Option<&'static str>);

    fn set_document_user_select(&mut self, enabled: bool);

    /// Same-origin access to the content frame's document. Cross-origin
    /// frames return [`HostError::CrossOrigin`].
    fn content_document(&mut self) -> Result<&mut ChatDocument, HostError>;
}
