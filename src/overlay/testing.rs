use crate::geometry::Viewport;
use crate::host::{ChatDocument, FullscreenSignals, HostError, HostPage, PointerId};

/// In-memory page used by the controller unit tests.
pub(crate) struct RecordingHost {
    pub viewport: Viewport,
    pub signals: FullscreenSignals,
    pub location: String,
    pub live: Result<bool, HostError>,
    pub captured: Vec<PointerId>,
    pub refuse_capture: bool,
    pub cursor: Option<&'static str>,
    pub user_select: bool,
    pub resize_dispatches: usize,
    /// `None` models a cross-origin frame.
    pub frame: Option<ChatDocument>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(1024, 768),
            signals: FullscreenSignals::none(),
            location: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            live: Ok(true),
            captured: Vec::new(),
            refuse_capture: false,
            cursor: None,
            user_select: true,
            resize_dispatches: 0,
            frame: None,
        }
    }
}

impl HostPage for RecordingHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn fullscreen_signals(&self) -> FullscreenSignals {
        self.signals
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn is_live_stream(&mut self, _video_id: &str) -> Result<bool, HostError> {
        self.live.clone()
    }

    fn capture_pointer(&mut self, pointer: PointerId) -> Result<(), HostError> {
        if self.refuse_capture {
            return Err(HostError::PointerCapture {
                pointer,
                reason: "pointer is not active".to_string(),
            });
        }
        self.captured.push(pointer);
        Ok(())
    }

    fn release_pointer(&mut self, pointer: PointerId) -> Result<(), HostError> {
        self.captured.retain(|captured| *captured != pointer);
        Ok(())
    }

    fn dispatch_viewport_resize(&mut self) {
        self.resize_dispatches += 1;
    }

    fn set_document_cursor(&mut self, cursor: Option<&'static str>) {
        self.cursor = cursor;
    }

    fn set_document_user_select(&mut self, enabled: bool) {
        self.user_select = enabled;
    }

    fn content_document(&mut self) -> Result<&mut ChatDocument, HostError> {
        self.frame.as_mut().ok_or(HostError::CrossOrigin)
    }
}
