use crate::host::HostPage;
use crate::overlay::document::{OverlayNode, UNAVAILABLE_NOTICE};
use crate::video::{fallback_chat_url, live_chat_url, BLANK_SOURCE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatSource {
    Live(String),
    /// The video is not live; there is no chat to embed.
    Unavailable,
    /// Liveness could not be determined. Load anyway.
    Fallback(String),
}

impl ChatSource {
    pub fn url(&self) -> &str {
        match self {
            ChatSource::Live(url) | ChatSource::Fallback(url) => url,
            ChatSource::Unavailable => BLANK_SOURCE,
        }
    }
}

pub fn resolve_source<H: HostPage + ?Sized>(host: &mut H, video_id: &str) -> ChatSource {
    match host.is_live_stream(video_id) {
        Ok(true) => ChatSource::Live(live_chat_url(video_id)),
        Ok(false) => ChatSource::Unavailable,
        Err(err) => {
            tracing::warn!(video_id, %err, "liveness check failed, loading chat anyway");
            ChatSource::Fallback(fallback_chat_url(video_id, &host.location()))
        }
    }
}

/// Points the frame at `source`. Returns true when the frame was told to
/// load something new; an unchanged source is left alone so the spinner does
/// not flash.
pub fn apply_source(node: &mut OverlayNode, source: &ChatSource) -> bool {
    let url = source.url();
    let Some(frame) = node.frame.as_mut() else {
        tracing::error!("chat frame not found in overlay");
        return false;
    };
    let unchanged = frame.src.as_deref() == Some(url);

    match source {
        ChatSource::Unavailable => {
            node.notice = Some(UNAVAILABLE_NOTICE.to_string());
            node.spinner_visible = false;
            if unchanged {
                return false;
            }
            frame.src = Some(url.to_string());
        }
        ChatSource::Live(_) | ChatSource::Fallback(_) => {
            if unchanged {
                return false;
            }
            frame.src = Some(url.to_string());
            node.notice = None;
            node.spinner_visible = true;
        }
    }
    tracing::debug!(src = url, "chat frame source set");
    true
}
