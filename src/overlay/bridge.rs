//! Applies settings changes to the overlay's own chrome and, when the
//! content frame is reachable, to the chat document inside it.

use crate::geometry::{clamp_position, clamp_size, Geometry, Viewport, COLLAPSED_HEIGHT};
use crate::host::{ChatDocument, ChromeElement, HostError, HostPage};
use crate::overlay::document::OverlayNode;
use crate::settings::{ChatSettings, SettingsPatch};

pub fn apply_patch<H: HostPage + ?Sized>(
    host: &mut H,
    node: &mut OverlayNode,
    settings: &ChatSettings,
    patch: &SettingsPatch,
) {
    let synced = sync_checkboxes(node, patch);
    apply_frame_chrome(host, settings);
    if let Some(show_history) = patch.show_history {
        apply_history_height(node, show_history, host.viewport());
    }
    tracing::debug!(keys = ?patch.keys(), synced, "applied settings to overlay");
}

/// Returns how many checkboxes were updated.
pub fn sync_checkboxes(node: &mut OverlayNode, patch: &SettingsPatch) -> usize {
    let Some(panel) = node.settings_panel.as_mut() else {
        return 0;
    };
    let mut synced = 0;
    for key in patch.keys() {
        let (Some(value), Some(checkbox)) = (patch.toggle_value(key), panel.checkbox_mut(key)) else {
            continue;
        };
        checkbox.checked = value;
        synced += 1;
    }
    synced
}

/// Restyles the chat document when the frame is same-origin. A cross-origin
/// frame is the normal case and is skipped without complaint.
pub fn apply_frame_chrome<H: HostPage + ?Sized>(host: &mut H, settings: &ChatSettings) -> bool {
    match host.content_document() {
        Ok(document) => {
            apply_chat_chrome(document, settings);
            true
        }
        Err(HostError::CrossOrigin) => {
            tracing::trace!("chat frame is cross-origin; chrome left as served");
            false
        }
        Err(err) => {
            tracing::debug!(%err, "chat frame document unavailable");
            false
        }
    }
}

pub fn apply_chat_chrome(document: &mut ChatDocument, settings: &ChatSettings) {
    set_hidden(&mut document.message_list, !settings.show_history);
    if let Some(input) = document.input_renderer.as_mut() {
        input.pinned_to_top = !settings.show_history;
    }
    set_hidden(&mut document.header, !settings.show_chat_header);
    set_hidden(&mut document.banner, !settings.show_chat_banner);
    set_hidden(&mut document.super_chat_buttons, settings.hide_super_chat_buttons);
    set_hidden(&mut document.ticker, !settings.show_chat_ticker);
}

fn set_hidden(element: &mut Option<ChromeElement>, hidden: bool) {
    if let Some(element) = element.as_mut() {
        element.hidden = hidden;
    }
}

/// Collapses to the input row when history is hidden, otherwise grows to
/// the expanded height for this viewport class.
pub fn apply_history_height(node: &mut OverlayNode, show_history: bool, viewport: Viewport) {
    if node.minimized {
        tracing::debug!("overlay minimized; history height applies on restore");
        node.intended_size.height = history_height(show_history, viewport);
        return;
    }
    let height = history_height(show_history, viewport);
    let size = clamp_size(node.geometry.width, height, viewport);
    let position = clamp_position(
        node.geometry.left,
        node.geometry.top,
        size.width,
        size.height,
        viewport,
    );
    node.geometry = Geometry::from_parts(position, size);
    node.intended_size.height = height;
}

fn history_height(show_history: bool, viewport: Viewport) -> i32 {
    if show_history {
        viewport.expanded_height()
    } else {
        COLLAPSED_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::RecordingHost;
    use crate::settings::SettingKey;

    fn node() -> OverlayNode {
        OverlayNode::build(Geometry::new(100, 100, 400, 500), &ChatSettings::default())
    }

    #[test]
    fn hiding_history_collapses_height_and_unchecks_box() {
        let mut host = RecordingHost::default();
        let mut overlay = node();
        let patch = SettingsPatch::toggle(SettingKey::ShowHistory, false);
        let mut settings = ChatSettings::default();
        settings.apply(&patch);

        apply_patch(&mut host, &mut overlay, &settings, &patch);

        assert_eq!(overlay.geometry.height, COLLAPSED_HEIGHT);
        assert_eq!(overlay.geometry.width, 400);
        assert_eq!(
            overlay
                .settings_panel
                .as_ref()
                .and_then(|panel| panel.is_checked(SettingKey::ShowHistory)),
            Some(false)
        );
    }

    #[test]
    fn showing_history_uses_expanded_height() {
        let viewport = Viewport::new(1920, 1000);
        let mut overlay = node();
        apply_history_height(&mut overlay, true, viewport);
        assert_eq!(overlay.geometry.height, 700);
        assert!(overlay.geometry.fits_in(viewport));
    }

    #[test]
    fn cross_origin_frame_is_skipped_quietly() {
        let mut host = RecordingHost::default();
        assert!(!apply_frame_chrome(&mut host, &ChatSettings::default()));
    }

    #[test]
    fn same_origin_frame_follows_settings() {
        let mut host = RecordingHost {
            frame: Some(ChatDocument::with_all_elements()),
            ..RecordingHost::default()
        };
        let settings = ChatSettings {
            show_history: false,
            show_chat_banner: false,
            hide_super_chat_buttons: true,
            ..ChatSettings::default()
        };

        assert!(apply_frame_chrome(&mut host, &settings));
        let document = host.frame.expect("frame");
        assert_eq!(document.message_list.map(|e| e.hidden), Some(true));
        assert_eq!(document.input_renderer.map(|e| e.pinned_to_top), Some(true));
        assert_eq!(document.banner.map(|e| e.hidden), Some(true));
        assert_eq!(document.super_chat_buttons.map(|e| e.hidden), Some(true));
        assert_eq!(document.header.map(|e| e.hidden), Some(false));
        assert_eq!(document.ticker.map(|e| e.hidden), Some(false));
    }

    #[test]
    fn missing_chat_elements_are_tolerated() {
        let mut document = ChatDocument::default();
        apply_chat_chrome(&mut document, &ChatSettings::default());
        assert_eq!(document, ChatDocument::default());
    }
}
