use crate::geometry::{
    clamp_position, clamp_size, Geometry, Size, Viewport, EDGE_MARGIN, HEADER_HEIGHT,
};
use crate::overlay::document::{ControlButton, OverlayNode, MINIMIZE_LABEL, RESTORE_LABEL};
use crate::overlay::session::PointerTarget;
use crate::settings::SettingKey;

pub const MINIMIZED_WIDTH: i32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    OpenSettings,
    CloseSettings,
    ToggleMinimize,
    Close,
    SetToggle(SettingKey, bool),
    None,
}

/// Which header buttons and panel parts were found at attach time. A missing
/// one disables only its own feature.
#[derive(Debug, Clone, Default)]
pub struct ControlBindings {
    buttons: Vec<ControlButton>,
    panel: bool,
}

impl ControlBindings {
    pub fn attach(node: &OverlayNode) -> Self {
        let mut buttons = Vec::new();
        for control in ControlButton::ALL {
            let found = node
                .header
                .as_ref()
                .and_then(|header| header.button(control))
                .is_some();
            if found {
                buttons.push(control);
            } else {
                tracing::error!(button = control.id(), "button not found in overlay");
            }
        }
        let panel = node.settings_panel.is_some();
        if !panel {
            tracing::error!("settings panel not found in overlay");
        }
        Self { buttons, panel }
    }

    pub fn is_bound(&self, control: ControlButton) -> bool {
        self.buttons.contains(&control)
    }

    pub fn on_click(&self, node: &mut OverlayNode, target: PointerTarget) -> ControlAction {
        match target {
            PointerTarget::Control(control) if self.is_bound(control) => match control {
                ControlButton::Settings => {
                    if set_panel_open(node, true) {
                        ControlAction::OpenSettings
                    } else {
                        ControlAction::None
                    }
                }
                ControlButton::Minimize => ControlAction::ToggleMinimize,
                ControlButton::Close => ControlAction::Close,
            },
            PointerTarget::SettingsClose | PointerTarget::SettingsBackdrop if self.panel => {
                if set_panel_open(node, false) {
                    ControlAction::CloseSettings
                } else {
                    ControlAction::None
                }
            }
            PointerTarget::Checkbox(key) if self.panel => {
                let Some(checkbox) = node
                    .settings_panel
                    .as_mut()
                    .and_then(|panel| panel.checkbox_mut(key))
                else {
                    tracing::error!(key = key.storage_key(), "checkbox not found in overlay");
                    return ControlAction::None;
                };
                checkbox.checked = !checkbox.checked;
                ControlAction::SetToggle(key, checkbox.checked)
            }
            _ => ControlAction::None,
        }
    }
}

/// Returns whether the panel state changed.
pub fn set_panel_open(node: &mut OverlayNode, open: bool) -> bool {
    match node.settings_panel.as_mut() {
        Some(panel) if panel.open != open => {
            panel.open = open;
            true
        }
        _ => false,
    }
}

/// Docks the header strip against the right edge at half height. The
/// intended size is left untouched and serves as the size to restore.
pub fn minimize(node: &mut OverlayNode, viewport: Viewport) -> Size {
    let position = clamp_position(
        viewport.width - MINIMIZED_WIDTH,
        viewport.height / 2,
        MINIMIZED_WIDTH,
        HEADER_HEIGHT,
        viewport,
    );
    node.geometry = Geometry::from_parts(position, Size::new(MINIMIZED_WIDTH, HEADER_HEIGHT));
    node.minimized = true;
    set_minimize_label(node, true);
    node.intended_size
}

/// Brings back `size`, docked 10px from the right edge at the current top.
pub fn restore(node: &mut OverlayNode, size: Size, viewport: Viewport) {
    let size = size.at_least_min();
    let shown = clamp_size(size.width, size.height, viewport);
    let position = clamp_position(
        viewport.width - shown.width - EDGE_MARGIN,
        node.geometry.top,
        shown.width,
        shown.height,
        viewport,
    );
    node.geometry = Geometry::from_parts(position, shown);
    node.intended_size = size;
    node.minimized = false;
    set_minimize_label(node, false);
}

fn set_minimize_label(node: &mut OverlayNode, minimized: bool) {
    let Some(button) = node
        .header
        .as_mut()
        .and_then(|header| header.button_mut(ControlButton::Minimize))
    else {
        return;
    };
    if minimized {
        button.label = RESTORE_LABEL.to_string();
        button.aria_label = "Restore chat".to_string();
    } else {
        button.label = MINIMIZE_LABEL.to_string();
        button.aria_label = "Minimize chat".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ChatSettings;

    fn node() -> OverlayNode {
        OverlayNode::build(Geometry::new(100, 100, 420, 380), &ChatSettings::default())
    }

    fn minimize_label(node: &OverlayNode) -> &str {
        node.header
            .as_ref()
            .and_then(|header| header.button(ControlButton::Minimize))
            .map(|button| button.label.as_str())
            .expect("minimize button")
    }

    #[test]
    fn minimize_and_restore_round_trip_exact_size() {
        let viewport = Viewport::new(1024, 768);
        let mut overlay = node();

        let pre = minimize(&mut overlay, viewport);
        assert_eq!(pre, Size::new(420, 380));
        assert_eq!(overlay.geometry, Geometry::new(724, 384, 300, 40));
        assert_eq!(minimize_label(&overlay), RESTORE_LABEL);

        restore(&mut overlay, pre, viewport);
        assert_eq!(overlay.geometry.size(), Size::new(420, 380));
        assert_eq!(overlay.geometry.left, 1024 - 420 - EDGE_MARGIN);
        assert!(overlay.geometry.fits_in(viewport));
        assert_eq!(minimize_label(&overlay), MINIMIZE_LABEL);
        assert!(!overlay.minimized);
    }

    #[test]
    fn header_clicks_map_to_actions() {
        let mut overlay = node();
        let bindings = ControlBindings::attach(&overlay);

        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Control(ControlButton::Settings)),
            ControlAction::OpenSettings
        );
        assert!(overlay.is_settings_open());
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::SettingsPanel),
            ControlAction::None
        );
        assert!(overlay.is_settings_open());
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::SettingsBackdrop),
            ControlAction::CloseSettings
        );
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Control(ControlButton::Close)),
            ControlAction::Close
        );
    }

    #[test]
    fn checkbox_click_flips_state() {
        let mut overlay = node();
        let bindings = ControlBindings::attach(&overlay);

        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Checkbox(SettingKey::ShowChatBanner)),
            ControlAction::SetToggle(SettingKey::ShowChatBanner, false)
        );
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Checkbox(SettingKey::AutoShowFullscreen)),
            ControlAction::None
        );
    }

    #[test]
    fn missing_button_disables_only_that_button() {
        let mut overlay = node();
        if let Some(header) = overlay.header.as_mut() {
            header.buttons.retain(|button| button.control != ControlButton::Close);
        }
        let bindings = ControlBindings::attach(&overlay);

        assert!(!bindings.is_bound(ControlButton::Close));
        assert!(bindings.is_bound(ControlButton::Minimize));
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Control(ControlButton::Close)),
            ControlAction::None
        );
        assert_eq!(
            bindings.on_click(&mut overlay, PointerTarget::Control(ControlButton::Minimize)),
            ControlAction::ToggleMinimize
        );
    }
}
