use crate::geometry::{Geometry, Size};
use crate::overlay::resize::ResizeDirection;
use crate::settings::{ChatSettings, SettingKey};

pub const OVERLAY_ID: &str = "yt-fullscreen-chat-overlay";
pub const OVERLAY_TITLE: &str = "YouTube Live Chat";
pub const UNAVAILABLE_NOTICE: &str = "Chat is not available for non-live videos";
pub const MINIMIZE_LABEL: &str = "−";
pub const RESTORE_LABEL: &str = "+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlButton {
    Settings,
    Minimize,
    Close,
}

impl ControlButton {
    pub const ALL: [ControlButton; 3] = [
        ControlButton::Settings,
        ControlButton::Minimize,
        ControlButton::Close,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ControlButton::Settings => "settings-btn",
            ControlButton::Minimize => "minimize-chat-btn",
            ControlButton::Close => "close-chat-btn",
        }
    }

    fn initial_label(self) -> &'static str {
        match self {
            ControlButton::Settings => "⚙",
            ControlButton::Minimize => MINIMIZE_LABEL,
            ControlButton::Close => "×",
        }
    }

    fn initial_aria_label(self) -> &'static str {
        match self {
            ControlButton::Settings => "Settings",
            ControlButton::Minimize => "Minimize chat",
            ControlButton::Close => "Close chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub control: ControlButton,
    pub label: String,
    pub aria_label: String,
}

impl Button {
    fn new(control: ControlButton) -> Self {
        Self {
            control,
            label: control.initial_label().to_string(),
            aria_label: control.initial_aria_label().to_string(),
        }
    }
}

/// Drag handle. Carries the title and the control buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub focusable: bool,
    pub buttons: Vec<Button>,
}

impl Header {
    pub fn button(&self, control: ControlButton) -> Option<&Button> {
        self.buttons.iter().find(|button| button.control == control)
    }

    pub fn button_mut(&mut self, control: ControlButton) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|button| button.control == control)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFrame {
    /// `None` until a source has been chosen.
    pub src: Option<String>,
    /// Cleared while a resize is in progress so the frame cannot swallow
    /// pointer events.
    pub pointer_events: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    pub key: SettingKey,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    pub open: bool,
    pub checkboxes: Vec<Checkbox>,
}

impl SettingsPanel {
    pub fn checkbox(&self, key: SettingKey) -> Option<&Checkbox> {
        self.checkboxes.iter().find(|checkbox| checkbox.key == key)
    }

    pub fn checkbox_mut(&mut self, key: SettingKey) -> Option<&mut Checkbox> {
        self.checkboxes.iter_mut().find(|checkbox| checkbox.key == key)
    }

    pub fn is_checked(&self, key: SettingKey) -> Option<bool> {
        self.checkbox(key).map(|checkbox| checkbox.checked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayNode {
    pub id: String,
    /// What is on screen.
    pub geometry: Geometry,
    /// What the user last asked for; may exceed the current viewport.
    pub intended_size: Size,
    pub visible: bool,
    pub transitions_enabled: bool,
    pub user_select: bool,
    pub minimized: bool,
    pub header: Option<Header>,
    pub frame: Option<ContentFrame>,
    pub spinner_visible: bool,
    pub notice: Option<String>,
    pub resize_handles: Vec<ResizeDirection>,
    pub settings_panel: Option<SettingsPanel>,
}

impl OverlayNode {
    /// Full markup with every control present. Checkboxes start from
    /// `settings`.
    pub fn build(geometry: Geometry, settings: &ChatSettings) -> Self {
        let checkboxes = SettingKey::OVERLAY_TOGGLES
            .into_iter()
            .map(|key| Checkbox {
                key,
                checked: settings.toggle(key).unwrap_or_default(),
            })
            .collect();

        Self {
            id: OVERLAY_ID.to_string(),
            geometry,
            intended_size: geometry.size(),
            visible: true,
            transitions_enabled: false,
            user_select: true,
            minimized: false,
            header: Some(Header {
                title: OVERLAY_TITLE.to_string(),
                focusable: false,
                buttons: ControlButton::ALL.into_iter().map(Button::new).collect(),
            }),
            frame: Some(ContentFrame {
                src: None,
                pointer_events: true,
            }),
            spinner_visible: false,
            notice: None,
            resize_handles: ResizeDirection::ALL.to_vec(),
            settings_panel: Some(SettingsPanel {
                open: false,
                checkboxes,
            }),
        }
    }

    pub fn frame_src(&self) -> Option<&str> {
        self.frame.as_ref().and_then(|frame| frame.src.as_deref())
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings_panel.as_ref().is_some_and(|panel| panel.open)
    }
}

/// The part of the host page the overlay writes to. Nodes are appended in
/// order and looked up by id, so a careless caller could mount two nodes
/// with the same id; creation goes through an existence check for that.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<OverlayNode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&OverlayNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut OverlayNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn count(&self, id: &str) -> usize {
        self.nodes.iter().filter(|node| node.id == id).count()
    }

    /// Returns the node mounted under `id`, building and appending it first
    /// when there is none. The flag tells whether it was just built.
    pub fn mount_once(
        &mut self,
        id: &str,
        build: impl FnOnce() -> OverlayNode,
    ) -> (&mut OverlayNode, bool) {
        let (index, created) = match self.nodes.iter().position(|node| node.id == id) {
            Some(index) => (index, false),
            None => {
                self.nodes.push(build());
                (self.nodes.len() - 1, true)
            }
        };
        (&mut self.nodes[index], created)
    }

    pub fn remove(&mut self, id: &str) -> Option<OverlayNode> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        Some(self.nodes.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
