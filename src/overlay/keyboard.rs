use crate::geometry::{clamp_position, Position, Viewport};
use crate::overlay::document::OverlayNode;
use anyhow::{Context, Result};

pub const NUDGE_STEP: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Other(String),
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }

    fn offset(&self, step: i32) -> Option<(i32, i32)> {
        match self {
            Key::ArrowUp => Some((0, -step)),
            Key::ArrowDown => Some((0, step)),
            Key::ArrowLeft => Some((-step, 0)),
            Key::ArrowRight => Some((step, 0)),
            Key::Escape | Key::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub header_focused: bool,
}

/// Anything but `Ignored` prevents the default action. Ignored keys keep
/// their normal browser behaviour, so Tab and friends still move focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Moved(Position),
    /// Consumed without moving, e.g. Escape ending a gesture.
    Handled,
    Ignored,
}

impl KeyOutcome {
    pub fn prevents_default(self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardNudge {
    step: i32,
}

impl KeyboardNudge {
    /// Makes the header focusable. Fails when the header is missing.
    pub fn attach(node: &mut OverlayNode, step: i32) -> Result<Self> {
        let header = node
            .header
            .as_mut()
            .context("overlay header missing; keyboard movement unavailable")?;
        header.focusable = true;
        Ok(Self { step })
    }

    pub fn handle(&self, node: &mut OverlayNode, event: &KeyEvent, viewport: Viewport) -> KeyOutcome {
        if !event.header_focused {
            return KeyOutcome::Ignored;
        }
        let Some((dx, dy)) = event.key.offset(self.step) else {
            return KeyOutcome::Ignored;
        };

        let geometry = node.geometry;
        let position = clamp_position(
            geometry.left + dx,
            geometry.top + dy,
            geometry.width,
            geometry.height,
            viewport,
        );
        node.geometry = geometry.with_position(position);
        KeyOutcome::Moved(position)
    }

    pub fn dispose(&self, node: Option<&mut OverlayNode>) {
        if let Some(header) = node.and_then(|node| node.header.as_mut()) {
            header.focusable = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::settings::ChatSettings;

    fn focused(key: Key) -> KeyEvent {
        KeyEvent {
            key,
            header_focused: true,
        }
    }

    #[test]
    fn arrows_step_and_clamp() {
        let viewport = Viewport::new(1024, 768);
        let mut node = OverlayNode::build(Geometry::new(5, 100, 400, 300), &ChatSettings::default());
        let nudge = KeyboardNudge::attach(&mut node, NUDGE_STEP).expect("attach");
        assert!(node.header.as_ref().is_some_and(|h| h.focusable));

        assert_eq!(
            nudge.handle(&mut node, &focused(Key::ArrowDown), viewport),
            KeyOutcome::Moved(Position { left: 5, top: 110 })
        );
        assert_eq!(
            nudge.handle(&mut node, &focused(Key::ArrowLeft), viewport),
            KeyOutcome::Moved(Position { left: 0, top: 110 })
        );
        assert_eq!(
            nudge.handle(&mut node, &focused(Key::from_name("ArrowRight")), viewport),
            KeyOutcome::Moved(Position { left: 10, top: 110 })
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        let viewport = Viewport::new(1024, 768);
        let mut node = OverlayNode::build(Geometry::new(50, 50, 400, 300), &ChatSettings::default());
        let nudge = KeyboardNudge::attach(&mut node, NUDGE_STEP).expect("attach");

        let tab = nudge.handle(&mut node, &focused(Key::from_name("Tab")), viewport);
        assert_eq!(tab, KeyOutcome::Ignored);
        assert!(!tab.prevents_default());

        let unfocused = KeyEvent {
            key: Key::ArrowUp,
            header_focused: false,
        };
        assert_eq!(nudge.handle(&mut node, &unfocused, viewport), KeyOutcome::Ignored);
        assert_eq!(node.geometry.position(), Position { left: 50, top: 50 });
    }
}
