use crate::geometry::{default_geometry, reconcile, Geometry, Viewport};
use crate::overlay::controls;
use crate::overlay::document::{Document, OverlayNode, OVERLAY_ID};
use crate::persistence::PersistedState;
use crate::settings::ChatSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// An overlay with the same id was already mounted and has been shown
    /// again instead of building a second one.
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHandle {
    pub id: &'static str,
    pub outcome: CreateOutcome,
    pub geometry: Geometry,
}

/// Mounts the overlay, or reveals the one already mounted. Either way the
/// persisted geometry is applied last, with transitions off.
pub fn create_overlay(
    document: &mut Document,
    viewport: Viewport,
    persisted: &PersistedState,
    settings: &ChatSettings,
) -> OverlayHandle {
    let (node, created) =
        document.mount_once(OVERLAY_ID, || OverlayNode::build(default_geometry(viewport), settings));
    let outcome = if created {
        tracing::debug!(geometry = ?node.geometry, "overlay mounted");
        CreateOutcome::Created
    } else {
        tracing::debug!("overlay already mounted, revealing it");
        node.visible = true;
        CreateOutcome::Revealed
    };

    apply_persisted(node, persisted, viewport);
    OverlayHandle {
        id: OVERLAY_ID,
        outcome,
        geometry: node.geometry,
    }
}

/// Overrides the displayed geometry with the stored one, fitted to the
/// current viewport. Missing parts keep what the node already shows.
pub fn apply_persisted(node: &mut OverlayNode, persisted: &PersistedState, viewport: Viewport) {
    node.transitions_enabled = false;

    let intended = persisted
        .pre_minimize_size
        .filter(|_| persisted.is_minimized)
        .or(persisted.size)
        .unwrap_or(node.intended_size)
        .at_least_min();
    let position = persisted.position.unwrap_or(node.geometry.position());
    node.intended_size = intended;
    node.geometry = reconcile(Geometry::from_parts(position, intended), viewport);

    if persisted.is_minimized {
        controls::minimize(node, viewport);
    } else if node.minimized {
        controls::restore(node, intended, viewport);
    }

    node.transitions_enabled = true;
}
