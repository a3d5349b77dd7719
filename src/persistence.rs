//! Persisted overlay geometry: position, intended size, and minimize state.
//!
//! Reads never fail towards the caller. Storage errors degrade to "no data";
//! unparseable values are cleared so the next session starts clean.

use crate::geometry::{Geometry, Position, Size};
use crate::store::{read_json, write_json, JsonRead, KeyValueStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const POSITION_KEY: &str = "youtube_chat_position";
pub const LEGACY_POSITION_KEY: &str = "ytChatPosition";
pub const SIZE_KEY: &str = "ytChatSize";
pub const MINIMIZED_KEY: &str = "isMinimized";
pub const PRE_MINIMIZE_SIZE_KEY: &str = "originalSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistedState {
    pub position: Option<Position>,
    pub size: Option<Size>,
    pub is_minimized: bool,
    pub pre_minimize_size: Option<Size>,
}

impl PersistedState {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.size.is_none()
            && !self.is_minimized
            && self.pre_minimize_size.is_none()
    }

    pub fn geometry(&self) -> Option<Geometry> {
        Some(Geometry::from_parts(self.position?, self.size?))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredPoint {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum PositionWire {
    Point(StoredPoint),
    Edges { left: i32, top: i32 },
}

impl From<PositionWire> for Position {
    fn from(wire: PositionWire) -> Self {
        match wire {
            PositionWire::Point(StoredPoint { x, y }) => Position { left: x, top: y },
            PositionWire::Edges { left, top } => Position { left, top },
        }
    }
}

pub fn load_geometry<S: KeyValueStore + ?Sized>(store: &mut S) -> PersistedState {
    let (is_minimized, pre_minimize_size) = load_minimized_state(store);
    PersistedState {
        position: load_position(store),
        size: load_size(store),
        is_minimized,
        pre_minimize_size,
    }
}

pub fn load_position<S: KeyValueStore + ?Sized>(store: &mut S) -> Option<Position> {
    let current = match store.get(POSITION_KEY) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(?err, "failed to read saved overlay position");
            return None;
        }
    };

    let raw = match current {
        Some(raw) => raw,
        None => migrate_legacy_position(store)?,
    };

    match serde_json::from_str::<PositionWire>(&raw) {
        Ok(wire) => {
            let position = Position::from(wire);
            tracing::debug!(?position, "loaded saved overlay position");
            Some(position)
        }
        Err(err) => {
            tracing::warn!(error = %err, "clearing corrupt saved overlay position");
            clear_keys(store, &[POSITION_KEY, LEGACY_POSITION_KEY]);
            None
        }
    }
}

/// Moves the legacy position record under the current key, once. Returns the
/// raw record so the caller parses it exactly like a current one.
fn migrate_legacy_position<S: KeyValueStore + ?Sized>(store: &mut S) -> Option<String> {
    let legacy = match store.get(LEGACY_POSITION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!("no saved overlay position");
            return None;
        }
        Err(err) => {
            tracing::warn!(?err, "failed to read legacy overlay position");
            return None;
        }
    };

    if let Err(err) = store.set(POSITION_KEY, legacy.clone()) {
        tracing::warn!(?err, "failed to migrate legacy overlay position");
        return Some(legacy);
    }
    if let Err(err) = store.remove(LEGACY_POSITION_KEY) {
        tracing::warn!(?err, "failed to remove legacy overlay position");
    }
    tracing::info!("migrated legacy overlay position key");
    Some(legacy)
}

pub fn load_size<S: KeyValueStore + ?Sized>(store: &mut S) -> Option<Size> {
    read_size(store, SIZE_KEY)
}

pub fn load_minimized_state<S: KeyValueStore + ?Sized>(store: &mut S) -> (bool, Option<Size>) {
    let is_minimized = match read_json::<bool, _>(&*store, MINIMIZED_KEY) {
        Ok(JsonRead::Value(value)) => value,
        Ok(JsonRead::Missing) => false,
        Ok(JsonRead::Corrupt(error)) => {
            tracing::warn!(%error, "clearing corrupt minimize flag");
            clear_keys(store, &[MINIMIZED_KEY]);
            false
        }
        Err(err) => {
            tracing::warn!(?err, "failed to read minimize flag");
            false
        }
    };
    (is_minimized, read_size(store, PRE_MINIMIZE_SIZE_KEY))
}

fn read_size<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> Option<Size> {
    match read_json::<Size, _>(&*store, key) {
        Ok(JsonRead::Value(size)) => Some(size),
        Ok(JsonRead::Missing) => None,
        Ok(JsonRead::Corrupt(error)) => {
            tracing::warn!(key, %error, "clearing corrupt saved size");
            clear_keys(store, &[key]);
            None
        }
        Err(err) => {
            tracing::warn!(key, ?err, "failed to read saved size");
            None
        }
    }
}

fn clear_keys<S: KeyValueStore + ?Sized>(store: &mut S, keys: &[&str]) {
    for key in keys {
        if let Err(err) = store.remove(key) {
            tracing::error!(key, ?err, "failed to remove corrupt storage entry");
        }
    }
}

pub fn save_position<S: KeyValueStore + ?Sized>(store: &mut S, position: Position) -> Result<()> {
    let point = StoredPoint {
        x: position.left,
        y: position.top,
    };
    write_json(store, POSITION_KEY, &point)?;
    tracing::debug!(?position, "saved overlay position");
    Ok(())
}

pub fn save_size<S: KeyValueStore + ?Sized>(store: &mut S, size: Size) -> Result<()> {
    write_json(store, SIZE_KEY, &size)?;
    tracing::debug!(?size, "saved overlay size");
    Ok(())
}

pub fn save_geometry<S: KeyValueStore + ?Sized>(store: &mut S, geometry: &Geometry) -> Result<()> {
    save_position(store, geometry.position())?;
    save_size(store, geometry.size())
}

/// Explicit save right before the overlay is detached. Reads the record back
/// and reports whether it landed.
pub fn save_final_geometry<S: KeyValueStore + ?Sized>(
    store: &mut S,
    geometry: &Geometry,
) -> Result<bool> {
    save_geometry(store, geometry)?;
    let verified = verify_saved(&*store, geometry);
    if verified {
        tracing::debug!(?geometry, "final overlay geometry saved");
    } else {
        tracing::warn!(?geometry, "final overlay geometry did not read back");
    }
    Ok(verified)
}

fn verify_saved<S: KeyValueStore + ?Sized>(store: &S, geometry: &Geometry) -> bool {
    let position = matches!(
        read_json::<StoredPoint, _>(store, POSITION_KEY),
        Ok(JsonRead::Value(StoredPoint { x, y })) if x == geometry.left && y == geometry.top
    );
    let size = matches!(
        read_json::<Size, _>(store, SIZE_KEY),
        Ok(JsonRead::Value(size)) if size == geometry.size()
    );
    position && size
}

pub fn save_minimized_state<S: KeyValueStore + ?Sized>(
    store: &mut S,
    is_minimized: bool,
    pre_minimize_size: Option<Size>,
) -> Result<()> {
    write_json(store, MINIMIZED_KEY, &is_minimized)?;
    match pre_minimize_size {
        Some(size) => write_json(store, PRE_MINIMIZE_SIZE_KEY, &size),
        None => store.remove(PRE_MINIMIZE_SIZE_KEY),
    }
}
