//! Live-chat overlay for a fullscreen video player.
//!
//! The browser is reached only through [`host::HostPage`] and
//! [`store::KeyValueStore`]; everything else is plain state driven by events
//! fed into [`overlay::OverlayManager`].

pub mod editor;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod messages;
pub mod overlay;
pub mod persistence;
pub mod settings;
pub mod store;
pub mod video;
pub mod watchers;

pub use geometry::{Geometry, Position, Size, Viewport};
pub use host::{HostError, HostPage, PointerId};
pub use overlay::{OverlayConfig, OverlayManager};
pub use settings::{ChatSettings, SettingKey, SettingsPatch};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
