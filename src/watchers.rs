use std::time::{Duration, Instant};

pub const FULLSCREEN_DEBOUNCE: Duration = Duration::from_millis(100);
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenTransition {
    Entered,
    Exited,
}

/// Collapses bursts of fullscreen-change events into one edge. Every signal
/// restarts the quiet window; the state is sampled only once it elapses.
#[derive(Debug, Clone)]
pub struct FullscreenWatcher {
    debounce: Duration,
    deadline: Option<Instant>,
    is_fullscreen: bool,
}

impl FullscreenWatcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            is_fullscreen: false,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records the state seen at startup without emitting an edge.
    pub fn prime(&mut self, is_fullscreen: bool) {
        self.is_fullscreen = is_fullscreen;
        self.deadline = None;
    }

    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns an edge once the quiet window has passed and the sampled state
    /// differs from the last known one.
    pub fn poll(&mut self, now: Instant, sampled: bool) -> Option<FullscreenTransition> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;

        if sampled == self.is_fullscreen {
            tracing::debug!(is_fullscreen = sampled, "fullscreen state unchanged");
            return None;
        }
        self.is_fullscreen = sampled;
        tracing::debug!(is_fullscreen = sampled, "fullscreen state changed");
        Some(if sampled {
            FullscreenTransition::Entered
        } else {
            FullscreenTransition::Exited
        })
    }
}

impl Default for FullscreenWatcher {
    fn default() -> Self {
        Self::new(FULLSCREEN_DEBOUNCE)
    }
}

/// Single-page-app navigation has no native event. Implementations are fed
/// whatever signal they observe and call `on_navigate` only when the
/// location really changed.
pub trait NavigationWatcher {
    fn observe(&mut self, location: &str, on_navigate: &mut dyn FnMut(&str));

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}

/// Driven by page-mutation notifications; compares the current location to
/// the last one it saw.
#[derive(Debug, Clone, Default)]
pub struct MutationUrlWatcher {
    last_location: Option<String>,
    disconnected: bool,
}

impl MutationUrlWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(location: impl Into<String>) -> Self {
        Self {
            last_location: Some(location.into()),
            disconnected: false,
        }
    }
}

impl NavigationWatcher for MutationUrlWatcher {
    fn observe(&mut self, location: &str, on_navigate: &mut dyn FnMut(&str)) {
        if self.disconnected {
            return;
        }
        if self.last_location.as_deref() == Some(location) {
            return;
        }
        self.last_location = Some(location.to_string());
        on_navigate(location);
    }

    fn disconnect(&mut self) {
        self.disconnected = true;
    }

    fn is_connected(&self) -> bool {
        !self.disconnected
    }
}

/// Leading-edge throttle: lets one call through, then drops calls until the
/// interval has passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_run = Some(now);
                true
            }
        }
    }
}
