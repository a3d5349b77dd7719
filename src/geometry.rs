use serde::{Deserialize, Serialize};

pub const MIN_WIDTH: i32 = 200;
pub const MIN_HEIGHT: i32 = 150;
pub const NARROW_VIEWPORT_WIDTH: i32 = 800;
pub const HEADER_HEIGHT: i32 = 40;
pub const COLLAPSED_HEIGHT: i32 = 285;
pub const EDGE_MARGIN: i32 = 10;

const MAX_VIEWPORT_PERCENT: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_narrow(self) -> bool {
        self.width < NARROW_VIEWPORT_WIDTH
    }

    /// Largest size the overlay may take in this viewport. Never below the
    /// fixed minimum, even when the viewport itself is smaller.
    pub fn max_size(self) -> Size {
        Size {
            width: max_dimension(self.width, MIN_WIDTH),
            height: max_dimension(self.height, MIN_HEIGHT),
        }
    }

    /// Height used when chat history is visible.
    pub fn expanded_height(self) -> i32 {
        let percent = if self.is_narrow() { 50 } else { 70 };
        percent_of(self.height, percent)
    }
}

fn percent_of(extent: i32, percent: i64) -> i32 {
    (i64::from(extent.max(0)) * percent / 100) as i32
}

fn max_dimension(extent: i32, min: i32) -> i32 {
    percent_of(extent, MAX_VIEWPORT_PERCENT).max(min)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub left: i32,
    pub top: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Raises each axis to the fixed minimum without applying any
    /// viewport-dependent maximum.
    pub fn at_least_min(self) -> Self {
        Self {
            width: self.width.max(MIN_WIDTH),
            height: self.height.max(MIN_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_parts(position: Position, size: Size) -> Self {
        Self::new(position.left, position.top, size.width, size.height)
    }

    pub fn position(self) -> Position {
        Position {
            left: self.left,
            top: self.top,
        }
    }

    pub fn size(self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn right(self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(self) -> i32 {
        self.top + self.height
    }

    pub fn with_position(self, position: Position) -> Self {
        Self::from_parts(position, self.size())
    }

    pub fn with_size(self, size: Size) -> Self {
        Self::from_parts(self.position(), size)
    }

    pub fn fits_in(self, viewport: Viewport) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right() <= viewport.width
            && self.bottom() <= viewport.height
    }
}

/// Keeps a `width`×`height` rectangle inside the viewport. An axis on which
/// the rectangle is larger than the viewport pins to `0`.
pub fn clamp_position(left: i32, top: i32, width: i32, height: i32, viewport: Viewport) -> Position {
    let max_left = (viewport.width - width).max(0);
    let max_top = (viewport.height - height).max(0);
    Position {
        left: left.clamp(0, max_left),
        top: top.clamp(0, max_top),
    }
}

/// Clamps to `[MIN, viewport max]` per axis. Callers must pass the live
/// viewport; fullscreen toggles change it.
pub fn clamp_size(width: i32, height: i32, viewport: Viewport) -> Size {
    let max = viewport.max_size();
    Size {
        width: width.clamp(MIN_WIDTH, max.width),
        height: height.clamp(MIN_HEIGHT, max.height),
    }
}

/// Fits a stored (possibly stale) geometry into the current viewport. The
/// size is clamped first and the position follows the clamped size. An axis
/// pins to `0` only when the stored extent overflows the viewport and the
/// clamped extent no longer fits where it sits.
pub fn reconcile(geometry: Geometry, viewport: Viewport) -> Geometry {
    let size = clamp_size(geometry.width, geometry.height, viewport);
    let fitted = clamp_position(geometry.left, geometry.top, size.width, size.height, viewport);
    let left = if geometry.width > viewport.width && geometry.left + size.width > viewport.width {
        0
    } else {
        fitted.left
    };
    let top = if geometry.height > viewport.height && geometry.top + size.height > viewport.height {
        0
    } else {
        fitted.top
    };
    Geometry::from_parts(Position { left, top }, size)
}

pub fn default_geometry(viewport: Viewport) -> Geometry {
    let (width, height) = if viewport.is_narrow() {
        (250, 150)
    } else {
        (400, 200)
    };
    let left = viewport.width - width - EDGE_MARGIN;
    let top = percent_of(viewport.height, 10);
    let position = clamp_position(left, top, width, height, viewport);
    Geometry::from_parts(position, Size::new(width, height))
}
