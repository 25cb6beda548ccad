#![forbid(unsafe_code)]

//! Geometric primitives and sheet height resolution.
//!
//! Coordinates are logical points with the origin at the container's top-left
//! corner and `y` growing downward. A sheet's position is the `y` of its top
//! edge (its *offset*). A target of resolved height `h` inside a container of
//! height `H` rests at offset `H - h`; offset `H` is fully off-screen.
//!
//! [`resolve_height`] is the height calculator. It runs on every layout pass
//! and every animation frame that changes the container, so it is pure and
//! deterministic for identical inputs.
//!
//! # Invariants
//!
//! 1. `resolve_height(..)` is always in `[0, container.height]` for a finite,
//!    non-negative container height.
//! 2. With safe-area insets enabled the result never exceeds
//!    `container.height - insets.top`.
//!
//! # Failure Modes
//!
//! - NaN, infinite, or negative inputs clamp to zero and emit a `warn` event.

use crate::content::{ContentHeight, ContentHeights, ContentMeasure};

#[cfg(feature = "tracing")]
use crate::logging::warn;
#[cfg(not(feature = "tracing"))]
use crate::warn;

/// Width and height in logical points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self::new(0.0, 0.0);
}

/// Safe-area insets of the container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// Create insets with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create insets with top and bottom values only.
    pub const fn vertical(top: f64, bottom: f64) -> Self {
        Self::new(top, 0.0, bottom, 0.0)
    }

    /// No insets.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Container geometry reported by the host.
///
/// Replaced wholesale whenever the container changes size (rotation, window
/// resize, keyboard). Never cached across changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    /// Container bounds.
    pub size: Size,
    /// Safe-area insets inside those bounds.
    pub safe_area: Insets,
}

impl Layout {
    /// Create a layout.
    pub const fn new(size: Size, safe_area: Insets) -> Self {
        Self { size, safe_area }
    }

    /// A layout without safe-area insets.
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(Size::new(width, height), Insets::ZERO)
    }

    /// Container height, clamped to a finite non-negative value.
    #[inline]
    pub fn container_height(&self) -> f64 {
        sanitize(self.size.height)
    }

    /// Offset at which a sheet is fully off-screen.
    #[inline]
    pub fn off_screen_offset(&self) -> f64 {
        self.container_height()
    }

    /// Resting offset for a sheet of resolved `height`.
    #[inline]
    pub fn resting_offset(&self, height: f64) -> f64 {
        self.container_height() - height
    }
}

/// Map NaN, infinities, and negatives to zero.
#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Resolve a requested height into a concrete height in points.
///
/// - `Fixed(h)` yields `min(h, container.height)`.
/// - `Automatic` yields the content's fitting height at the container width,
///   plus the bottom safe-area inset when `use_safe_area` is set.
/// - With `use_safe_area`, the result is further capped so the sheet never
///   reaches into the top safe-area inset.
///
/// The result is always in `[0, container.height]`.
pub fn resolve_height(
    requested: ContentHeight,
    layout: &Layout,
    use_safe_area: bool,
    content: &dyn ContentMeasure,
) -> f64 {
    let container_height = layout.container_height();

    let raw = match requested {
        ContentHeight::Fixed(height) => height,
        ContentHeight::Automatic => {
            let fitting = content.fitting_height(sanitize(layout.size.width));
            if use_safe_area {
                fitting + sanitize(layout.safe_area.bottom)
            } else {
                fitting
            }
        }
    };

    let max_height = if use_safe_area {
        (container_height - sanitize(layout.safe_area.top)).max(0.0)
    } else {
        container_height
    };

    if raw.is_nan() || raw < 0.0 {
        warn!(
            message = "sheet.geometry.degenerate",
            requested = ?requested,
            container_height
        );
        return 0.0;
    }

    raw.min(max_height)
}

/// Resolve every requested height to its resting offset.
///
/// Index `i` of the result is the resting offset of target `i`.
pub fn resting_offsets(
    heights: &ContentHeights,
    layout: &Layout,
    use_safe_area: bool,
    content: &dyn ContentMeasure,
) -> Vec<f64> {
    heights
        .iter()
        .map(|height| layout.resting_offset(resolve_height(height, layout, use_safe_area, content)))
        .collect()
}
