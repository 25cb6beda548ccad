#![forbid(unsafe_code)]

//! Core: geometry, snapping, spring motion, and drag tracking for bottom sheets.
//!
//! # Role in bsheet
//! `bsheet-core` holds everything about a bottom sheet that does not depend on
//! a host: how requested heights become concrete heights, where a released
//! sheet should snap, how offsets move over time, and how a drag maps pointer
//! travel onto the sheet.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::resolve_height`] turns a [`content::ContentHeight`]
//!   plus container size and safe-area insets into points.
//! - **Snapping**: [`snap::SnapResolver`] picks a target or dismissal from the
//!   release offset and velocity.
//! - **Motion**: [`animation::Spring`] drives every animated offset change.
//! - **Drag**: [`drag::DragTracker`] handles rubber banding and the two-phase
//!   sample/release protocol.
//!
//! # How it fits in the system
//! `bsheet-widgets` builds the draggable sheet surface and the transition
//! controller on top of these pieces. Nothing here keeps time on its own;
//! the host's scheduler drives all motion through `tick`.

pub mod animation;
pub mod content;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod snap;

pub use content::{ContentHeight, ContentHeights, ContentMeasure, FixedContent};
pub use error::SheetError;
pub use geometry::{Insets, Layout, Rect, Size};
pub use snap::{SnapConfig, SnapOutcome, SnapResolver};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
