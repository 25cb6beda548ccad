#![forbid(unsafe_code)]

//! Bottom sheet surface and modal transition controller.
//!
//! # Role in bsheet
//! `bsheet-widgets` turns the primitives of `bsheet-core` into the two
//! stateful pieces a host talks to:
//!
//! - [`SheetSurface`]: the draggable panel. Owns offset, targets, the single
//!   running animation and the drag protocol.
//! - [`TransitionController`]: the modal presentation state machine. Creates
//!   a surface per presentation, runs present and dismiss transitions, and
//!   reports their completion to the host exactly once.
//!
//! [`SheetTransitioning`] keeps a presentation configuration around and
//! builds controllers from it; [`HandleView`] forwards accessibility
//! activation of the drag handle.
//!
//! # Driving
//! Nothing here runs on its own. The host calls `tick` from its frame
//! scheduler and forwards pointer samples, taps and layout changes.
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use bsheet_core::{ContentHeights, FixedContent, Layout};
//! use bsheet_widgets::{SheetSurface, SurfaceConfig};
//!
//! let heights = ContentHeights::fixed([300.0, 600.0]).unwrap();
//! let mut sheet = SheetSurface::new(
//!     heights,
//!     Rc::new(FixedContent(0.0)),
//!     Layout::from_size(400.0, 800.0),
//!     SurfaceConfig::default(),
//! );
//! sheet.present(0, true, |finished| assert!(finished)).unwrap();
//! while sheet.is_animating() {
//!     sheet.tick(Duration::from_millis(16));
//! }
//! assert_eq!(sheet.offset(), 500.0);
//! ```

pub mod controller;
pub mod handle;
pub mod surface;
pub mod transitioning;

pub use controller::{
    AnimatedTransitioning, InteractiveTransitioning, PresentationRequest, TransitionController,
    TransitionDirection, TransitionHost, TransitionState,
};
pub use handle::{HandleActivation, HandleView};
pub use surface::{Completion, SheetSurface, SheetSurfaceDelegate, SurfaceConfig};
pub use transitioning::SheetTransitioning;
