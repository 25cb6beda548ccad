#![forbid(unsafe_code)]

//! The draggable sheet surface.
//!
//! [`SheetSurface`] positions an opaque rectangle inside a container and moves
//! it between target offsets. It owns the live target heights, the current
//! offset, at most one animation, and at most one drag.
//!
//! # State Machine
//!
//! ```text
//!            present                 tick (at rest)
//! Hidden ───────────────▶ Settling ───────────────▶ Resting
//!                            ▲  │ drag_sample            │ drag_sample
//!                  release   │  ▼                        ▼
//!                  (snap)    └─ Dragging ◀───────────────┘
//!                                 │ release (dismiss)
//!                                 ▼
//!  Hidden ◀──────────────────  Dismissing
//!           tick (off-screen)
//! ```
//!
//! # Invariants
//!
//! 1. At most one animation runs at a time. Starting another one completes
//!    the running one with `finished == false` first.
//! 2. Every completion passed to [`present`](SheetSurface::present),
//!    [`dismiss`](SheetSurface::dismiss) or held by a drag is invoked exactly
//!    once.
//! 3. A drag that begins while an animation runs adopts that animation's
//!    completion. Settling after the release completes it with `true`;
//!    dismissal completes it with `false`.
//! 4. Snap targets are resolved only at release, never per sample.
//! 5. The offset never exceeds the fully off-screen offset.
//!
//! # Delegate
//!
//! Backdrop taps and dismiss-threshold releases are reported to a
//! [`SheetSurfaceDelegate`] held as a `Weak` reference. A surface without a
//! live delegate dismisses itself.

use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bsheet_core::animation::{Animation, Spring, SpringConfig};
use bsheet_core::drag::{DragBounds, DragSample, DragTracker, VelocityTracker};
use bsheet_core::error::check_index;
use bsheet_core::geometry::{resolve_height, resting_offsets};
use bsheet_core::{
    ContentHeights, ContentMeasure, Layout, Rect, SheetError, SnapConfig, SnapOutcome,
    SnapResolver,
};
use bsheet_core::{debug, trace};
use web_time::Instant;

/// Completion callback for an animated surface operation.
///
/// Receives `true` when the operation ran to the end and `false` when it was
/// interrupted.
pub type Completion = Box<dyn FnOnce(bool)>;

/// Listener for user-driven surface events.
pub trait SheetSurfaceDelegate {
    /// The dimmed backdrop behind the sheet was tapped.
    fn on_backdrop_tapped(&self);

    /// A drag was released past the dismiss threshold with `velocity`
    /// (points/sec, positive is down).
    fn on_dismiss_threshold_reached(&self, velocity: f64);
}

/// Surface tuning and presentation flags.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceConfig {
    /// Snap thresholds and rubber banding.
    pub snap: SnapConfig,
    /// Spring used to present and settle.
    pub settle_spring: SpringConfig,
    /// Spring used to dismiss.
    pub dismiss_spring: SpringConfig,
    /// Keep the sheet clear of the top safe-area inset and pad automatic
    /// heights by the bottom inset.
    pub use_safe_area: bool,
    /// Whether drags and backdrop taps may dismiss the sheet.
    pub is_dismissible: bool,
    /// Whether the dimmed backdrop is hidden.
    pub is_dim_view_hidden: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            settle_spring: SpringConfig::default(),
            dismiss_spring: SpringConfig::snappy(),
            use_safe_area: false,
            is_dismissible: true,
            is_dim_view_hidden: true,
        }
    }
}

impl SurfaceConfig {
    /// Set snap tuning.
    #[must_use]
    pub fn snap(mut self, snap: SnapConfig) -> Self {
        self.snap = snap;
        self
    }

    /// Set the settle spring.
    #[must_use]
    pub fn settle_spring(mut self, spring: SpringConfig) -> Self {
        self.settle_spring = spring;
        self
    }

    /// Set the dismiss spring.
    #[must_use]
    pub fn dismiss_spring(mut self, spring: SpringConfig) -> Self {
        self.dismiss_spring = spring;
        self
    }

    /// Set whether safe-area insets are honoured.
    #[must_use]
    pub fn use_safe_area(mut self, use_safe_area: bool) -> Self {
        self.use_safe_area = use_safe_area;
        self
    }

    /// Set whether the sheet can be dismissed by the user.
    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.is_dismissible = dismissible;
        self
    }

    /// Set whether the dimmed backdrop is hidden.
    #[must_use]
    pub fn dim_view_hidden(mut self, hidden: bool) -> Self {
        self.is_dim_view_hidden = hidden;
        self
    }
}

/// What the running animation is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Settle { target: usize },
    Dismiss,
}

struct SurfaceAnimation {
    motion: Motion,
    spring: Spring,
    completion: Option<Completion>,
}

/// A draggable bottom sheet surface.
pub struct SheetSurface {
    heights: ContentHeights,
    content: Rc<dyn ContentMeasure>,
    layout: Layout,
    config: SurfaceConfig,
    resolver: SnapResolver,

    offset: f64,
    settled_index: usize,
    // Target of the latest present or settle, landed or not.
    target_index: usize,
    presented: bool,

    animation: Option<SurfaceAnimation>,
    // Completion adopted from an interrupted animation, resolved by the
    // outcome of the current drag or the next animation.
    pending: Option<Completion>,
    drag: Option<DragTracker>,
    velocity: VelocityTracker,

    delegate: Option<Weak<dyn SheetSurfaceDelegate>>,
}

impl fmt::Debug for SheetSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetSurface")
            .field("targets", &self.heights.len())
            .field("offset", &self.offset)
            .field("settled_index", &self.settled_index)
            .field("target_index", &self.target_index)
            .field("presented", &self.presented)
            .field("motion", &self.animation.as_ref().map(|a| a.motion))
            .field("dragging", &self.drag.is_some())
            .finish()
    }
}

impl SheetSurface {
    /// Create a hidden surface. It stays off-screen until
    /// [`present`](Self::present).
    #[must_use]
    pub fn new(
        heights: ContentHeights,
        content: Rc<dyn ContentMeasure>,
        layout: Layout,
        config: SurfaceConfig,
    ) -> Self {
        Self {
            heights,
            content,
            layout,
            resolver: SnapResolver::new(config.snap),
            config,
            offset: layout.off_screen_offset(),
            settled_index: 0,
            target_index: 0,
            presented: false,
            animation: None,
            pending: None,
            drag: None,
            velocity: VelocityTracker::new(),
            delegate: None,
        }
    }

    /// Attach the listener for backdrop taps and dismiss requests.
    pub fn set_delegate(&mut self, delegate: Weak<dyn SheetSurfaceDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Detach the listener. The surface dismisses itself from now on.
    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Current top-edge offset inside the container.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Target the sheet rests at or is heading for. During a drag this is
    /// the target the drag started from.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.heights.clamp_index(self.target_index)
    }

    /// Last target the sheet came to rest at.
    #[inline]
    #[must_use]
    pub fn settled_index(&self) -> usize {
        self.settled_index
    }

    /// Live target heights.
    #[inline]
    #[must_use]
    pub fn heights(&self) -> &ContentHeights {
        &self.heights
    }

    /// Current container layout.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Whether the sheet is on screen (between present and dismissal end).
    #[inline]
    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// Whether an animation is running.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Whether a dismissal animation is running.
    #[inline]
    #[must_use]
    pub fn is_dismissing(&self) -> bool {
        matches!(
            self.animation.as_ref().map(|a| a.motion),
            Some(Motion::Dismiss)
        )
    }

    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the user may dismiss the sheet.
    #[inline]
    #[must_use]
    pub fn is_dismissible(&self) -> bool {
        self.config.is_dismissible
    }

    /// Allow or forbid user dismissal.
    pub fn set_dismissible(&mut self, dismissible: bool) {
        self.config.is_dismissible = dismissible;
    }

    /// Whether the dimmed backdrop is hidden.
    #[inline]
    #[must_use]
    pub fn is_dim_view_hidden(&self) -> bool {
        self.config.is_dim_view_hidden
    }

    /// Show or hide the dimmed backdrop.
    pub fn set_dim_view_hidden(&mut self, hidden: bool) {
        self.config.is_dim_view_hidden = hidden;
    }

    /// Resolved height of target `index` under the current layout.
    pub fn target_height(&self, index: usize) -> Result<f64, SheetError> {
        let index = check_index(index, self.heights.len())?;
        Ok(self.height_at(index))
    }

    /// Resting offsets of all targets, in index order.
    #[must_use]
    pub fn target_offsets(&self) -> Vec<f64> {
        resting_offsets(
            &self.heights,
            &self.layout,
            self.config.use_safe_area,
            self.content.as_ref(),
        )
    }

    /// Frame of the sheet inside the container.
    #[must_use]
    pub fn frame(&self) -> Rect {
        Rect::new(
            0.0,
            self.offset,
            self.layout.size.width,
            self.height_at(self.current_index()),
        )
    }

    /// Backdrop opacity in `[0, 1]`: 0 off-screen, 1 at or above the
    /// shortest target, 0 whenever the dim view is hidden.
    #[must_use]
    pub fn backdrop_opacity(&self) -> f64 {
        if self.config.is_dim_view_hidden || !self.presented {
            return 0.0;
        }
        let off_screen = self.layout.off_screen_offset();
        let shortest = self
            .target_offsets()
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(off_screen);
        let span = off_screen - shortest;
        if span <= f64::EPSILON {
            return 1.0;
        }
        ((off_screen - self.offset) / span).clamp(0.0, 1.0)
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Move from off-screen to the resting offset of `target_index`.
    ///
    /// With `animated == false` the move is instantaneous and `completion`
    /// runs before this returns. An invalid index is rejected and
    /// `completion` is dropped without being called.
    pub fn present(
        &mut self,
        target_index: usize,
        animated: bool,
        completion: impl FnOnce(bool) + 'static,
    ) -> Result<(), SheetError> {
        let index = check_index(target_index, self.heights.len())?;
        debug!(message = "sheet.present", index, animated);

        self.interrupt();
        if !self.presented {
            self.offset = self.layout.off_screen_offset();
            self.presented = true;
        }

        self.target_index = index;
        let target = self.resting_offset(index);
        if animated {
            let spring = self.config.settle_spring.spring(self.offset, target);
            self.start(Motion::Settle { target: index }, spring, Some(Box::new(completion)));
        } else {
            self.offset = target;
            self.settled_index = index;
            completion(true);
        }
        Ok(())
    }

    /// Animate fully off-screen, continuing a downward `velocity`.
    ///
    /// A surface that is not presented completes immediately with `true`.
    pub fn dismiss(&mut self, velocity: f64, completion: impl FnOnce(bool) + 'static) {
        debug!(message = "sheet.dismiss", velocity, offset = self.offset);
        self.interrupt();
        if !self.presented {
            completion(true);
            return;
        }

        let spring = self
            .config
            .dismiss_spring
            .spring(self.offset, self.layout.off_screen_offset())
            .with_velocity(velocity.max(0.0));
        self.start(Motion::Dismiss, spring, Some(Box::new(completion)));
    }

    /// Animate to a caller-chosen target.
    pub fn set_target(&mut self, index: usize) -> Result<(), SheetError> {
        let index = check_index(index, self.heights.len())?;
        if !self.presented || self.is_dismissing() {
            return Err(SheetError::NotPresented);
        }
        self.interrupt();
        self.settle(index, 0.0, None);
        Ok(())
    }

    /// Drop drag displacement and head back to the current target: the one
    /// the sheet rests at, or the one an interrupted present or settle was
    /// heading for.
    ///
    /// A running settle is retargeted to its target's current resting offset
    /// and keeps its completion. A running dismissal keeps going. Calling
    /// `reset` repeatedly has the same effect as calling it once.
    pub fn reset(&mut self) {
        if !self.presented {
            return;
        }

        if self.drag.take().is_some() {
            self.velocity.clear();
            let index = self.current_index();
            let pending = self.pending.take();
            debug!(message = "sheet.reset", index, dragging = true);
            self.settle(index, 0.0, pending);
            return;
        }

        let off_screen = self.layout.off_screen_offset();
        let retarget = match self.animation.as_ref().map(|a| a.motion) {
            Some(Motion::Settle { target }) => {
                let index = self.heights.clamp_index(target);
                Some((Motion::Settle { target: index }, self.resting_offset(index)))
            }
            Some(Motion::Dismiss) => Some((Motion::Dismiss, off_screen)),
            None => None,
        };

        if let Some((motion, target)) = retarget
            && let Some(animation) = self.animation.as_mut()
        {
            debug!(message = "sheet.reset", target, retarget = true);
            animation.motion = motion;
            animation.spring.set_target(target);
            return;
        }

        let index = self.current_index();
        let pending = self.pending.take();
        debug!(message = "sheet.reset", index, dragging = false);
        self.settle(index, 0.0, pending);
    }

    /// Replace the target heights.
    ///
    /// A running animation keeps its current destination; the next settle
    /// (release, reset, resize) uses the new heights.
    pub fn reload(&mut self, heights: ContentHeights) {
        debug!(message = "sheet.reload", targets = heights.len());
        self.heights = heights;
        self.settled_index = self.heights.clamp_index(self.settled_index);
        self.target_index = self.heights.clamp_index(self.target_index);
    }

    /// Apply a new container layout and re-settle against it.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        if !self.presented && self.animation.is_none() {
            self.offset = layout.off_screen_offset();
        } else {
            self.offset = self.offset.min(layout.off_screen_offset());
        }
        self.reset();
    }

    /// Advance the running animation by `dt`.
    ///
    /// Returns `true` when an animation finished during this tick.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let off_screen = self.layout.off_screen_offset();
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };

        animation.spring.tick(dt);
        let position = animation.spring.position();
        let done = match animation.motion {
            Motion::Settle { .. } => animation.spring.is_complete(),
            Motion::Dismiss => {
                animation.spring.is_complete()
                    || position >= off_screen - self.config.dismiss_spring.rest_threshold
            }
        };
        self.offset = position.min(off_screen);
        trace!(message = "sheet.tick", offset = self.offset, done);

        if !done {
            return false;
        }
        let Some(animation) = self.animation.take() else {
            return false;
        };
        match animation.motion {
            Motion::Settle { target } => {
                self.offset = animation.spring.target().min(off_screen);
                self.settled_index = self.heights.clamp_index(target);
                debug!(message = "sheet.settled", index = self.settled_index, offset = self.offset);
            }
            Motion::Dismiss => {
                self.offset = off_screen;
                self.presented = false;
                debug!(message = "sheet.dismissed");
            }
        }
        if let Some(completion) = animation.completion {
            completion(true);
        }
        true
    }

    // ── Gesture ──────────────────────────────────────────────────────────

    /// Feed one pointer sample while the finger is down.
    ///
    /// The first sample starts the drag. Samples are ignored while the sheet
    /// is hidden or dismissing.
    pub fn drag_sample(&mut self, position: f64, velocity: f64) {
        if !self.presented || self.is_dismissing() {
            return;
        }
        let sample = DragSample::new(position, velocity);
        match self.drag.as_mut() {
            Some(drag) => drag.update(sample),
            None => {
                if let Some(animation) = self.animation.take() {
                    self.adopt(animation.completion);
                }
                self.drag = Some(DragTracker::begin(sample, self.offset));
            }
        }
        self.track_drag();
    }

    /// Finish the drag at `position` with release `velocity`.
    ///
    /// This is the only point where the snap target is resolved.
    pub fn drag_release(&mut self, position: f64, velocity: f64) {
        let Some(mut drag) = self.drag.take() else {
            return;
        };
        self.velocity.clear();
        drag.update(DragSample::new(position, velocity));
        let targets = self.target_offsets();
        if let Some(bounds) = DragBounds::from_offsets(&targets, self.layout.off_screen_offset()) {
            self.offset = drag.offset(&bounds, self.config.snap.rubber_band);
        }

        let outcome = self.resolver.resolve(&targets, self.offset, velocity);
        debug!(
            message = "sheet.release",
            offset = self.offset,
            velocity,
            outcome = ?outcome
        );
        let pending = self.pending.take();
        match outcome {
            SnapOutcome::SnapTo(index) => self.settle(index, velocity, pending),
            SnapOutcome::Dismiss if self.config.is_dismissible => {
                self.pending = pending;
                self.request_dismiss(velocity);
            }
            SnapOutcome::Dismiss => {
                let shortest = shortest_index(&targets);
                self.settle(shortest, velocity, pending);
            }
        }
    }

    /// Feed a timestamped pointer position; velocity is estimated.
    pub fn drag_sample_at(&mut self, position: f64, now: Instant) {
        if self.drag.is_none() {
            self.velocity.clear();
        }
        self.velocity.record(position, now);
        let velocity = self.velocity.velocity();
        self.drag_sample(position, velocity);
    }

    /// Release at a timestamped position; velocity is estimated.
    pub fn drag_release_at(&mut self, position: f64, now: Instant) {
        self.velocity.record(position, now);
        let velocity = self.velocity.velocity();
        self.drag_release(position, velocity);
    }

    /// Tap on the dimmed backdrop. Returns whether it was handled.
    pub fn tap_backdrop(&mut self) -> bool {
        if self.config.is_dim_view_hidden
            || !self.config.is_dismissible
            || !self.presented
            || self.is_dismissing()
        {
            return false;
        }
        debug!(message = "sheet.backdrop_tap");
        match self.live_delegate() {
            Some(delegate) => delegate.on_backdrop_tapped(),
            None => self.dismiss(0.0, |_| {}),
        }
        true
    }

    /// Accessibility activation of the handle.
    ///
    /// A dismissible sheet treats it like a zero-velocity release past the
    /// dismiss threshold. Otherwise the sheet advances to the next target in
    /// index order, wrapping to the first.
    pub fn activate_handle(&mut self) -> bool {
        if !self.presented || self.is_dismissing() {
            return false;
        }
        if self.config.is_dismissible {
            self.request_dismiss(0.0);
        } else {
            let next = (self.current_index() + 1) % self.heights.len();
            self.interrupt();
            self.settle(next, 0.0, None);
        }
        true
    }

    /// Complete any running animation and adopted completion with `false`
    /// and drop drag tracking. The offset stays where it is.
    pub fn interrupt(&mut self) {
        self.drag = None;
        if let Some(animation) = self.animation.take() {
            trace!(message = "sheet.interrupt", motion = ?animation.motion);
            if let Some(completion) = animation.completion {
                completion(false);
            }
        }
        if let Some(pending) = self.pending.take() {
            pending(false);
        }
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn height_at(&self, index: usize) -> f64 {
        match self.heights.get(index) {
            Some(height) => resolve_height(
                height,
                &self.layout,
                self.config.use_safe_area,
                self.content.as_ref(),
            ),
            None => 0.0,
        }
    }

    fn resting_offset(&self, index: usize) -> f64 {
        self.layout.resting_offset(self.height_at(index))
    }

    fn live_delegate(&self) -> Option<Rc<dyn SheetSurfaceDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    /// Keep `completion` until the current drag resolves.
    fn adopt(&mut self, completion: Option<Completion>) {
        if let Some(completion) = completion {
            if let Some(previous) = self.pending.replace(completion) {
                previous(false);
            }
        }
    }

    fn track_drag(&mut self) {
        let targets = self.target_offsets();
        let Some(bounds) = DragBounds::from_offsets(&targets, self.layout.off_screen_offset())
        else {
            return;
        };
        if let Some(drag) = self.drag.as_ref() {
            self.offset = drag.offset(&bounds, self.config.snap.rubber_band);
        }
    }

    fn request_dismiss(&mut self, velocity: f64) {
        match self.live_delegate() {
            Some(delegate) => delegate.on_dismiss_threshold_reached(velocity),
            None => self.dismiss(velocity, |_| {}),
        }
    }

    /// Spring toward target `index`, seeded with `velocity`.
    fn settle(&mut self, index: usize, velocity: f64, completion: Option<Completion>) {
        let index = self.heights.clamp_index(index);
        let target = self.resting_offset(index);
        debug!(message = "sheet.snap", index, from = self.offset, to = target);
        self.target_index = index;
        let spring = self
            .config
            .settle_spring
            .spring(self.offset, target)
            .with_velocity(velocity);
        self.start(Motion::Settle { target: index }, spring, completion);
    }

    fn start(&mut self, motion: Motion, spring: Spring, completion: Option<Completion>) {
        if let Some(previous) = self.animation.take()
            && let Some(previous) = previous.completion
        {
            previous(false);
        }
        self.animation = Some(SurfaceAnimation {
            motion,
            spring,
            completion,
        });
    }
}

/// Index of the largest resting offset (the shortest sheet).
fn shortest_index(targets: &[f64]) -> usize {
    let mut best = 0;
    for (index, &offset) in targets.iter().enumerate().skip(1) {
        if offset > targets[best] {
            best = index;
        }
    }
    best
}
