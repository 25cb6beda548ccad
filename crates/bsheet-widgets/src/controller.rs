#![forbid(unsafe_code)]

//! Modal presentation controller for a bottom sheet.
//!
//! [`TransitionController`] owns one [`SheetSurface`] per presentation and
//! drives it through the host's transition protocol:
//!
//! ```text
//!          present                     surface settled
//! Idle ─────────────────▶ Presenting ─────────────────▶ Idle
//!  │                          │ dismiss / tap / threshold
//!  │ dismiss / tap / threshold│ (presentation fails first)
//!  ▼                          ▼
//! Dismissing ◀────────────────┘
//!  │ surface off-screen
//!  ▼
//! Idle (surface released)
//! ```
//!
//! Every transition reports to [`TransitionHost::complete_transition`]
//! exactly once, after the state is back to `Idle`.
//!
//! Surface callbacks (completions and delegate events) are queued and
//! drained at the end of each public call, so the controller never re-enters
//! itself while the surface is borrowed. Hosts should treat
//! `complete_transition` as a notification and act on the controller after
//! the current call returns.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bsheet_core::error::check_index;
use bsheet_core::geometry::resolve_height;
use bsheet_core::{ContentHeights, ContentMeasure, Layout, Rect, SheetError};
use bsheet_core::{debug, debug_span, info, trace};

use crate::surface::{SheetSurface, SheetSurfaceDelegate, SurfaceConfig};

/// Direction of a modal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionDirection {
    Presenting,
    Dismissing,
}

/// Controller transition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionState {
    /// No transition in flight.
    #[default]
    Idle,
    /// The sheet is animating in.
    Presenting,
    /// The sheet is animating out.
    Dismissing,
}

impl TransitionState {
    /// Direction of the in-flight transition, if any.
    #[must_use]
    pub const fn direction(self) -> Option<TransitionDirection> {
        match self {
            Self::Idle => None,
            Self::Presenting => Some(TransitionDirection::Presenting),
            Self::Dismissing => Some(TransitionDirection::Dismissing),
        }
    }

    /// Whether no transition is in flight.
    #[inline]
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// The host side of the modal transition protocol.
pub trait TransitionHost {
    /// Current container layout.
    fn layout(&self) -> Layout;

    /// A transition ended. Called once per transition, with the controller
    /// already back in [`TransitionState::Idle`].
    fn complete_transition(&mut self, direction: TransitionDirection, finished: bool);
}

/// Non-interactive entry point of the transition protocol.
pub trait AnimatedTransitioning {
    /// Nominal duration. Motion is spring-driven, so this is zero.
    fn transition_duration(&self) -> Duration {
        Duration::ZERO
    }

    /// Run the pending transition.
    fn animate_transition(&mut self);
}

/// Interactive entry point of the transition protocol.
pub trait InteractiveTransitioning {
    /// Run the pending transition.
    fn start_interactive_transition(&mut self);
}

/// What to present.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationRequest {
    /// Target heights in index order.
    pub heights: ContentHeights,
    /// Target to present at.
    pub start_index: usize,
    /// Whether heights honour safe-area insets.
    pub use_safe_area: bool,
    /// Whether the presentation animates.
    pub animated: bool,
}

impl PresentationRequest {
    /// Animated request presenting at target 0.
    #[must_use]
    pub fn new(heights: ContentHeights) -> Self {
        Self {
            heights,
            start_index: 0,
            use_safe_area: false,
            animated: true,
        }
    }

    /// Set the start target.
    #[must_use]
    pub fn start_index(mut self, index: usize) -> Self {
        self.start_index = index;
        self
    }

    /// Set whether safe-area insets are honoured.
    #[must_use]
    pub fn use_safe_area(mut self, use_safe_area: bool) -> Self {
        self.use_safe_area = use_safe_area;
        self
    }

    /// Set whether the presentation animates.
    #[must_use]
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    fn validate(&self) -> Result<(), SheetError> {
        check_index(self.start_index, self.heights.len()).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SurfaceEvent {
    BackdropTapped,
    DismissThresholdReached(f64),
    TransitionFinished {
        id: u64,
        direction: TransitionDirection,
        finished: bool,
    },
}

/// Queue between the surface and the controller.
#[derive(Debug, Default)]
struct SurfaceEvents {
    queue: RefCell<VecDeque<SurfaceEvent>>,
}

impl SurfaceEvents {
    fn push(&self, event: SurfaceEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    fn pop(&self) -> Option<SurfaceEvent> {
        self.queue.borrow_mut().pop_front()
    }
}

impl SheetSurfaceDelegate for SurfaceEvents {
    fn on_backdrop_tapped(&self) {
        self.push(SurfaceEvent::BackdropTapped);
    }

    fn on_dismiss_threshold_reached(&self, velocity: f64) {
        self.push(SurfaceEvent::DismissThresholdReached(velocity));
    }
}

/// Presents and dismisses one bottom sheet at a time.
pub struct TransitionController {
    config: SurfaceConfig,
    host: Box<dyn TransitionHost>,
    state: TransitionState,
    transition_id: u64,
    launched: Option<u64>,
    request: Option<PresentationRequest>,
    requested_index: usize,
    content: Option<Rc<dyn ContentMeasure>>,
    surface: Option<SheetSurface>,
    events: Rc<SurfaceEvents>,
    dismiss_velocity: f64,
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("state", &self.state)
            .field("transition_id", &self.transition_id)
            .field("requested_index", &self.requested_index)
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

impl TransitionController {
    /// Create an idle controller reporting to `host`.
    #[must_use]
    pub fn new(host: Box<dyn TransitionHost>, config: SurfaceConfig) -> Self {
        Self {
            config,
            host,
            state: TransitionState::Idle,
            transition_id: 0,
            launched: None,
            request: None,
            requested_index: 0,
            content: None,
            surface: None,
            events: Rc::new(SurfaceEvents::default()),
            dismiss_velocity: 0.0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Current transition state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// The live surface, if a sheet is presented.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> Option<&SheetSurface> {
        self.surface.as_ref()
    }

    /// The host this controller reports to.
    #[must_use]
    pub fn host(&self) -> &dyn TransitionHost {
        &*self.host
    }

    /// Whether a sheet is on screen or animating.
    #[must_use]
    pub fn is_presented(&self) -> bool {
        self.surface.is_some()
    }

    /// Target the caller asked for most recently.
    #[inline]
    #[must_use]
    pub fn requested_index(&self) -> usize {
        self.requested_index
    }

    /// Surface configuration applied to every presentation.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Frame of the presented sheet for the current layout and requested
    /// target. `None` before anything was requested.
    #[must_use]
    pub fn frame_of_presented_view(&self) -> Option<Rect> {
        let request = self.request.as_ref()?;
        let content = self.content.as_ref()?;
        let layout = self.host.layout();
        let index = request.heights.clamp_index(self.requested_index);
        let requested = request.heights.get(index)?;
        let height = resolve_height(requested, &layout, request.use_safe_area, content.as_ref());
        Some(Rect::new(
            0.0,
            layout.resting_offset(height),
            layout.size.width,
            height,
        ))
    }

    // ── Caller surface ───────────────────────────────────────────────────

    /// Store a request without running it.
    ///
    /// The host either runs it through [`AnimatedTransitioning`] /
    /// [`InteractiveTransitioning`] or reports a presentation that finished
    /// on its own via
    /// [`presentation_transition_did_end`](Self::presentation_transition_did_end).
    pub fn prepare(
        &mut self,
        request: PresentationRequest,
        content: Rc<dyn ContentMeasure>,
    ) -> Result<(), SheetError> {
        request.validate()?;
        if self.surface.is_some() {
            return Err(SheetError::AlreadyPresented);
        }
        self.requested_index = request.start_index;
        self.request = Some(request);
        self.content = Some(content);
        self.state = TransitionState::Presenting;
        self.transition_id += 1;
        debug!(message = "transition.prepare", id = self.transition_id);
        Ok(())
    }

    /// Present a sheet.
    ///
    /// A presentation or dismissal still in flight completes with
    /// `finished == false` before the new presentation starts. A sheet
    /// resting on screen is [`SheetError::AlreadyPresented`].
    pub fn present(
        &mut self,
        request: PresentationRequest,
        content: Rc<dyn ContentMeasure>,
    ) -> Result<(), SheetError> {
        request.validate()?;
        if self.state.is_idle() && self.surface.is_some() {
            return Err(SheetError::AlreadyPresented);
        }
        if !self.state.is_idle() {
            self.abandon_transition();
        }
        info!(
            message = "transition.present",
            index = request.start_index,
            targets = request.heights.len(),
            animated = request.animated
        );
        self.prepare(request, content)?;
        self.animate_transition();
        self.process_events();
        Ok(())
    }

    /// Dismiss the presented sheet.
    ///
    /// Dismissing while already dismissing is a no-op.
    pub fn dismiss(&mut self) -> Result<(), SheetError> {
        match self.state {
            TransitionState::Dismissing => Ok(()),
            _ if self.surface.is_none() => Err(SheetError::NotPresented),
            _ => {
                self.dismiss_with_velocity(0.0);
                self.process_events();
                Ok(())
            }
        }
    }

    /// Replace the target heights without interrupting a running transition.
    pub fn reload(&mut self, heights: ContentHeights) {
        self.requested_index = heights.clamp_index(self.requested_index);
        if let Some(request) = self.request.as_mut() {
            request.heights = heights.clone();
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.reload(heights);
        }
        self.process_events();
    }

    /// Drop drag displacement and settle on the current target.
    pub fn reset(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.reset();
        }
        self.process_events();
    }

    /// Animate the presented sheet to target `index`.
    pub fn set_target(&mut self, index: usize) -> Result<(), SheetError> {
        let surface = self.surface.as_mut().ok_or(SheetError::NotPresented)?;
        surface.set_target(index)?;
        self.requested_index = index;
        self.process_events();
        Ok(())
    }

    /// The host's container changed size. Re-reads the layout and re-settles.
    pub fn container_resized(&mut self) {
        let layout = self.host.layout();
        debug!(
            message = "transition.resize",
            width = layout.size.width,
            height = layout.size.height
        );
        if let Some(surface) = self.surface.as_mut() {
            surface.set_layout(layout);
        }
        self.process_events();
    }

    /// Advance animations by `dt`.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let finished = self
            .surface
            .as_mut()
            .is_some_and(|surface| surface.tick(dt));
        self.process_events();
        finished
    }

    /// Forward a pointer sample to the surface.
    pub fn drag_sample(&mut self, position: f64, velocity: f64) {
        if let Some(surface) = self.surface.as_mut() {
            surface.drag_sample(position, velocity);
        }
        self.process_events();
    }

    /// Forward the pointer release to the surface.
    pub fn drag_release(&mut self, position: f64, velocity: f64) {
        if let Some(surface) = self.surface.as_mut() {
            surface.drag_release(position, velocity);
        }
        self.process_events();
    }

    /// Forward a backdrop tap. Returns whether it was handled.
    pub fn tap_backdrop(&mut self) -> bool {
        let handled = self
            .surface
            .as_mut()
            .is_some_and(SheetSurface::tap_backdrop);
        self.process_events();
        handled
    }

    /// Forward an accessibility activation of the handle.
    pub fn activate_handle(&mut self) -> bool {
        let handled = self
            .surface
            .as_mut()
            .is_some_and(SheetSurface::activate_handle);
        self.process_events();
        handled
    }

    /// The host finished a presentation.
    ///
    /// When the prepared presentation never ran (non-animated host
    /// presentation), the sheet is placed at its start target without
    /// animation and the transition completes.
    pub fn presentation_transition_did_end(&mut self, completed: bool) {
        if self.state != TransitionState::Presenting || self.surface.is_some() {
            return;
        }
        let id = self.transition_id;
        if completed && self.launched != Some(id) {
            self.launched = Some(id);
            if let Some(mut surface) = self.make_surface() {
                let events = Rc::downgrade(&self.events);
                let index = self.requested_index;
                let placed = surface.present(index, false, move |finished| {
                    notify(&events, id, TransitionDirection::Presenting, finished);
                });
                if placed.is_ok() {
                    self.surface = Some(surface);
                }
            }
        }
        self.process_events();
        if self.state == TransitionState::Presenting && self.transition_id == id {
            self.finish_transition(id, TransitionDirection::Presenting, completed);
        }
    }

    // ── Transition internals ─────────────────────────────────────────────

    /// Launch the pending transition once. Both protocol entry points land
    /// here.
    fn run_transition(&mut self) {
        let id = self.transition_id;
        let Some(direction) = self.state.direction() else {
            return;
        };
        if self.launched == Some(id) {
            trace!(message = "transition.run.duplicate", id);
            return;
        }
        self.launched = Some(id);
        let _span = debug_span!("transition.run", id, direction = ?direction).entered();

        let events = Rc::downgrade(&self.events);
        let completion = move |finished| notify(&events, id, direction, finished);
        match direction {
            TransitionDirection::Presenting => {
                if self.surface.is_none() {
                    self.surface = self.make_surface();
                }
                let animated = self.request.as_ref().is_none_or(|r| r.animated);
                let index = self.requested_index;
                let started = match self.surface.as_mut() {
                    Some(surface) => surface.present(index, animated, completion).is_ok(),
                    None => false,
                };
                if !started {
                    self.surface = None;
                    self.events.push(SurfaceEvent::TransitionFinished {
                        id,
                        direction,
                        finished: false,
                    });
                }
            }
            TransitionDirection::Dismissing => {
                let velocity = self.dismiss_velocity;
                match self.surface.as_mut() {
                    Some(surface) => surface.dismiss(velocity, completion),
                    None => completion(true),
                }
            }
        }
    }

    fn make_surface(&self) -> Option<SheetSurface> {
        let request = self.request.as_ref()?;
        let content = Rc::clone(self.content.as_ref()?);
        let config = self.config.use_safe_area(request.use_safe_area);
        let mut surface =
            SheetSurface::new(request.heights.clone(), content, self.host.layout(), config);
        let delegate: Weak<SurfaceEvents> = Rc::downgrade(&self.events);
        surface.set_delegate(delegate);
        Some(surface)
    }

    /// Fail the in-flight transition so a newer presentation can run.
    fn abandon_transition(&mut self) {
        let id = self.transition_id;
        debug!(message = "transition.abandon", id, state = ?self.state);
        if let Some(mut surface) = self.surface.take() {
            surface.interrupt();
        }
        self.process_events();
        if let Some(direction) = self.state.direction()
            && self.transition_id == id
        {
            self.finish_transition(id, direction, false);
        }
    }

    fn dismiss_with_velocity(&mut self, velocity: f64) {
        if self.state == TransitionState::Dismissing {
            return;
        }
        if self.state == TransitionState::Presenting {
            let id = self.transition_id;
            debug!(message = "transition.interrupt", id);
            if let Some(surface) = self.surface.as_mut() {
                surface.interrupt();
            }
            self.process_events();
            if self.state == TransitionState::Presenting && self.transition_id == id {
                self.finish_transition(id, TransitionDirection::Presenting, false);
            }
        }
        if self.surface.is_none() || !self.state.is_idle() {
            return;
        }

        self.state = TransitionState::Dismissing;
        self.transition_id += 1;
        self.dismiss_velocity = velocity.max(0.0);
        info!(
            message = "transition.dismiss",
            id = self.transition_id,
            velocity = self.dismiss_velocity
        );
        self.start_interactive_transition();
    }

    fn finish_transition(&mut self, id: u64, direction: TransitionDirection, finished: bool) {
        if id != self.transition_id || self.state.direction() != Some(direction) {
            trace!(message = "transition.stale", id, current = self.transition_id);
            return;
        }
        self.state = TransitionState::Idle;
        if direction == TransitionDirection::Dismissing && finished {
            self.surface = None;
            self.request = None;
            self.content = None;
        }
        info!(
            message = "transition.complete",
            id,
            direction = ?direction,
            finished
        );
        self.host.complete_transition(direction, finished);
    }

    fn process_events(&mut self) {
        while let Some(event) = self.events.pop() {
            match event {
                SurfaceEvent::BackdropTapped => self.dismiss_with_velocity(0.0),
                SurfaceEvent::DismissThresholdReached(velocity) => {
                    self.dismiss_with_velocity(velocity);
                }
                SurfaceEvent::TransitionFinished {
                    id,
                    direction,
                    finished,
                } => self.finish_transition(id, direction, finished),
            }
        }
    }
}

fn notify(events: &Weak<SurfaceEvents>, id: u64, direction: TransitionDirection, finished: bool) {
    if let Some(events) = events.upgrade() {
        events.push(SurfaceEvent::TransitionFinished {
            id,
            direction,
            finished,
        });
    }
}

impl AnimatedTransitioning for TransitionController {
    fn animate_transition(&mut self) {
        self.run_transition();
        self.process_events();
    }
}

impl InteractiveTransitioning for TransitionController {
    fn start_interactive_transition(&mut self) {
        self.run_transition();
        self.process_events();
    }
}
