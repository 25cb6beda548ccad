//! Lifecycle tests for `TransitionController`.
//!
//! - Dismiss during presentation completes both transitions, in order
//! - Reload mid-animation keeps the in-flight target; reset applies the reload
//! - Reset is idempotent
//! - Backdrop taps and threshold releases dismiss through the controller
//! - Rejected operations leave state untouched

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bsheet_core::{ContentHeight, ContentHeights, FixedContent, Insets, Layout, SheetError, Size};
use bsheet_widgets::{
    PresentationRequest, SurfaceConfig, TransitionController, TransitionDirection,
    TransitionHost, TransitionState,
};

const FRAME: Duration = Duration::from_millis(16);

type Completions = Rc<RefCell<Vec<(TransitionDirection, bool)>>>;

struct TestHost {
    layout: Rc<RefCell<Layout>>,
    completions: Completions,
}

impl TransitionHost for TestHost {
    fn layout(&self) -> Layout {
        *self.layout.borrow()
    }

    fn complete_transition(&mut self, direction: TransitionDirection, finished: bool) {
        self.completions.borrow_mut().push((direction, finished));
    }
}

struct Harness {
    controller: TransitionController,
    layout: Rc<RefCell<Layout>>,
    completions: Completions,
}

impl Harness {
    fn new(config: SurfaceConfig) -> Self {
        let layout = Rc::new(RefCell::new(Layout::from_size(400.0, 800.0)));
        let completions = Completions::default();
        let host = TestHost {
            layout: Rc::clone(&layout),
            completions: Rc::clone(&completions),
        };
        Self {
            controller: TransitionController::new(Box::new(host), config),
            layout,
            completions,
        }
    }

    fn dimmed() -> Self {
        Self::new(SurfaceConfig::default().dim_view_hidden(false))
    }

    /// Targets resting at offsets 500 (index 0) and 200 (index 1).
    fn present(&mut self, index: usize) {
        let request = PresentationRequest::new(ContentHeights::fixed([300.0, 600.0]).unwrap())
            .start_index(index);
        self.controller
            .present(request, Rc::new(FixedContent(0.0)))
            .unwrap();
    }

    fn run(&mut self) {
        for _ in 0..1000 {
            self.controller.tick(FRAME);
            let animating = self
                .controller
                .surface()
                .is_some_and(|surface| surface.is_animating());
            if !animating && self.controller.state().is_idle() {
                return;
            }
        }
        panic!("animation did not settle");
    }

    fn offset(&self) -> Option<f64> {
        self.controller.surface().map(|surface| surface.offset())
    }

    fn completions(&self) -> Vec<(TransitionDirection, bool)> {
        self.completions.borrow().clone()
    }
}

#[test]
fn present_then_dismiss_reports_each_transition_once() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    assert_eq!(h.offset(), Some(500.0));

    h.controller.dismiss().unwrap();
    assert_eq!(h.controller.state(), TransitionState::Dismissing);
    h.run();

    assert!(h.controller.state().is_idle());
    assert!(h.controller.surface().is_none());
    assert_eq!(
        h.completions(),
        vec![
            (TransitionDirection::Presenting, true),
            (TransitionDirection::Dismissing, true)
        ]
    );
}

#[test]
fn finished_dismissal_clears_presented_frame() {
    let mut h = Harness::dimmed();
    h.present(1);
    h.run();
    assert_eq!(
        h.controller.frame_of_presented_view().map(|frame| frame.y),
        Some(200.0)
    );

    h.controller.dismiss().unwrap();
    h.controller.tick(FRAME);
    assert!(h.controller.frame_of_presented_view().is_some());
    h.run();

    assert!(h.controller.state().is_idle());
    assert_eq!(h.controller.frame_of_presented_view(), None);
}

#[test]
fn dismiss_while_presenting_yields_exactly_two_completions() {
    let mut h = Harness::dimmed();
    h.present(1);
    h.controller.tick(FRAME);
    h.controller.tick(FRAME);
    assert_eq!(h.controller.state(), TransitionState::Presenting);

    h.controller.dismiss().unwrap();
    // The presentation fails before the dismissal starts.
    assert_eq!(
        h.completions(),
        vec![(TransitionDirection::Presenting, false)]
    );
    assert_eq!(h.controller.state(), TransitionState::Dismissing);

    h.run();
    assert!(h.controller.state().is_idle());
    assert_eq!(
        h.completions(),
        vec![
            (TransitionDirection::Presenting, false),
            (TransitionDirection::Dismissing, true)
        ]
    );
}

#[test]
fn second_dismiss_is_a_noop() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    h.controller.dismiss().unwrap();
    h.controller.dismiss().unwrap();
    h.run();
    assert_eq!(h.completions().len(), 2);
    assert_eq!(h.controller.dismiss(), Err(SheetError::NotPresented));
}

#[test]
fn reload_mid_animation_keeps_target_until_reset() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.controller.tick(FRAME);
    h.controller
        .reload(ContentHeights::fixed([100.0, 700.0]).unwrap());
    h.run();
    // Still the target captured at present time.
    assert_eq!(h.offset(), Some(500.0));
    assert_eq!(
        h.completions(),
        vec![(TransitionDirection::Presenting, true)]
    );

    h.controller.reset();
    h.run();
    assert_eq!(h.offset(), Some(700.0));
    assert_eq!(h.completions().len(), 1);
}

#[test]
fn reload_to_fewer_targets_clamps_index() {
    let mut h = Harness::dimmed();
    h.present(1);
    h.run();
    h.controller
        .reload(ContentHeights::fixed([250.0]).unwrap());
    h.controller.reset();
    h.run();
    assert_eq!(h.offset(), Some(550.0));
    assert_eq!(h.controller.requested_index(), 0);
}

#[test]
fn reset_is_idempotent() {
    let mut once = Harness::dimmed();
    let mut twice = Harness::dimmed();
    for h in [&mut once, &mut twice] {
        h.present(1);
        h.run();
        h.controller.drag_sample(300.0, 0.0);
        h.controller.drag_sample(430.0, 0.0);
    }
    once.controller.reset();
    twice.controller.reset();
    twice.controller.reset();
    once.run();
    twice.run();
    assert_eq!(once.offset(), twice.offset());
    assert_eq!(once.offset(), Some(200.0));
    assert_eq!(once.completions(), twice.completions());
}

#[test]
fn resize_during_presenting_drag_keeps_start_target() {
    let mut h = Harness::dimmed();
    h.present(1);
    for _ in 0..3 {
        h.controller.tick(FRAME);
    }
    let at = h.offset().unwrap_or_default();
    h.controller.drag_sample(at, 0.0);
    h.controller.drag_sample(at + 40.0, 0.0);
    assert_eq!(h.controller.surface().map(|s| s.current_index()), Some(1));

    h.controller.container_resized();
    h.run();
    assert_eq!(h.offset(), Some(200.0));
    assert_eq!(
        h.completions(),
        vec![(TransitionDirection::Presenting, true)]
    );
}

#[test]
fn backdrop_tap_dismisses() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    assert!(h.controller.tap_backdrop());
    assert_eq!(h.controller.state(), TransitionState::Dismissing);
    h.run();
    assert!(!h.controller.is_presented());
}

#[test]
fn hidden_dim_view_ignores_backdrop_taps() {
    let mut h = Harness::new(SurfaceConfig::default());
    h.present(0);
    h.run();
    assert!(!h.controller.tap_backdrop());
    assert!(h.controller.state().is_idle());
    assert!(h.controller.is_presented());
}

#[test]
fn threshold_release_dismisses_with_velocity() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    h.controller.drag_sample(500.0, 0.0);
    h.controller.drag_release(530.0, 3000.0);
    assert_eq!(h.controller.state(), TransitionState::Dismissing);
    h.run();
    assert_eq!(
        h.completions(),
        vec![
            (TransitionDirection::Presenting, true),
            (TransitionDirection::Dismissing, true)
        ]
    );
}

#[test]
fn drag_release_during_presentation_resolves_presentation() {
    let mut h = Harness::dimmed();
    h.present(1);
    while h.offset().is_some_and(|offset| offset > 400.0) {
        h.controller.tick(FRAME);
    }
    let at = h.offset().unwrap_or_default();
    h.controller.drag_sample(at, 0.0);
    h.controller.drag_release(at, -800.0);
    h.run();
    assert_eq!(h.offset(), Some(200.0));
    assert_eq!(
        h.completions(),
        vec![(TransitionDirection::Presenting, true)]
    );
}

#[test]
fn threshold_release_during_presentation_fails_it_first() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.controller.tick(FRAME);
    let at = h.offset().unwrap_or_default();
    h.controller.drag_sample(at, 0.0);
    h.controller.drag_release(at + 20.0, 4000.0);
    h.run();
    assert_eq!(
        h.completions(),
        vec![
            (TransitionDirection::Presenting, false),
            (TransitionDirection::Dismissing, true)
        ]
    );
}

#[test]
fn present_while_presented_is_rejected() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    let request = PresentationRequest::new(ContentHeights::fixed([100.0]).unwrap());
    assert_eq!(
        h.controller.present(request, Rc::new(FixedContent(0.0))),
        Err(SheetError::AlreadyPresented)
    );
    assert_eq!(h.completions().len(), 1);
}

#[test]
fn present_during_dismissal_fails_dismissal() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    h.controller.dismiss().unwrap();
    h.controller.tick(FRAME);
    h.present(1);
    h.run();
    assert_eq!(
        h.completions(),
        vec![
            (TransitionDirection::Presenting, true),
            (TransitionDirection::Dismissing, false),
            (TransitionDirection::Presenting, true)
        ]
    );
    assert_eq!(h.offset(), Some(200.0));
}

#[test]
fn invalid_index_is_a_noop() {
    let mut h = Harness::dimmed();
    let request = PresentationRequest::new(ContentHeights::fixed([300.0]).unwrap()).start_index(4);
    assert_eq!(
        h.controller.present(request, Rc::new(FixedContent(0.0))),
        Err(SheetError::InvalidTargetIndex { index: 4, count: 1 })
    );
    assert!(h.controller.state().is_idle());
    assert!(h.completions().is_empty());

    h.present(0);
    h.run();
    assert_eq!(
        h.controller.set_target(9),
        Err(SheetError::InvalidTargetIndex { index: 9, count: 2 })
    );
    assert_eq!(h.controller.requested_index(), 0);
    assert!(!h.controller.surface().is_some_and(|s| s.is_animating()));
}

#[test]
fn set_target_moves_and_updates_frame() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    h.controller.set_target(1).unwrap();
    h.run();
    assert_eq!(h.offset(), Some(200.0));
    assert_eq!(
        h.controller.frame_of_presented_view().map(|frame| frame.y),
        Some(200.0)
    );
}

#[test]
fn frame_follows_container_resize() {
    let mut h = Harness::dimmed();
    h.present(1);
    h.run();
    assert_eq!(
        h.controller.frame_of_presented_view().map(|frame| frame.height),
        Some(600.0)
    );

    *h.layout.borrow_mut() = Layout::new(Size::new(800.0, 400.0), Insets::vertical(20.0, 0.0));
    let frame = h.controller.frame_of_presented_view();
    assert_eq!(frame.map(|frame| (frame.width, frame.height)), Some((800.0, 400.0)));

    h.controller.container_resized();
    h.run();
    assert_eq!(h.offset(), Some(0.0));
    assert_eq!(h.completions().len(), 1);
}

#[test]
fn safe_area_request_keeps_clear_of_top_inset() {
    let mut h = Harness::dimmed();
    *h.layout.borrow_mut() = Layout::new(Size::new(400.0, 800.0), Insets::vertical(50.0, 30.0));
    let heights = ContentHeights::new([ContentHeight::Fixed(2000.0), ContentHeight::Automatic])
        .unwrap();
    let request = PresentationRequest::new(heights).use_safe_area(true);
    h.controller
        .present(request, Rc::new(FixedContent(200.0)))
        .unwrap();
    h.run();
    assert_eq!(h.offset(), Some(50.0));

    h.controller.set_target(1).unwrap();
    h.run();
    // 200pt content plus the 30pt bottom inset.
    assert_eq!(h.offset(), Some(570.0));
}

#[test]
fn handle_activation_dismisses_dismissible_sheet() {
    let mut h = Harness::dimmed();
    h.present(0);
    h.run();
    assert!(h.controller.activate_handle());
    assert_eq!(h.controller.state(), TransitionState::Dismissing);
    h.run();
    assert!(!h.controller.is_presented());
}

#[test]
fn non_dismissible_sheet_stays_presented() {
    let mut h = Harness::new(SurfaceConfig::default().dismissible(false).dim_view_hidden(false));
    h.present(0);
    h.run();
    h.controller.drag_sample(500.0, 0.0);
    h.controller.drag_release(700.0, 5000.0);
    h.run();
    assert!(h.controller.is_presented());
    assert_eq!(h.offset(), Some(500.0));
    assert!(h.controller.activate_handle());
    h.run();
    assert_eq!(h.offset(), Some(200.0));
    assert_eq!(h.completions().len(), 1);
}
