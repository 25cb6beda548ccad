#![forbid(unsafe_code)]

//! Reusable presentation configuration.
//!
//! A [`SheetTransitioning`] is set up once by the presenting screen and
//! hands out a fresh [`TransitionController`] for every presentation.

use std::rc::Rc;

use bsheet_core::{ContentHeights, ContentMeasure, SheetError};

use crate::controller::{PresentationRequest, TransitionController, TransitionHost};
use crate::surface::SurfaceConfig;

/// Immutable description of how to present a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTransitioning {
    config: SurfaceConfig,
    request: PresentationRequest,
}

impl SheetTransitioning {
    /// Animated presentation at target 0 with default surface tuning.
    #[must_use]
    pub fn new(heights: ContentHeights) -> Self {
        Self {
            config: SurfaceConfig::default(),
            request: PresentationRequest::new(heights),
        }
    }

    /// Set surface tuning.
    #[must_use]
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the start target.
    #[must_use]
    pub fn start_index(mut self, index: usize) -> Self {
        self.request = self.request.start_index(index);
        self
    }

    /// Set whether safe-area insets are honoured.
    #[must_use]
    pub fn use_safe_area(mut self, use_safe_area: bool) -> Self {
        self.request = self.request.use_safe_area(use_safe_area);
        self
    }

    /// Set whether the presentation animates.
    #[must_use]
    pub fn animated(mut self, animated: bool) -> Self {
        self.request = self.request.animated(animated);
        self
    }

    /// Surface tuning.
    #[inline]
    #[must_use]
    pub fn surface_config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// The presentation request this configuration describes.
    #[must_use]
    pub fn request(&self) -> PresentationRequest {
        self.request.clone()
    }

    /// A controller with the request prepared, ready for the host to run.
    pub fn controller(
        &self,
        host: Box<dyn TransitionHost>,
        content: Rc<dyn ContentMeasure>,
    ) -> Result<TransitionController, SheetError> {
        let mut controller = TransitionController::new(host, self.config);
        controller.prepare(self.request(), content)?;
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{AnimatedTransitioning, TransitionDirection, TransitionState};
    use bsheet_core::{FixedContent, Layout};
    use std::cell::RefCell;
    use std::time::Duration;

    struct Host(Rc<RefCell<Vec<(TransitionDirection, bool)>>>);

    impl TransitionHost for Host {
        fn layout(&self) -> Layout {
            Layout::from_size(320.0, 640.0)
        }

        fn complete_transition(&mut self, direction: TransitionDirection, finished: bool) {
            self.0.borrow_mut().push((direction, finished));
        }
    }

    fn transitioning() -> SheetTransitioning {
        SheetTransitioning::new(ContentHeights::fixed([200.0, 400.0]).unwrap())
    }

    #[test]
    fn builders_flow_into_request() {
        let t = transitioning().start_index(1).use_safe_area(true).animated(false);
        let request = t.request();
        assert_eq!(request.start_index, 1);
        assert!(request.use_safe_area);
        assert!(!request.animated);
    }

    #[test]
    fn invalid_start_index_fails_controller() {
        let log = Rc::default();
        let err = transitioning()
            .start_index(3)
            .controller(Box::new(Host(log)), Rc::new(FixedContent(0.0)))
            .unwrap_err();
        assert_eq!(err, SheetError::InvalidTargetIndex { index: 3, count: 2 });
    }

    #[test]
    fn each_controller_is_independent() {
        let t = transitioning().start_index(1);
        let log: Rc<RefCell<Vec<_>>> = Rc::default();
        for _ in 0..2 {
            let mut controller = t
                .controller(Box::new(Host(Rc::clone(&log))), Rc::new(FixedContent(0.0)))
                .unwrap();
            assert_eq!(controller.state(), TransitionState::Presenting);
            assert_eq!(
                controller.frame_of_presented_view().map(|f| f.y),
                Some(240.0)
            );
            controller.animate_transition();
            for _ in 0..600 {
                if controller.tick(Duration::from_millis(16)) {
                    break;
                }
            }
            assert!(controller.state().is_idle());
        }
        assert_eq!(
            *log.borrow(),
            vec![
                (TransitionDirection::Presenting, true),
                (TransitionDirection::Presenting, true)
            ]
        );
    }
}
