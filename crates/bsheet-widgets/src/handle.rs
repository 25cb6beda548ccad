#![forbid(unsafe_code)]

//! Drag handle accessibility affordance.
//!
//! The handle is the small bar at the top of the sheet. For assistive
//! technology it is a button whose activation is forwarded to whatever owns
//! the sheet.

use bsheet_core::{Rect, Size};

use crate::controller::TransitionController;
use crate::surface::SheetSurface;

/// Size of the visible handle bar.
pub const HANDLE_SIZE: Size = Size::new(25.0, 4.0);

/// Height of the handle's hit area at the top of the sheet.
pub const HANDLE_AREA_HEIGHT: f64 = 20.0;

/// Localization key of the default accessibility label.
pub const HANDLE_LABEL_KEY: &str = "handle_view_accessibility_label";

/// Receiver of handle activations.
pub trait HandleActivation {
    /// Perform the handle's action. Returns whether anything happened.
    fn activate_handle(&mut self) -> bool;
}

impl HandleActivation for SheetSurface {
    fn activate_handle(&mut self) -> bool {
        SheetSurface::activate_handle(self)
    }
}

impl HandleActivation for TransitionController {
    fn activate_handle(&mut self) -> bool {
        TransitionController::activate_handle(self)
    }
}

/// Accessibility role reported for the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessibilityRole {
    #[default]
    Button,
}

/// The sheet's drag handle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleView {
    label: String,
}

impl Default for HandleView {
    fn default() -> Self {
        Self::new(HANDLE_LABEL_KEY)
    }
}

impl HandleView {
    /// Create a handle with an accessibility `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Accessibility label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Accessibility role.
    #[must_use]
    pub const fn role(&self) -> AccessibilityRole {
        AccessibilityRole::Button
    }

    /// Hit area along the top edge of `sheet`.
    #[must_use]
    pub fn area_in(&self, sheet: Rect) -> Rect {
        Rect::new(
            sheet.x,
            sheet.y,
            sheet.width,
            HANDLE_AREA_HEIGHT.min(sheet.height.max(0.0)),
        )
    }

    /// Visible bar, centred horizontally and vertically in the hit area.
    #[must_use]
    pub fn bar_in(&self, sheet: Rect) -> Rect {
        let area = self.area_in(sheet);
        Rect::new(
            area.x + (area.width - HANDLE_SIZE.width) / 2.0,
            area.y + (area.height - HANDLE_SIZE.height).max(0.0) / 2.0,
            HANDLE_SIZE.width,
            HANDLE_SIZE.height.min(area.height),
        )
    }

    /// Forward an accessibility activation.
    pub fn accessibility_activate(&self, target: &mut dyn HandleActivation) -> bool {
        target.activate_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceConfig;
    use bsheet_core::{ContentHeights, FixedContent, Layout};
    use std::rc::Rc;

    #[test]
    fn default_label_is_localization_key() {
        let handle = HandleView::default();
        assert_eq!(handle.label(), HANDLE_LABEL_KEY);
        assert_eq!(handle.role(), AccessibilityRole::Button);
    }

    #[test]
    fn bar_is_centred() {
        let handle = HandleView::default();
        let bar = handle.bar_in(Rect::new(0.0, 500.0, 375.0, 300.0));
        assert_eq!(bar, Rect::new(175.0, 508.0, 25.0, 4.0));
    }

    #[test]
    fn area_clamps_to_tiny_sheet() {
        let handle = HandleView::default();
        let area = handle.area_in(Rect::new(0.0, 790.0, 100.0, 10.0));
        assert_eq!(area.height, 10.0);
    }

    #[test]
    fn activation_reaches_surface() {
        let mut surface = SheetSurface::new(
            ContentHeights::fixed([100.0, 200.0]).unwrap(),
            Rc::new(FixedContent(0.0)),
            Layout::from_size(300.0, 600.0),
            SurfaceConfig::default().dismissible(false),
        );
        let handle = HandleView::default();
        assert!(!handle.accessibility_activate(&mut surface));
        surface.present(0, false, |_| {}).unwrap();
        assert!(handle.accessibility_activate(&mut surface));
        assert_eq!(surface.current_index(), 1);
    }
}
