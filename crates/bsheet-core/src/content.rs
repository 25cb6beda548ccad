#![forbid(unsafe_code)]

//! Requested sheet heights.
//!
//! A sheet rests at one of several targets. Each target is requested either as
//! a concrete length or as [`ContentHeight::Automatic`], which sizes the sheet
//! to its content's fitting height. [`ContentHeights`] is the ordered,
//! non-empty list of requests; index `i` in the list is target index `i`.
//!
//! # Invariants
//!
//! 1. A `ContentHeights` value is never empty.
//! 2. Order is the caller's order. Snapping decides "taller" and "shorter"
//!    from resolved offsets, not from list position.

use crate::error::SheetError;

/// Measures the intrinsic height of the sheet's content.
///
/// Implemented by the host for whatever opaque view the sheet carries.
pub trait ContentMeasure {
    /// Height the content wants when laid out at `width`.
    fn fitting_height(&self, width: f64) -> f64;
}

/// Content with a known, width-independent fitting height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedContent(pub f64);

impl ContentMeasure for FixedContent {
    fn fitting_height(&self, _width: f64) -> f64 {
        self.0
    }
}

impl<F> ContentMeasure for F
where
    F: Fn(f64) -> f64,
{
    fn fitting_height(&self, width: f64) -> f64 {
        self(width)
    }
}

/// One requested target height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentHeight {
    /// Size to the content's fitting height.
    #[default]
    Automatic,
    /// A concrete height in logical points.
    Fixed(f64),
}

impl ContentHeight {
    /// Whether this is the automatic sentinel.
    #[inline]
    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }
}

impl From<f64> for ContentHeight {
    fn from(height: f64) -> Self {
        Self::Fixed(height)
    }
}

/// Ordered, non-empty list of target heights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContentHeights {
    heights: Vec<ContentHeight>,
}

impl ContentHeights {
    /// Build a height list. Fails when `heights` is empty.
    pub fn new(heights: impl IntoIterator<Item = ContentHeight>) -> Result<Self, SheetError> {
        let heights: Vec<ContentHeight> = heights.into_iter().collect();
        if heights.is_empty() {
            return Err(SheetError::EmptyContentHeights);
        }
        Ok(Self { heights })
    }

    /// Build a height list from concrete lengths.
    pub fn fixed(heights: impl IntoIterator<Item = f64>) -> Result<Self, SheetError> {
        Self::new(heights.into_iter().map(ContentHeight::Fixed))
    }

    /// A single automatic target.
    #[must_use]
    pub fn automatic() -> Self {
        Self {
            heights: vec![ContentHeight::Automatic],
        }
    }

    /// Number of targets (always at least 1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Height requested for `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ContentHeight> {
        self.heights.get(index).copied()
    }

    /// Iterate over requested heights in index order.
    pub fn iter(&self) -> impl Iterator<Item = ContentHeight> + '_ {
        self.heights.iter().copied()
    }

    /// Borrow the underlying slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[ContentHeight] {
        &self.heights
    }

    /// Clamp `index` into `[0, len)`.
    #[inline]
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.heights.len() - 1)
    }
}

impl TryFrom<Vec<ContentHeight>> for ContentHeights {
    type Error = SheetError;

    fn try_from(heights: Vec<ContentHeight>) -> Result<Self, Self::Error> {
        Self::new(heights)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ContentHeights {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            heights: Vec<ContentHeight>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.heights).map_err(serde::de::Error::custom)
    }
}
