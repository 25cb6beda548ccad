#![forbid(unsafe_code)]

//! Sheet error type.
//!
//! The taxonomy is narrow: every operation is local and synchronous or
//! animated, so there is nothing to retry. Errors are reported at the call
//! site and the rejected operation leaves all state untouched.
//!
//! Conflicting transitions are not errors. The older transition completes
//! with `finished == false` and the newer one runs. Degenerate geometry is
//! clamped to zero and logged.

use std::fmt;

/// Errors returned by sheet and transition operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetError {
    /// A target index outside `[0, count)`.
    InvalidTargetIndex {
        /// The rejected index.
        index: usize,
        /// Number of targets at the time of the call.
        count: usize,
    },
    /// A content height list must hold at least one entry.
    EmptyContentHeights,
    /// The operation needs a presented sheet and there is none.
    NotPresented,
    /// A sheet is already resting on screen for this controller.
    AlreadyPresented,
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTargetIndex { index, count } => {
                write!(f, "target index {index} out of range for {count} targets")
            }
            Self::EmptyContentHeights => write!(f, "content heights must not be empty"),
            Self::NotPresented => write!(f, "no sheet is presented"),
            Self::AlreadyPresented => write!(f, "a sheet is already presented"),
        }
    }
}

impl std::error::Error for SheetError {}

/// Validate `index` against `count`.
#[inline]
pub fn check_index(index: usize, count: usize) -> Result<usize, SheetError> {
    if index < count {
        Ok(index)
    } else {
        Err(SheetError::InvalidTargetIndex { index, count })
    }
}
