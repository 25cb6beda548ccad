#![forbid(unsafe_code)]

//! Snap target resolution at drag release.
//!
//! [`SnapResolver`] decides where a released sheet goes from two inputs: the
//! offset at release and the release velocity. A slow release snaps to the
//! nearest target. A flick respects the direction of the gesture even when the
//! sheet sits nearer to the target it is leaving.
//!
//! Targets are given as resting offsets in index order. Larger offsets are
//! shorter sheets; positive velocity points down.
//!
//! # Rules
//!
//! 1. `velocity >= hard_flick_velocity` dismisses regardless of offset.
//! 2. An offset more than `dismiss_commit_distance` past the shortest target
//!    dismisses, unless the release is an upward flick.
//! 3. `|velocity| < flick_velocity` picks the nearest target. Ties go to the
//!    smaller index.
//! 4. A downward flick picks the nearest target strictly below the offset, or
//!    the shortest target when none is below.
//! 5. An upward flick picks the nearest target strictly above the offset, or
//!    the tallest target when none is above.
//!
//! An empty target list resolves to [`SnapOutcome::Dismiss`].

/// Default velocity (points/sec) separating a slow release from a flick.
pub const DEFAULT_FLICK_VELOCITY: f64 = 500.0;

/// Default downward velocity (points/sec) that dismisses from anywhere.
pub const DEFAULT_HARD_FLICK_VELOCITY: f64 = 2500.0;

/// Default distance past the shortest target that commits a dismissal.
pub const DEFAULT_DISMISS_COMMIT_DISTANCE: f64 = 100.0;

/// Default fraction of pointer travel applied beyond the outermost targets.
pub const DEFAULT_RUBBER_BAND: f64 = 0.35;

/// Tuning constants for snapping and drag feel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapConfig {
    /// Minimum `|velocity|` treated as a flick (default: 500 pt/s).
    pub flick_velocity: f64,
    /// Downward velocity that dismisses regardless of offset (default: 2500 pt/s).
    pub hard_flick_velocity: f64,
    /// Travel past the shortest target that commits a slow dismissal (default: 100 pt).
    pub dismiss_commit_distance: f64,
    /// Fraction of pointer travel applied beyond the outermost targets
    /// (default: 0.35). `1.0` disables rubber banding.
    pub rubber_band: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            flick_velocity: DEFAULT_FLICK_VELOCITY,
            hard_flick_velocity: DEFAULT_HARD_FLICK_VELOCITY,
            dismiss_commit_distance: DEFAULT_DISMISS_COMMIT_DISTANCE,
            rubber_band: DEFAULT_RUBBER_BAND,
        }
    }
}

impl SnapConfig {
    /// Set the flick velocity threshold.
    #[must_use]
    pub fn flick_velocity(mut self, velocity: f64) -> Self {
        self.flick_velocity = velocity.abs();
        self
    }

    /// Set the hard flick velocity threshold.
    #[must_use]
    pub fn hard_flick_velocity(mut self, velocity: f64) -> Self {
        self.hard_flick_velocity = velocity.abs();
        self
    }

    /// Set the dismiss commit distance.
    #[must_use]
    pub fn dismiss_commit_distance(mut self, distance: f64) -> Self {
        self.dismiss_commit_distance = distance.max(0.0);
        self
    }

    /// Set the rubber band factor, clamped to `[0, 1]`.
    #[must_use]
    pub fn rubber_band(mut self, factor: f64) -> Self {
        self.rubber_band = factor.clamp(0.0, 1.0);
        self
    }
}

/// Where a released sheet should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOutcome {
    /// Settle at the target with this index.
    SnapTo(usize),
    /// Leave the screen.
    Dismiss,
}

/// Resolves release offset and velocity into a [`SnapOutcome`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapResolver {
    config: SnapConfig,
}

impl SnapResolver {
    /// Create a resolver with the given tuning.
    #[must_use]
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    /// Current tuning.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Resolve a release at `offset` moving at `velocity`.
    ///
    /// `targets` are resting offsets in index order.
    #[must_use]
    pub fn resolve(&self, targets: &[f64], offset: f64, velocity: f64) -> SnapOutcome {
        let Some(shortest) = shortest_offset(targets) else {
            return SnapOutcome::Dismiss;
        };

        if velocity >= self.config.hard_flick_velocity {
            return SnapOutcome::Dismiss;
        }
        // An upward flick overrides the commit distance.
        if offset - shortest > self.config.dismiss_commit_distance
            && velocity > -self.config.flick_velocity
        {
            return SnapOutcome::Dismiss;
        }

        let index = if velocity.abs() < self.config.flick_velocity {
            nearest(targets, offset)
        } else if velocity > 0.0 {
            next_below(targets, offset).unwrap_or_else(|| extreme(targets, |a, b| a > b))
        } else {
            next_above(targets, offset).unwrap_or_else(|| extreme(targets, |a, b| a < b))
        };

        SnapOutcome::SnapTo(index)
    }
}

/// Largest resting offset, i.e. the shortest sheet.
fn shortest_offset(targets: &[f64]) -> Option<f64> {
    targets.iter().copied().reduce(f64::max)
}

/// Index of the nearest target; the first index wins ties.
fn nearest(targets: &[f64], offset: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, &target) in targets.iter().enumerate() {
        let distance = (target - offset).abs();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

/// Nearest target strictly below `offset`.
fn next_below(targets: &[f64], offset: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &target) in targets.iter().enumerate() {
        if target > offset && best.is_none_or(|(_, b)| target < b) {
            best = Some((index, target));
        }
    }
    best.map(|(index, _)| index)
}

/// Nearest target strictly above `offset`.
fn next_above(targets: &[f64], offset: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &target) in targets.iter().enumerate() {
        if target < offset && best.is_none_or(|(_, b)| target > b) {
            best = Some((index, target));
        }
    }
    best.map(|(index, _)| index)
}

/// First index whose offset beats every other under `better`.
fn extreme(targets: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (index, &target) in targets.iter().enumerate().skip(1) {
        if better(target, targets[best]) {
            best = index;
        }
    }
    best
}
