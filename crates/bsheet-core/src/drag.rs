#![forbid(unsafe_code)]

//! Drag tracking for a vertically draggable sheet.
//!
//! A drag is a two-phase interaction: any number of samples while the pointer
//! is down, then exactly one release. [`DragTracker`] holds the state between
//! the first sample and the release; snapping is resolved only at release,
//! never per sample.
//!
//! While dragging, the sheet follows the pointer 1:1 between its tallest and
//! shortest targets. Beyond them, movement is scaled down by the rubber band
//! factor, and the sheet never goes past fully off-screen.
//!
//! Hosts that only deliver pointer positions can feed timestamps to
//! [`VelocityTracker`] to estimate release velocity.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

/// One pointer sample: position along the drag axis and its velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragSample {
    /// Pointer position in container coordinates (points).
    pub position: f64,
    /// Pointer velocity (points/sec, positive is down).
    pub velocity: f64,
}

impl DragSample {
    /// Create a sample.
    #[inline]
    pub const fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }
}

/// Offsets limiting free drag movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBounds {
    /// Resting offset of the tallest target.
    pub tallest: f64,
    /// Resting offset of the shortest target.
    pub shortest: f64,
    /// Fully off-screen offset; a hard limit.
    pub off_screen: f64,
}

impl DragBounds {
    /// Bounds from resting offsets. Returns `None` for an empty list.
    pub fn from_offsets(offsets: &[f64], off_screen: f64) -> Option<Self> {
        let tallest = offsets.iter().copied().reduce(f64::min)?;
        let shortest = offsets.iter().copied().reduce(f64::max)?;
        Some(Self {
            tallest,
            shortest,
            off_screen,
        })
    }

    /// Apply rubber banding to a raw, 1:1 offset.
    #[must_use]
    pub fn rubber_band(&self, raw: f64, factor: f64) -> f64 {
        let banded = if raw < self.tallest {
            self.tallest - (self.tallest - raw) * factor
        } else if raw > self.shortest {
            self.shortest + (raw - self.shortest) * factor
        } else {
            raw
        };
        banded.min(self.off_screen)
    }
}

/// State of one in-progress drag.
#[derive(Debug, Clone)]
pub struct DragTracker {
    start_pointer: f64,
    start_offset: f64,
    last: DragSample,
    samples: usize,
}

impl DragTracker {
    /// Start tracking from the first sample with the sheet at `offset`.
    #[must_use]
    pub fn begin(sample: DragSample, offset: f64) -> Self {
        Self {
            start_pointer: sample.position,
            start_offset: offset,
            last: sample,
            samples: 1,
        }
    }

    /// Record a sample.
    pub fn update(&mut self, sample: DragSample) {
        self.last = sample;
        self.samples += 1;
    }

    /// Pointer travel since the drag started.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> f64 {
        self.last.position - self.start_pointer
    }

    /// Offset of the sheet when the drag started.
    #[inline]
    #[must_use]
    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    /// Most recent sample.
    #[inline]
    #[must_use]
    pub fn last(&self) -> DragSample {
        self.last
    }

    /// Number of samples seen, including the first.
    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Displayed offset for the latest sample.
    #[must_use]
    pub fn offset(&self, bounds: &DragBounds, rubber_band: f64) -> f64 {
        bounds.rubber_band(self.start_offset + self.translation(), rubber_band)
    }
}

/// Sliding window length for velocity estimation.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Samples kept for velocity estimation.
const VELOCITY_SAMPLES: usize = 8;

/// Estimates pointer velocity from timestamped positions.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f64)>,
}

impl VelocityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(VELOCITY_SAMPLES),
        }
    }

    /// Record a position observed at `now`.
    pub fn record(&mut self, position: f64, now: Instant) {
        if self.samples.len() == VELOCITY_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((now, position));
        while let Some(&(time, _)) = self.samples.front() {
            if now.saturating_duration_since(time) > VELOCITY_WINDOW && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity (points/sec) over the retained window. Zero with fewer than
    /// two samples or no elapsed time.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        let dt = t1.saturating_duration_since(t0).as_secs_f64();
        if dt <= 0.0 { 0.0 } else { (p1 - p0) / dt }
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
