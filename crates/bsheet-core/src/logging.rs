#![forbid(unsafe_code)]

//! Logging shim.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros. Without it, macros of the same names are exported at the crate
//! root and expand to nothing, so call sites never need their own `cfg`.
//!
//! Span macros return a [`NoopSpan`] so `let _guard = span.enter();` keeps
//! compiling when tracing is off.
//!
//! Event names are dotted (`sheet.present`, `sheet.snap`,
//! `transition.complete`) and carry structured fields.

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Span stand-in used when the `tracing` feature is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

/// Guard returned by [`NoopSpan::enter`].
#[derive(Debug)]
pub struct NoopGuard;

impl NoopSpan {
    /// Enter the span. Does nothing.
    #[inline]
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    /// Consume and enter the span. Does nothing.
    #[inline]
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

/// Install a JSON subscriber honouring `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> bool {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}

#[cfg(not(feature = "tracing"))]
mod noop {
    #[macro_export]
    #[doc(hidden)]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! info_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! warn_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    #[macro_export]
    #[doc(hidden)]
    macro_rules! error_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_span_enters() {
        let span = NoopSpan;
        let _guard = span.enter();
        let _entered = NoopSpan.entered();
    }
}
