//! Error types surfaced by the core.
//!
//! `populate`, `layout_map`, and the [`MagView`](crate::layout::MagView) accessors are total on
//! well-formed input and never fail; only the two sizing/initialization entry points can.

/// Failure modes surfaced by this crate.
///
/// Marked `#[non_exhaustive]` so that adding a variant is not a breaking change for callers that
/// already match with a wildcard arm.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied argument is outside the domain this crate can operate on.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable reason, suitable for a control-plane log line.
        reason: &'static str,
    },

    /// The caller-supplied region is shorter than [`layout_len`](crate::layout::layout_len)
    /// reports for the requested `(m0, n)`.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Bytes required, as computed by `layout_len`.
        needed: usize,
        /// Bytes actually supplied.
        got: usize,
    },
}
