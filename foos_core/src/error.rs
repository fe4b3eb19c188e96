//! Error types for the foosball simulation core.

use thiserror::Error;

use crate::state::Side;

/// Errors raised by table construction, input handling and stepping.
#[derive(Debug, Error)]
pub enum SimError {
    /// Table configuration rejected at construction.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse table configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Side index other than 0 or 1.
    #[error("invalid side {0}, expected 0 or 1")]
    InvalidSide(u8),

    /// Player-relative rod index has no matching rod for that side.
    #[error("rod index {rod} out of range for {side:?} ({available} rods available)")]
    RodIndexOutOfRange {
        /// Requesting side.
        side: Side,
        /// Requested player-relative rod index.
        rod: usize,
        /// Number of rods owned by the side.
        available: usize,
    },

    /// A second input arrived for a side already consumed this tick.
    #[error("input already applied for {0:?} this tick")]
    InputAlreadyApplied(Side),

    /// A body position or velocity became NaN or infinite.
    #[error("non-finite state on {body} body")]
    NonFinite {
        /// Which body kind carried the bad value.
        body: &'static str,
    },

    /// The instance was aborted by an earlier invariant violation.
    #[error("simulation aborted after an invariant violation")]
    Aborted,
}

impl SimError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
