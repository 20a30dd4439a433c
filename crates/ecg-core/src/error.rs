//! Error handling for the ECG toolkit
//!
//! Every failure in the core is a local, recoverable condition: the caller
//! either adjusts its parameters or surfaces a message. Retrying with the same
//! input always yields the same error.

use thiserror::Error;

/// Result type alias for ECG operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Error type for all ECG core operations
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EcgError {
    /// Too few samples for stable zero-phase filtering
    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Fewer than two R-peaks, so no R-R interval exists
    #[error("insufficient peaks: need at least 2 R-peaks to estimate a rate, found {found}")]
    InsufficientPeaks { found: usize },

    /// Display window longer than the available signal
    #[error("window of {requested} samples exceeds signal of {available} samples")]
    WindowExceedsSignal { requested: usize, available: usize },

    /// Non-positive or non-finite sampling rate
    #[error("invalid sampling rate: {rate} Hz (must be positive and finite)")]
    InvalidSamplingRate { rate: f64 },

    /// Input larger than the per-call processing cap
    #[error("signal of {len} samples exceeds the per-call cap of {max} samples")]
    SignalTooLong { len: usize, max: usize },

    /// Leads in one set must share their sample count
    #[error("lead '{lead}' has {actual} samples, expected {expected}")]
    LeadLengthMismatch {
        lead: String,
        expected: usize,
        actual: usize,
    },

    /// Leads in one set must share their sampling rate
    #[error("lead '{lead}' sampled at {actual} Hz, expected {expected} Hz")]
    SamplingRateMismatch {
        lead: String,
        expected: f64,
        actual: f64,
    },

    #[error("duplicate lead '{lead}'")]
    DuplicateLead { lead: String },

    #[error("lead '{lead}' not present")]
    UnknownLead { lead: String },

    #[error("lead set contains no leads")]
    EmptyLeadSet,

    #[error("sample {index} of lead '{lead}' is not finite")]
    NonFiniteSample { lead: String, index: usize },

    /// Peak indices must be strictly increasing
    #[error("peak indices not strictly increasing at position {position}")]
    UnorderedPeaks { position: usize },

    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Failure inside a presentation backend
    #[error("render failed: {reason}")]
    Render { reason: String },
}

impl EcgError {
    /// Shorthand for configuration errors
    pub fn config(reason: impl Into<String>) -> Self {
        EcgError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// True when the error means "rate undefined" rather than bad input
    pub fn is_rate_undefined(&self) -> bool {
        matches!(self, EcgError::InsufficientPeaks { .. })
    }
}
