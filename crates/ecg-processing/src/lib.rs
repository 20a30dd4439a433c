//! ECG-Processing: conditioning, R-peak detection and heart-rate estimation
//!
//! Every stage is a pure function of its input and configuration, so leads
//! can be processed independently and in any order.

pub mod conditioner;
pub mod config;
pub mod detector;
pub mod envelope;
pub mod filters;
pub mod pipeline;
pub mod processor;
pub mod rate;

pub use conditioner::{ConditionedSignal, SignalConditioner};
pub use config::{
    ConditionerConfig, DetectorConfig, ProcessingConfig, ProcessingProfile, DEFAULT_MAX_SAMPLES,
};
pub use detector::PeakDetector;
pub use filters::{FilterConfig, FilterType, ZeroPhaseFilter};
pub use pipeline::{HeartRateAnalyzer, LeadAnalysis};
pub use processor::{apply_chain, ProcessorType, SignalProcessor};
pub use rate::{
    RateClassification, RateEstimator, RateReport, NORMAL_RATE_MAX_BPM, NORMAL_RATE_MIN_BPM,
};
