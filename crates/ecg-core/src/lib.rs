//! ECG-Core: Foundation types for electrocardiogram analysis
//!
//! Waveforms, lead sets, peak sets and the shared error type used by the
//! processing and rendering crates.

pub mod error;
pub mod lead;
pub mod peaks;
pub mod record;
pub mod waveform;

pub use error::{EcgError, EcgResult};
pub use lead::{Lead, CANONICAL_LEAD_ORDER};
pub use peaks::PeakSet;
pub use record::{DiagnosisLookup, RecordMetadata};
pub use waveform::{LeadSet, Waveform};
