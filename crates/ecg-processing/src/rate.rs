//! Heart rate from R-R intervals

use ecg_core::waveform::validate_sampling_rate;
use ecg_core::{EcgError, EcgResult, PeakSet};
use serde::Serialize;
use std::fmt;

/// Lower edge of the normal resting band (inclusive)
pub const NORMAL_RATE_MIN_BPM: f64 = 60.0;
/// Upper edge of the normal resting band (inclusive)
pub const NORMAL_RATE_MAX_BPM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateClassification {
    Bradycardic,
    Normal,
    Tachycardic,
}

impl RateClassification {
    pub fn from_bpm(bpm: f64) -> Self {
        if bpm < NORMAL_RATE_MIN_BPM {
            RateClassification::Bradycardic
        } else if bpm > NORMAL_RATE_MAX_BPM {
            RateClassification::Tachycardic
        } else {
            RateClassification::Normal
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, RateClassification::Normal)
    }

    /// Plain-language reading of the classification for presenters
    pub fn description(&self) -> &'static str {
        match self {
            RateClassification::Bradycardic => {
                "below the normal resting range of 60 to 100 beats per minute"
            }
            RateClassification::Normal => "within the normal resting range of 60 to 100 beats per minute",
            RateClassification::Tachycardic => {
                "above the normal resting range of 60 to 100 beats per minute"
            }
        }
    }
}

impl fmt::Display for RateClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateClassification::Bradycardic => "Bradycardic",
            RateClassification::Normal => "Normal",
            RateClassification::Tachycardic => "Tachycardic",
        };
        f.write_str(label)
    }
}

/// Result of one rate estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateReport {
    pub mean_bpm: f64,
    /// One entry per consecutive peak pair
    pub per_interval_bpm: Vec<f64>,
    pub classification: RateClassification,
    pub lead_used: String,
}

impl RateReport {
    pub fn is_normal(&self) -> bool {
        self.classification.is_normal()
    }

    /// One-line summary, e.g. "Heart rate 72.0 bpm on lead II: within ..."
    pub fn summary(&self) -> String {
        format!(
            "Heart rate {:.1} bpm on lead {}: {}",
            self.mean_bpm,
            self.lead_used,
            self.classification.description()
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RateEstimator;

impl RateEstimator {
    pub fn new() -> Self {
        RateEstimator
    }

    /// Mean of the per-interval rates, not peaks per duration, so edge
    /// effects at the start and end of the record do not bias the result.
    pub fn estimate(
        &self,
        peaks: &PeakSet,
        sampling_rate_hz: f64,
        lead_name: &str,
    ) -> EcgResult<RateReport> {
        validate_sampling_rate(sampling_rate_hz)?;
        if peaks.len() < 2 {
            return Err(EcgError::InsufficientPeaks { found: peaks.len() });
        }

        let per_interval_bpm: Vec<f64> = peaks
            .intervals()
            .map(|rr| 60.0 * sampling_rate_hz / rr as f64)
            .collect();
        let mean_bpm = per_interval_bpm.iter().sum::<f64>() / per_interval_bpm.len() as f64;

        Ok(RateReport {
            mean_bpm,
            per_interval_bpm,
            classification: RateClassification::from_bpm(mean_bpm),
            lead_used: lead_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(RateClassification::from_bpm(60.0), RateClassification::Normal);
        assert_eq!(
            RateClassification::from_bpm(59.999),
            RateClassification::Bradycardic
        );
        assert_eq!(RateClassification::from_bpm(100.0), RateClassification::Normal);
        assert_eq!(
            RateClassification::from_bpm(100.001),
            RateClassification::Tachycardic
        );
    }

    #[test]
    fn test_evenly_spaced_peaks() {
        let fs = 500.0;
        let t = 400;
        let peaks = PeakSet::new(vec![0, t, 2 * t, 3 * t]).unwrap();
        let report = RateEstimator::new().estimate(&peaks, fs, "II").unwrap();

        let expected = 60.0 * fs / t as f64;
        assert!((report.mean_bpm - expected).abs() < 1e-9);
        assert_eq!(report.per_interval_bpm.len(), 3);
        assert_eq!(report.classification, RateClassification::Normal);
        assert_eq!(report.lead_used, "II");
    }

    #[test]
    fn test_mean_of_interval_rates() {
        // 60 bpm then 120 bpm averages to 90, not 3 beats over 1.5 s
        let peaks = PeakSet::new(vec![0, 250, 375]).unwrap();
        let report = RateEstimator::new().estimate(&peaks, 250.0, "I").unwrap();
        assert_eq!(report.per_interval_bpm, vec![60.0, 120.0]);
        assert!((report.mean_bpm - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_peaks() {
        let estimator = RateEstimator::new();
        assert_eq!(
            estimator.estimate(&PeakSet::empty(), 500.0, "II"),
            Err(EcgError::InsufficientPeaks { found: 0 })
        );
        let single = PeakSet::new(vec![42]).unwrap();
        assert!(estimator
            .estimate(&single, 500.0, "II")
            .unwrap_err()
            .is_rate_undefined());
    }

    #[test]
    fn test_invalid_rate_checked_first() {
        assert!(matches!(
            RateEstimator::new().estimate(&PeakSet::empty(), -1.0, "II"),
            Err(EcgError::InvalidSamplingRate { .. })
        ));
    }

    #[test]
    fn test_report_summary() {
        let peaks = PeakSet::new(vec![0, 100, 200]).unwrap();
        let report = RateEstimator::new().estimate(&peaks, 250.0, "V2").unwrap();
        assert_eq!(report.classification, RateClassification::Tachycardic);
        assert!(!report.is_normal());
        assert!(report.summary().starts_with("Heart rate 150.0 bpm on lead V2: above"));
    }
}
