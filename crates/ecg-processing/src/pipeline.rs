//! Per-lead analysis: condition, detect, estimate

use crate::conditioner::{ConditionedSignal, SignalConditioner};
use crate::config::ProcessingConfig;
use crate::detector::PeakDetector;
use crate::rate::{RateEstimator, RateReport};
use ecg_core::{EcgError, EcgResult, Lead, LeadSet, PeakSet, Waveform};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything derived from one lead
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadAnalysis {
    pub lead_used: String,
    pub conditioned: ConditionedSignal,
    pub peaks: PeakSet,
    /// `None` when fewer than two R-peaks were found
    pub rate: Option<RateReport>,
}

impl LeadAnalysis {
    /// The rate report, or `InsufficientPeaks` when the rate is undefined
    pub fn rate_report(&self) -> EcgResult<&RateReport> {
        self.rate.as_ref().ok_or(EcgError::InsufficientPeaks {
            found: self.peaks.len(),
        })
    }
}

/// Heart-rate analysis over a lead set.
///
/// Holds only configuration. The lead to analyse is passed on every call.
#[derive(Debug, Clone)]
pub struct HeartRateAnalyzer {
    conditioner: SignalConditioner,
    detector: PeakDetector,
    estimator: RateEstimator,
}

impl HeartRateAnalyzer {
    pub fn new(config: &ProcessingConfig) -> EcgResult<Self> {
        config.validate()?;
        info!(config = %config.name, "heart-rate analyzer ready");

        Ok(HeartRateAnalyzer {
            conditioner: SignalConditioner::new(config.conditioner.clone())
                .with_max_samples(config.max_samples),
            detector: PeakDetector::new(config.detector.clone())
                .with_max_samples(config.max_samples),
            estimator: RateEstimator::new(),
        })
    }

    pub fn conditioner(&self) -> &SignalConditioner {
        &self.conditioner
    }

    pub fn detector(&self) -> &PeakDetector {
        &self.detector
    }

    /// Pick the lead the rate is computed on.
    ///
    /// An explicit name must exist in the set. Otherwise lead II is used when
    /// present, then a lead II variant such as MLII, falling back to the
    /// first lead of the record.
    pub fn select_analysis_lead<'a>(
        &self,
        lead_set: &'a LeadSet,
        requested: Option<&str>,
    ) -> EcgResult<&'a Waveform> {
        match requested {
            Some(name) => lead_set
                .get(name)
                .or_else(|| {
                    name.parse::<Lead>()
                        .ok()
                        .and_then(|lead| lead_set.find_lead(lead))
                })
                .ok_or_else(|| EcgError::UnknownLead {
                    lead: name.to_string(),
                }),
            None => lead_set
                .find_lead(Lead::II)
                .or_else(|| lead_set.iter().find(|w| is_lead_ii_variant(w.lead_name())))
                .or_else(|| lead_set.iter().next())
                .ok_or(EcgError::EmptyLeadSet),
        }
    }

    /// Condition → detect → estimate for a single waveform
    pub fn analyze_lead(&self, waveform: &Waveform) -> EcgResult<LeadAnalysis> {
        let conditioned = self.conditioner.condition(waveform)?;
        let peaks = self.detector.detect(&conditioned)?;

        let rate = match self.estimator.estimate(
            &peaks,
            conditioned.sampling_rate_hz(),
            waveform.lead_name(),
        ) {
            Ok(report) => {
                debug!(
                    lead = waveform.lead_name(),
                    bpm = report.mean_bpm,
                    classification = %report.classification,
                    "rate estimated"
                );
                Some(report)
            }
            Err(e) if e.is_rate_undefined() => {
                warn!(lead = waveform.lead_name(), peaks = peaks.len(), "rate undefined");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(LeadAnalysis {
            lead_used: waveform.lead_name().to_string(),
            conditioned,
            peaks,
            rate,
        })
    }

    /// Analyse the selected lead of a record
    pub fn analyze(&self, lead_set: &LeadSet, requested: Option<&str>) -> EcgResult<LeadAnalysis> {
        let waveform = self.select_analysis_lead(lead_set, requested)?;
        self.analyze_lead(waveform)
    }

    /// Analyse every lead independently, in record order
    pub fn analyze_all(&self, lead_set: &LeadSet) -> EcgResult<Vec<LeadAnalysis>> {
        let leads: Vec<&Waveform> = lead_set.iter().collect();

        #[cfg(feature = "parallel")]
        let results = leads
            .par_iter()
            .map(|w| self.analyze_lead(w))
            .collect::<Vec<_>>();

        #[cfg(not(feature = "parallel"))]
        let results = leads
            .iter()
            .map(|w| self.analyze_lead(w))
            .collect::<Vec<_>>();

        results.into_iter().collect()
    }
}

impl Default for HeartRateAnalyzer {
    fn default() -> Self {
        HeartRateAnalyzer {
            conditioner: SignalConditioner::default(),
            detector: PeakDetector::default(),
            estimator: RateEstimator::new(),
        }
    }
}

/// Prefixed spellings of lead II (`MLII`, `ecg_II`), not lead III
fn is_lead_ii_variant(name: &str) -> bool {
    let upper = name.trim().to_ascii_uppercase();
    upper.ends_with("II") && !upper.ends_with("III")
}
