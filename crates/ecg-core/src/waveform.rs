//! Waveform and LeadSet: containers for raw ECG samples

use crate::error::{EcgError, EcgResult};
use crate::lead::Lead;
use serde::Serialize;

/// Samples of a single lead at a fixed sampling rate.
///
/// Immutable once constructed: every derived signal is a new `Waveform`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    lead_name: String,
    sampling_rate_hz: f64,
    samples: Vec<f64>,
}

impl Waveform {
    /// Create a waveform, rejecting bad rates and non-finite samples
    pub fn new(
        lead_name: impl Into<String>,
        sampling_rate_hz: f64,
        samples: Vec<f64>,
    ) -> EcgResult<Self> {
        let lead_name = lead_name.into();
        validate_sampling_rate(sampling_rate_hz)?;

        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(EcgError::NonFiniteSample {
                lead: lead_name,
                index,
            });
        }

        Ok(Waveform {
            lead_name,
            sampling_rate_hz,
            samples,
        })
    }

    pub fn lead_name(&self) -> &str {
        &self.lead_name
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration in seconds
    pub fn duration_s(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate_hz
    }

    /// Number of samples covering `seconds`, truncated toward zero
    pub fn samples_for(&self, seconds: f64) -> usize {
        (seconds * self.sampling_rate_hz) as usize
    }

    /// Same lead and rate, new sample values of identical length
    pub fn with_samples(&self, samples: Vec<f64>) -> EcgResult<Self> {
        if samples.len() != self.samples.len() {
            return Err(EcgError::LeadLengthMismatch {
                lead: self.lead_name.clone(),
                expected: self.samples.len(),
                actual: samples.len(),
            });
        }
        Waveform::new(self.lead_name.clone(), self.sampling_rate_hz, samples)
    }

    /// Leading window of `seconds` duration.
    ///
    /// Fails with `WindowExceedsSignal` rather than returning a shorter window.
    pub fn window(&self, seconds: f64) -> EcgResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(EcgError::InvalidGrid {
                reason: format!("window length must be positive, got {seconds} s"),
            });
        }

        let requested = self.samples_for(seconds);
        if requested > self.samples.len() {
            return Err(EcgError::WindowExceedsSignal {
                requested,
                available: self.samples.len(),
            });
        }

        Ok(Waveform {
            lead_name: self.lead_name.clone(),
            sampling_rate_hz: self.sampling_rate_hz,
            samples: self.samples[..requested].to_vec(),
        })
    }

    /// Time of each sample in seconds, for plotting
    pub fn time_vector(&self) -> Vec<f64> {
        let dt = 1.0 / self.sampling_rate_hz;
        (0..self.samples.len()).map(|i| i as f64 * dt).collect()
    }
}

/// Validate a sampling rate shared by every stage of the toolkit
pub fn validate_sampling_rate(rate: f64) -> EcgResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(EcgError::InvalidSamplingRate { rate })
    }
}

/// Leads of one recording, kept in record order.
///
/// Every waveform shares the same sampling rate and sample count, and lead
/// names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSet {
    leads: Vec<Waveform>,
}

impl LeadSet {
    pub fn new(leads: Vec<Waveform>) -> EcgResult<Self> {
        let first = leads.first().ok_or(EcgError::EmptyLeadSet)?;
        let expected_len = first.len();
        let expected_rate = first.sampling_rate_hz();

        for (i, lead) in leads.iter().enumerate() {
            if lead.sampling_rate_hz() != expected_rate {
                return Err(EcgError::SamplingRateMismatch {
                    lead: lead.lead_name().to_string(),
                    expected: expected_rate,
                    actual: lead.sampling_rate_hz(),
                });
            }
            if lead.len() != expected_len {
                return Err(EcgError::LeadLengthMismatch {
                    lead: lead.lead_name().to_string(),
                    expected: expected_len,
                    actual: lead.len(),
                });
            }
            if leads[..i].iter().any(|other| other.lead_name() == lead.lead_name()) {
                return Err(EcgError::DuplicateLead {
                    lead: lead.lead_name().to_string(),
                });
            }
        }

        Ok(LeadSet { leads })
    }

    /// Build from column-major samples, one column per name
    pub fn from_columns(
        names: &[&str],
        sampling_rate_hz: f64,
        columns: Vec<Vec<f64>>,
    ) -> EcgResult<Self> {
        if names.len() != columns.len() {
            return Err(EcgError::config(format!(
                "{} lead names for {} sample columns",
                names.len(),
                columns.len()
            )));
        }

        let leads = names
            .iter()
            .zip(columns)
            .map(|(name, samples)| Waveform::new(*name, sampling_rate_hz, samples))
            .collect::<EcgResult<Vec<_>>>()?;

        LeadSet::new(leads)
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.leads[0].sampling_rate_hz()
    }

    pub fn samples_per_lead(&self) -> usize {
        self.leads[0].len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waveform> {
        self.leads.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.leads.iter().map(|w| w.lead_name()).collect()
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&Waveform> {
        self.leads.iter().find(|w| w.lead_name() == name)
    }

    /// Lookup tolerant of spelling differences (`AVR` for `aVR`)
    pub fn find_lead(&self, lead: Lead) -> Option<&Waveform> {
        self.leads.iter().find(|w| lead.matches(w.lead_name()))
    }
}
