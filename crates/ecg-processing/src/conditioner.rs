//! Baseline and noise removal ahead of QRS detection

use crate::config::{ConditionerConfig, DEFAULT_MAX_SAMPLES};
use crate::filters::{FilterConfig, ZeroPhaseFilter};
use crate::processor::{apply_chain, SignalProcessor};
use ecg_core::waveform::validate_sampling_rate;
use ecg_core::{EcgError, EcgResult, Waveform};
use serde::Serialize;
use tracing::{debug, warn};

/// A waveform after conditioning: same lead, rate and length, cleaned values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConditionedSignal(Waveform);

impl ConditionedSignal {
    pub fn waveform(&self) -> &Waveform {
        &self.0
    }

    pub fn samples(&self) -> &[f64] {
        self.0.samples()
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.0.sampling_rate_hz()
    }

    pub fn lead_name(&self) -> &str {
        self.0.lead_name()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_waveform(self) -> Waveform {
        self.0
    }
}

/// Zero-phase highpass + lowpass (+ optional notch) cleaning stage.
///
/// Filters are designed per call from the waveform's own sampling rate, so
/// one conditioner serves records of any rate.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    config: ConditionerConfig,
    max_samples: usize,
}

impl SignalConditioner {
    pub fn new(config: ConditionerConfig) -> Self {
        Self {
            config,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn config(&self) -> &ConditionerConfig {
        &self.config
    }

    /// Longest effective kernel: one period of the highpass cutoff.
    fn kernel_len(&self, sampling_rate_hz: f64) -> usize {
        (sampling_rate_hz / self.config.highpass_hz).ceil() as usize
    }

    /// Minimum input length accepted at the given rate
    pub fn required_samples(&self, sampling_rate_hz: f64) -> usize {
        self.kernel_len(sampling_rate_hz).saturating_mul(2)
    }

    pub fn condition(&self, waveform: &Waveform) -> EcgResult<ConditionedSignal> {
        self.config.validate()?;
        let fs = waveform.sampling_rate_hz();
        validate_sampling_rate(fs)?;

        let len = waveform.len();
        if len > self.max_samples {
            return Err(EcgError::SignalTooLong {
                len,
                max: self.max_samples,
            });
        }

        let required = self.required_samples(fs);
        if len < required {
            return Err(EcgError::InsufficientSamples {
                required,
                actual: len,
            });
        }

        let stages = self.design_stages(fs)?;
        let cleaned = apply_chain(&stages, waveform.samples());

        debug!(
            lead = waveform.lead_name(),
            samples = len,
            stages = stages.len(),
            "conditioned waveform"
        );

        waveform.with_samples(cleaned).map(ConditionedSignal)
    }

    fn design_stages(&self, fs: f64) -> EcgResult<Vec<Box<dyn SignalProcessor>>> {
        let nyquist = fs / 2.0;
        let pad_len = self.kernel_len(fs);
        let cfg = &self.config;

        if cfg.highpass_hz >= nyquist {
            return Err(EcgError::config(format!(
                "highpass cutoff {} Hz is not below the Nyquist frequency {nyquist} Hz",
                cfg.highpass_hz
            )));
        }

        let mut stages: Vec<Box<dyn SignalProcessor>> = vec![Box::new(ZeroPhaseFilter::design(
            &FilterConfig::highpass(cfg.highpass_hz, cfg.order),
            fs,
            pad_len,
        )?)];

        if cfg.lowpass_hz < nyquist {
            stages.push(Box::new(ZeroPhaseFilter::design(
                &FilterConfig::lowpass(cfg.lowpass_hz, cfg.order),
                fs,
                pad_len,
            )?));
        } else {
            warn!(
                cutoff_hz = cfg.lowpass_hz,
                nyquist_hz = nyquist,
                "lowpass cutoff above Nyquist, stage skipped"
            );
        }

        if let Some(freq) = cfg.powerline_hz {
            if freq < 0.95 * nyquist {
                stages.push(Box::new(ZeroPhaseFilter::design(
                    &FilterConfig::notch(freq, cfg.powerline_q),
                    fs,
                    pad_len,
                )?));
            } else {
                warn!(
                    powerline_hz = freq,
                    nyquist_hz = nyquist,
                    "powerline notch too close to Nyquist, stage skipped"
                );
            }
        }

        Ok(stages)
    }
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::new(ConditionerConfig::default())
    }
}
