//! Zero-phase digital filters for ECG conditioning
//!
//! Filters are built from second-order biquad sections and always run
//! forward then backward over an edge-extended copy of the input, so peaks
//! keep their timing and the output length equals the input length.

use crate::processor::{ProcessorType, SignalProcessor};
use ecg_core::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Filter types used by the conditioner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    /// Butterworth lowpass filter
    ButterworthLowpass,
    /// Butterworth highpass filter
    ButterworthHighpass,
    /// Notch filter for powerline interference
    Notch,
}

/// Filter design parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter_type: FilterType,
    /// Butterworth order, even, 2 to 8
    pub order: usize,
    /// Cutoff (lowpass/highpass) or centre (notch) frequency in Hz
    pub frequency_hz: f64,
    /// Notch quality factor
    pub q: Option<f64>,
}

impl FilterConfig {
    pub fn lowpass(cutoff_hz: f64, order: usize) -> Self {
        Self {
            filter_type: FilterType::ButterworthLowpass,
            order,
            frequency_hz: cutoff_hz,
            q: None,
        }
    }

    pub fn highpass(cutoff_hz: f64, order: usize) -> Self {
        Self {
            filter_type: FilterType::ButterworthHighpass,
            order,
            frequency_hz: cutoff_hz,
            q: None,
        }
    }

    pub fn notch(freq_hz: f64, q: f64) -> Self {
        Self {
            filter_type: FilterType::Notch,
            order: 2,
            frequency_hz: freq_hz,
            q: Some(q),
        }
    }
}

/// Single biquad section (2nd order), transposed direct form II.
///
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadSection {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadSection {
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    fn lowpass(cutoff_hz: f64, fs: f64, q: f64) -> Self {
        let (cos_w0, alpha) = Self::angular(cutoff_hz, fs, q);
        let b0 = (1.0 - cos_w0) * 0.5;
        Self::normalized(b0, 1.0 - cos_w0, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    fn highpass(cutoff_hz: f64, fs: f64, q: f64) -> Self {
        let (cos_w0, alpha) = Self::angular(cutoff_hz, fs, q);
        let b0 = (1.0 + cos_w0) * 0.5;
        Self::normalized(b0, -(1.0 + cos_w0), b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    fn notch(center_hz: f64, fs: f64, q: f64) -> Self {
        let (cos_w0, alpha) = Self::angular(center_hz, fs, q);
        Self::normalized(1.0, -2.0 * cos_w0, 1.0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
    }

    fn angular(freq_hz: f64, fs: f64, q: f64) -> (f64, f64) {
        let w0 = 2.0 * PI * freq_hz / fs;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    /// Gain at 0 Hz
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Run the section over `input`, starting in the steady state the
    /// section would reach on a constant input equal to `input[0]`.
    fn run(&self, input: &[f64]) -> Vec<f64> {
        let Some(&x0) = input.first() else {
            return Vec::new();
        };

        let gain = self.dc_gain();
        let mut z2 = (self.b2 - self.a2 * gain) * x0;
        let mut z1 = (self.b1 - self.a1 * gain) * x0 + z2;

        input
            .iter()
            .map(|&x| {
                let y = self.b0 * x + z1;
                z1 = self.b1 * x - self.a1 * y + z2;
                z2 = self.b2 * x - self.a2 * y;
                y
            })
            .collect()
    }
}

/// Q of each biquad in an even-order Butterworth cascade
fn butterworth_qs(order: usize) -> Vec<f64> {
    let n = order as f64;
    (0..order / 2)
        .map(|k| 1.0 / (2.0 * (PI * (2 * k + 1) as f64 / (2.0 * n)).cos()))
        .collect()
}

/// A designed, zero-phase filter ready to apply at one sampling rate
#[derive(Debug, Clone)]
pub struct ZeroPhaseFilter {
    name: String,
    sections: Vec<BiquadSection>,
    pad_len: usize,
}

impl ZeroPhaseFilter {
    /// Design `config` for sampling rate `fs`.
    ///
    /// `pad_len` samples of odd reflection are added at each edge before
    /// filtering; it is clamped to the signal length at apply time.
    pub fn design(config: &FilterConfig, fs: f64, pad_len: usize) -> EcgResult<Self> {
        let nyquist = fs / 2.0;
        if !(config.frequency_hz > 0.0 && config.frequency_hz < nyquist) {
            return Err(EcgError::config(format!(
                "{:?} frequency {} Hz must lie in (0, {}) Hz",
                config.filter_type, config.frequency_hz, nyquist
            )));
        }

        let sections = match config.filter_type {
            FilterType::ButterworthLowpass | FilterType::ButterworthHighpass => {
                if config.order < 2 || config.order > 8 || config.order % 2 != 0 {
                    return Err(EcgError::config(format!(
                        "Butterworth order must be even and within 2..=8, got {}",
                        config.order
                    )));
                }
                butterworth_qs(config.order)
                    .into_iter()
                    .map(|q| match config.filter_type {
                        FilterType::ButterworthLowpass => {
                            BiquadSection::lowpass(config.frequency_hz, fs, q)
                        }
                        _ => BiquadSection::highpass(config.frequency_hz, fs, q),
                    })
                    .collect()
            }
            FilterType::Notch => {
                let q = config.q.unwrap_or(30.0);
                if q <= 0.0 {
                    return Err(EcgError::config("notch quality factor must be positive"));
                }
                vec![BiquadSection::notch(config.frequency_hz, fs, q)]
            }
        };

        Ok(ZeroPhaseFilter {
            name: format!("{:?} {} Hz", config.filter_type, config.frequency_hz),
            sections,
            pad_len,
        })
    }

    pub fn sections(&self) -> &[BiquadSection] {
        &self.sections
    }

    fn cascade(&self, input: Vec<f64>) -> Vec<f64> {
        self.sections
            .iter()
            .fold(input, |signal, section| section.run(&signal))
    }
}

impl SignalProcessor for ZeroPhaseFilter {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        if samples.len() < 2 {
            return samples.to_vec();
        }

        let pad = self.pad_len.min(samples.len() - 1);
        let extended = odd_extend(samples, pad);

        let mut forward = self.cascade(extended);
        forward.reverse();
        let mut backward = self.cascade(forward);
        backward.reverse();

        backward[pad..pad + samples.len()].to_vec()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

/// Point-symmetric extension about each end sample.
///
/// Keeps the signal and its slope continuous across the boundary, so the
/// filter's start-up transient is spent on the padding. `pad` is capped at
/// one less than the input length.
fn odd_extend(samples: &[f64], pad: usize) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
        return Vec::new();
    };
    let n = samples.len();
    let pad = pad.min(n - 1);

    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i]));
    out.extend_from_slice(samples);
    out.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / fs).sin())
            .collect()
    }

    fn peak_abs(samples: &[f64]) -> f64 {
        samples.iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn test_butterworth_qs() {
        let qs = butterworth_qs(2);
        assert!((qs[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        let qs = butterworth_qs(4);
        assert!((qs[0] - 0.5412).abs() < 1e-3);
        assert!((qs[1] - 1.3066).abs() < 1e-3);
    }

    #[test]
    fn test_dc_gains() {
        let lp = BiquadSection::lowpass(40.0, 500.0, 0.7071);
        let hp = BiquadSection::highpass(0.5, 500.0, 0.7071);
        assert!((lp.dc_gain() - 1.0).abs() < 1e-9);
        assert!(hp.dc_gain().abs() < 1e-9);
    }

    #[test]
    fn test_odd_extend() {
        let ext = odd_extend(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);

        assert!(odd_extend(&[], 3).is_empty());
        assert_eq!(odd_extend(&[5.0], 3), vec![5.0]);
        assert_eq!(odd_extend(&[1.0, 2.0], 9), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_lowpass_preserves_length_and_passband() {
        let fs = 500.0;
        let filter = ZeroPhaseFilter::design(&FilterConfig::lowpass(40.0, 2), fs, 100).unwrap();
        let input = sine(5.0, fs, 2000);
        let output = filter.process(&input);

        assert_eq!(output.len(), input.len());
        assert!((peak_abs(&output[200..1800]) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_lowpass_attenuates_stopband() {
        let fs = 500.0;
        let filter = ZeroPhaseFilter::design(&FilterConfig::lowpass(40.0, 4), fs, 100).unwrap();
        let output = filter.process(&sine(150.0, fs, 2000));
        assert!(peak_abs(&output[200..1800]) < 0.01);
    }

    #[test]
    fn test_highpass_removes_offset() {
        let fs = 250.0;
        let filter = ZeroPhaseFilter::design(&FilterConfig::highpass(0.5, 2), fs, 500).unwrap();
        let input = vec![3.0; 2000];
        let output = filter.process(&input);
        assert!(peak_abs(&output) < 1e-6);
    }

    #[test]
    fn test_notch_removes_powerline() {
        let fs = 500.0;
        let filter = ZeroPhaseFilter::design(&FilterConfig::notch(50.0, 30.0), fs, 500).unwrap();
        let output = filter.process(&sine(50.0, fs, 5000));
        assert!(peak_abs(&output[1000..4000]) < 0.05);
    }

    #[test]
    fn test_zero_phase_keeps_peak_position() {
        let fs = 500.0;
        let filter = ZeroPhaseFilter::design(&FilterConfig::lowpass(40.0, 2), fs, 100).unwrap();
        let mut input = vec![0.0; 1000];
        for (i, sample) in input.iter_mut().enumerate() {
            let t = (i as f64 - 500.0) / 5.0;
            *sample = (-0.5 * t * t).exp();
        }
        let output = filter.process(&input);
        let argmax = output
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0;
        assert_eq!(argmax, 500);
    }

    #[test]
    fn test_design_rejects_cutoff_above_nyquist() {
        let result = ZeroPhaseFilter::design(&FilterConfig::lowpass(300.0, 2), 500.0, 10);
        assert!(matches!(result, Err(EcgError::InvalidConfig { .. })));

        let result = ZeroPhaseFilter::design(&FilterConfig::highpass(0.5, 3), 500.0, 10);
        assert!(matches!(result, Err(EcgError::InvalidConfig { .. })));
    }
}
