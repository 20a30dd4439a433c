//! Synthetic multi-lead ECG built from Gaussian P, Q, R, S and T waves

use crate::rhythm::RhythmPattern;
use ecg_core::waveform::validate_sampling_rate;
use ecg_core::{EcgError, EcgResult, Lead, LeadSet, RecordMetadata, Waveform};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Highest rate the simulator accepts
pub const MAX_SIMULATED_BPM: f64 = 300.0;

/// Configuration for ECG simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgConfig {
    pub sampling_rate_hz: f64,
    /// Leads to synthesise, in record order
    pub leads: Vec<Lead>,
    pub rhythm: RhythmPattern,
    pub noise: NoiseConfig,
    /// Power line interference (50/60Hz)
    pub powerline_hz: Option<f64>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

/// Artefacts added on top of the clean complexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Gaussian noise standard deviation in mV (0.0 = no noise)
    pub gaussian_std: f64,
    /// Baseline wander amplitude in mV
    pub baseline_wander: f64,
    /// Baseline wander frequency (respiration), Hz
    pub baseline_wander_hz: f64,
    /// Powerline hum amplitude in mV
    pub powerline_amplitude: f64,
}

impl NoiseConfig {
    /// No artefacts at all
    pub fn none() -> Self {
        Self {
            gaussian_std: 0.0,
            baseline_wander: 0.0,
            baseline_wander_hz: 0.25,
            powerline_amplitude: 0.0,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            gaussian_std: 0.02,
            baseline_wander: 0.15,
            baseline_wander_hz: 0.25,
            powerline_amplitude: 0.05,
        }
    }
}

/// The standard 12 leads in the order recording files store them
pub const STANDARD_RECORD_ORDER: [Lead; 12] = [
    Lead::I,
    Lead::II,
    Lead::III,
    Lead::AVR,
    Lead::AVL,
    Lead::AVF,
    Lead::V1,
    Lead::V2,
    Lead::V3,
    Lead::V4,
    Lead::V5,
    Lead::V6,
];

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 500.0,
            leads: STANDARD_RECORD_ORDER.to_vec(),
            rhythm: RhythmPattern::Regular { bpm: 72.0 },
            noise: NoiseConfig::default(),
            powerline_hz: Some(50.0),
            seed: None,
        }
    }
}

impl EcgConfig {
    /// Clean, seeded, regular rhythm at `bpm`
    pub fn regular(bpm: f64) -> Self {
        Self {
            rhythm: RhythmPattern::Regular { bpm },
            noise: NoiseConfig::none(),
            powerline_hz: None,
            seed: Some(0),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EcgResult<()> {
        validate_sampling_rate(self.sampling_rate_hz)?;
        if self.leads.is_empty() {
            return Err(EcgError::EmptyLeadSet);
        }
        if !(self.rhythm.min_bpm() > 0.0) || self.rhythm.peak_bpm() > MAX_SIMULATED_BPM {
            return Err(EcgError::config(format!(
                "rhythm rate must stay within (0, {MAX_SIMULATED_BPM}] bpm"
            )));
        }
        let variability = self.rhythm.variability();
        if !(0.0..0.5).contains(&variability) {
            return Err(EcgError::config("rhythm variability must be within [0, 0.5)"));
        }
        Ok(())
    }
}

/// One wave of the complex, positioned relative to the R-peak
#[derive(Debug, Clone, Copy)]
struct WaveShape {
    offset_s: f64,
    amplitude_mv: f64,
    width_s: f64,
}

const P_WAVE: WaveShape = WaveShape {
    offset_s: -0.20,
    amplitude_mv: 0.12,
    width_s: 0.025,
};
const Q_WAVE: WaveShape = WaveShape {
    offset_s: -0.035,
    amplitude_mv: -0.12,
    width_s: 0.010,
};
const R_WAVE: WaveShape = WaveShape {
    offset_s: 0.0,
    amplitude_mv: 1.0,
    width_s: 0.010,
};
const S_WAVE: WaveShape = WaveShape {
    offset_s: 0.035,
    amplitude_mv: -0.25,
    width_s: 0.010,
};
const T_WAVE: WaveShape = WaveShape {
    offset_s: 0.28,
    amplitude_mv: 0.30,
    width_s: 0.045,
};

/// Relative size and polarity of the complex as seen from each lead
pub fn lead_gain(lead: Lead) -> f64 {
    match lead {
        Lead::I => 0.7,
        Lead::II => 1.0,
        Lead::III => 0.5,
        Lead::AVR => -0.8,
        Lead::AVL => 0.35,
        Lead::AVF => 0.75,
        Lead::V1 => 0.5,
        Lead::V2 => 0.8,
        Lead::V3 => 1.0,
        Lead::V4 => 1.2,
        Lead::V5 => 1.1,
        Lead::V6 => 0.9,
    }
}

/// SNOMED-CT code describing the simulated rhythm
pub fn rhythm_code(rhythm: &RhythmPattern) -> u64 {
    match rhythm {
        RhythmPattern::SinusArrhythmia { .. } | RhythmPattern::Irregular { .. } => 427393009,
        _ if rhythm.rate_at(0.0) < 60.0 => 426177001,
        _ if rhythm.rate_at(0.0) > 100.0 => 427084000,
        _ => 426783006,
    }
}

/// Generated record plus the ground-truth R-peak positions
#[derive(Debug, Clone)]
pub struct SyntheticRecord {
    pub lead_set: LeadSet,
    /// Sample index of every R wave centre inside the record
    pub r_peaks: Vec<usize>,
    pub rhythm: RhythmPattern,
}

impl SyntheticRecord {
    /// Metadata with a `Dx:` line for the simulated rhythm
    pub fn metadata(&self, record_id: &str) -> RecordMetadata {
        RecordMetadata::new(
            record_id,
            vec![
                format!("Rhythm: {}", self.rhythm.description()),
                format!("Dx: {}", rhythm_code(&self.rhythm)),
            ],
        )
    }
}

/// ECG signal simulator
pub struct EcgSimulator {
    config: EcgConfig,
    rng: rand::rngs::StdRng,
    normal_dist: Normal<f64>,
}

impl EcgSimulator {
    pub fn new(config: EcgConfig) -> EcgResult<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        });

        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        let normal_dist = Normal::new(0.0, config.noise.gaussian_std)
            .map_err(|e| EcgError::config(format!("invalid noise level: {e}")))?;

        Ok(EcgSimulator {
            config,
            rng,
            normal_dist,
        })
    }

    pub fn config(&self) -> &EcgConfig {
        &self.config
    }

    /// Generate a record of `duration_s` seconds
    pub fn generate(&mut self, duration_s: f64) -> EcgResult<SyntheticRecord> {
        let fs = self.config.sampling_rate_hz;
        let n = (duration_s * fs).round() as usize;
        if !(duration_s > 0.0) || n == 0 {
            return Err(EcgError::config(format!(
                "duration must cover at least one sample, got {duration_s} s"
            )));
        }

        let beats = self.beat_times(duration_s);
        let template = Self::clean_trace(&beats, n, fs);

        let leads = self.config.leads.clone();
        let waveforms = leads
            .iter()
            .enumerate()
            .map(|(i, &lead)| {
                let samples = self.lead_samples(&template, lead, i);
                Waveform::new(lead.as_str(), fs, samples)
            })
            .collect::<EcgResult<Vec<_>>>()?;

        let r_peaks = beats
            .iter()
            .map(|t| (t * fs).round() as usize)
            .filter(|&idx| idx < n)
            .collect();

        Ok(SyntheticRecord {
            lead_set: LeadSet::new(waveforms)?,
            r_peaks,
            rhythm: self.config.rhythm,
        })
    }

    /// R-wave times in seconds, first beat half an interval into the record
    fn beat_times(&mut self, duration_s: f64) -> Vec<f64> {
        let rhythm = self.config.rhythm;
        let variability = rhythm.variability();

        let mut beats = Vec::new();
        let mut t = 0.5 * 60.0 / rhythm.rate_at(0.0);
        while t < duration_s {
            beats.push(t);
            let mut rr = 60.0 / rhythm.rate_at(t);
            if variability > 0.0 {
                rr *= 1.0 + self.rng.gen_range(-variability..variability);
            }
            t += rr;
        }
        beats
    }

    /// Unit-gain sum of all complexes
    fn clean_trace(beats: &[f64], n: usize, fs: f64) -> Vec<f64> {
        let mut trace = vec![0.0; n];
        for (k, &beat) in beats.iter().enumerate() {
            // QT follows the preceding interval (Bazett-style)
            let rr = if k > 0 { beat - beats[k - 1] } else { 1.0 };
            let t_wave = WaveShape {
                offset_s: T_WAVE.offset_s * rr.sqrt(),
                ..T_WAVE
            };
            for wave in [P_WAVE, Q_WAVE, R_WAVE, S_WAVE, t_wave] {
                add_wave(&mut trace, fs, beat + wave.offset_s, wave);
            }
        }
        trace
    }

    fn lead_samples(&mut self, template: &[f64], lead: Lead, lead_index: usize) -> Vec<f64> {
        let fs = self.config.sampling_rate_hz;
        let gain = lead_gain(lead);
        let noise = self.config.noise.clone();
        let wander_phase = 0.7 * lead_index as f64;

        template
            .iter()
            .enumerate()
            .map(|(i, &clean)| {
                let time = i as f64 / fs;
                let mut value = gain * clean;

                // Baseline wander (slow drift)
                value += noise.baseline_wander
                    * (2.0 * PI * noise.baseline_wander_hz * time + wander_phase).sin();

                if let Some(freq) = self.config.powerline_hz {
                    value += noise.powerline_amplitude * (2.0 * PI * freq * time).sin();
                }

                value + self.normal_dist.sample(&mut self.rng)
            })
            .collect()
    }

    /// Generate several records back to back with the same configuration
    pub fn generate_batch(&mut self, count: usize, duration_s: f64) -> EcgResult<Vec<SyntheticRecord>> {
        (0..count).map(|_| self.generate(duration_s)).collect()
    }
}

fn add_wave(trace: &mut [f64], fs: f64, centre_s: f64, wave: WaveShape) {
    let reach = 4.0 * wave.width_s;
    let start = ((centre_s - reach) * fs).ceil().max(0.0) as usize;
    let end = (((centre_s + reach) * fs).floor().max(-1.0) + 1.0) as usize;
    let end = end.min(trace.len());

    for (i, sample) in trace.iter_mut().enumerate().take(end).skip(start) {
        let dt = i as f64 / fs - centre_s;
        *sample += wave.amplitude_mv * (-dt * dt / (2.0 * wave.width_s * wave.width_s)).exp();
    }
}
