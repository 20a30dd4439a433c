//! Pan-Tompkins R-peak detection
//!
//! The conditioned signal is turned into a QRS energy envelope (see
//! [`crate::envelope`]). Local maxima of the envelope are classified against
//! an adaptive threshold that tracks running estimates of the signal-peak and
//! noise-peak levels. Each accepted envelope maximum is mapped back to the
//! largest absolute deflection of the signal inside the integration window,
//! which is reported as the R-peak.

use crate::conditioner::ConditionedSignal;
use crate::config::{DetectorConfig, DEFAULT_MAX_SAMPLES};
use crate::envelope::envelope_chain;
use crate::processor::apply_chain;
use ecg_core::waveform::validate_sampling_rate;
use ecg_core::{EcgError, EcgResult, PeakSet};
use tracing::{debug, warn};

/// Number of recent R-R intervals averaged for the searchback trigger
const RR_HISTORY: usize = 8;

/// R-R interval assumed before two beats have been seen (s)
const INITIAL_RR_S: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct PeakDetector {
    config: DetectorConfig,
    max_samples: usize,
}

/// Running signal/noise levels and the thresholds derived from them
#[derive(Debug, Clone, Copy)]
struct Levels {
    signal: f64,
    noise: f64,
}

impl Levels {
    fn threshold(&self) -> f64 {
        self.noise + 0.25 * (self.signal - self.noise)
    }

    fn searchback_threshold(&self) -> f64 {
        0.5 * self.threshold()
    }

    fn signal_peak(&mut self, value: f64) {
        self.signal = 0.125 * value + 0.875 * self.signal;
    }

    fn searchback_peak(&mut self, value: f64) {
        self.signal = 0.25 * value + 0.75 * self.signal;
    }

    fn noise_peak(&mut self, value: f64) {
        self.noise = 0.125 * value + 0.875 * self.noise;
    }
}

/// An envelope maximum together with the R index it maps to
#[derive(Debug, Clone, Copy)]
struct Candidate {
    envelope: f64,
    r_index: usize,
}

impl PeakDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn samples_for(seconds: f64, sampling_rate_hz: f64) -> usize {
        ((seconds * sampling_rate_hz).round() as usize).max(1)
    }

    /// QRS energy envelope of `samples`
    pub fn envelope(&self, samples: &[f64], sampling_rate_hz: f64) -> EcgResult<Vec<f64>> {
        validate_sampling_rate(sampling_rate_hz)?;
        if samples.len() > self.max_samples {
            return Err(EcgError::SignalTooLong {
                len: samples.len(),
                max: self.max_samples,
            });
        }
        let window = Self::samples_for(self.config.integration_window_s, sampling_rate_hz);
        Ok(apply_chain(
            &envelope_chain(sampling_rate_hz, window),
            samples,
        ))
    }

    pub fn detect(&self, signal: &ConditionedSignal) -> EcgResult<PeakSet> {
        self.detect_r_peaks(signal.samples(), signal.sampling_rate_hz())
    }

    /// Locate R-peaks. A signal without QRS activity yields an empty set.
    pub fn detect_r_peaks(&self, samples: &[f64], sampling_rate_hz: f64) -> EcgResult<PeakSet> {
        let envelope = self.envelope(samples, sampling_rate_hz)?;

        let envelope_max = envelope.iter().copied().fold(0.0, f64::max);
        if envelope_max <= self.config.min_envelope {
            warn!(samples = samples.len(), "flat envelope, no R-peaks");
            return Ok(PeakSet::empty());
        }

        let window = Self::samples_for(self.config.integration_window_s, sampling_rate_hz);
        let learning = Self::samples_for(self.config.learning_period_s, sampling_rate_hz)
            .min(envelope.len());

        let levels = initial_levels(&envelope[..learning]);
        let mut tracker = BeatTracker {
            samples,
            envelope: &envelope,
            levels,
            refractory: Self::samples_for(self.config.refractory_s, sampling_rate_hz),
            initial_rr: INITIAL_RR_S * sampling_rate_hz,
            searchback_factor: self.config.searchback_factor,
            min_envelope: self.config.min_envelope,
            peaks: Vec::new(),
            pending: Vec::new(),
            recovered_after: None,
        };
        debug!(
            signal_level = levels.signal,
            noise_level = levels.noise,
            window,
            refractory = tracker.refractory,
            "detector thresholds initialised"
        );

        for index in local_maxima(&envelope) {
            let candidate = Candidate {
                envelope: envelope[index],
                r_index: abs_argmax(samples, index.saturating_sub(window), index),
            };
            tracker.offer(candidate, index);
        }

        debug!(peaks = tracker.peaks.len(), "R-peak detection finished");
        PeakSet::new(tracker.peaks)
    }
}

/// Classification state of one detection pass
struct BeatTracker<'a> {
    samples: &'a [f64],
    envelope: &'a [f64],
    levels: Levels,
    refractory: usize,
    /// R-R interval assumed until two beats have been accepted, in samples
    initial_rr: f64,
    searchback_factor: f64,
    min_envelope: f64,
    peaks: Vec<usize>,
    /// Candidates rejected as noise since the last accepted beat
    pending: Vec<Candidate>,
    /// Beat after which recovery already ran
    recovered_after: Option<usize>,
}

impl BeatTracker<'_> {
    /// Longest gap after the last beat before it counts as overdue
    fn searchback_limit(&self) -> f64 {
        self.searchback_factor * mean_recent_rr(&self.peaks).unwrap_or(self.initial_rr)
    }

    /// Envelope maximum at `index` mapped to `candidate`
    fn offer(&mut self, candidate: Candidate, index: usize) {
        if let Some(&last) = self.peaks.last() {
            let overdue = candidate.r_index > last
                && (candidate.r_index - last) as f64 > self.searchback_limit();
            if overdue && self.recovered_after != Some(last) {
                self.recovered_after = Some(last);
                self.recover(last, candidate.r_index, index);
            }
        }
        self.classify(candidate);
    }

    fn classify(&mut self, candidate: Candidate) {
        if candidate.envelope <= self.levels.threshold() {
            self.levels.noise_peak(candidate.envelope);
            self.pending.push(candidate);
            return;
        }

        if let Some(&last) = self.peaks.last() {
            let r = candidate.r_index;
            if r <= last || r - last < self.refractory {
                // Same complex seen twice: keep the larger deflection
                if r > last && self.samples[r].abs() > self.samples[last].abs() {
                    if let Some(slot) = self.peaks.last_mut() {
                        *slot = r;
                    }
                    self.levels.signal_peak(candidate.envelope);
                }
                return;
            }
        }

        self.levels.signal_peak(candidate.envelope);
        self.peaks.push(candidate.r_index);
        self.pending.clear();
    }

    /// No beat since `last` for too long. Beats clearing the halved
    /// threshold are taken back from the rejected candidates; if none do,
    /// or a gap stays overdue, the levels are re-seeded instead.
    fn recover(&mut self, last: usize, next: usize, index: usize) {
        let limit = self.searchback_limit();
        let threshold = self.levels.searchback_threshold();

        let mut missed = Vec::new();
        let mut gaps = vec![(last, next)];
        while let Some((from, to)) = gaps.pop() {
            if let Some(beat) = searchback(&self.pending, threshold, from, to, self.refractory) {
                missed.push(beat);
                gaps.push((from, beat.r_index));
                gaps.push((beat.r_index, to));
            }
        }
        missed.sort_by_key(|c| c.r_index);

        let mut bounds = Vec::with_capacity(missed.len() + 2);
        bounds.push(last);
        bounds.extend(missed.iter().map(|c| c.r_index));
        bounds.push(next);
        let bridged = bounds.windows(2).all(|w| (w[1] - w[0]) as f64 <= limit);

        if missed.is_empty() || !bridged {
            self.reseed(index);
            return;
        }
        for beat in &missed {
            debug!(r_index = beat.r_index, "searchback recovered beat");
            self.levels.searchback_peak(beat.envelope);
            self.peaks.push(beat.r_index);
        }
        let recovered = self.peaks.last().copied().unwrap_or(last);
        self.pending.retain(|c| c.r_index > recovered);
    }

    /// Restart the levels from the envelope since the last beat and
    /// reclassify the candidates rejected in between.
    fn reseed(&mut self, index: usize) {
        let Some(&last) = self.peaks.last() else {
            return;
        };
        let start = (last + self.refractory).min(index);
        let stretch = &self.envelope[start..=index];
        if stretch.iter().copied().fold(0.0, f64::max) <= self.min_envelope {
            return;
        }

        self.levels = initial_levels(stretch);
        debug!(
            after = last,
            signal_level = self.levels.signal,
            noise_level = self.levels.noise,
            "detector thresholds re-seeded"
        );
        for candidate in std::mem::take(&mut self.pending) {
            self.classify(candidate);
        }
    }
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Seed levels from the learning stretch: a third of its maximum for the
/// signal level, half its mean for the noise level.
fn initial_levels(learning: &[f64]) -> Levels {
    let max = learning.iter().copied().fold(0.0, f64::max);
    let mean = if learning.is_empty() {
        0.0
    } else {
        learning.iter().sum::<f64>() / learning.len() as f64
    };
    Levels {
        signal: max / 3.0,
        noise: mean / 2.0,
    }
}

/// Indices of strict local maxima. A plateau counts once, at its first
/// sample, when the values on both sides are lower.
fn local_maxima(envelope: &[f64]) -> Vec<usize> {
    let n = envelope.len();
    let mut maxima = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if envelope[i] > envelope[i - 1] {
            let mut end = i;
            while end + 1 < n && envelope[end + 1] == envelope[i] {
                end += 1;
            }
            if end + 1 < n && envelope[end + 1] < envelope[i] {
                maxima.push(i);
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }
    maxima
}

/// Index of the largest |sample| in `start..=end` (first one on ties)
fn abs_argmax(samples: &[f64], start: usize, end: usize) -> usize {
    let end = end.min(samples.len().saturating_sub(1));
    let mut best = start;
    for i in start..=end {
        if samples[i].abs() > samples[best].abs() {
            best = i;
        }
    }
    best
}

fn mean_recent_rr(peaks: &[usize]) -> Option<f64> {
    if peaks.len() < 2 {
        return None;
    }
    let start = peaks.len().saturating_sub(RR_HISTORY + 1);
    let recent = &peaks[start..];
    let total: usize = recent.windows(2).map(|w| w[1] - w[0]).sum();
    Some(total as f64 / (recent.len() - 1) as f64)
}

/// Strongest noise candidate between `last` and `next` that clears the
/// lowered threshold and respects the refractory spacing on both sides.
fn searchback(
    candidates: &[Candidate],
    threshold: f64,
    last: usize,
    next: usize,
    refractory: usize,
) -> Option<Candidate> {
    candidates
        .iter()
        .filter(|c| c.envelope > threshold)
        .filter(|c| c.r_index > last && c.r_index - last >= refractory)
        .filter(|c| c.r_index < next && next - c.r_index >= refractory)
        .copied()
        .fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.envelope >= c.envelope => Some(b),
            _ => Some(c),
        })
}
