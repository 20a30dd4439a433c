//! QRS energy envelope: derivative, squaring and moving-window integration

use crate::processor::{ProcessorType, SignalProcessor};

/// Five-point central derivative scaled by `fs / 8`.
///
/// Centred so the slope maximum stays aligned with the upstroke; edges reuse
/// the boundary sample.
#[derive(Debug, Clone)]
pub struct Derivative {
    sampling_rate_hz: f64,
}

impl Derivative {
    pub fn new(sampling_rate_hz: f64) -> Self {
        Self { sampling_rate_hz }
    }
}

impl SignalProcessor for Derivative {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        let n = samples.len();
        if n == 0 {
            return Vec::new();
        }
        let at = |i: isize| samples[i.clamp(0, n as isize - 1) as usize];
        let gain = self.sampling_rate_hz / 8.0;

        (0..n as isize)
            .map(|i| gain * (2.0 * (at(i + 1) - at(i - 1)) + at(i + 2) - at(i - 2)))
            .collect()
    }

    fn name(&self) -> &str {
        "Five-point derivative"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Squaring;

impl SignalProcessor for Squaring {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|s| s * s).collect()
    }

    fn name(&self) -> &str {
        "Squaring"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

/// Trailing moving-window average.
///
/// `out[n]` is the mean of `in[n - w + 1..=n]`, with samples before the start
/// counted as zero, so every output is divided by the full width.
#[derive(Debug, Clone)]
pub struct MovingWindowIntegrator {
    width: usize,
}

impl MovingWindowIntegrator {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl SignalProcessor for MovingWindowIntegrator {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        if samples.is_empty() {
            return Vec::new();
        }
        // Summed per window: an all-zero stretch integrates to exactly zero
        let w = self.width;
        let mut padded = vec![0.0; w - 1];
        padded.extend_from_slice(samples);
        padded
            .windows(w)
            .map(|win| win.iter().sum::<f64>() / w as f64)
            .collect()
    }

    fn name(&self) -> &str {
        "Moving-window integrator"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Transform
    }
}

/// The full envelope chain for one sampling rate
pub fn envelope_chain(sampling_rate_hz: f64, window: usize) -> Vec<Box<dyn SignalProcessor>> {
    vec![
        Box::new(Derivative::new(sampling_rate_hz)),
        Box::new(Squaring),
        Box::new(MovingWindowIntegrator::new(window)),
    ]
}
