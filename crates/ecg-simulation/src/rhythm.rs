//! Pre-defined heart rhythm patterns for realistic simulation

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the instantaneous heart rate evolves over a record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RhythmPattern {
    /// Fixed rate, perfectly regular beats
    Regular { bpm: f64 },
    /// Rate modulated by breathing
    SinusArrhythmia {
        bpm: f64,
        /// Fractional rate swing, e.g. 0.1 for +/-10 %
        depth: f64,
        breathing_hz: f64,
    },
    /// Linear change of rate, then held at `end_bpm`
    Ramp {
        start_bpm: f64,
        end_bpm: f64,
        duration_s: f64,
    },
    /// Random beat-to-beat jitter around a mean rate
    Irregular {
        bpm: f64,
        /// Maximum fractional deviation of each R-R interval
        variability: f64,
    },
}

impl RhythmPattern {
    /// Instantaneous rate at `time` seconds, before any random jitter
    pub fn rate_at(&self, time: f64) -> f64 {
        match *self {
            RhythmPattern::Regular { bpm } => bpm,

            RhythmPattern::SinusArrhythmia {
                bpm,
                depth,
                breathing_hz,
            } => bpm * (1.0 + depth * (2.0 * PI * breathing_hz * time).sin()),

            RhythmPattern::Ramp {
                start_bpm,
                end_bpm,
                duration_s,
            } => {
                if time >= duration_s {
                    end_bpm
                } else {
                    start_bpm + (end_bpm - start_bpm) * (time / duration_s)
                }
            }

            RhythmPattern::Irregular { bpm, .. } => bpm,
        }
    }

    /// Fractional R-R jitter bound (zero for deterministic rhythms)
    pub fn variability(&self) -> f64 {
        match *self {
            RhythmPattern::Irregular { variability, .. } => variability,
            _ => 0.0,
        }
    }

    /// Highest rate the pattern can produce
    pub fn peak_bpm(&self) -> f64 {
        match *self {
            RhythmPattern::Regular { bpm } | RhythmPattern::Irregular { bpm, .. } => bpm,
            RhythmPattern::SinusArrhythmia { bpm, depth, .. } => bpm * (1.0 + depth.abs()),
            RhythmPattern::Ramp {
                start_bpm, end_bpm, ..
            } => start_bpm.max(end_bpm),
        }
    }

    /// Lowest rate the pattern can produce
    pub fn min_bpm(&self) -> f64 {
        match *self {
            RhythmPattern::Regular { bpm } | RhythmPattern::Irregular { bpm, .. } => bpm,
            RhythmPattern::SinusArrhythmia { bpm, depth, .. } => bpm * (1.0 - depth.abs()),
            RhythmPattern::Ramp {
                start_bpm, end_bpm, ..
            } => start_bpm.min(end_bpm),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RhythmPattern::Regular { .. } => "Regular sinus rhythm",
            RhythmPattern::SinusArrhythmia { .. } => "Respiratory sinus arrhythmia",
            RhythmPattern::Ramp { .. } => "Gradual rate change",
            RhythmPattern::Irregular { .. } => "Irregular rhythm",
        }
    }

    /// Create common preset patterns
    pub fn presets() -> Vec<(&'static str, RhythmPattern)> {
        vec![
            ("Resting", RhythmPattern::Regular { bpm: 72.0 }),
            ("Sinus Bradycardia", RhythmPattern::Regular { bpm: 45.0 }),
            ("Sinus Tachycardia", RhythmPattern::Regular { bpm: 130.0 }),
            (
                "Deep Breathing",
                RhythmPattern::SinusArrhythmia {
                    bpm: 70.0,
                    depth: 0.1,
                    breathing_hz: 0.2,
                },
            ),
            (
                "Exercise Onset",
                RhythmPattern::Ramp {
                    start_bpm: 70.0,
                    end_bpm: 120.0,
                    duration_s: 10.0,
                },
            ),
            (
                "Irregular",
                RhythmPattern::Irregular {
                    bpm: 80.0,
                    variability: 0.15,
                },
            ),
        ]
    }
}
