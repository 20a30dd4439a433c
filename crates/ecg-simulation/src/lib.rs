//! ECG-Simulation: synthetic 12-lead ECG generation
//!
//! Provides deterministic, seedable ECG records with known R-peak positions
//! for testing and demonstration.

pub mod ecg_simulator;
pub mod rhythm;

pub use ecg_simulator::*;
pub use rhythm::*;
