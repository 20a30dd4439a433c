//! PeakSet: ordered R-peak sample indices

use crate::error::{EcgError, EcgResult};
use serde::Serialize;

/// Strictly increasing sample indices of detected R-peaks for one waveform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeakSet {
    indices: Vec<usize>,
}

impl PeakSet {
    pub fn new(indices: Vec<usize>) -> EcgResult<Self> {
        if let Some(position) = indices.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EcgError::UnorderedPeaks {
                position: position + 1,
            });
        }
        Ok(PeakSet { indices })
    }

    /// No peaks: the "rate undefined" outcome of detection
    pub fn empty() -> Self {
        PeakSet::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// R-R intervals in samples
    pub fn intervals(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.windows(2).map(|w| w[1] - w[0])
    }

    /// Peak times in seconds
    pub fn times_s(&self, sampling_rate_hz: f64) -> Vec<f64> {
        self.indices
            .iter()
            .map(|&i| i as f64 / sampling_rate_hz)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_set_ordering() {
        let peaks = PeakSet::new(vec![10, 410, 820]).unwrap();
        assert_eq!(peaks.intervals().collect::<Vec<_>>(), vec![400, 410]);

        let err = PeakSet::new(vec![10, 410, 410]).unwrap_err();
        assert_eq!(err, EcgError::UnorderedPeaks { position: 2 });
    }

    #[test]
    fn test_peak_times() {
        let peaks = PeakSet::new(vec![0, 250, 500]).unwrap();
        assert_eq!(peaks.times_s(500.0), vec![0.0, 0.5, 1.0]);
        assert!(PeakSet::empty().is_empty());
    }
}
