//! Core signal processor trait

use serde::{Deserialize, Serialize};

/// A pure transform over one lead's samples.
///
/// Processors hold only their design parameters, so the same instance can be
/// shared across leads and threads.
pub trait SignalProcessor: Send + Sync {
    /// Transform `samples`, returning a sequence of the same length
    fn process(&self, samples: &[f64]) -> Vec<f64>;

    /// Get processor name/identifier
    fn name(&self) -> &str;

    /// Get processor type for pipeline organization
    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

/// Types of signal processors for pipeline organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorType {
    /// Frequency-selective cleaning stages
    Filter,
    /// Nonlinear or derivative stages building a detection envelope
    Transform,
}

/// Run `samples` through `processors` in order
pub fn apply_chain(processors: &[Box<dyn SignalProcessor>], samples: &[f64]) -> Vec<f64> {
    let mut current = samples.to_vec();
    for processor in processors {
        current = processor.process(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale(f64);

    impl SignalProcessor for Scale {
        fn process(&self, samples: &[f64]) -> Vec<f64> {
            samples.iter().map(|s| s * self.0).collect()
        }

        fn name(&self) -> &str {
            "scale"
        }
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain: Vec<Box<dyn SignalProcessor>> = vec![Box::new(Scale(2.0)), Box::new(Scale(3.0))];
        assert_eq!(apply_chain(&chain, &[1.0, -1.0]), vec![6.0, -6.0]);
        assert_eq!(chain[0].processor_type(), ProcessorType::Filter);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        assert_eq!(apply_chain(&[], &[1.0, 2.0]), vec![1.0, 2.0]);
    }
}
