//! Configuration management for ECG processing

use ecg_core::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};

/// Default cap on samples processed per call (about 33 minutes at 1 kHz)
pub const DEFAULT_MAX_SAMPLES: usize = 2_000_000;

/// Global processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Configuration name/profile
    pub name: String,
    /// Target use
    pub profile: ProcessingProfile,
    /// Cleaning stage parameters
    pub conditioner: ConditionerConfig,
    /// R-peak detection parameters
    pub detector: DetectorConfig,
    /// Upper bound on samples accepted by any single call
    pub max_samples: usize,
}

/// Processing profiles for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingProfile {
    /// Standard monitoring-grade cleaning
    Clinical,
    /// Steeper filters for offline review
    Research,
    /// Custom profile
    Custom,
}

/// Signal conditioner parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionerConfig {
    /// Baseline-wander highpass cutoff (Hz)
    pub highpass_hz: f64,
    /// Noise lowpass cutoff (Hz)
    pub lowpass_hz: f64,
    /// Butterworth order of each stage before the forward-backward pass
    pub order: usize,
    /// Powerline notch centre (Hz), disabled when `None`
    pub powerline_hz: Option<f64>,
    /// Notch quality factor
    pub powerline_q: f64,
}

/// Pan-Tompkins detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Moving-window integration width (s)
    pub integration_window_s: f64,
    /// Minimum spacing between accepted R-peaks (s)
    pub refractory_s: f64,
    /// Span used to seed the signal and noise levels (s)
    pub learning_period_s: f64,
    /// A gap longer than this multiple of the mean R-R triggers searchback
    pub searchback_factor: f64,
    /// Envelope maxima at or below this level mean "no QRS present"
    pub min_envelope: f64,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        ConditionerConfig {
            highpass_hz: 0.5,
            lowpass_hz: 40.0,
            order: 2,
            powerline_hz: Some(50.0),
            powerline_q: 30.0,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            integration_window_s: 0.150,
            refractory_s: 0.200,
            learning_period_s: 2.0,
            searchback_factor: 1.66,
            min_envelope: 1e-9,
        }
    }
}

impl ConditionerConfig {
    pub fn validate(&self) -> EcgResult<()> {
        if !(self.highpass_hz > 0.0) {
            return Err(EcgError::config("highpass cutoff must be positive"));
        }
        if !(self.lowpass_hz > self.highpass_hz) {
            return Err(EcgError::config(format!(
                "lowpass cutoff {} Hz must exceed highpass cutoff {} Hz",
                self.lowpass_hz, self.highpass_hz
            )));
        }
        if self.order < 2 || self.order > 8 || self.order % 2 != 0 {
            return Err(EcgError::config(format!(
                "filter order must be even and within 2..=8, got {}",
                self.order
            )));
        }
        if let Some(freq) = self.powerline_hz {
            if !(freq > 0.0) {
                return Err(EcgError::config("powerline frequency must be positive"));
            }
            if !(self.powerline_q > 0.0) {
                return Err(EcgError::config("powerline Q must be positive"));
            }
        }
        Ok(())
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> EcgResult<()> {
        let positive = [
            ("integration window", self.integration_window_s),
            ("refractory period", self.refractory_s),
            ("learning period", self.learning_period_s),
        ];
        for (label, value) in positive {
            if !(value > 0.0) {
                return Err(EcgError::config(format!("{label} must be positive, got {value}")));
            }
        }
        if !(self.searchback_factor > 1.0) {
            return Err(EcgError::config("searchback factor must exceed 1.0"));
        }
        if !(self.min_envelope >= 0.0) {
            return Err(EcgError::config("envelope floor must be non-negative"));
        }
        Ok(())
    }
}

impl ProcessingConfig {
    /// Standard cleaning: 0.5-40 Hz, second order, 50 Hz notch
    pub fn clinical() -> Self {
        ProcessingConfig {
            name: "Clinical ECG".to_string(),
            profile: ProcessingProfile::Clinical,
            conditioner: ConditionerConfig::default(),
            detector: DetectorConfig::default(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    /// Steeper fourth-order stages for offline review
    pub fn research() -> Self {
        ProcessingConfig {
            name: "Research ECG".to_string(),
            profile: ProcessingProfile::Research,
            conditioner: ConditionerConfig {
                order: 4,
                ..ConditionerConfig::default()
            },
            detector: DetectorConfig::default(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }

    /// Create configuration suitable for given profile
    pub fn for_profile(profile: ProcessingProfile) -> Self {
        match profile {
            ProcessingProfile::Clinical => Self::clinical(),
            ProcessingProfile::Research => Self::research(),
            ProcessingProfile::Custom => ProcessingConfig {
                name: "Custom ECG".to_string(),
                profile: ProcessingProfile::Custom,
                ..Self::clinical()
            },
        }
    }

    /// Validate entire configuration
    pub fn validate(&self) -> EcgResult<()> {
        if self.max_samples == 0 {
            return Err(EcgError::config("max_samples must be greater than 0"));
        }
        self.conditioner.validate()?;
        self.detector.validate()
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EcgError::config(format!("failed to serialize configuration: {e}")))
    }

    /// Import and validate configuration from JSON
    pub fn from_json(json: &str) -> EcgResult<Self> {
        let config: ProcessingConfig = serde_json::from_str(json)
            .map_err(|e| EcgError::config(format!("failed to deserialize configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::clinical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinical_config() {
        let config = ProcessingConfig::clinical();
        assert_eq!(config.profile, ProcessingProfile::Clinical);
        assert_eq!(config.conditioner.highpass_hz, 0.5);
        assert_eq!(config.conditioner.lowpass_hz, 40.0);
        assert_eq!(config.detector.integration_window_s, 0.150);
        assert_eq!(config.detector.refractory_s, 0.200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_profile_creation() {
        assert_eq!(
            ProcessingConfig::for_profile(ProcessingProfile::Research).conditioner.order,
            4
        );
        let custom = ProcessingConfig::for_profile(ProcessingProfile::Custom);
        assert_eq!(custom.profile, ProcessingProfile::Custom);
        assert!(custom.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ProcessingConfig::clinical();

        config.conditioner.lowpass_hz = 0.2;
        assert!(config.validate().is_err());

        config = ProcessingConfig::clinical();
        config.conditioner.order = 3;
        assert!(config.validate().is_err());

        config = ProcessingConfig::clinical();
        config.detector.refractory_s = 0.0;
        assert!(config.validate().is_err());

        config = ProcessingConfig::clinical();
        config.detector.searchback_factor = 1.0;
        assert!(config.validate().is_err());

        config = ProcessingConfig::clinical();
        config.max_samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_serialization() {
        let config = ProcessingConfig::research();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"Research\""));

        let restored = ProcessingConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let mut config = ProcessingConfig::clinical();
        config.conditioner.highpass_hz = -1.0;
        let json = serde_json::to_string(&config).unwrap();
        assert!(matches!(
            ProcessingConfig::from_json(&json),
            Err(EcgError::InvalidConfig { .. })
        ));
    }
}
