//! End-to-end analysis of synthetic records

use ecg_core::EcgError;
use ecg_processing::{
    HeartRateAnalyzer, PeakDetector, ProcessingConfig, RateClassification, SignalConditioner,
};
use ecg_simulation::{EcgConfig, EcgSimulator, NoiseConfig, RhythmPattern, SyntheticRecord};

const TOLERANCE: isize = 3;
const EDGE: usize = 150;

fn simulate(rhythm: RhythmPattern, noise: NoiseConfig, seconds: f64) -> SyntheticRecord {
    let config = EcgConfig {
        rhythm,
        noise,
        powerline_hz: Some(50.0),
        seed: Some(2024),
        ..EcgConfig::default()
    };
    EcgSimulator::new(config).unwrap().generate(seconds).unwrap()
}

/// Every detection sits on a true beat, and no interior beat is missed.
/// Beats too close to either end to be fully enveloped may go undetected.
fn assert_matches_truth(found: &[usize], truth: &[usize], len: usize) {
    let near = |a: usize, b: usize| (a as isize - b as isize).abs() <= TOLERANCE;

    for f in found {
        assert!(truth.iter().any(|t| near(*f, *t)), "spurious peak at {f}");
    }
    for t in truth.iter().filter(|&&t| t >= EDGE && t + EDGE < len) {
        assert!(found.iter().any(|f| near(*f, *t)), "missed beat at {t}");
    }
}

#[test]
fn test_noisy_regular_rhythm() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 75.0 },
        NoiseConfig::default(),
        10.0,
    );
    let analyzer = HeartRateAnalyzer::new(&ProcessingConfig::clinical()).unwrap();
    let analysis = analyzer.analyze(&record.lead_set, None).unwrap();

    assert_eq!(analysis.lead_used, "II");
    assert_eq!(analysis.conditioned.len(), record.lead_set.samples_per_lead());
    assert_matches_truth(
        analysis.peaks.indices(),
        &record.r_peaks,
        record.lead_set.samples_per_lead(),
    );

    let report = analysis.rate_report().unwrap();
    assert!((report.mean_bpm - 75.0).abs() < 1.0);
    assert_eq!(report.classification, RateClassification::Normal);
    assert_eq!(report.per_interval_bpm.len(), analysis.peaks.len() - 1);
}

#[test]
fn test_rate_classes() {
    let analyzer = HeartRateAnalyzer::default();
    let cases = [
        (45.0, RateClassification::Bradycardic),
        (130.0, RateClassification::Tachycardic),
    ];

    for (bpm, expected) in cases {
        let record = simulate(RhythmPattern::Regular { bpm }, NoiseConfig::default(), 12.0);
        let analysis = analyzer.analyze(&record.lead_set, None).unwrap();
        let report = analysis.rate_report().unwrap();

        assert!((report.mean_bpm - bpm).abs() < 1.5, "bpm {bpm}: {report:?}");
        assert_eq!(report.classification, expected);
    }
}

#[test]
fn test_irregular_rhythm_peaks() {
    let record = simulate(
        RhythmPattern::Irregular {
            bpm: 80.0,
            variability: 0.15,
        },
        NoiseConfig::default(),
        15.0,
    );
    let analysis = HeartRateAnalyzer::default()
        .analyze(&record.lead_set, Some("II"))
        .unwrap();
    assert_matches_truth(
        analysis.peaks.indices(),
        &record.r_peaks,
        record.lead_set.samples_per_lead(),
    );
}

#[test]
fn test_detection_resumes_after_artifact() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 75.0 },
        NoiseConfig::default(),
        20.0,
    );
    let lead = record.lead_set.get("II").unwrap();
    let mut samples = lead.samples().to_vec();
    for sample in &mut samples[2500..2510] {
        *sample += 8.0;
    }
    let spiked = lead.with_samples(samples).unwrap();

    let analysis = HeartRateAnalyzer::default().analyze_lead(&spiked).unwrap();
    let found = analysis.peaks.indices();
    let len = spiked.len();

    let unaffected = record
        .r_peaks
        .iter()
        .filter(|&&t| t >= EDGE && t + EDGE < len)
        .filter(|&&t| t.abs_diff(2505) > EDGE);
    for t in unaffected {
        assert!(
            found
                .iter()
                .any(|f| (*f as isize - *t as isize).abs() <= TOLERANCE),
            "missed beat at {t}: {found:?}"
        );
    }
    assert!(found.iter().any(|&f| f > 3000));
}

#[test]
fn test_every_lead_is_analysed() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 75.0 },
        NoiseConfig::default(),
        10.0,
    );
    let analyses = HeartRateAnalyzer::default()
        .analyze_all(&record.lead_set)
        .unwrap();

    assert_eq!(analyses.len(), 12);
    for (analysis, name) in analyses.iter().zip(record.lead_set.names()) {
        assert_eq!(analysis.lead_used, name);
        let report = analysis.rate_report().unwrap();
        assert!((report.mean_bpm - 75.0).abs() < 1.0, "lead {name}: {report:?}");
    }
}

#[test]
fn test_explicit_inverted_lead() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 75.0 },
        NoiseConfig::none(),
        10.0,
    );
    let analysis = HeartRateAnalyzer::default()
        .analyze(&record.lead_set, Some("aVR"))
        .unwrap();

    assert_eq!(analysis.lead_used, "aVR");
    assert_matches_truth(
        analysis.peaks.indices(),
        &record.r_peaks,
        record.lead_set.samples_per_lead(),
    );
}

#[test]
fn test_stages_compose_like_the_analyzer() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 60.0 },
        NoiseConfig::default(),
        8.0,
    );
    let lead = record.lead_set.get("II").unwrap();

    let conditioned = SignalConditioner::default().condition(lead).unwrap();
    let peaks = PeakDetector::default().detect(&conditioned).unwrap();
    let analysis = HeartRateAnalyzer::default().analyze_lead(lead).unwrap();

    assert_eq!(analysis.conditioned, conditioned);
    assert_eq!(analysis.peaks, peaks);
}

#[test]
fn test_unknown_lead() {
    let record = simulate(
        RhythmPattern::Regular { bpm: 60.0 },
        NoiseConfig::none(),
        5.0,
    );
    let err = HeartRateAnalyzer::default()
        .analyze(&record.lead_set, Some("V7"))
        .unwrap_err();
    assert_eq!(
        err,
        EcgError::UnknownLead {
            lead: "V7".to_string()
        }
    );
}
