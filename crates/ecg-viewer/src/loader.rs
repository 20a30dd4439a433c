//! Record input: CSV lead columns, comment files and diagnosis tables

use anyhow::{bail, Context, Result};
use ecg_core::{LeadSet, RecordMetadata};
use ecg_simulation::{EcgConfig, EcgSimulator, RhythmPattern, SyntheticRecord};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Lead set from CSV text: a header row of lead names, then one row per sample
pub fn lead_set_from_csv<R: Read>(reader: R, sampling_rate_hz: f64) -> Result<LeadSet> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let names: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        bail!("CSV header names no leads");
    }

    let mut columns = vec![Vec::new(); names.len()];
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", row + 1))?;
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field.parse().with_context(|| {
                format!("Row {} lead '{}': '{field}' is not a number", row + 1, names[col])
            })?;
            columns[col].push(value);
        }
    }

    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    Ok(LeadSet::from_columns(&names, sampling_rate_hz, columns)?)
}

pub fn load_csv(path: &Path, sampling_rate_hz: f64) -> Result<LeadSet> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open record {}", path.display()))?;
    let lead_set = lead_set_from_csv(file, sampling_rate_hz)
        .with_context(|| format!("Failed to load record {}", path.display()))?;

    info!(
        leads = lead_set.len(),
        samples = lead_set.samples_per_lead(),
        "loaded record"
    );
    Ok(lead_set)
}

/// Regular 12-lead record with mild noise
pub fn synthesize(bpm: f64, sampling_rate_hz: f64, seconds: f64, seed: u64) -> Result<SyntheticRecord> {
    let config = EcgConfig {
        sampling_rate_hz,
        rhythm: RhythmPattern::Regular { bpm },
        seed: Some(seed),
        ..EcgConfig::default()
    };
    let record = EcgSimulator::new(config)
        .and_then(|mut simulator| simulator.generate(seconds))
        .context("Failed to synthesise record")?;

    info!(bpm, seconds, "synthesised record");
    Ok(record)
}

pub fn load_comments(path: &Path, record_id: &str) -> Result<RecordMetadata> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read comments {}", path.display()))?;
    let lines = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    Ok(RecordMetadata::new(record_id, lines))
}

/// `code,description` rows, header first
pub fn dx_table_from_csv<R: Read>(reader: R) -> Result<HashMap<u64, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut table = HashMap::new();
    for result in reader.records() {
        let record = result.context("Failed to read diagnosis table row")?;
        let code = record.get(0).context("Missing code column")?;
        let code: u64 = code
            .parse()
            .with_context(|| format!("Diagnosis code '{code}' is not an integer"))?;
        let description = record.get(1).unwrap_or("").to_string();
        table.insert(code, description);
    }
    Ok(table)
}

pub fn load_dx_table(path: &Path) -> Result<HashMap<u64, String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open diagnosis table {}", path.display()))?;
    dx_table_from_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::DiagnosisLookup;

    #[test]
    fn test_lead_set_from_csv() {
        let text = "I, II ,V1\n0.1,0.2,0.3\n0.4,0.5,0.6\n";
        let set = lead_set_from_csv(text.as_bytes(), 250.0).unwrap();

        assert_eq!(set.names(), vec!["I", "II", "V1"]);
        assert_eq!(set.samples_per_lead(), 2);
        assert_eq!(set.get("II").unwrap().samples(), &[0.2, 0.5]);
        assert_eq!(set.sampling_rate_hz(), 250.0);
    }

    #[test]
    fn test_bad_field_names_row_and_lead() {
        let text = "I,II\n0.1,0.2\n0.3,abc\n";
        let err = lead_set_from_csv(text.as_bytes(), 250.0).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Row 2"), "{message}");
        assert!(message.contains("'II'"), "{message}");
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let text = "I,II\n0.1,0.2\n0.3\n";
        assert!(lead_set_from_csv(text.as_bytes(), 250.0).is_err());
    }

    #[test]
    fn test_dx_table() {
        let text = "code,description\n426783006,sinus rhythm\n164889003, atrial fibrillation\n";
        let table = dx_table_from_csv(text.as_bytes()).unwrap();
        assert_eq!(table.describe(426783006), Some("sinus rhythm"));
        assert_eq!(table.describe(164889003), Some("atrial fibrillation"));
        assert_eq!(table.describe(1), None);
    }

    #[test]
    fn test_synthesize_record() {
        let record = synthesize(60.0, 250.0, 8.0, 3).unwrap();
        assert_eq!(record.lead_set.len(), 12);
        assert_eq!(record.lead_set.samples_per_lead(), 2000);
    }
}
