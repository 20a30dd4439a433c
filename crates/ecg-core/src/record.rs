//! Record metadata and the diagnosis-code lookup seam
//!
//! Records carry free-text comment lines. A line starting with `Dx:` lists
//! comma-separated SNOMED-CT codes; resolving a code to its description is
//! done by whoever owns the reference table, through [`DiagnosisLookup`].

use std::collections::{BTreeMap, HashMap};

const DX_PREFIX: &str = "Dx:";

/// Resolves a diagnosis code to a human-readable description
pub trait DiagnosisLookup {
    fn describe(&self, code: u64) -> Option<&str>;
}

impl DiagnosisLookup for HashMap<u64, String> {
    fn describe(&self, code: u64) -> Option<&str> {
        self.get(&code).map(String::as_str)
    }
}

impl DiagnosisLookup for BTreeMap<u64, String> {
    fn describe(&self, code: u64) -> Option<&str> {
        self.get(&code).map(String::as_str)
    }
}

/// Identifier and annotations of one recording
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMetadata {
    pub record_id: String,
    pub comments: Vec<String>,
}

impl RecordMetadata {
    pub fn new(record_id: impl Into<String>, comments: Vec<String>) -> Self {
        Self {
            record_id: record_id.into(),
            comments,
        }
    }

    /// Diagnosis codes from every `Dx:` line, in order of appearance.
    ///
    /// Tokens that are not integers are skipped.
    pub fn diagnosis_codes(&self) -> Vec<u64> {
        self.comments
            .iter()
            .filter_map(|line| line.trim().strip_prefix(DX_PREFIX))
            .flat_map(|codes| codes.split(','))
            .filter_map(|code| code.trim().parse().ok())
            .collect()
    }

    /// Comment block with each diagnosis code expanded through `lookup`.
    ///
    /// Unknown codes are shown as `<code> - -`.
    pub fn annotated_comments(&self, lookup: &dyn DiagnosisLookup) -> String {
        let mut out = String::new();

        for line in &self.comments {
            match line.trim().strip_prefix(DX_PREFIX) {
                Some(codes) => {
                    out.push_str("Dx:\n");
                    for code in codes.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                        let description = code
                            .parse::<u64>()
                            .ok()
                            .and_then(|c| lookup.describe(c))
                            .unwrap_or("-");
                        out.push_str(&format!("{code} - {description}\n"));
                    }
                    out.push('\n');
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        out
    }
}
