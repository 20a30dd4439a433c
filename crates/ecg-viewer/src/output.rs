//! Figure files and the printed report

use crate::cli::Layout;
use anyhow::{Context, Result};
use ecg_core::LeadSet;
use ecg_processing::{LeadAnalysis, RateReport};
use ecg_render::{render_svg, GridRenderer, MultiLeadComposer, RenderedFigure, SvgStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What one run produced, printed as JSON
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub record_id: String,
    pub lead_used: String,
    pub peak_count: usize,
    /// Absent when fewer than two R-peaks were found
    pub rate: Option<RateReport>,
    pub figures: Vec<PathBuf>,
}

/// Writes figures of one record into an output directory
pub struct FigureWriter {
    out_dir: PathBuf,
    record_id: String,
    style: SvgStyle,
}

impl FigureWriter {
    pub fn new(out_dir: &Path, record_id: &str) -> Result<Self> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            record_id: record_id.to_string(),
            style: SvgStyle::default(),
        })
    }

    fn write(&self, suffix: &str, figure: &RenderedFigure) -> Result<PathBuf> {
        let path = self
            .out_dir
            .join(format!("{}_{}.svg", self.record_id, suffix));
        let svg = render_svg(figure, &self.style)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        std::fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote figure");
        Ok(path)
    }

    /// Lead sheets in the requested layout
    pub fn write_leads(&self, lead_set: &LeadSet, seconds: f64, layout: Layout) -> Result<Vec<PathBuf>> {
        match layout {
            Layout::Stacked => {
                let figure = MultiLeadComposer::new()
                    .compose_canonical(lead_set, seconds)
                    .context("Failed to compose stacked leads")?
                    .with_title(self.record_id.clone());
                Ok(vec![self.write("leads", &figure)?])
            }
            Layout::PerLead => {
                let renderer = GridRenderer::new();
                lead_set
                    .iter()
                    .map(|lead| {
                        let figure = renderer
                            .render_lead_sheet(lead, seconds, &self.record_id)
                            .with_context(|| format!("Failed to render lead {}", lead.lead_name()))?;
                        self.write(lead.lead_name(), &figure)
                    })
                    .collect()
            }
        }
    }

    /// Conditioned analysis lead with its R-peaks marked
    pub fn write_detection(&self, analysis: &LeadAnalysis, seconds: f64) -> Result<PathBuf> {
        let figure = GridRenderer::new()
            .render_detection(analysis.conditioned.waveform(), &analysis.peaks, Some(seconds))
            .context("Failed to render detected peaks")?;
        self.write("rpeaks", &figure)
    }
}

/// Clamp the display window to the record length
pub fn display_seconds(requested: f64, lead_set: &LeadSet) -> f64 {
    let available = lead_set.samples_per_lead() as f64 / lead_set.sampling_rate_hz();
    if requested > available {
        warn!(requested, available, "display window longer than record, showing all of it");
        available
    } else {
        requested
    }
}

pub fn run_report(
    record_id: &str,
    analysis: &LeadAnalysis,
    figures: Vec<PathBuf>,
) -> RunReport {
    RunReport {
        record_id: record_id.to_string(),
        lead_used: analysis.lead_used.clone(),
        peak_count: analysis.peaks.len(),
        rate: analysis.rate.clone(),
        figures,
    }
}
