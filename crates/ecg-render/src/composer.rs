//! Stacked multi-lead view in clinical order

use crate::figure::{RenderedFigure, Trace, TraceLabel};
use crate::grid::{build_grid, VerticalRange};
use ecg_core::{EcgResult, Lead, LeadSet, CANONICAL_LEAD_ORDER};
use tracing::{debug, warn};

/// Vertical distance between stacked leads, in mV
pub const STACK_OFFSET_MV: f64 = 1.0;

/// Horizontal position of lead labels, left of the time origin
pub const LABEL_TIME_S: f64 = -0.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLeadComposer;

impl MultiLeadComposer {
    pub fn new() -> Self {
        MultiLeadComposer
    }

    /// Stack the leads of `lead_set` bottom-to-top following `lead_order`.
    ///
    /// Leads named in `lead_order` but absent from the set are skipped; leads
    /// in the set but not in `lead_order` are not drawn.
    pub fn compose(
        &self,
        lead_set: &LeadSet,
        seconds: f64,
        lead_order: &[Lead],
    ) -> EcgResult<RenderedFigure> {
        let present: Vec<_> = lead_order
            .iter()
            .filter_map(|&lead| lead_set.find_lead(lead))
            .collect();
        if present.is_empty() {
            warn!(leads = ?lead_set.names(), "no drawable leads in the requested order");
        }

        let vertical = VerticalRange::stacked(present.len(), STACK_OFFSET_MV)?;
        let grid = build_grid(seconds, vertical)?;
        let mut figure =
            RenderedFigure::new(grid).with_y_label("Amplitude (10 mm/mV + offset)");

        for (i, waveform) in present.into_iter().enumerate() {
            let offset = i as f64 * STACK_OFFSET_MV;
            let window = waveform.window(seconds)?;
            figure.push_trace(Trace::from_waveform(&window, offset));
            figure.push_label(TraceLabel {
                text: waveform.lead_name().to_string(),
                time_s: LABEL_TIME_S,
                amplitude_mv: offset,
            });
        }

        debug!(traces = figure.traces().len(), seconds, "composed stacked view");
        Ok(figure)
    }

    /// `compose` with the standard order V6 ... I
    pub fn compose_canonical(&self, lead_set: &LeadSet, seconds: f64) -> EcgResult<RenderedFigure> {
        self.compose(lead_set, seconds, &CANONICAL_LEAD_ORDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecg_core::{EcgError, Waveform};

    fn lead_set(names: &[&str], n: usize) -> LeadSet {
        LeadSet::new(
            names
                .iter()
                .map(|name| Waveform::new(*name, 100.0, vec![0.1; n]).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_canonical_subset_order() {
        let set = lead_set(&["I", "V1", "aVR"], 1000);
        let figure = MultiLeadComposer::new().compose_canonical(&set, 10.0).unwrap();

        let names: Vec<_> = figure.traces().iter().map(|t| t.lead_name()).collect();
        assert_eq!(names, vec!["V1", "aVR", "I"]);

        let offsets: Vec<_> = figure.traces().iter().map(|t| t.offset_mv()).collect();
        assert_eq!(offsets, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_range_and_labels() {
        let set = lead_set(&["I", "V1", "aVR"], 1000);
        let figure = MultiLeadComposer::new().compose_canonical(&set, 10.0).unwrap();

        let vertical = figure.grid().vertical();
        assert_eq!((vertical.min_mv(), vertical.max_mv()), (-1.0, 3.0));
        assert_eq!(figure.grid().seconds(), 10.0);

        let labels = figure.labels();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[2].text, "I");
        assert_eq!(labels[2].time_s, -0.3);
        assert_eq!(labels[2].amplitude_mv, 2.0);
    }

    #[test]
    fn test_full_twelve_leads() {
        let names = [
            "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
        ];
        let set = lead_set(&names, 500);
        let figure = MultiLeadComposer::new().compose_canonical(&set, 5.0).unwrap();

        assert_eq!(figure.traces().len(), 12);
        assert_eq!(figure.traces()[0].lead_name(), "V6");
        assert_eq!(figure.traces()[11].lead_name(), "I");
        assert_eq!(figure.grid().vertical().max_mv(), 12.0);
        // 0.1 mV samples on the top lead sit at 11.1
        assert!((figure.traces()[11].points()[0].1 - 11.1).abs() < 1e-12);
    }

    #[test]
    fn test_custom_order_and_unknown_names() {
        let set = lead_set(&["II", "CH7"], 300);
        let figure = MultiLeadComposer::new()
            .compose(&set, 3.0, &[Lead::II, Lead::V4])
            .unwrap();
        assert_eq!(figure.traces().len(), 1);
        assert_eq!(figure.traces()[0].lead_name(), "II");
    }

    #[test]
    fn test_window_too_long() {
        let set = lead_set(&["II"], 300);
        assert_eq!(
            MultiLeadComposer::new().compose_canonical(&set, 10.0),
            Err(EcgError::WindowExceedsSignal {
                requested: 1000,
                available: 300
            })
        );
    }
}
