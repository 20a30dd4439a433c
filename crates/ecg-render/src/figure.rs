//! Backend-neutral description of a drawn ECG sheet

use crate::grid::GridSpec;
use ecg_core::Waveform;
use serde::Serialize;

/// One polyline, already shifted by its stacking offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    lead_name: String,
    offset_mv: f64,
    points: Vec<(f64, f64)>,
}

impl Trace {
    pub fn from_waveform(waveform: &Waveform, offset_mv: f64) -> Self {
        let points = waveform
            .time_vector()
            .into_iter()
            .zip(waveform.samples())
            .map(|(t, v)| (t, v + offset_mv))
            .collect();

        Trace {
            lead_name: waveform.lead_name().to_string(),
            offset_mv,
            points,
        }
    }

    pub fn lead_name(&self) -> &str {
        &self.lead_name
    }

    pub fn offset_mv(&self) -> f64 {
        self.offset_mv
    }

    /// `(time_s, amplitude_mv)` pairs
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Text anchored by its right edge at a data coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLabel {
    pub text: String,
    pub time_s: f64,
    pub amplitude_mv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakMarker {
    pub time_s: f64,
    pub amplitude_mv: f64,
}

/// Grid plus everything drawn on it.
///
/// Handed to a presentation backend as is. Nothing here depends on a
/// particular output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFigure {
    title: Option<String>,
    x_label: String,
    y_label: String,
    grid: GridSpec,
    traces: Vec<Trace>,
    labels: Vec<TraceLabel>,
    markers: Vec<PeakMarker>,
}

impl RenderedFigure {
    pub fn new(grid: GridSpec) -> Self {
        RenderedFigure {
            title: None,
            x_label: "Time (s) (25 mm/s)".to_string(),
            y_label: "Amplitude (mV) (10 mm/mV)".to_string(),
            grid,
            traces: Vec::new(),
            labels: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn push_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn push_label(&mut self, label: TraceLabel) {
        self.labels.push(label);
    }

    pub fn push_marker(&mut self, marker: PeakMarker) {
        self.markers.push(marker);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn labels(&self) -> &[TraceLabel] {
        &self.labels
    }

    pub fn markers(&self) -> &[PeakMarker] {
        &self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{build_grid, VerticalRange};

    #[test]
    fn test_trace_offset_and_timing() {
        let waveform = Waveform::new("I", 4.0, vec![0.0, 0.5, -0.5]).unwrap();
        let trace = Trace::from_waveform(&waveform, 2.0);

        assert_eq!(trace.lead_name(), "I");
        assert_eq!(trace.points(), &[(0.0, 2.0), (0.25, 2.5), (0.5, 1.5)]);
    }

    #[test]
    fn test_figure_builder() {
        let grid = build_grid(1.0, VerticalRange::single_lead()).unwrap();
        let mut figure = RenderedFigure::new(grid).with_title("demo");
        figure.push_marker(PeakMarker {
            time_s: 0.5,
            amplitude_mv: 1.0,
        });

        assert_eq!(figure.title(), Some("demo"));
        assert_eq!(figure.markers().len(), 1);
        assert!(figure.traces().is_empty());
        assert!(figure.x_label().contains("25 mm/s"));
    }

    #[test]
    fn test_figure_serializes_for_other_backends() {
        let grid = build_grid(0.2, VerticalRange::single_lead()).unwrap();
        let mut figure = RenderedFigure::new(grid);
        figure.push_label(TraceLabel {
            text: "II".into(),
            time_s: -0.3,
            amplitude_mv: 0.0,
        });

        let json = serde_json::to_value(&figure).unwrap();
        assert_eq!(json["labels"][0]["text"], "II");
        assert_eq!(json["grid"]["major_time_ticks"].as_array().unwrap().len(), 1);
        assert_eq!(json["grid"]["minor_time_ticks"].as_array().unwrap().len(), 5);
    }
}
