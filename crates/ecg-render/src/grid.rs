//! Calibrated ECG paper: 25 mm/s, 10 mm/mV
//!
//! The tick spacing below is the calibration itself. A minor square is 1 mm
//! (0.04 s by 0.1 mV) and a major square is 5 mm (0.20 s by 0.5 mV). These are
//! constants, not settings.

use crate::figure::{PeakMarker, RenderedFigure, Trace};
use ecg_core::{EcgError, EcgResult, PeakSet, Waveform};
use serde::Serialize;

pub const MINOR_TIME_STEP_S: f64 = 0.04;
pub const MAJOR_TIME_STEP_S: f64 = 0.20;
pub const MINOR_AMPLITUDE_STEP_MV: f64 = 0.1;
pub const MAJOR_AMPLITUDE_STEP_MV: f64 = 0.5;

/// Data-space aspect ratio that makes minor squares square
pub const ASPECT_RATIO: f64 = MINOR_TIME_STEP_S / MINOR_AMPLITUDE_STEP_MV;

pub const PAPER_SPEED_MM_PER_S: f64 = 25.0;
pub const GAIN_MM_PER_MV: f64 = 10.0;

/// Vertical extent of one sheet, in mV
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalRange {
    min_mv: f64,
    max_mv: f64,
}

impl VerticalRange {
    pub fn new(min_mv: f64, max_mv: f64) -> EcgResult<Self> {
        if !min_mv.is_finite() || !max_mv.is_finite() || min_mv >= max_mv {
            return Err(EcgError::InvalidGrid {
                reason: format!("vertical range [{min_mv}, {max_mv}] is empty or not finite"),
            });
        }
        Ok(Self { min_mv, max_mv })
    }

    /// The single-lead sheet: -2 to 2 mV
    pub fn single_lead() -> Self {
        Self {
            min_mv: -2.0,
            max_mv: 2.0,
        }
    }

    /// `[-1, leads * offset_step]` for a stacked view
    pub fn stacked(leads: usize, offset_step: f64) -> EcgResult<Self> {
        Self::new(-1.0, leads as f64 * offset_step)
    }

    /// The single-lead range, grown in major steps until `samples` fit
    pub fn covering(samples: &[f64]) -> Self {
        let base = Self::single_lead();
        let lo = samples.iter().copied().fold(base.min_mv, f64::min);
        let hi = samples.iter().copied().fold(base.max_mv, f64::max);
        Self {
            min_mv: (lo / MAJOR_AMPLITUDE_STEP_MV).floor() * MAJOR_AMPLITUDE_STEP_MV,
            max_mv: (hi / MAJOR_AMPLITUDE_STEP_MV).ceil() * MAJOR_AMPLITUDE_STEP_MV,
        }
    }

    pub fn min_mv(&self) -> f64 {
        self.min_mv
    }

    pub fn max_mv(&self) -> f64 {
        self.max_mv
    }

    pub fn span_mv(&self) -> f64 {
        self.max_mv - self.min_mv
    }
}

/// Tick layout of one calibrated sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpec {
    seconds: f64,
    vertical: VerticalRange,
    minor_time_ticks: Vec<f64>,
    major_time_ticks: Vec<f64>,
    minor_amplitude_ticks: Vec<f64>,
    major_amplitude_ticks: Vec<f64>,
}

impl GridSpec {
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn vertical(&self) -> VerticalRange {
        self.vertical
    }

    pub fn minor_time_ticks(&self) -> &[f64] {
        &self.minor_time_ticks
    }

    pub fn major_time_ticks(&self) -> &[f64] {
        &self.major_time_ticks
    }

    pub fn minor_amplitude_ticks(&self) -> &[f64] {
        &self.minor_amplitude_ticks
    }

    pub fn major_amplitude_ticks(&self) -> &[f64] {
        &self.major_amplitude_ticks
    }

    pub fn aspect_ratio(&self) -> f64 {
        ASPECT_RATIO
    }

    /// Paper size in millimetres at 25 mm/s and 10 mm/mV
    pub fn paper_size_mm(&self) -> (f64, f64) {
        (
            self.seconds * PAPER_SPEED_MM_PER_S,
            self.vertical.span_mv() * GAIN_MM_PER_MV,
        )
    }
}

/// `start, start + step, ...` strictly below `stop`
fn ticks(start: f64, stop: f64, step: f64) -> Vec<f64> {
    // The epsilon keeps 10 / 0.04 from producing a 251st tick at 10.0
    let count = ((stop - start) / step - 1e-9).ceil().max(0.0) as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Calibrated grid for a window of `seconds`
pub fn build_grid(seconds: f64, vertical: VerticalRange) -> EcgResult<GridSpec> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(EcgError::InvalidGrid {
            reason: format!("display window must be positive, got {seconds} s"),
        });
    }

    Ok(GridSpec {
        seconds,
        vertical,
        minor_time_ticks: ticks(0.0, seconds, MINOR_TIME_STEP_S),
        major_time_ticks: ticks(0.0, seconds, MAJOR_TIME_STEP_S),
        minor_amplitude_ticks: ticks(vertical.min_mv, vertical.max_mv, MINOR_AMPLITUDE_STEP_MV),
        major_amplitude_ticks: ticks(vertical.min_mv, vertical.max_mv, MAJOR_AMPLITUDE_STEP_MV),
    })
}

/// Puts single waveforms on calibrated paper
#[derive(Debug, Clone, Copy, Default)]
pub struct GridRenderer;

impl GridRenderer {
    pub fn new() -> Self {
        GridRenderer
    }

    pub fn build_grid(&self, seconds: f64, vertical: VerticalRange) -> EcgResult<GridSpec> {
        build_grid(seconds, vertical)
    }

    /// Draw the first `grid.seconds()` of `waveform` on `grid`.
    ///
    /// Fails with `WindowExceedsSignal` when the waveform is shorter than the
    /// grid's window.
    pub fn render(&self, waveform: &Waveform, grid: &GridSpec) -> EcgResult<RenderedFigure> {
        let window = waveform.window(grid.seconds())?;
        let mut figure = RenderedFigure::new(grid.clone());
        figure.push_trace(Trace::from_waveform(&window, 0.0));
        Ok(figure)
    }

    /// One lead on its own -2 to 2 mV sheet, titled "<record> - <lead>"
    pub fn render_lead_sheet(
        &self,
        waveform: &Waveform,
        seconds: f64,
        record_id: &str,
    ) -> EcgResult<RenderedFigure> {
        let grid = self.build_grid(seconds, VerticalRange::single_lead())?;
        Ok(self
            .render(waveform, &grid)?
            .with_title(format!("{record_id} - {}", waveform.lead_name())))
    }

    /// Conditioned lead with its detected R-peaks marked.
    ///
    /// `seconds` defaults to the whole signal. Only peaks inside the window
    /// are marked.
    pub fn render_detection(
        &self,
        conditioned: &Waveform,
        peaks: &PeakSet,
        seconds: Option<f64>,
    ) -> EcgResult<RenderedFigure> {
        let seconds = seconds.unwrap_or_else(|| conditioned.duration_s());
        let window = conditioned.window(seconds)?;
        let grid = self.build_grid(seconds, VerticalRange::covering(window.samples()))?;

        let fs = window.sampling_rate_hz();
        let samples = window.samples();
        let mut figure = self
            .render(&window, &grid)?
            .with_title(format!("R-peaks - {}", conditioned.lead_name()));
        for &index in peaks.indices().iter().filter(|&&i| i < samples.len()) {
            figure.push_marker(PeakMarker {
                time_s: index as f64 / fs,
                amplitude_mv: samples[index],
            });
        }
        Ok(figure)
    }
}
