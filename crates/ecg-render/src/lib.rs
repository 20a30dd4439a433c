//! ECG-Render: calibrated ECG paper and multi-lead layouts
//!
//! `grid` and `composer` build backend-neutral [`RenderedFigure`]s; `svg`
//! turns a figure into an SVG document through plotters.

pub mod composer;
pub mod figure;
pub mod grid;
pub mod svg;

pub use composer::{MultiLeadComposer, LABEL_TIME_S, STACK_OFFSET_MV};
pub use figure::{PeakMarker, RenderedFigure, Trace, TraceLabel};
pub use grid::{
    build_grid, GridRenderer, GridSpec, VerticalRange, ASPECT_RATIO, GAIN_MM_PER_MV,
    MAJOR_AMPLITUDE_STEP_MV, MAJOR_TIME_STEP_S, MINOR_AMPLITUDE_STEP_MV, MINOR_TIME_STEP_S,
    PAPER_SPEED_MM_PER_S,
};
pub use svg::{render_svg, SvgStyle};
