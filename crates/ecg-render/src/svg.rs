//! SVG output for rendered figures
//!
//! Canvas size is derived from the paper size so that one grid millimetre is
//! the same number of pixels on both axes.

use crate::figure::RenderedFigure;
use ecg_core::{EcgError, EcgResult};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const MINOR_LINE: RGBColor = RGBColor(240, 128, 128);
const MAJOR_LINE: RGBColor = RGBColor(220, 0, 0);
const LABEL_COLOR: RGBColor = RGBColor(0, 0, 255);
const MARKER_COLOR: RGBColor = RGBColor(255, 140, 0);

#[derive(Clone, Debug)]
pub struct SvgStyle {
    /// Output pixels per millimetre of paper
    pub px_per_mm: f64,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub font_size: u32,
    pub trace_width: u32,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            px_per_mm: 4.0,
            margin_left: 90,
            margin_right: 20,
            margin_top: 40,
            margin_bottom: 40,
            font_size: 14,
            trace_width: 1,
        }
    }
}

impl SvgStyle {
    /// Plot area in pixels, before margins
    pub fn plot_size(&self, figure: &RenderedFigure) -> (u32, u32) {
        let (w_mm, h_mm) = figure.grid().paper_size_mm();
        (
            (w_mm * self.px_per_mm).round() as u32,
            (h_mm * self.px_per_mm).round() as u32,
        )
    }

    /// Full canvas in pixels
    pub fn canvas_size(&self, figure: &RenderedFigure) -> (u32, u32) {
        let (w, h) = self.plot_size(figure);
        (
            w + self.margin_left + self.margin_right,
            h + self.margin_top + self.margin_bottom,
        )
    }
}

fn render_err<E: std::fmt::Debug>(err: E) -> EcgError {
    EcgError::Render {
        reason: format!("{err:?}"),
    }
}

/// Draw `figure` into an SVG document
pub fn render_svg(figure: &RenderedFigure, style: &SvgStyle) -> EcgResult<String> {
    let (width, height) = style.canvas_size(figure);
    if width == 0 || height == 0 {
        return Err(EcgError::Render {
            reason: "figure has an empty canvas".into(),
        });
    }

    let grid = figure.grid();
    let vertical = grid.vertical();
    let (y_min, y_max) = (vertical.min_mv(), vertical.max_mv());
    let seconds = grid.seconds();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin_left(style.margin_left)
            .margin_right(style.margin_right)
            .margin_top(style.margin_top)
            .margin_bottom(style.margin_bottom)
            .build_cartesian_2d(0f64..seconds, y_min..y_max)
            .map_err(render_err)?;

        // Minor lines first so major lines stay visible on top
        let minor = MINOR_LINE.mix(0.6).stroke_width(1);
        let major = MAJOR_LINE.stroke_width(1);
        for (times, amplitudes, line) in [
            (grid.minor_time_ticks(), grid.minor_amplitude_ticks(), minor),
            (grid.major_time_ticks(), grid.major_amplitude_ticks(), major),
        ] {
            chart
                .draw_series(
                    times
                        .iter()
                        .map(|&t| PathElement::new(vec![(t, y_min), (t, y_max)], line)),
                )
                .map_err(render_err)?;
            chart
                .draw_series(
                    amplitudes
                        .iter()
                        .map(|&a| PathElement::new(vec![(0.0, a), (seconds, a)], line)),
                )
                .map_err(render_err)?;
        }

        for trace in figure.traces() {
            chart
                .draw_series(LineSeries::new(
                    trace.points().iter().copied(),
                    BLACK.stroke_width(style.trace_width),
                ))
                .map_err(render_err)?;
        }

        chart
            .draw_series(
                figure
                    .markers()
                    .iter()
                    .map(|m| Circle::new((m.time_s, m.amplitude_mv), 4, MARKER_COLOR.filled())),
            )
            .map_err(render_err)?;

        let label_font = ("sans-serif", style.font_size)
            .into_font()
            .color(&LABEL_COLOR)
            .pos(Pos::new(HPos::Right, VPos::Center));
        for label in figure.labels() {
            let at = chart.backend_coord(&(label.time_s, label.amplitude_mv));
            root.draw(&Text::new(label.text.clone(), at, label_font.clone()))
                .map_err(render_err)?;
        }

        let centre = (width / 2) as i32;
        let heading = ("sans-serif", style.font_size + 4)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        if let Some(title) = figure.title() {
            let at = (centre, (style.margin_top / 2) as i32);
            root.draw(&Text::new(title.to_string(), at, heading))
                .map_err(render_err)?;
        }

        let caption = ("sans-serif", style.font_size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let at = (centre, (height - style.margin_bottom / 2) as i32);
        root.draw(&Text::new(figure.x_label().to_string(), at, caption.clone()))
            .map_err(render_err)?;

        // Reads bottom to top, left of the lead labels
        let (_, plot_height) = style.plot_size(figure);
        let at = (
            (style.margin_left / 4) as i32,
            (style.margin_top + plot_height / 2) as i32,
        );
        let vertical = caption.transform(FontTransform::Rotate270);
        root.draw(&Text::new(figure.y_label().to_string(), at, vertical))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    Ok(svg)
}
