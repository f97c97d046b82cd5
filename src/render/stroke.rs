// src/render/stroke.rs
// The stroke primitive: one pressure-varying polyline drawn segment by
// segment so the line width can change mid-stroke.

use nannou::prelude::*;
use rand::Rng;

use crate::models::geometry::StrokePoint;
use crate::render::canvas::Canvas;

// Hand-tremor amplitudes. Jitter is applied at draw time only and is
// never written back into the point sequence.
const WIDTH_JITTER: f32 = 0.25;
const TREMOR: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct StrokeOptions {
    pub base_width: f32,
    pub max_width: f32,
    /// Tremor on: endpoint jitter and width micro-variation, for the
    /// synthetic pen. Off: segments land exactly where the input says,
    /// for manual capture fidelity.
    pub tremor: bool,
}

impl StrokeOptions {
    pub fn pressure_varying(base_width: f32, max_width: f32) -> Self {
        Self {
            base_width,
            max_width,
            tremor: true,
        }
    }

    /// Fixed-width, jitter-free rendering used by the capture pad.
    pub fn fixed(width: f32) -> Self {
        Self {
            base_width: width,
            max_width: width,
            tremor: false,
        }
    }
}

/// Draw `points` onto the canvas with the current stroke color. Fewer
/// than two points is a silent no-op: a single tap leaves no mark.
pub fn render_stroke(
    canvas: &mut Canvas,
    points: &[StrokePoint],
    options: &StrokeOptions,
    rng: &mut impl Rng,
) {
    if points.len() < 2 {
        return;
    }

    let span = options.max_width - options.base_width;
    let mut from = pt2(points[0].x, points[0].y);

    for point in &points[1..] {
        let pressure = match point.pressure {
            Some(p) => p,
            None if span > 0.0 => rng.gen_range(0.3..1.0),
            None => 1.0,
        };
        let mut width = options.base_width + span * pressure;
        let mut to = pt2(point.x, point.y);

        if options.tremor {
            width += rng.gen_range(-WIDTH_JITTER..WIDTH_JITTER);
            to.x += rng.gen_range(-TREMOR..TREMOR);
            to.y += rng.gen_range(-TREMOR..TREMOR);
        }

        // Fresh path per segment so the new width takes effect.
        canvas.set_line_width(width);
        canvas.begin_path();
        canvas.move_to(from);
        canvas.line_to(to);
        canvas.stroke();

        from = to;
    }
}
