// src/render/letters.rs
// Turns a letterform template into strokes at a concrete position.

use nannou::prelude::*;
use rand::Rng;

use crate::models::geometry::StrokePoint;
use crate::models::glyph_model::{Anchor, TemplateBank, TemplateStroke};
use crate::render::canvas::Canvas;
use crate::render::stroke::{render_stroke, StrokeOptions};

// Per-letter shape variation and baseline wobble, drawn once per
// letter so its anchors stay coherent.
const VARIATION: f32 = 0.15;
const BASELINE_WOBBLE: f32 = 4.0;

/// Draw one letter with its template and return the horizontal advance
/// consumed. The advance is always `max_width`, independent of the
/// glyph's actual extent. Accepts any character; never fails.
#[allow(clippy::too_many_arguments)]
pub fn draw_letter(
    canvas: &mut Canvas,
    bank: &TemplateBank,
    letter: char,
    origin_x: f32,
    center_y: f32,
    max_width: f32,
    base_line_width: f32,
    max_line_width: f32,
    color: Rgb<f32>,
    rng: &mut impl Rng,
) -> f32 {
    canvas.set_color(color);

    let variation = rng.gen_range(-VARIATION..VARIATION);
    let wobble = rng.gen_range(-BASELINE_WOBBLE..BASELINE_WOBBLE);
    let center_y = center_y + wobble;

    let template = bank.template_for(letter);
    let place = |anchor: &Anchor| place_anchor(anchor, origin_x, center_y, max_width, variation);

    for stroke in &template.strokes {
        match stroke {
            TemplateStroke::Points { anchors } => {
                let points: Vec<StrokePoint> = anchors.iter().map(|a| place(a)).collect();
                let options = StrokeOptions::pressure_varying(base_line_width, max_line_width);
                render_stroke(canvas, &points, &options, rng);
            }
            TemplateStroke::Curves { start, segments } => {
                // Curve strokes keep one width for their whole length.
                let width =
                    base_line_width + rng.gen_range(0.0..1.0) * (max_line_width - base_line_width);
                canvas.set_line_width(width);
                canvas.begin_path();
                let from = place(start);
                canvas.move_to(pt2(from.x, from.y));
                for segment in segments {
                    let control = place(&segment.control);
                    let end = place(&segment.end);
                    canvas.quadratic_curve_to(pt2(control.x, control.y), pt2(end.x, end.y));
                }
                canvas.stroke();
            }
        }
    }

    max_width
}

fn place_anchor(
    anchor: &Anchor,
    origin_x: f32,
    center_y: f32,
    max_width: f32,
    variation: f32,
) -> StrokePoint {
    StrokePoint {
        x: origin_x + anchor.x * max_width,
        y: center_y + anchor.y + variation * anchor.sway,
        pressure: anchor.pressure,
    }
}
