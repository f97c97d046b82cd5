// src/services/signature_service.rs
// Name-to-signature composition plus the display entry point that
// routes between the synthetic generator and manual-raster playback.

use nannou::image::imageops::{self, FilterType};
use nannou::image::RgbaImage;
use nannou::prelude::*;
use rand::Rng;
use std::error::Error;

use crate::models::geometry::{aspect_fit, FitRect};
use crate::models::glyph_model::TemplateBank;
use crate::models::signature_model::{SignatureMode, SignatureSpec, SignatureState, SignatureStyle};
use crate::render::canvas::Canvas;
use crate::render::letters::draw_letter;
use crate::utilities::font5x7;

// Layout constants from the letter spacing rule: a glyph consumes 0.8
// of its slot, the gap 0.3, and the flourish trails the last letter.
const GLYPH_SHARE: f32 = 0.8;
const GAP_SHARE: f32 = 0.3;
const FLOURISH_OFFSET: f32 = 10.0;

/// Display entry point. Auto mode synthesizes from the name; manual
/// mode replays the stored raster, falling back to the plain name as
/// text if the raster cannot be decoded.
pub fn display_signature(
    canvas: &mut Canvas,
    bank: &TemplateBank,
    style: &SignatureStyle,
    state: &SignatureState,
    name: &str,
    rng: &mut impl Rng,
) {
    if state.mode() == SignatureMode::Manual {
        if let Some(data) = state.manual_data() {
            if let Err(err) = display_manual_signature(canvas, data) {
                eprintln!("Failed to decode stored signature: {}", err);
                draw_name_fallback(canvas, style, name);
            }
            return;
        }
    }
    generate_signature(canvas, bank, style, name, rng);
}

/// Synthesize a signature for `name`. Completes for any input; an
/// empty name draws just the flourish.
pub fn generate_signature(
    canvas: &mut Canvas,
    bank: &TemplateBank,
    style: &SignatureStyle,
    name: &str,
    rng: &mut impl Rng,
) {
    canvas.clear();
    canvas.reset_style();

    let spec = SignatureSpec::from_name(name, style, rng);
    let center_y = canvas.height() as f32 / 2.0;
    let available = canvas.width() as f32 - 2.0 * style.margin;

    let mut current_x = style.margin;
    if !spec.initials.is_empty() {
        let spacing = available / (spec.initials.len() + 1) as f32;
        for &letter in &spec.initials {
            current_x += draw_letter(
                canvas,
                bank,
                letter,
                current_x,
                center_y,
                spacing * GLYPH_SHARE,
                spec.base_line_width,
                spec.max_line_width,
                spec.color,
                rng,
            );
            current_x += spacing * GAP_SHARE;
        }
    }

    draw_flourish(canvas, current_x + FLOURISH_OFFSET, center_y, &spec);
}

// Two joined quadratic curves forming a small loop, plus a dot.
fn draw_flourish(canvas: &mut Canvas, x: f32, y: f32, spec: &SignatureSpec) {
    canvas.set_color(spec.color);
    canvas.set_line_width(spec.base_line_width);

    canvas.begin_path();
    canvas.move_to(pt2(x, y));
    canvas.quadratic_curve_to(pt2(x + 15.0, y - 8.0), pt2(x + 25.0, y + 2.0));
    canvas.quadratic_curve_to(pt2(x + 35.0, y + 12.0), pt2(x + 20.0, y + 8.0));
    canvas.stroke();

    canvas.begin_path();
    canvas.arc(pt2(x + 30.0, y - 5.0), 1.0);
    canvas.fill();
}

/// Decode an encoded raster and center-fit it onto the canvas,
/// preserving aspect ratio. Stateless; not the capture machine.
pub fn display_manual_signature(canvas: &mut Canvas, data: &[u8]) -> Result<(), Box<dyn Error>> {
    let image = nannou::image::load_from_memory(data)?.to_rgba8();

    canvas.clear();
    let fit = aspect_fit(
        (image.width() as f32, image.height() as f32),
        (canvas.width() as f32, canvas.height() as f32),
    );
    blit_image(canvas, &image, fit);
    Ok(())
}

fn blit_image(canvas: &mut Canvas, image: &RgbaImage, fit: FitRect) {
    let width = (fit.width.round() as u32).max(1);
    let height = (fit.height.round() as u32).max(1);
    let scaled = imageops::resize(image, width, height, FilterType::Triangle);

    let x0 = fit.x.round().max(0.0) as u32;
    let y0 = fit.y.round().max(0.0) as u32;

    let mut span = Vec::with_capacity((width * 4) as usize);
    for (row_idx, row) in scaled.rows().enumerate() {
        span.clear();
        for pixel in row {
            // Composite over the opaque white background.
            let alpha = pixel.0[3] as f32 / 255.0;
            for channel in 0..3 {
                let value = pixel.0[channel] as f32 * alpha + 255.0 * (1.0 - alpha);
                span.push(value.round() as u8);
            }
            span.push(255);
        }
        canvas.write_span(x0, y0 + row_idx as u32, &span);
    }
}

/// Decode-failure fallback: the plain name, centered.
pub fn draw_name_fallback(canvas: &mut Canvas, style: &SignatureStyle, name: &str) {
    canvas.clear();

    let label = name.trim().to_uppercase();
    if label.is_empty() {
        return;
    }

    let scale = 2;
    let width = font5x7::text_width(&label, scale) as i32;
    let x = ((canvas.width() as i32 - width) / 2).max(style.margin as i32);
    let y = (canvas.height() as i32 - font5x7::text_height(scale) as i32) / 2;
    font5x7::draw_text(canvas, x, y, scale, &label, style.ink);
}
