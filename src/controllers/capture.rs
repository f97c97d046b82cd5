// src/controllers/capture.rs
// Free-hand capture state machine: Idle -> Drawing -> Idle, driven by
// pointer and touch events already expressed in device (window
// top-left) coordinates.

use nannou::prelude::*;
use rand::Rng;

use crate::models::geometry::StrokePoint;
use crate::render::canvas::Canvas;
use crate::render::stroke::{render_stroke, StrokeOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Gesture finished with ink on the surface: the encoded raster.
    Signature(Vec<u8>),
    /// Explicit clear, distinct from "nothing was drawn".
    Cleared,
}

pub struct CapturePad {
    is_drawing: bool,
    last: Point2,
    is_empty: bool,
    line_width: f32,
    ink: Rgb<f32>,
    surface_origin: Vec2,
    active_touch: Option<u64>,
    events: Vec<CaptureEvent>,
}

impl CapturePad {
    pub fn new(line_width: f32, ink: Rgb<f32>) -> Self {
        Self {
            is_drawing: false,
            last: pt2(0.0, 0.0),
            is_empty: true,
            line_width,
            ink,
            surface_origin: Vec2::ZERO,
            active_touch: None,
            events: Vec::new(),
        }
    }

    /// Top-left of the canvas in device coordinates. Pointer positions
    /// are translated against this before any drawing.
    pub fn set_surface_origin(&mut self, origin: Vec2) {
        self.surface_origin = origin;
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn is_signature_empty(&self) -> bool {
        self.is_empty
    }

    pub fn pointer_down(&mut self, canvas: &Canvas, device: Point2) {
        let local = self.to_local(device);
        if !in_bounds(canvas, local) {
            return;
        }
        self.is_drawing = true;
        self.last = local;
    }

    /// Only processed while drawing. Draws the incremental segment
    /// exactly as input: fixed width, no jitter, no pressure.
    pub fn pointer_move(&mut self, canvas: &mut Canvas, rng: &mut impl Rng, device: Point2) {
        if !self.is_drawing {
            return;
        }
        let local = self.to_local(device);
        if !in_bounds(canvas, local) {
            // Leaving the pad ends the gesture, like the cursor
            // leaving the surface.
            self.pointer_up(canvas);
            return;
        }

        canvas.set_color(self.ink);
        let segment = [
            StrokePoint::new(self.last.x, self.last.y),
            StrokePoint::new(local.x, local.y),
        ];
        render_stroke(canvas, &segment, &StrokeOptions::fixed(self.line_width), rng);

        self.last = local;
        self.is_empty = false;
    }

    /// Ends the gesture; a non-empty surface emits its raster. An empty
    /// gesture emits nothing.
    pub fn pointer_up(&mut self, canvas: &Canvas) {
        if !self.is_drawing {
            return;
        }
        self.is_drawing = false;

        if self.is_empty {
            return;
        }
        match canvas.encode_png() {
            Ok(data) => self.events.push(CaptureEvent::Signature(data)),
            Err(err) => eprintln!("Failed to encode captured signature: {}", err),
        }
    }

    /// Back to idle without emitting output.
    pub fn pointer_cancel(&mut self) {
        self.is_drawing = false;
    }

    /// Touch input goes through the same transitions; only the first
    /// active touch point is tracked.
    pub fn touch(
        &mut self,
        canvas: &mut Canvas,
        rng: &mut impl Rng,
        id: u64,
        phase: TouchPhase,
        device: Point2,
    ) {
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_none() {
                    self.active_touch = Some(id);
                    self.pointer_down(canvas, device);
                }
            }
            TouchPhase::Moved => {
                if self.active_touch == Some(id) {
                    self.pointer_move(canvas, rng, device);
                }
            }
            TouchPhase::Ended => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    self.pointer_up(canvas);
                }
            }
            TouchPhase::Cancelled => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    self.pointer_cancel();
                }
            }
        }
    }

    /// Reset to idle, erase the surface, and tell observers the pad
    /// was explicitly cleared.
    pub fn clear(&mut self, canvas: &mut Canvas) {
        self.is_drawing = false;
        self.active_touch = None;
        canvas.clear();
        self.is_empty = true;
        self.events.push(CaptureEvent::Cleared);
    }

    /// Encoded raster if anything was drawn, else empty. Never mutates
    /// state.
    pub fn signature_data(&self, canvas: &Canvas) -> Vec<u8> {
        if self.is_empty {
            return Vec::new();
        }
        canvas.encode_png().unwrap_or_else(|err| {
            eprintln!("Failed to encode captured signature: {}", err);
            Vec::new()
        })
    }

    pub fn take_events(&mut self) -> Vec<CaptureEvent> {
        std::mem::take(&mut self.events)
    }

    fn to_local(&self, device: Point2) -> Point2 {
        device - self.surface_origin
    }
}

fn in_bounds(canvas: &Canvas, point: Point2) -> bool {
    point.x >= 0.0
        && point.y >= 0.0
        && point.x < canvas.width() as f32
        && point.y < canvas.height() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pad() -> CapturePad {
        CapturePad::new(2.0, rgb(0.1, 0.14, 0.49))
    }

    #[test]
    fn test_down_move_up_round_trip() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 10.0));
        assert!(pad.is_drawing());
        pad.pointer_move(&mut canvas, &mut rng, pt2(20.0, 20.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(30.0, 15.0));
        pad.pointer_up(&canvas);

        assert!(!pad.is_drawing());
        assert!(!pad.is_signature_empty());
        assert!(!pad.signature_data(&canvas).is_empty());

        let events = pad.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], CaptureEvent::Signature(data) if !data.is_empty()));
    }

    #[test]
    fn test_tap_without_movement_emits_nothing() {
        let canvas = Canvas::new(100, 50);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 10.0));
        pad.pointer_up(&canvas);

        assert!(pad.is_signature_empty());
        assert!(pad.signature_data(&canvas).is_empty());
        assert!(pad.take_events().is_empty());
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_manual_strokes_land_exactly_where_input_says() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 25.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(40.0, 25.0));
        pad.pointer_up(&canvas);

        // No jitter: the midpoint of the segment is inked, and ink
        // never strays past the stroke radius.
        assert_ne!(canvas.pixel(25, 25), [255, 255, 255, 255]);
        for y in 0..50u32 {
            for x in 0..100u32 {
                if canvas.pixel(x, y) != [255, 255, 255, 255] {
                    assert!((y as f32 - 25.0).abs() <= 2.0);
                    assert!((9.0..=41.0).contains(&(x as f32)));
                }
            }
        }
    }

    #[test]
    fn test_device_coordinates_are_translated() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();
        pad.set_surface_origin(vec2(200.0, 300.0));

        pad.pointer_down(&canvas, pt2(210.0, 325.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(240.0, 325.0));
        pad.pointer_up(&canvas);

        assert_ne!(canvas.pixel(25, 25), [255, 255, 255, 255]);
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_move(&mut canvas, &mut rng, pt2(20.0, 20.0));
        assert!(canvas.is_blank());
        assert!(pad.take_events().is_empty());
    }

    #[test]
    fn test_down_outside_the_pad_is_ignored() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(-5.0, 10.0));
        assert!(!pad.is_drawing());
        pad.pointer_move(&mut canvas, &mut rng, pt2(20.0, 20.0));
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_leaving_the_pad_ends_and_emits() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 10.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(30.0, 30.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(500.0, 500.0));

        assert!(!pad.is_drawing());
        let events = pad.take_events();
        assert!(matches!(&events[..], [CaptureEvent::Signature(_)]));
    }

    #[test]
    fn test_cancel_emits_no_output() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 10.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(30.0, 30.0));
        pad.pointer_cancel();

        assert!(!pad.is_drawing());
        assert!(pad.take_events().is_empty());
    }

    #[test]
    fn test_clear_is_idempotent_and_always_announced() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.pointer_down(&canvas, pt2(10.0, 10.0));
        pad.pointer_move(&mut canvas, &mut rng, pt2(30.0, 30.0));

        pad.clear(&mut canvas);
        assert!(pad.is_signature_empty());
        assert!(canvas.is_blank());
        let first = canvas.pixels().to_vec();

        pad.clear(&mut canvas);
        assert!(pad.is_signature_empty());
        assert_eq!(canvas.pixels(), &first[..]);

        let events = pad.take_events();
        assert_eq!(events, vec![CaptureEvent::Cleared, CaptureEvent::Cleared]);
    }

    #[test]
    fn test_only_the_first_touch_draws() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.touch(&mut canvas, &mut rng, 7, TouchPhase::Started, pt2(10.0, 10.0));
        // A second finger is ignored entirely.
        pad.touch(&mut canvas, &mut rng, 8, TouchPhase::Started, pt2(80.0, 40.0));
        pad.touch(&mut canvas, &mut rng, 8, TouchPhase::Moved, pt2(90.0, 40.0));
        assert!(canvas.is_blank());

        pad.touch(&mut canvas, &mut rng, 7, TouchPhase::Moved, pt2(30.0, 10.0));
        assert!(!canvas.is_blank());
        pad.touch(&mut canvas, &mut rng, 7, TouchPhase::Ended, pt2(30.0, 10.0));

        let events = pad.take_events();
        assert!(matches!(&events[..], [CaptureEvent::Signature(_)]));
    }

    #[test]
    fn test_touch_cancel_returns_to_idle_silently() {
        let mut canvas = Canvas::new(100, 50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pad = pad();

        pad.touch(&mut canvas, &mut rng, 3, TouchPhase::Started, pt2(10.0, 10.0));
        pad.touch(&mut canvas, &mut rng, 3, TouchPhase::Moved, pt2(20.0, 20.0));
        pad.touch(&mut canvas, &mut rng, 3, TouchPhase::Cancelled, pt2(20.0, 20.0));

        assert!(!pad.is_drawing());
        assert!(pad.take_events().is_empty());
    }
}
