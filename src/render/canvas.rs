// src/render/canvas.rs
// The raster drawing surface.
//
// Immediate-mode path construction over a CPU pixel buffer, top-left
// origin with y pointing down (device orientation). Strokes are
// rasterized by stamping discs along each segment, which yields the
// round caps and joins the signature styles ask for.

use nannou::image::{DynamicImage, RgbaImage};
use nannou::prelude::*;
use std::error::Error;
use std::io::Cursor;

const QUAD_RESOLUTION: usize = 24;
const ARC_RESOLUTION: usize = 32;
const STAMP_SPACING: f32 = 0.3;

/// The opaque background every surface starts from and clears back to.
pub fn background() -> Rgb<f32> {
    rgb(1.0, 1.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    #[default]
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
}

#[derive(Debug, Clone)]
pub struct StrokeStyle {
    pub color: Rgb<f32>,
    pub line_width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: rgb(0.1, 0.1, 0.1),
            line_width: 2.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PathCmd {
    MoveTo(Point2),
    LineTo(Point2),
    QuadTo { control: Point2, to: Point2 },
    Arc { center: Point2, radius: f32 },
}

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA8, row-major
    path: Vec<PathCmd>,
    pub style: StrokeStyle,
    dirty: bool,
}

impl Canvas {
    /// Fresh canvas filled with the opaque background. Exports rely on
    /// the background never being transparent.
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            path: Vec::new(),
            style: StrokeStyle::default(),
            dirty: true,
        };
        canvas.clear();
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Repaints the opaque background and drops any pending path.
    pub fn clear(&mut self) {
        let bg = color_bytes(background());
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }
        self.path.clear();
        self.dirty = true;
    }

    pub fn reset_style(&mut self) {
        self.style = StrokeStyle::default();
    }

    pub fn set_color(&mut self, color: Rgb<f32>) {
        self.style.color = color;
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.style.line_width = width;
    }

    pub fn is_blank(&self) -> bool {
        let bg = color_bytes(background());
        self.pixels.chunks_exact(4).all(|px| px == bg)
    }

    // ---------------- path construction ----------------

    pub fn begin_path(&mut self) {
        self.path.clear();
    }

    pub fn move_to(&mut self, point: Point2) {
        self.path.push(PathCmd::MoveTo(point));
    }

    pub fn line_to(&mut self, point: Point2) {
        self.path.push(PathCmd::LineTo(point));
    }

    pub fn quadratic_curve_to(&mut self, control: Point2, to: Point2) {
        self.path.push(PathCmd::QuadTo { control, to });
    }

    pub fn arc(&mut self, center: Point2, radius: f32) {
        self.path.push(PathCmd::Arc { center, radius });
    }

    /// Rasterize the current path with the current style.
    pub fn stroke(&mut self) {
        let subpaths = self.flatten();
        let width = self.style.line_width;
        let cap = self.style.cap;
        let color = color_bytes(self.style.color);

        for subpath in subpaths {
            for pair in subpath.windows(2) {
                self.stamp_segment(pair[0], pair[1], width, cap, color);
            }
        }
        self.dirty = true;
    }

    /// Even-odd scanline fill of the current path. Subpaths close
    /// implicitly.
    pub fn fill(&mut self) {
        let subpaths = self.flatten();
        if subpaths.is_empty() {
            return;
        }
        let color = color_bytes(self.style.color);

        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for point in subpaths.iter().flatten() {
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }

        let y_from = min_y.floor().max(0.0) as i32;
        let y_to = max_y.ceil().min(self.height as f32) as i32;

        for y in y_from..y_to {
            let scan = y as f32 + 0.5;
            let mut crossings: Vec<f32> = Vec::new();
            for subpath in &subpaths {
                let n = subpath.len();
                for i in 0..n {
                    let a = subpath[i];
                    let b = subpath[(i + 1) % n];
                    if (a.y <= scan && b.y > scan) || (b.y <= scan && a.y > scan) {
                        let t = (scan - a.y) / (b.y - a.y);
                        crossings.push(a.x + t * (b.x - a.x));
                    }
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let from = pair[0].round().max(0.0) as i32;
                let to = pair[1].round().min(self.width as f32) as i32;
                for x in from..to {
                    self.put_pixel(x, y, color);
                }
            }
        }
        self.dirty = true;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb<f32>) {
        let bytes = color_bytes(color);
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.put_pixel(x + dx, y + dy, bytes);
            }
        }
        self.dirty = true;
    }

    /// Overwrite one horizontal run of pixels. Clipped at the right
    /// edge; rows outside the canvas are ignored.
    pub fn write_span(&mut self, x: u32, y: u32, rgba: &[u8]) {
        if y >= self.height || x >= self.width {
            return;
        }
        let max_len = ((self.width - x) * 4) as usize;
        let len = rgba.len().min(max_len);
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + len].copy_from_slice(&rgba[..len]);
        self.dirty = true;
    }

    // ---------------- raster readback ----------------

    pub fn to_image(&self) -> Result<RgbaImage, Box<dyn Error>> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| "raster buffer does not match canvas dimensions".into())
    }

    /// Current pixels encoded as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, Box<dyn Error>> {
        let image = self.to_image()?;
        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(image).write_to(
            &mut Cursor::new(&mut encoded),
            nannou::image::ImageOutputFormat::Png,
        )?;
        Ok(encoded)
    }

    /// True once since the last call if the pixels changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    // ---------------- rasterization ----------------

    fn flatten(&self) -> Vec<Vec<Point2>> {
        let mut subpaths: Vec<Vec<Point2>> = Vec::new();
        let mut current: Vec<Point2> = Vec::new();

        for cmd in &self.path {
            match *cmd {
                PathCmd::MoveTo(p) => {
                    flush(&mut subpaths, &mut current);
                    current.push(p);
                }
                PathCmd::LineTo(p) => current.push(p),
                PathCmd::QuadTo { control, to } => {
                    let from = *current.last().unwrap_or(&control);
                    if current.is_empty() {
                        current.push(from);
                    }
                    for i in 1..=QUAD_RESOLUTION {
                        let t = i as f32 / QUAD_RESOLUTION as f32;
                        current.push(quad_point(from, control, to, t));
                    }
                }
                PathCmd::Arc { center, radius } => {
                    flush(&mut subpaths, &mut current);
                    let mut circle = Vec::with_capacity(ARC_RESOLUTION + 1);
                    for i in 0..=ARC_RESOLUTION {
                        let angle = TAU * i as f32 / ARC_RESOLUTION as f32;
                        circle.push(pt2(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        ));
                    }
                    subpaths.push(circle);
                }
            }
        }
        flush(&mut subpaths, &mut current);
        subpaths
    }

    fn stamp_segment(&mut self, a: Point2, b: Point2, width: f32, cap: LineCap, color: [u8; 4]) {
        let radius = (width * 0.5).max(0.5);
        let length = a.distance(b);

        // Butt caps stop at the endpoints instead of overshooting by
        // one stamp radius.
        let (t_from, t_to) = match cap {
            LineCap::Round => (0.0, 1.0),
            LineCap::Butt => {
                if length <= radius * 2.0 {
                    return;
                }
                (radius / length, 1.0 - radius / length)
            }
        };

        let span = t_to - t_from;
        let steps = ((length * span) / STAMP_SPACING).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = t_from + span * (i as f32 / steps as f32);
            self.stamp_disc(a.lerp(b, t), radius, color);
        }
    }

    fn stamp_disc(&mut self, center: Point2, radius: f32, color: [u8; 4]) {
        let min_x = (center.x - radius).floor() as i32;
        let max_x = (center.x + radius).ceil() as i32;
        let min_y = (center.y - radius).floor() as i32;
        let max_y = (center.y + radius).ceil() as i32;
        let r2 = radius * radius;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }
}

fn flush(subpaths: &mut Vec<Vec<Point2>>, current: &mut Vec<Point2>) {
    if current.len() > 1 {
        subpaths.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn quad_point(from: Point2, control: Point2, to: Point2, t: f32) -> Point2 {
    let u = 1.0 - t;
    from * (u * u) + control * (2.0 * u * t) + to * (t * t)
}

fn color_bytes(color: Rgb<f32>) -> [u8; 4] {
    [
        (color.red * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.green * 255.0).round().clamp(0.0, 255.0) as u8,
        (color.blue * 255.0).round().clamp(0.0, 255.0) as u8,
        255,
    ]
}
