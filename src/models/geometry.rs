// src/models/geometry.rs
// Some types for working with stroke geometry

/// One sampled pen position. Pressure is optional; when absent the
/// stroke renderer synthesizes a value at draw time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub pressure: Option<f32>,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pressure: None,
        }
    }

    pub fn with_pressure(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Smallest box containing every point. None for an empty slice.
    pub fn of(points: &[StrokePoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for point in &points[1..] {
            bbox.min_x = bbox.min_x.min(point.x);
            bbox.min_y = bbox.min_y.min(point.y);
            bbox.max_x = bbox.max_x.max(point.x);
            bbox.max_y = bbox.max_y.max(point.y);
        }
        Some(bbox)
    }
}

/// Total polyline length of a point sequence.
pub fn path_length(points: &[StrokePoint]) -> f32 {
    points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Placement of a scaled source inside a target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale (src_w, src_h) to fit inside (box_w, box_h) preserving aspect
/// ratio, centered. Degenerate sources fill the whole box.
pub fn aspect_fit(source: (f32, f32), target: (f32, f32)) -> FitRect {
    let (src_w, src_h) = source;
    let (box_w, box_h) = target;

    if src_w <= 0.0 || src_h <= 0.0 {
        return FitRect {
            x: 0.0,
            y: 0.0,
            width: box_w,
            height: box_h,
        };
    }

    let ratio = src_w / src_h;
    let (width, height) = if ratio > box_w / box_h {
        (box_w, box_w / ratio)
    } else {
        (box_h * ratio, box_h)
    };

    FitRect {
        x: (box_w - width) / 2.0,
        y: (box_h - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod point_tests {
        use super::*;

        #[test]
        fn test_pressure_defaults_to_none() {
            let point = StrokePoint::new(3.0, 4.0);
            assert_eq!(point.pressure, None);

            let point = StrokePoint::with_pressure(3.0, 4.0, 0.8);
            assert_eq!(point.pressure, Some(0.8));
        }
    }

    mod bounding_box_tests {
        use super::*;

        #[test]
        fn test_bounding_box_of_points() {
            let points = [
                StrokePoint::new(10.0, 5.0),
                StrokePoint::new(-2.0, 8.0),
                StrokePoint::new(4.0, -1.0),
            ];

            let bbox = BoundingBox::of(&points).unwrap();
            assert_eq!(bbox.min_x, -2.0);
            assert_eq!(bbox.min_y, -1.0);
            assert_eq!(bbox.max_x, 10.0);
            assert_eq!(bbox.max_y, 8.0);
            assert_eq!(bbox.width(), 12.0);
            assert_eq!(bbox.height(), 9.0);
        }

        #[test]
        fn test_empty_slice_has_no_box() {
            assert_eq!(BoundingBox::of(&[]), None);
        }
    }

    mod path_length_tests {
        use super::*;

        #[test]
        fn test_path_length_sums_segments() {
            let points = [
                StrokePoint::new(0.0, 0.0),
                StrokePoint::new(3.0, 4.0),
                StrokePoint::new(3.0, 10.0),
            ];
            assert_eq!(path_length(&points), 11.0);
        }

        #[test]
        fn test_short_sequences_have_zero_length() {
            assert_eq!(path_length(&[]), 0.0);
            assert_eq!(path_length(&[StrokePoint::new(1.0, 1.0)]), 0.0);
        }
    }

    mod aspect_fit_tests {
        use super::*;

        #[test]
        fn test_wide_source_clips_to_width() {
            // 2:1 source into a 1:1 box: width wins, height shrinks.
            let fit = aspect_fit((200.0, 100.0), (100.0, 100.0));
            assert_eq!(fit.width, 100.0);
            assert_eq!(fit.height, 50.0);
            assert_eq!(fit.x, 0.0);
            assert_eq!(fit.y, 25.0);
        }

        #[test]
        fn test_tall_source_clips_to_height() {
            let fit = aspect_fit((100.0, 200.0), (100.0, 100.0));
            assert_eq!(fit.width, 50.0);
            assert_eq!(fit.height, 100.0);
            assert_eq!(fit.x, 25.0);
            assert_eq!(fit.y, 0.0);
        }

        #[test]
        fn test_degenerate_source_fills_box() {
            let fit = aspect_fit((0.0, 50.0), (80.0, 40.0));
            assert_eq!(fit.width, 80.0);
            assert_eq!(fit.height, 40.0);
        }
    }
}
