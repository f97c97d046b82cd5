pub mod geometry;
pub mod glyph_model;
pub mod signature_model;

pub use geometry::{aspect_fit, path_length, BoundingBox, FitRect, StrokePoint};
pub use glyph_model::{GlyphTemplate, TemplateBank, TemplateStroke};
pub use signature_model::{
    extract_initials, SignatureMode, SignatureSpec, SignatureState, SignatureStyle,
};
