pub mod color;
pub mod font5x7;

pub use color::{parse_hex_color, parse_palette};
