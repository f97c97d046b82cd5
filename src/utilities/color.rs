// src/utilities/color.rs
// #rrggbb parsing for the config palette.

use nannou::prelude::*;
use std::error::Error;

/// Parse a `#rrggbb` string into a color.
pub fn parse_hex_color(value: &str) -> Result<Rgb<f32>, Box<dyn Error>> {
    let re = regex::Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")?;
    let caps = re
        .captures(value.trim())
        .ok_or_else(|| format!("invalid color {:?}, expected #rrggbb", value))?;

    let mut channels = [0.0f32; 3];
    for (slot, cap) in channels.iter_mut().zip(caps.iter().skip(1)) {
        let cap = cap.ok_or("missing color channel")?;
        *slot = u8::from_str_radix(cap.as_str(), 16)? as f32 / 255.0;
    }

    Ok(rgb(channels[0], channels[1], channels[2]))
}

/// Parse the whole palette; an empty palette is a config error.
pub fn parse_palette(entries: &[String]) -> Result<Vec<Rgb<f32>>, Box<dyn Error>> {
    if entries.is_empty() {
        return Err("palette must contain at least one color".into());
    }
    entries.iter().map(|entry| parse_hex_color(entry)).collect()
}
