// src/models/signature_model.rs
// Signature parameters derived from the card holder's name, plus the
// auto/manual mode state shared by the app and the OSC controller.

use nannou::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::error::Error;
use std::str::FromStr;

use crate::config::StyleConfig;
use crate::utilities::color::{parse_hex_color, parse_palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    Auto,
    Manual,
}

impl FromStr for SignatureMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(SignatureMode::Auto),
            "manual" => Ok(SignatureMode::Manual),
            other => Err(format!("unknown signature mode {:?}", other)),
        }
    }
}

/// Style values resolved once at startup from config.toml.
#[derive(Debug, Clone)]
pub struct SignatureStyle {
    pub base_line_width: f32,
    pub max_line_width: f32,
    pub capture_line_width: f32,
    pub margin: f32,
    pub palette: Vec<Rgb<f32>>,
    pub ink: Rgb<f32>,
}

impl SignatureStyle {
    pub fn from_config(config: &StyleConfig) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            base_line_width: config.base_line_width,
            max_line_width: config.max_line_width,
            capture_line_width: config.capture_line_width,
            margin: config.margin,
            palette: parse_palette(&config.palette)?,
            ink: parse_hex_color(&config.ink)?,
        })
    }
}

/// Everything a single generation run needs, derived from the name.
/// Immutable while rendering.
#[derive(Debug, Clone)]
pub struct SignatureSpec {
    pub initials: Vec<char>,
    pub color: Rgb<f32>,
    pub base_line_width: f32,
    pub max_line_width: f32,
}

impl SignatureSpec {
    pub fn from_name(name: &str, style: &SignatureStyle, rng: &mut impl Rng) -> Self {
        let color = style
            .palette
            .choose(rng)
            .copied()
            .unwrap_or(style.ink);

        Self {
            initials: extract_initials(name),
            color,
            base_line_width: style.base_line_width,
            max_line_width: style.max_line_width,
        }
    }
}

/// First character of each space-delimited token, uppercased. Hyphens
/// are not separators, so "Jean-Pierre Dupont" yields ['J', 'D'].
pub fn extract_initials(name: &str) -> Vec<char> {
    name.split(' ')
        .filter_map(|token| token.chars().next())
        .flat_map(|first| first.to_uppercase())
        .collect()
}

/// Mode flag plus the captured raster it guards. A surface is either
/// synthetic or manual for a given signature, never both; leaving
/// manual mode drops the stored raster so it cannot leak into a later
/// auto render.
#[derive(Debug)]
pub struct SignatureState {
    mode: SignatureMode,
    manual_data: Option<Vec<u8>>,
}

impl SignatureState {
    pub fn new(mode: SignatureMode) -> Self {
        Self {
            mode,
            manual_data: None,
        }
    }

    pub fn mode(&self) -> SignatureMode {
        self.mode
    }

    pub fn manual_data(&self) -> Option<&[u8]> {
        self.manual_data.as_deref()
    }

    /// Returns true if the mode actually changed.
    pub fn set_mode(&mut self, mode: SignatureMode) -> bool {
        if self.mode == mode {
            return false;
        }
        if mode == SignatureMode::Auto {
            self.manual_data = None;
        }
        self.mode = mode;
        true
    }

    pub fn store_manual(&mut self, data: Vec<u8>) {
        if !data.is_empty() {
            self.manual_data = Some(data);
        }
    }

    pub fn clear_manual(&mut self) {
        self.manual_data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    mod initials_tests {
        use super::*;

        #[test]
        fn test_basic_two_part_name() {
            assert_eq!(extract_initials("Martin Derouet"), vec!['M', 'D']);
        }

        #[test]
        fn test_hyphen_is_not_a_separator() {
            assert_eq!(extract_initials("Jean-Pierre Dupont"), vec!['J', 'D']);
        }

        #[test]
        fn test_single_name() {
            assert_eq!(extract_initials("Marie"), vec!['M']);
        }

        #[test]
        fn test_many_tokens() {
            assert_eq!(
                extract_initials("Jean Claude Van Damme"),
                vec!['J', 'C', 'V', 'D']
            );
        }

        #[test]
        fn test_empty_and_blank_names() {
            assert_eq!(extract_initials(""), Vec::<char>::new());
            assert_eq!(extract_initials("   "), Vec::<char>::new());
        }

        #[test]
        fn test_lowercase_is_uppercased() {
            assert_eq!(extract_initials("ada lovelace"), vec!['A', 'L']);
        }
    }

    mod spec_tests {
        use super::*;

        fn style() -> SignatureStyle {
            SignatureStyle {
                base_line_width: 1.5,
                max_line_width: 3.0,
                capture_line_width: 2.0,
                margin: 10.0,
                palette: vec![rgb(0.1, 0.1, 0.5), rgb(0.0, 0.3, 0.7)],
                ink: rgb(0.1, 0.1, 0.5),
            }
        }

        #[test]
        fn test_spec_color_comes_from_palette() {
            let style = style();
            let mut rng = StdRng::seed_from_u64(7);
            let spec = SignatureSpec::from_name("Martin Derouet", &style, &mut rng);
            assert!(style.palette.contains(&spec.color));
            assert_eq!(spec.initials, vec!['M', 'D']);
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_leaving_manual_drops_the_stored_raster() {
            let mut state = SignatureState::new(SignatureMode::Manual);
            state.store_manual(vec![1, 2, 3]);
            assert!(state.manual_data().is_some());

            assert!(state.set_mode(SignatureMode::Auto));
            assert_eq!(state.manual_data(), None);

            // Coming back to manual does not resurrect it.
            assert!(state.set_mode(SignatureMode::Manual));
            assert_eq!(state.manual_data(), None);
        }

        #[test]
        fn test_setting_same_mode_is_a_no_op() {
            let mut state = SignatureState::new(SignatureMode::Manual);
            state.store_manual(vec![9]);
            assert!(!state.set_mode(SignatureMode::Manual));
            assert!(state.manual_data().is_some());
        }

        #[test]
        fn test_empty_capture_is_not_stored() {
            let mut state = SignatureState::new(SignatureMode::Manual);
            state.store_manual(Vec::new());
            assert_eq!(state.manual_data(), None);
        }
    }
}
