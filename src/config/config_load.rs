// src/config/config_load.rs
//
// loading of config.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub paths: PathConfig,
    pub canvas: CanvasConfig,
    pub window: WindowConfig,
    pub card: CardConfig,
    pub style: StyleConfig,
    pub osc: OscConfig,
}

#[derive(Debug, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
pub struct CardConfig {
    pub holder_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StyleConfig {
    pub base_line_width: f32,
    pub max_line_width: f32,
    pub capture_line_width: f32,
    pub margin: f32,
    pub palette: Vec<String>,
    pub ink: String,
}

#[derive(Debug, Deserialize)]
pub struct PathConfig {
    pub letterform_file: String,
    pub output_directory: String,
}

#[derive(Debug, Deserialize)]
pub struct OscConfig {
    pub rx_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // First try to load from the executable's directory
        if let Some(exe_config) = Self::load_from_exe_dir() {
            return Ok(exe_config);
        }

        // Fallback to loading from the current working directory
        Self::load_from_working_dir()
    }

    fn load_from_exe_dir() -> Option<Self> {
        let exe_path = std::env::current_exe().ok()?;
        let exe_dir = exe_path.parent()?;
        let config_path = exe_dir.join("config.toml");

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).ok()?;
            toml::from_str(&content).ok()
        } else {
            None
        }
    }

    fn load_from_working_dir() -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string("config.toml")?;
        Ok(toml::from_str(&content)?)
    }

    /// Path of the letterform bank override, if one is configured.
    pub fn resolve_letterform_path(&self) -> Option<PathBuf> {
        if self.paths.letterform_file.is_empty() {
            return None;
        }
        Some(Self::resolve(&self.paths.letterform_file))
    }

    pub fn resolve_output_dir_as_str(&self) -> String {
        Self::resolve(&self.paths.output_directory)
            .to_string_lossy()
            .into_owned()
    }

    // Relative paths resolve against the executable's directory when
    // possible, matching where build.rs places config.toml.
    fn resolve(path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            return PathBuf::from(path);
        }
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .map(|exe_dir| exe_dir.join(path))
            .unwrap_or_else(|| PathBuf::from(path))
    }
}
