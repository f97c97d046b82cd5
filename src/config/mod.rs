pub mod config_load;

pub use config_load::{
    CanvasConfig, CardConfig, Config, OscConfig, PathConfig, StyleConfig, WindowConfig,
};
