pub mod capture;
pub mod osc;

pub use capture::{CaptureEvent, CapturePad};
pub use osc::{OscController, SignatureCommand};
