pub mod export_service;
pub mod signature_service;

pub use export_service::{ExportFormat, ExportJob, ExportService};
