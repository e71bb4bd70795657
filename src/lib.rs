// Library module organization

pub mod app;
pub mod barcode;
pub mod commands;
pub mod config;
pub mod errors;
pub mod image_processing;
pub mod printers;

// Re-export commonly used types for convenience
pub use app::{App, Response};
pub use barcode::Code128;
pub use config::Config;
pub use errors::{AppError, AppResult, BarcodeError, ConfigError, PrintError};
pub use image_processing::{BarcodeRenderer, BARCODE_HEIGHT, BARCODE_WIDTH};
pub use printers::{FileDevice, MockDevice, OutputDevice};
