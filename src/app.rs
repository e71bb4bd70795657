use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{error, info};

use crate::config::Config;
use crate::errors::PrintError;
use crate::image_processing::BarcodeRenderer;
use crate::printers::{print_copies, FileDevice, OutputDevice};

/// Reply handed back to the host shell for every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub error: String,
}

impl Response {
    pub fn ok() -> Self {
        Response {
            success: true,
            error: String::new(),
        }
    }

    pub fn failure(error: impl Display) -> Self {
        Response {
            success: false,
            error: error.to_string(),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Response {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Response::ok(),
            Err(e) => Response::failure(e),
        }
    }
}

/// The operations exposed to the host shell, bound to one configuration.
pub struct App {
    config: Config,
    device: Box<dyn OutputDevice>,
    renderer: BarcodeRenderer,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::with_device(config, Box::new(FileDevice))
    }

    pub fn with_device(config: Config, device: Box<dyn OutputDevice>) -> Self {
        App {
            config,
            device,
            renderer: BarcodeRenderer::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sends `filepath` (relative to the source root) to the printer `quantity` times.
    pub fn print_file(&self, filepath: &str, quantity: u32) -> Response {
        info!("Print request: {} x{}", filepath, quantity);

        let result = self
            .config
            .resolve(filepath)
            .ok_or_else(|| PrintError::OutsideRoot {
                path: filepath.to_string(),
            })
            .and_then(|source| {
                print_copies(
                    self.device.as_ref(),
                    &source,
                    self.config.printer_path(),
                    quantity,
                )
            });
        if let Err(e) = &result {
            error!("could not print file {}: {}", filepath, e);
        }
        result.into()
    }

    /// Writes a Code 128 image of `filepath` into the source root.
    pub fn generate(&self, filepath: &str) -> Response {
        info!("Barcode request: {:?}", filepath);

        let result = self.renderer.generate(self.config.root_path(), filepath);
        if let Err(e) = &result {
            error!("could not generate barcode for {:?}: {}", filepath, e);
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BarcodeError;

    #[test]
    fn test_response_json_shape() {
        let json = serde_json::to_value(Response::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "error": ""}));

        let json = serde_json::to_value(Response::failure("printer offline")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "printer offline"})
        );
    }

    #[test]
    fn test_response_from_result() {
        let ok: Result<u8, BarcodeError> = Ok(1);
        assert_eq!(Response::from(ok), Response::ok());

        let err: Result<(), BarcodeError> = Err(BarcodeError::EmptyPayload);
        let response = Response::from(err);
        assert!(!response.success);
        assert_eq!(response.error, "could not generate barcode from empty filepath");
    }
}
