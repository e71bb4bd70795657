// Image processing for barcode labels
// Rasterizes Code 128 symbols and writes them out as PNG

use image::codecs::png::PngEncoder;
use image::{ColorType, GrayImage, ImageEncoder, ImageError, Luma};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::barcode::Code128;
use crate::config::confine;
use crate::errors::BarcodeError;
use crate::printers::{FileDevice, OutputDevice};

// Target bitmap for every generated label
pub const BARCODE_WIDTH: u32 = 250;
pub const BARCODE_HEIGHT: u32 = 50;

// Quiet-zone allowance, in modules, split across both sides
const QUIET_ZONE_MODULES: u32 = 10;

const SOURCE_SUFFIX: &str = ".prn";
const OUTPUT_SUFFIX: &str = "_barcode.png";

const BAR: Luma<u8> = Luma([0]);
const SPACE: Luma<u8> = Luma([255]);

pub struct BarcodeRenderer {
    width: u32,
    height: u32,
    device: Box<dyn OutputDevice>,
}

impl Default for BarcodeRenderer {
    fn default() -> Self {
        Self::with_device(Box::new(FileDevice))
    }
}

impl BarcodeRenderer {
    /// Renderer at the standard label size writing through `device`.
    pub fn with_device(device: Box<dyn OutputDevice>) -> Self {
        BarcodeRenderer {
            width: BARCODE_WIDTH,
            height: BARCODE_HEIGHT,
            device,
        }
    }

    /// Draws the symbol scaled by the largest whole module width that fits, centered.
    ///
    /// A symbol too long for the target width at one pixel per module widens the
    /// image instead of being clipped. Height never changes.
    pub fn render(&self, symbol: &Code128) -> GrayImage {
        let modules = symbol.modules();
        let code_width = modules.len() as u32;
        let full_width = code_width + QUIET_ZONE_MODULES;

        let width = self.width.max(full_width);
        let height = self.height.max(1);
        let multiple = width / full_width;
        let left_padding = (width - code_width * multiple) / 2;

        let mut canvas = GrayImage::from_pixel(width, height, SPACE);
        for (i, _) in modules.iter().enumerate().filter(|(_, bar)| **bar) {
            let x0 = left_padding + i as u32 * multiple;
            for x in x0..x0 + multiple {
                for y in 0..height {
                    canvas.put_pixel(x, y, BAR);
                }
            }
        }

        canvas
    }

    /// Writes `image` to `path` as PNG. A file left behind by a failed encode is
    /// removed; if that fails too, both errors are reported.
    pub fn save_png(&self, image: &GrayImage, path: &Path) -> Result<(), BarcodeError> {
        let mut writer = self.device.create(path).map_err(|e| {
            warn!("cannot create barcode png image {:?}: {}", path, e);
            BarcodeError::CreateFile {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        let outcome = PngEncoder::new(&mut writer)
            .write_image(image.as_raw(), image.width(), image.height(), ColorType::L8)
            .and_then(|()| writer.flush().map_err(ImageError::IoError));
        drop(writer);

        let serialize = match outcome {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!("cannot encode barcode to png file {:?}: {}", path, serialize);
        match self.device.remove(path) {
            Ok(()) => Err(BarcodeError::Serialize {
                path: path.to_path_buf(),
                source: serialize,
            }),
            Err(cleanup) => {
                error!("could not delete partial image {:?}: {}", path, cleanup);
                Err(BarcodeError::Cleanup {
                    path: path.to_path_buf(),
                    serialize,
                    cleanup,
                })
            }
        }
    }

    /// Encodes `payload` and writes `<stem>_barcode.png` under `root`.
    pub fn generate(&self, root: &Path, payload: &str) -> Result<PathBuf, BarcodeError> {
        let symbol = Code128::encode(payload).map_err(|e| {
            warn!("cannot encode filepath as barcode: {}", e);
            e
        })?;

        let output = confine(root, &barcode_filename(payload)).ok_or_else(|| {
            warn!("refusing to write barcode outside {:?} for {:?}", root, payload);
            BarcodeError::OutsideRoot {
                path: payload.to_string(),
            }
        })?;
        let image = self.render(&symbol);
        self.save_png(&image, &output)?;

        info!(
            "Barcode for {:?} written to {:?} ({}x{})",
            payload,
            output,
            image.width(),
            image.height()
        );
        Ok(output)
    }
}

/// `ABC123.prn` becomes `ABC123_barcode.png`. Other names just gain the suffix.
pub fn barcode_filename(payload: &str) -> String {
    let stem = payload.strip_suffix(SOURCE_SUFFIX).unwrap_or(payload);
    format!("{}{}", stem, OUTPUT_SUFFIX)
}
