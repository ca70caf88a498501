use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::traits::Renderer;

/// Pixels per QR module.
pub const DEFAULT_MODULE_SIZE: u32 = 8;

/// Light modules around the symbol. The QR standard asks for four.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR error-correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery.
    #[default]
    L,
    /// ~15% recovery.
    M,
    /// ~25% recovery.
    Q,
    /// ~30% recovery.
    H,
}

impl ErrorCorrection {
    /// Byte-mode capacity of a version 40 symbol at this level.
    pub fn max_payload(self) -> usize {
        match self {
            ErrorCorrection::L => 2953,
            ErrorCorrection::M => 2331,
            ErrorCorrection::Q => 1663,
            ErrorCorrection::H => 1273,
        }
    }

    fn level(self) -> EcLevel {
        match self {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Renders payloads as greyscale QR code PNGs and scans them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrRenderer {
    error_correction: ErrorCorrection,
    module_size: u32,
    quiet_zone: u32,
}

impl QrRenderer {
    pub fn new(error_correction: ErrorCorrection) -> Self {
        Self {
            error_correction,
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
        }
    }

    /// Set the size of one module in pixels (minimum 1).
    pub fn with_module_size(mut self, module_size: u32) -> Self {
        self.module_size = module_size.max(1);
        self
    }

    /// Set the quiet zone width in modules.
    pub fn with_quiet_zone(mut self, quiet_zone: u32) -> Self {
        self.quiet_zone = quiet_zone;
        self
    }

    pub fn error_correction(&self) -> ErrorCorrection {
        self.error_correction
    }

    fn rasterize(&self, code: &QrCode) -> GrayImage {
        let width = code.width() as u32;
        let side = (width + 2 * self.quiet_zone) * self.module_size;
        let mut image = GrayImage::from_pixel(side, side, LIGHT);

        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let mx = i as u32 % width + self.quiet_zone;
            let my = i as u32 / width + self.quiet_zone;
            for dy in 0..self.module_size {
                for dx in 0..self.module_size {
                    image.put_pixel(
                        mx * self.module_size + dx,
                        my * self.module_size + dy,
                        DARK,
                    );
                }
            }
        }
        image
    }
}

impl Default for QrRenderer {
    fn default() -> Self {
        Self::new(ErrorCorrection::default())
    }
}

impl Renderer for QrRenderer {
    fn render(&self, payload: &[u8], path: &Path) -> Result<()> {
        let max = self.max_payload();
        if payload.len() > max {
            return Err(RenderError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }

        let code = QrCode::with_error_correction_level(payload, self.error_correction.level())
            .map_err(|err| RenderError::Encode(err.to_string()))?;
        let image = self.rasterize(&code);
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| RenderError::Image {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        tracing::debug!(
            path = %path.display(),
            payload_size = payload.len(),
            modules = code.width(),
            "rendered QR code"
        );
        Ok(())
    }

    fn scan(&self, path: &Path) -> Result<Vec<u8>> {
        let image = image::open(path)
            .map_err(|err| RenderError::Image {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
            .to_luma8();

        let (width, height) = image.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                image.get_pixel(x as u32, y as u32)[0]
            });

        let grids = prepared.detect_grids();
        let grid = grids.first().ok_or_else(|| RenderError::NoCode {
            path: path.to_path_buf(),
        })?;

        let mut payload = Vec::new();
        grid.decode_to(&mut payload)
            .map_err(|err| RenderError::Scan {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        Ok(payload)
    }

    fn max_payload(&self) -> usize {
        self.error_correction.max_payload()
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "qrsite-qr-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn render_then_scan_roundtrip() {
        let dir = unique_temp_dir("roundtrip");
        let path = dir.join("qrcode_0.png");
        let payload = b"M0013:site/ana/MIT/00000/00001-KLUv/QBYYQAAaGk=";

        let renderer = QrRenderer::new(ErrorCorrection::M);
        renderer.render(payload, &path).unwrap();
        assert_eq!(renderer.scan(&path).unwrap(), payload);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn oversize_payload_is_rejected_before_encoding() {
        let dir = unique_temp_dir("oversize");
        let renderer = QrRenderer::new(ErrorCorrection::H);
        let payload = vec![b'a'; ErrorCorrection::H.max_payload() + 1];

        let err = renderer
            .render(&payload, &dir.join("qrcode_0.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::PayloadTooLarge { max: 1273, .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn scan_without_code_reports_no_code() {
        let dir = unique_temp_dir("blank");
        let path = dir.join("blank.png");
        GrayImage::from_pixel(64, 64, LIGHT)
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let err = QrRenderer::default().scan(&path).unwrap_err();
        assert!(matches!(err, RenderError::NoCode { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn scan_missing_file_is_image_error() {
        let err = QrRenderer::default()
            .scan(Path::new("/nonexistent/qrcode_0.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Image { .. }));
    }

    #[test]
    fn capacity_table() {
        assert_eq!(QrRenderer::default().max_payload(), 2953);
        assert!(ErrorCorrection::L.max_payload() > ErrorCorrection::M.max_payload());
        assert!(ErrorCorrection::Q.max_payload() > ErrorCorrection::H.max_payload());
        assert_eq!(QrRenderer::default().extension(), "png");
    }

    #[test]
    fn module_size_is_at_least_one() {
        let renderer = QrRenderer::default().with_module_size(0).with_quiet_zone(2);
        let code = QrCode::new(b"x").unwrap();
        let image = renderer.rasterize(&code);
        assert_eq!(image.width(), code.width() as u32 + 4);
    }
}
