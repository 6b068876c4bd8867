use crate::background::{self, ImageLoadError};
use crate::config::PipelineConfig;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{Color, QrCode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

const DARK_MODULE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("QR code generation failed: could not encode payload: {0}")]
    Encode(#[from] QrError),

    #[error("QR code generation failed: {0}")]
    Background(#[from] ImageLoadError),

    #[error("QR code generation failed: background path has no file name: {}", .0.display())]
    MissingFileName(PathBuf),

    #[error("QR code generation failed: could not save {}: {}", .path.display(), .source)]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("QR code generation cancelled")]
    Cancelled,
}

/// Everything needed to produce one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionRequest {
    pub payload: String,
    pub background: PathBuf,
    pub output_dir: PathBuf,
}

/// Encodes `payload` and draws it as black modules on a transparent bitmap,
/// `box_size` pixels per module with a `border`-module quiet zone.
pub fn render_qr(payload: &str, config: &PipelineConfig) -> Result<RgbaImage, CompositionError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), config.ec_level)?;
    let modules = code.width() as u32;
    let side = (modules + 2 * config.border) * config.box_size;

    let mut bitmap = RgbaImage::from_pixel(side, side, CLEAR);
    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let module_x = index as u32 % modules + config.border;
        let module_y = index as u32 / modules + config.border;
        for dy in 0..config.box_size {
            for dx in 0..config.box_size {
                bitmap.put_pixel(
                    module_x * config.box_size + dx,
                    module_y * config.box_size + dy,
                    DARK_MODULE,
                );
            }
        }
    }

    log::debug!(
        "Encoded {} bytes into a {}x{} module QR code ({}px)",
        payload.len(),
        modules,
        modules,
        side
    );

    Ok(bitmap)
}

/// Composites `image` onto a solid `matte`, dropping the alpha channel.
pub fn flatten_alpha(image: &RgbaImage, matte: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let blend = |c: u8, m: u8| -> u8 {
            let (c, m, a) = (c as u32, m as u32, a as u32);
            ((c * a + m * (255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r, matte[0]), blend(g, matte[1]), blend(b, matte[2])])
    })
}

/// `<output_dir>/<prefix><background file name>.png`
pub fn output_path_for(
    background: &Path,
    output_dir: &Path,
    prefix: &str,
) -> Result<PathBuf, CompositionError> {
    let file_name = background
        .file_name()
        .ok_or_else(|| CompositionError::MissingFileName(background.to_path_buf()))?
        .to_string_lossy();

    Ok(output_dir.join(format!("{}{}.png", prefix, file_name)))
}

/// Places `overlay` centered on `canvas`, blending through the overlay's alpha.
pub fn paste_centered(canvas: &mut RgbaImage, overlay: &RgbaImage) {
    let (x, y) = background::centered_offset(canvas.dimensions(), overlay.dimensions());
    imageops::overlay(canvas, overlay, x, y);
}

/// Builds the centered composite in memory, before flattening.
pub fn compose(
    request: &CompositionRequest,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<RgbaImage, CompositionError> {
    let qr = render_qr(&request.payload, config)?;
    let overlay = imageops::resize(
        &qr,
        config.overlay_size.width,
        config.overlay_size.height,
        FilterType::Lanczos3,
    );
    ensure_active(cancel)?;

    let mut canvas = background::normalize_background(&request.background, config.background_size)?;
    ensure_active(cancel)?;

    paste_centered(&mut canvas, &overlay);
    Ok(canvas)
}

/// Runs the whole pipeline and returns the path of the saved PNG.
pub fn create_qrcode_with_background(
    request: &CompositionRequest,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<PathBuf, CompositionError> {
    log::info!(
        "Generating QR code over {} into {}",
        request.background.display(),
        request.output_dir.display()
    );

    let output_path = output_path_for(&request.background, &request.output_dir, &config.output_prefix)?;
    let canvas = compose(request, config, cancel)?;
    let flattened = flatten_alpha(&canvas, config.matte);
    ensure_active(cancel)?;

    flattened
        .save_with_format(&output_path, ImageFormat::Png)
        .map_err(|source| CompositionError::Save {
            path: output_path.clone(),
            source,
        })?;

    log::info!("Saved {}", output_path.display());
    Ok(output_path)
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), CompositionError> {
    if cancel.is_cancelled() {
        log::info!("Generation cancelled");
        return Err(CompositionError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetSize;
    use std::fs;

    fn write_background(dir: &Path, name: &str, width: u32, height: u32, color: Rgba<u8>) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, color).save(&path).unwrap();
        path
    }

    fn request(payload: &str, background: PathBuf, output_dir: &Path) -> CompositionRequest {
        CompositionRequest {
            payload: payload.to_string(),
            background,
            output_dir: output_dir.to_path_buf(),
        }
    }

    fn scan(image: &RgbImage) -> Vec<String> {
        let gray = image::DynamicImage::ImageRgb8(image.clone()).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            gray.width() as usize,
            gray.height() as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| grid.decode().ok().map(|(_, text)| text))
            .collect()
    }

    #[test]
    fn test_render_qr_is_deterministic() {
        let config = PipelineConfig::default();
        let first = render_qr("https://example.com/menu", &config).unwrap();
        let second = render_qr("https://example.com/menu", &config).unwrap();
        assert_eq!(first.dimensions(), second.dimensions());
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_render_qr_layout() {
        let config = PipelineConfig::default();
        let bitmap = render_qr("HELLO", &config).unwrap();

        // Version 1 is 21 modules wide.
        assert_eq!(bitmap.dimensions(), (290, 290));
        // Quiet zone is transparent, the finder pattern corner is dark.
        assert_eq!(*bitmap.get_pixel(5, 5), CLEAR);
        assert_eq!(*bitmap.get_pixel(40, 40), DARK_MODULE);
    }

    #[test]
    fn test_render_qr_rejects_oversized_payload() {
        let payload = "x".repeat(4000);
        let err = render_qr(&payload, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, CompositionError::Encode(_)));
    }

    #[test]
    fn test_flatten_alpha_uses_matte() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let flat = flatten_alpha(&image, Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([10, 20, 30]));

        let half = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        assert_eq!(*flatten_alpha(&half, Rgb([255, 255, 255])).get_pixel(0, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn test_output_path_keeps_original_extension() {
        let path = output_path_for(Path::new("/pictures/beach.jpg"), Path::new("/out"), "qrcode_").unwrap();
        assert_eq!(path, PathBuf::from("/out/qrcode_beach.jpg.png"));

        let err = output_path_for(Path::new("/"), Path::new("/out"), "qrcode_").unwrap_err();
        assert!(matches!(err, CompositionError::MissingFileName(_)));
    }

    #[test]
    fn test_overlay_is_centered() {
        let dir = tempfile::tempdir().unwrap();
        let background = write_background(dir.path(), "white.png", 640, 480, Rgba([255, 255, 255, 255]));
        let config = PipelineConfig {
            overlay_size: TargetSize::new(201, 199),
            ..PipelineConfig::default()
        };

        let canvas = compose(
            &request("HELLO", background, dir.path()),
            &config,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(canvas.dimensions(), (512, 512));

        let mut bounds = (u32::MAX, u32::MAX, 0u32, 0u32);
        for (x, y, px) in canvas.enumerate_pixels() {
            if px[0] < 128 {
                bounds = (bounds.0.min(x), bounds.1.min(y), bounds.2.max(x + 1), bounds.3.max(y + 1));
            }
        }
        let (left, top, right, bottom) = bounds;
        assert!((left as i64 - (512 - right) as i64).abs() <= 1);
        assert!((top as i64 - (512 - bottom) as i64).abs() <= 1);
    }

    #[test]
    fn test_generate_hello_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let background = write_background(dir.path(), "paper.png", 300, 400, Rgba([250, 248, 240, 255]));

        let output = create_qrcode_with_background(
            &request("HELLO", background, dir.path()),
            &PipelineConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(output, dir.path().join("qrcode_paper.png.png"));
        assert!(output.exists());

        let decoded = image::open(&output).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!((decoded.width(), decoded.height()), (512, 512));
        assert_eq!(scan(&decoded.to_rgb8()), vec!["HELLO".to_string()]);
    }

    #[test]
    fn test_non_image_background_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("readme.txt");
        fs::write(&background, "plain text").unwrap();

        let err = create_qrcode_with_background(
            &request("HELLO", background, dir.path()),
            &PipelineConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap_err();

        assert!(matches!(err, CompositionError::Background(_)));
        assert!(!dir.path().join("qrcode_readme.txt.png").exists());
    }

    #[test]
    fn test_cancelled_job_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let background = write_background(dir.path(), "bg.png", 64, 64, Rgba([255, 255, 255, 255]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = create_qrcode_with_background(
            &request("HELLO", background, dir.path()),
            &PipelineConfig::default(),
            &cancel,
        )
        .unwrap_err();

        assert!(matches!(err, CompositionError::Cancelled));
        assert!(!dir.path().join("qrcode_bg.png.png").exists());
    }
}
