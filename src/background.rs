use crate::config::TargetSize;
use image::imageops::{self, FilterType};
use image::{ImageError, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Letterbox fill: white with zero alpha.
const LETTERBOX: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Error, Debug)]
#[error("Background image adjustment failed ({}): {}", .path.display(), .source)]
pub struct ImageLoadError {
    pub path: PathBuf,
    #[source]
    pub source: ImageError,
}

/// Size of `source` after scaling it uniformly to fit inside `target`.
///
/// Each side is floored and kept at one pixel minimum, so a very thin source
/// still produces a drawable strip.
pub fn scaled_dimensions(source: (u32, u32), target: TargetSize) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }

    let (src_w, src_h) = (src_w as u64, src_h as u64);
    let (tgt_w, tgt_h) = (target.width as u64, target.height as u64);

    // scale = min(tgt_w / src_w, tgt_h / src_h), kept in integers so that the
    // limiting side lands exactly on the target.
    let (width, height) = if tgt_w * src_h <= tgt_h * src_w {
        (tgt_w, src_h * tgt_w / src_w)
    } else {
        (src_w * tgt_h / src_h, tgt_h)
    };

    (width.max(1) as u32, height.max(1) as u32)
}

/// Top-left position that centers `inner` inside `outer`, floored.
///
/// Negative when `inner` is larger than `outer` on that axis.
pub fn centered_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    let x = (outer.0 as i64 - inner.0 as i64).div_euclid(2);
    let y = (outer.1 as i64 - inner.1 as i64).div_euclid(2);
    (x, y)
}

/// Loads the image at `path` and fits it, aspect ratio preserved, on a
/// transparent canvas of exactly `target` size.
pub fn normalize_background(path: &Path, target: TargetSize) -> Result<RgbaImage, ImageLoadError> {
    let source = image::open(path)
        .map_err(|source| ImageLoadError {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    log::debug!(
        "Loaded background {} ({}x{})",
        path.display(),
        source.width(),
        source.height()
    );

    Ok(letterbox(&source, target))
}

/// Resizes `source` to fit `target` and centers it on a transparent canvas.
pub fn letterbox(source: &RgbaImage, target: TargetSize) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(target.width, target.height, LETTERBOX);

    let (new_width, new_height) = scaled_dimensions(source.dimensions(), target);
    if new_width == 0 || new_height == 0 {
        return canvas;
    }

    let resized = imageops::resize(source, new_width, new_height, FilterType::Lanczos3);
    let (x, y) = centered_offset(target.dimensions(), (new_width, new_height));
    imageops::replace(&mut canvas, &resized, x, y);

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
    }

    /// Bounding box of opaque pixels as (left, top, right, bottom), exclusive.
    fn opaque_bounds(img: &RgbaImage) -> (u32, u32, u32, u32) {
        let mut bounds = (u32::MAX, u32::MAX, 0, 0);
        for (x, y, px) in img.enumerate_pixels() {
            if px[3] > 0 {
                bounds.0 = bounds.0.min(x);
                bounds.1 = bounds.1.min(y);
                bounds.2 = bounds.2.max(x + 1);
                bounds.3 = bounds.3.max(y + 1);
            }
        }
        bounds
    }

    #[test]
    fn test_scaled_dimensions_preserve_aspect() {
        let target = TargetSize::new(512, 512);
        assert_eq!(scaled_dimensions((1024, 512), target), (512, 256));
        assert_eq!(scaled_dimensions((300, 600), target), (256, 512));
        assert_eq!(scaled_dimensions((100, 100), target), (512, 512));

        let (w, h) = scaled_dimensions((640, 480), TargetSize::new(300, 200));
        assert_eq!((w, h), (266, 200));
        let source_ratio = 640.0 / 480.0;
        assert!((w as f64 - h as f64 * source_ratio).abs() <= 1.0);
    }

    #[test]
    fn test_scaled_dimensions_keep_one_pixel() {
        assert_eq!(scaled_dimensions((5000, 1), TargetSize::new(512, 512)), (512, 1));
    }

    #[test]
    fn test_centered_offset_floors() {
        assert_eq!(centered_offset((512, 512), (200, 200)), (156, 156));
        assert_eq!(centered_offset((512, 512), (511, 256)), (0, 128));
        assert_eq!(centered_offset((100, 100), (103, 100)), (-2, 0));
    }

    #[test]
    fn test_letterbox_has_exact_target_size() {
        for (w, h) in [(10, 10), (1920, 1080), (333, 1000), (1, 1)] {
            for target in [TargetSize::new(512, 512), TargetSize::new(300, 120)] {
                let canvas = letterbox(&solid(w, h), target);
                assert_eq!(canvas.dimensions(), target.dimensions());
            }
        }
    }

    #[test]
    fn test_letterbox_centers_content() {
        let canvas = letterbox(&solid(1000, 500), TargetSize::new(512, 512));
        let (left, top, right, bottom) = opaque_bounds(&canvas);

        assert_eq!((left, right), (0, 512));
        assert_eq!(bottom - top, 256);
        assert!((top as i64 - (512 - bottom) as i64).abs() <= 1);
        // Padding stays fully transparent.
        assert_eq!(*canvas.get_pixel(0, 0), LETTERBOX);
    }

    #[test]
    fn test_normalize_background_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        solid(800, 400).save(&path).unwrap();

        let canvas = normalize_background(&path, TargetSize::new(512, 512)).unwrap();
        assert_eq!(canvas.dimensions(), (512, 512));
        assert_eq!(canvas.get_pixel(256, 256)[3], 255);
        assert_eq!(canvas.get_pixel(256, 10)[3], 0);
    }

    #[test]
    fn test_normalize_background_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");

        let err = normalize_background(&path, TargetSize::new(512, 512)).unwrap_err();
        assert_eq!(err.path, path);
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_normalize_background_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, "definitely not a png").unwrap();

        let err = normalize_background(&path, TargetSize::new(512, 512)).unwrap_err();
        assert!(err.to_string().starts_with("Background image adjustment failed"));
    }
}
