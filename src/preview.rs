use eframe::egui;
use std::path::Path;
use thiserror::Error;

/// Fixed box the generated image is shown in.
pub const PREVIEW_SIZE: egui::Vec2 = egui::vec2(250.0, 250.0);

#[derive(Error, Debug)]
#[error("Failed to display {}: {}", .path.display(), .source)]
pub struct PreviewError {
    pub path: std::path::PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Largest size with the image's aspect ratio that fits inside `bounds`.
pub fn fit_within(image_size: [usize; 2], bounds: egui::Vec2) -> egui::Vec2 {
    let [width, height] = image_size;
    if width == 0 || height == 0 {
        return egui::Vec2::ZERO;
    }

    let (width, height) = (width as f32, height as f32);
    let scale = (bounds.x / width).min(bounds.y / height);
    egui::vec2(width * scale, height * scale)
}

/// Decodes the file at `path` into an image egui can upload as a texture.
pub fn load_color_image(path: &Path) -> Result<egui::ColorImage, PreviewError> {
    let rgba = image::open(path)
        .map_err(|source| PreviewError {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
