use image::Rgb;
use qrcode::EcLevel;

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Fixed parameters of the compositing pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub background_size: TargetSize,
    pub overlay_size: TargetSize,
    pub ec_level: EcLevel,
    /// Pixels per QR module before the overlay is resized.
    pub box_size: u32,
    /// Quiet zone, in modules.
    pub border: u32,
    /// Colour that transparent pixels end up as in the saved RGB file.
    pub matte: Rgb<u8>,
    pub output_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            background_size: TargetSize::new(512, 512),
            overlay_size: TargetSize::new(200, 200),
            ec_level: EcLevel::L,
            box_size: 10,
            border: 4,
            matte: Rgb([255, 255, 255]),
            output_prefix: "qrcode_".to_string(),
        }
    }
}
