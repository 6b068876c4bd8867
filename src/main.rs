mod app;
mod background;
mod compositor;
mod config;
mod preview;
mod session;
mod ui_theme;
mod worker;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // Log to stderr, `RUST_LOG=debug` for pipeline details.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("QR Code Generator")
            .with_inner_size([600.0, 620.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "QR Code Generator",
        options,
        Box::new(|_cc| {
            let app = app::QrBackdropApp::new(config::PipelineConfig::default())?;
            Ok(Box::new(app))
        }),
    )
}
