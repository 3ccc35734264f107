mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::TelemarketingApp;
use config::{AppConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Telemarketing analysis",
        options,
        Box::new(move |cc| {
            // Install image loaders so the branding image can be shown.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(TelemarketingApp::new(config)))
        }),
    )
}
