#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

use karaoke_core::config::{APP_NAME, WINDOW_MIN_SIZE, WINDOW_SIZE, WINDOW_TITLE};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    helpers::log::init();
    log::info!("{APP_NAME} {} starting", env!("CARGO_PKG_VERSION"));

    // Without FFmpeg every open reports an error on the status line, but the
    // window and the recorder still work.
    if let Err(e) = ffmpeg_the_third::init() {
        log::error!("FFmpeg init failed: {e}");
    }

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size(WINDOW_MIN_SIZE)
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(app::KaraokeApp::new(cc)))),
    )
}
