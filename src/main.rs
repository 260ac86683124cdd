#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Windows release: hide console window
use {
    clap::Parser,
    eframe::{NativeOptions, egui::ViewportBuilder},
    std::{panic, path::PathBuf},
    traderoad::{Cli, PERSISTENCE, run_app},
};

fn init_logging() {
    let (global_level, app_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    // RUST_LOG, when set, is applied on top of the build defaults
    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("traderoad"), app_level)
        .parse_default_env()
        .init();
}

fn main() -> eframe::Result {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    init_logging();

    let args = Cli::parse();
    log::info!("Starting with {:?}", args);

    let options = NativeOptions {
        persistence_path: Some(PathBuf::from(PERSISTENCE.app.state_path)),
        viewport: ViewportBuilder::default()
            .with_maximized(true)
            .with_min_inner_size([900.0, 600.0])
            .with_title("TradeRoad - AI chart analysis"),
        ..Default::default()
    };

    eframe::run_native(
        "TradeRoad",
        options,
        Box::new(move |cc| Ok(Box::new(run_app(cc, args)))),
    )
}
