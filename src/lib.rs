#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod analysis;
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod llm;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types outside of crate (for the analyze binary and tests)
pub use analysis::{FibImpulse, FibLevel, FibLevelSet, classify, classify_css};
pub use app::App;
pub use config::PERSISTENCE;
pub use domain::{Candle, DataSource};
pub use llm::parse_analysis;
pub use models::AnalysisResult;

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Symbol to open, e.g. BTCUSDT or BTC-USDT
    #[arg(long)]
    pub symbol: Option<String>,

    /// Chart timeframe, e.g. 15m, 1h, 1d
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Exchange feeding the chart (binance, bingx)
    #[arg(long)]
    pub source: Option<DataSource>,

    /// Don't connect to the exchanges (no history fetch, no live stream)
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

/// Main application entry point - creates the GUI app
pub fn run_app(cc: &eframe::CreationContext<'_>, args: Cli) -> App {
    App::new(cc, args)
}
