use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};
use traderoad::analysis::fibonacci::{
    DEFAULT_ALTERNATIVE_EXTENSION_RATIOS, DEFAULT_EXTENSION_RATIOS, DEFAULT_RETRACEMENT_RATIOS, ImpulseDirection,
    extensions, extensions_alternative, finite_levels, retracements, sort_extensions_for_display,
    sort_retracements_for_display,
};
use traderoad::analysis::{FibImpulse, FibLevel, build_overlay, classify_css};
use traderoad::analysis::overlay::{LineStyle, MarkerShape};
use traderoad::llm::parse_analysis;
use traderoad::models::Preferences;
use traderoad::utils::format_price_plain;

/// Offline companion to the chart: Fibonacci levels and overlay colors on the command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Levels for an impulse from A to B, with extensions when C (retracement end) is given
    Levels {
        #[arg(long, allow_hyphen_values = true)]
        a: f64,
        #[arg(long, allow_hyphen_values = true)]
        b: f64,
        #[arg(long, allow_hyphen_values = true)]
        c: Option<f64>,
        /// Use the older negative-ratio projection measured from B
        #[arg(long, default_value_t = false)]
        alternative: bool,
    },
    /// Levels and chart drawings from a saved LLM analysis (raw model text or JSON)
    File {
        path: PathBuf,
        #[arg(long, default_value = "BTC/USDT")]
        symbol: String,
        #[arg(long, default_value = "1H")]
        timeframe: String,
        /// Include the lower-timeframe Fibonacci retracements
        #[arg(long, default_value_t = false)]
        ltf: bool,
    },
    /// Color a single signal the way the chart would
    Classify {
        #[arg(long)]
        kind: String,
        #[arg(long, default_value = "")]
        timeframe: String,
        #[arg(long, default_value = "")]
        importance: String,
        #[arg(long, default_value = "")]
        label: String,
        /// 0.0..=1.0
        #[arg(long, default_value_t = 1.0)]
        opacity: f64,
    },
}

#[derive(Tabled)]
struct LevelRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Ratio")]
    label: String,
    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Style")]
    style: &'static str,
    #[tabled(rename = "Color")]
    color: String,
}

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "Time (ms)")]
    time_ms: i64,
    #[tabled(rename = "Shape")]
    shape: &'static str,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Color")]
    color: String,
}

fn level_rows(kind: &'static str, levels: &[FibLevel]) -> Vec<LevelRow> {
    finite_levels(levels)
        .into_iter()
        .map(|l| LevelRow {
            kind,
            label: l.label,
            price: format_price_plain(l.price),
        })
        .collect()
}

fn print_table<T: Tabled>(title: &str, rows: Vec<T>) {
    if rows.is_empty() {
        return;
    }
    println!("\n{}", title);
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn run_levels(a: f64, b: f64, c: Option<f64>, alternative: bool) -> Result<()> {
    if !a.is_finite() || !b.is_finite() {
        bail!("Anchors must be finite numbers (got A={}, B={})", a, b);
    }
    let direction = ImpulseDirection::of(a, b);
    let mut retr = retracements(a, b, &DEFAULT_RETRACEMENT_RATIOS);
    sort_retracements_for_display(&mut retr, direction);

    let mut rows = level_rows("Retracement", &retr);
    if let Some(c) = c {
        let mut ext = if alternative {
            extensions_alternative(a, b, c, &DEFAULT_ALTERNATIVE_EXTENSION_RATIOS)
        } else {
            extensions(a, b, c, &DEFAULT_EXTENSION_RATIOS)
        };
        sort_extensions_for_display(&mut ext);
        rows.extend(level_rows("Extension", &ext));
    }

    println!("Impulse {} -> {} ({:?})", format_price_plain(a), format_price_plain(b), direction);
    print_table("Fibonacci levels", rows);
    Ok(())
}

fn impulse_rows(scope: &str, impulse: &FibImpulse) -> Vec<LevelRow> {
    log::info!(
        "{} impulse on {}: {} -> {}",
        scope,
        impulse.timeframe,
        impulse.start,
        impulse.end
    );
    let levels = impulse.levels();
    let mut rows = level_rows("Retracement", &levels.retracements);
    rows.extend(level_rows("Extension", &levels.extensions));
    rows
}

fn run_file(path: &PathBuf, symbol: &str, timeframe: &str, ltf: bool) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let result = parse_analysis(&text, symbol, timeframe);
    if result.is_fallback() {
        log::warn!("{} did not hold a usable analysis; showing the fallback", path.display());
    }

    if let Some(general) = &result.analisis_general {
        println!(
            "{} {}: {}",
            general.simbolo, general.temporalidad_principal_analisis, general.sesgo_direccional_general
        );
    }

    if let Some(htf) = result.htf_impulse() {
        print_table("HTF Fibonacci", impulse_rows("HTF", &htf));
    }
    if let Some(ltf_impulse) = result.ltf_impulse() {
        print_table("LTF Fibonacci", impulse_rows("LTF", &ltf_impulse));
    }

    let mut prefs = Preferences::default();
    prefs.show_ltf_fibonacci = ltf;
    let overlay = build_overlay(&result, &prefs.overlay_settings());

    let lines = overlay
        .lines
        .iter()
        .map(|l| LineRow {
            title: l.title.clone(),
            price: format_price_plain(l.price),
            style: match l.style {
                LineStyle::Solid => "solid",
                LineStyle::Dashed => "dashed",
                LineStyle::Dotted => "dotted",
            },
            color: l.color.to_string(),
        })
        .collect();
    print_table("Chart lines", lines);

    let markers = overlay
        .markers
        .iter()
        .map(|m| MarkerRow {
            time_ms: m.time_ms,
            shape: match m.shape {
                MarkerShape::ArrowUp => "arrow up",
                MarkerShape::ArrowDown => "arrow down",
                MarkerShape::Circle => "circle",
                MarkerShape::Square => "square",
            },
            text: m.text.clone(),
            color: m.color.to_string(),
        })
        .collect();
    print_table("Chart markers", markers);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Command::Levels { a, b, c, alternative } => run_levels(a, b, c, alternative),
        Command::File {
            path,
            symbol,
            timeframe,
            ltf,
        } => run_file(&path, &symbol, &timeframe, ltf),
        Command::Classify {
            kind,
            timeframe,
            importance,
            label,
            opacity,
        } => {
            println!("{}", classify_css(&kind, &timeframe, &importance, &label, opacity));
            Ok(())
        }
    }
}
