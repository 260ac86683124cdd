//! Market, timeframe and display defaults.

pub const DEFAULT_SYMBOL: &str = "ETHUSDT";

pub const AVAILABLE_SYMBOLS_BINANCE: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT", "ADAUSDT", "LINKUSDT"];
pub const AVAILABLE_SYMBOLS_BINGX: &[&str] = &["BTC-USDT", "ETH-USDT", "XAUUSD", "EURUSD", "USOIL"];

/// Lowercase to match the exchange interval codes (except `1M`).
pub const DEFAULT_TIMEFRAME: &str = "1h";
pub const QUICK_SELECT_TIMEFRAMES: &[&str] = &["1m", "3m", "5m", "15m", "1h", "4h", "1d", "1w"];
pub const DEFAULT_FAVORITE_TIMEFRAMES: &[&str] = &["15m", "1h", "4h", "1d"];
pub const AVAILABLE_TIMEFRAMES: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

// Chart pane
pub const DARK_PANE_BACKGROUND: &str = "#18191B";
pub const LIGHT_PANE_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_VOLUME_PANE_HEIGHT: u32 = 0;

// Fibonacci lines as (HTF, LTF) per theme
pub const FIB_COLORS_DARK: (&str, &str) = ("#60A5FA", "#FB923C");
pub const FIB_COLORS_LIGHT: (&str, &str) = ("#3B82F6", "#F97316");
pub const FIB_LINE_OPACITY: f64 = 0.7;

// Signals
pub const DEFAULT_W_SIGNAL_COLOR: &str = "#243EA8";
/// Percent (0-100)
pub const DEFAULT_W_SIGNAL_OPACITY: u8 = 70;
/// Percent (0-100); applied to every classified overlay color.
pub const DEFAULT_SIGNALS_OPACITY: u8 = 65;

/// Number of candles requested per history fetch.
pub const HISTORY_LIMIT: u32 = 500;

/// Delay before a typed symbol is applied (keystroke debounce).
pub const SYMBOL_INPUT_DEBOUNCE_MS: u64 = 750;
