//! Plot visualization configuration

use eframe::egui::Color32;

/// Colors that flip with the light/dark theme.
pub struct ThemeColors {
    pub text: Color32,
    pub grid: Color32,
}

pub struct PlotConfig {
    // --- CANDLESTICKS ---
    pub candle_bullish_color: Color32,
    pub candle_bearish_color: Color32,
    pub candle_width_pct: f64,  // 0.0 to 1.0 (relative to time step)
    pub candle_wick_width: f32, // Pixels

    // --- VOLUME ---
    pub volume_bullish_color: Color32,
    pub volume_bearish_color: Color32,
    /// Fraction of the visible price range the tallest volume bar may occupy.
    pub volume_height_pct: f64,

    // --- PRICE LINE ---
    pub current_price_color: Color32,
    pub current_price_line_width: f32,

    // --- ANALYSIS OVERLAY ---
    pub overlay_marker_radius: f32,
    pub moving_average_line_width: f32,

    pub plot_y_padding_pct: f64, // Y-Axis Padding factor (e.g. 0.05 = 5% padding top and bottom)
    pub plot_x_padding_pct: f64,

    pub dark: ThemeColors,
    pub light: ThemeColors,

    // --- SEMANTIC COLORS ---
    pub color_long: Color32,
    pub color_short: Color32,
    pub color_warning: Color32,
    pub color_text_subdued: Color32,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    candle_bullish_color: Color32::from_rgb(34, 197, 94), // #22C55E
    candle_bearish_color: Color32::from_rgb(239, 68, 68), // #EF4444
    candle_width_pct: 0.8, // 80% width leaves a small gap between candles
    candle_wick_width: 1.0,

    // Premultiplied at 50% alpha
    volume_bullish_color: Color32::from_rgba_premultiplied(17, 99, 47, 128),
    volume_bearish_color: Color32::from_rgba_premultiplied(120, 34, 34, 128),
    volume_height_pct: 0.2,

    current_price_color: Color32::from_rgb(255, 215, 0), // Gold
    current_price_line_width: 1.5,

    overlay_marker_radius: 5.0,
    moving_average_line_width: 1.5,

    plot_y_padding_pct: 0.05,
    plot_x_padding_pct: 0.02,

    dark: ThemeColors {
        text: Color32::WHITE,
        grid: Color32::from_rgb(30, 41, 59), // #1e293b
    },
    light: ThemeColors {
        text: Color32::BLACK,
        grid: Color32::from_rgb(229, 231, 235), // #e5e7eb
    },

    color_long: Color32::from_rgb(34, 197, 94),
    color_short: Color32::from_rgb(239, 68, 68),
    color_warning: Color32::from_rgb(255, 215, 0),
    color_text_subdued: Color32::GRAY,
};
