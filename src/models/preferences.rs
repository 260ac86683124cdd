use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

use crate::{
    analysis::{MovingAverageConfig, OverlaySettings, hex_to_rgba},
    config::{
        PERSISTENCE,
        constants::{
            DARK_PANE_BACKGROUND, DEFAULT_FAVORITE_TIMEFRAMES, DEFAULT_SIGNALS_OPACITY, DEFAULT_SYMBOL,
            DEFAULT_TIMEFRAME, DEFAULT_VOLUME_PANE_HEIGHT, DEFAULT_W_SIGNAL_COLOR, DEFAULT_W_SIGNAL_OPACITY,
            FIB_COLORS_DARK, FIB_COLORS_LIGHT, FIB_LINE_OPACITY, LIGHT_PANE_BACKGROUND,
        },
    },
    domain::DataSource,
    models::template::TemplateConfiguration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn default_pane_background(&self) -> &'static str {
        match self {
            Theme::Dark => DARK_PANE_BACKGROUND,
            Theme::Light => LIGHT_PANE_BACKGROUND,
        }
    }

    /// `(HTF, LTF)` Fibonacci line colors, brighter on the dark pane.
    pub fn fibonacci_colors(&self) -> (&'static str, &'static str) {
        match self {
            Theme::Dark => FIB_COLORS_DARK,
            Theme::Light => FIB_COLORS_LIGHT,
        }
    }
}

/// User settings that survive restarts. Written through a `PreferencesRepository`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub version: u32,
    pub data_source: DataSource,
    pub symbol: String,
    pub timeframe: String,
    pub theme: Theme,
    pub moving_averages: Vec<MovingAverageConfig>,
    pub chart_pane_background_color: String,
    pub volume_pane_height: u32,
    pub show_ai_analysis_drawings: bool,
    pub show_ltf_fibonacci: bool,
    pub w_signal_color: String,
    /// Percent (0-100)
    pub w_signal_opacity: u8,
    pub show_w_signals: bool,
    /// Percent (0-100), applied to classified overlay colors
    pub signals_opacity: u8,
    pub favorite_timeframes: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        let theme = Theme::default();
        Preferences {
            version: PERSISTENCE.preferences.version,
            data_source: DataSource::default(),
            symbol: DEFAULT_SYMBOL.to_string(),
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            theme,
            moving_averages: MovingAverageConfig::defaults(),
            chart_pane_background_color: theme.default_pane_background().to_string(),
            volume_pane_height: DEFAULT_VOLUME_PANE_HEIGHT,
            show_ai_analysis_drawings: true,
            show_ltf_fibonacci: false,
            w_signal_color: DEFAULT_W_SIGNAL_COLOR.to_string(),
            w_signal_opacity: DEFAULT_W_SIGNAL_OPACITY,
            show_w_signals: true,
            signals_opacity: DEFAULT_SIGNALS_OPACITY,
            favorite_timeframes: DEFAULT_FAVORITE_TIMEFRAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Preferences {
    /// Switches theme. A pane background that is still one of the theme
    /// defaults follows the theme; a custom color is left alone.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        let bg = self.chart_pane_background_color.as_str();
        let is_theme_default =
            bg.eq_ignore_ascii_case(DARK_PANE_BACKGROUND) || bg.eq_ignore_ascii_case(LIGHT_PANE_BACKGROUND);
        if is_theme_default {
            self.chart_pane_background_color = theme.default_pane_background().to_string();
        }
    }

    /// Switches exchange, rewriting the symbol into that exchange's spelling.
    pub fn set_data_source(&mut self, source: DataSource) {
        self.data_source = source;
        self.symbol = source.consistent_symbol(&self.symbol);
    }

    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = self.data_source.consistent_symbol(symbol);
    }

    pub fn w_signal_alpha(&self) -> f64 {
        self.w_signal_opacity.min(100) as f64 / 100.0
    }

    pub fn signals_alpha(&self) -> f64 {
        self.signals_opacity.min(100) as f64 / 100.0
    }

    /// The display switches the chart overlay is built with.
    pub fn overlay_settings(&self) -> OverlaySettings {
        let (htf, ltf) = self.theme.fibonacci_colors();
        OverlaySettings {
            show_ai_drawings: self.show_ai_analysis_drawings,
            show_w_signals: self.show_w_signals,
            show_ltf_fibonacci: self.show_ltf_fibonacci,
            w_signal_color: self.w_signal_color.clone(),
            w_signal_alpha: self.w_signal_alpha(),
            signals_alpha: self.signals_alpha(),
            fib_htf_color: hex_to_rgba(htf, FIB_LINE_OPACITY),
            fib_ltf_color: hex_to_rgba(ltf, FIB_LINE_OPACITY),
        }
    }

    /// Snapshot of the current settings, with the current market as the template default.
    pub fn to_template_configuration(&self) -> TemplateConfiguration {
        TemplateConfiguration {
            moving_averages: self.moving_averages.clone(),
            theme: self.theme,
            chart_pane_background_color: self.chart_pane_background_color.clone(),
            volume_pane_height: self.volume_pane_height,
            w_signal_color: self.w_signal_color.clone(),
            w_signal_opacity: self.w_signal_opacity,
            show_w_signals: self.show_w_signals,
            show_ai_analysis_drawings: self.show_ai_analysis_drawings,
            favorite_timeframes: self.favorite_timeframes.clone(),
            default_data_source: Some(self.data_source),
            default_symbol: Some(self.symbol.clone()),
            default_timeframe: Some(self.timeframe.clone()),
        }
    }

    /// Applies a template. Market defaults in the template only override when present.
    pub fn apply_template(&mut self, cfg: &TemplateConfiguration) {
        self.moving_averages = cfg.moving_averages.clone();
        self.theme = cfg.theme;
        self.chart_pane_background_color = cfg.chart_pane_background_color.clone();
        self.volume_pane_height = cfg.volume_pane_height;
        self.w_signal_color = cfg.w_signal_color.clone();
        self.w_signal_opacity = cfg.w_signal_opacity.min(100);
        self.show_w_signals = cfg.show_w_signals;
        self.show_ai_analysis_drawings = cfg.show_ai_analysis_drawings;
        self.favorite_timeframes = cfg.favorite_timeframes.clone();

        if let Some(source) = cfg.default_data_source {
            self.data_source = source;
        }
        if let Some(symbol) = &cfg.default_symbol {
            self.symbol = symbol.clone();
        }
        if let Some(tf) = &cfg.default_timeframe {
            self.timeframe = tf.clone();
        }
        self.symbol = self.data_source.consistent_symbol(&self.symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_switch_moves_default_background_only() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.chart_pane_background_color, DARK_PANE_BACKGROUND);

        prefs.set_theme(Theme::Light);
        assert_eq!(prefs.chart_pane_background_color, LIGHT_PANE_BACKGROUND);

        prefs.chart_pane_background_color = "#123456".to_string();
        prefs.set_theme(Theme::Dark);
        assert_eq!(prefs.chart_pane_background_color, "#123456");
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn source_switch_rewrites_symbol() {
        let mut prefs = Preferences::default();
        prefs.set_symbol("btcusdt");
        assert_eq!(prefs.symbol, "BTCUSDT");
        prefs.set_data_source(DataSource::Bingx);
        assert_eq!(prefs.symbol, "BTC-USDT");
    }

    #[test]
    fn template_round_trip_through_preferences() {
        let mut source = Preferences::default();
        source.set_theme(Theme::Light);
        source.w_signal_opacity = 40;
        source.timeframe = "4h".to_string();
        let cfg = source.to_template_configuration();

        let mut target = Preferences::default();
        target.set_data_source(DataSource::Bingx);
        target.apply_template(&cfg);
        assert_eq!(target.theme, Theme::Light);
        assert_eq!(target.w_signal_opacity, 40);
        assert_eq!(target.timeframe, "4h");
        assert_eq!(target.data_source, DataSource::Binance);
        assert_eq!(target.symbol, "ETHUSDT");
    }

    #[test]
    fn template_without_market_keeps_current_market() {
        let mut cfg = Preferences::default().to_template_configuration();
        cfg.default_data_source = None;
        cfg.default_symbol = None;
        cfg.default_timeframe = None;

        let mut prefs = Preferences::default();
        prefs.set_data_source(DataSource::Bingx);
        prefs.set_symbol("SOLUSDT");
        prefs.timeframe = "15m".to_string();
        prefs.apply_template(&cfg);
        assert_eq!(prefs.symbol, "SOL-USDT");
        assert_eq!(prefs.timeframe, "15m");
    }

    #[test]
    fn alphas_are_fractions() {
        let prefs = Preferences::default();
        assert_eq!(prefs.w_signal_alpha(), 0.7);
        assert_eq!(prefs.signals_alpha(), 0.65);
    }

    #[test]
    fn overlay_settings_follow_toggles() {
        let mut prefs = Preferences::default();
        prefs.show_ai_analysis_drawings = false;
        prefs.show_ltf_fibonacci = true;
        prefs.w_signal_opacity = 150;
        let settings = prefs.overlay_settings();
        assert!(!settings.show_ai_drawings);
        assert!(settings.show_ltf_fibonacci);
        assert_eq!(settings.w_signal_alpha, 1.0);
        assert_eq!(settings.fib_htf_color, OverlaySettings::default().fib_htf_color);
    }

    #[test]
    fn fibonacci_colors_follow_theme() {
        let mut prefs = Preferences::default();
        prefs.theme = Theme::Dark;
        let dark = prefs.overlay_settings();
        assert_eq!(dark.fib_htf_color.to_string(), "rgba(96, 165, 250, 0.7)");
        assert_eq!(dark.fib_ltf_color.to_string(), "rgba(251, 146, 60, 0.7)");

        prefs.theme = Theme::Light;
        let light = prefs.overlay_settings();
        assert_eq!(light.fib_htf_color.to_string(), "rgba(59, 130, 246, 0.7)");
        assert_eq!(light.fib_ltf_color.to_string(), "rgba(249, 115, 22, 0.7)");
    }
}
