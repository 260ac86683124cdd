use std::sync::LazyLock;

// Glyphs from egui's bundled emoji font
pub const ICON_REFRESH: &str = "🔄";
pub const ICON_ANALYZE: &str = "🔍";
pub const ICON_CHAT: &str = "💬";
pub const ICON_TEMPLATES: &str = "📋";
pub const ICON_SETTINGS: &str = "⚙";
pub const ICON_TRASH: &str = "🗑";
pub const ICON_STAR: &str = "★";
pub const ICON_WARNING: &str = "⚠";
pub const ICON_LIVE: &str = "●";
pub const ICON_SEND: &str = "➡";

pub struct UiText {
    pub app_title: String,

    pub icon_templates: String,
    pub icon_trash: String,
    pub icon_star: String,
    pub icon_warning: String,
    pub icon_live: String,

    // --- TOP PANEL ---
    pub tb_source: String,
    pub tb_symbol: String,
    pub tb_symbol_hint: String,
    pub tb_timeframe: String,
    pub tb_analyze: String,
    pub tb_analyzing: String,
    pub tb_chat: String,
    pub tb_templates: String,
    pub tb_settings: String,
    pub tb_reload: String,
    pub tb_offline: String,

    // --- STATUS ---
    pub status_connected: String,
    pub status_connecting: String,
    pub status_disconnected: String,
    pub status_volume: String,
    pub status_candles: String,

    // --- CENTRAL PANEL ---
    pub cp_loading_history: String,
    pub cp_loading_sub: String,
    pub cp_no_data: String,
    pub cp_no_data_sub: String,
    pub cp_offline_sub: String,

    // --- PLOT ---
    pub plot_x_axis: String,
    pub plot_y_axis: String,
    pub plot_current_price: String,

    // --- ANALYSIS PANEL ---
    pub ap_heading: String,
    pub ap_empty: String,
    pub ap_fallback: String,
    pub ap_bias: String,
    pub ap_wyckoff: String,
    pub ap_volume: String,
    pub ap_structure: String,
    pub ap_scenarios: String,
    pub ap_probability: String,
    pub ap_invalidation: String,
    pub ap_setup: String,
    pub ap_entry: String,
    pub ap_entry_zone: String,
    pub ap_stop: String,
    pub ap_targets: String,
    pub ap_rr: String,
    pub ap_conclusion: String,
    pub ap_next_move: String,
    pub ap_risks: String,
    pub ap_fibonacci: String,
    pub ap_retracements: String,
    pub ap_extensions: String,
    pub ap_level: String,
    pub ap_price: String,
    pub ap_impulse: String,

    // --- CHAT PANEL ---
    pub chat_heading: String,
    pub chat_hint: String,
    pub chat_send: String,
    pub chat_clear: String,
    pub chat_thinking: String,
    pub chat_you: String,
    pub chat_ai: String,

    // --- TEMPLATE WINDOW ---
    pub tw_title: String,
    pub tw_name: String,
    pub tw_description: String,
    pub tw_make_default: String,
    pub tw_save: String,
    pub tw_load: String,
    pub tw_set_default: String,
    pub tw_update_active: String,
    pub tw_empty: String,
    pub tw_active: String,
    pub tw_default: String,

    // --- SETTINGS WINDOW ---
    pub sw_title: String,
    pub sw_theme: String,
    pub sw_background: String,
    pub sw_moving_averages: String,
    pub sw_period: String,
    pub sw_color: String,
    pub sw_ai_drawings: String,
    pub sw_ltf_fibonacci: String,
    pub sw_w_signals: String,
    pub sw_w_signal_color: String,
    pub sw_w_signal_opacity: String,
    pub sw_signals_opacity: String,
    pub sw_volume: String,
    pub sw_candles: String,
    pub sw_price_line: String,
    pub sw_favorites: String,

    // --- ERRORS ---
    pub error_history: String,
    pub error_no_price: String,
}

pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    app_title: "TradeRoad".to_string(),

    icon_templates: ICON_TEMPLATES.to_string(),
    icon_trash: ICON_TRASH.to_string(),
    icon_star: ICON_STAR.to_string(),
    icon_warning: ICON_WARNING.to_string(),
    icon_live: ICON_LIVE.to_string(),

    tb_source: "Exchange:".to_string(),
    tb_symbol: "Symbol:".to_string(),
    tb_symbol_hint: "Type a symbol".to_string(),
    tb_timeframe: "TF:".to_string(),
    tb_analyze: format!("{} Analyze", ICON_ANALYZE),
    tb_analyzing: "Analyzing...".to_string(),
    tb_chat: format!("{} Chat", ICON_CHAT),
    tb_templates: format!("{} Templates", ICON_TEMPLATES),
    tb_settings: format!("{} Display", ICON_SETTINGS),
    tb_reload: format!("{} Reload", ICON_REFRESH),
    tb_offline: "Offline".to_string(),

    status_connected: "Live".to_string(),
    status_connecting: "Connecting".to_string(),
    status_disconnected: "Disconnected".to_string(),
    status_volume: "Vol".to_string(),
    status_candles: "Candles".to_string(),

    cp_loading_history: "Loading history".to_string(),
    cp_loading_sub: "Fetching candles from the exchange...".to_string(),
    cp_no_data: "No chart data".to_string(),
    cp_no_data_sub: "Pick a symbol or press Reload.".to_string(),
    cp_offline_sub: "Exchange connections are disabled (--offline).".to_string(),

    plot_x_axis: "Time (UTC)".to_string(),
    plot_y_axis: "Price".to_string(),
    plot_current_price: "Current Price".to_string(),

    ap_heading: "AI Analysis".to_string(),
    ap_empty: "No analysis yet. Press Analyze to request one.".to_string(),
    ap_fallback: "The model did not return a usable analysis. Try again.".to_string(),
    ap_bias: "Bias".to_string(),
    ap_wyckoff: "Wyckoff".to_string(),
    ap_volume: "Volume".to_string(),
    ap_structure: "Market structure".to_string(),
    ap_scenarios: "Scenarios".to_string(),
    ap_probability: "Probability".to_string(),
    ap_invalidation: "Invalidation".to_string(),
    ap_setup: "Setup".to_string(),
    ap_entry: "Entry".to_string(),
    ap_entry_zone: "Entry zone".to_string(),
    ap_stop: "Stop".to_string(),
    ap_targets: "Targets".to_string(),
    ap_rr: "R:R".to_string(),
    ap_conclusion: "Conclusion".to_string(),
    ap_next_move: "Next move".to_string(),
    ap_risks: "Risks".to_string(),
    ap_fibonacci: "Fibonacci".to_string(),
    ap_retracements: "Retracements".to_string(),
    ap_extensions: "Extensions".to_string(),
    ap_level: "Level".to_string(),
    ap_price: "Price".to_string(),
    ap_impulse: "Impulse".to_string(),

    chat_heading: "Assistant".to_string(),
    chat_hint: "Ask about the chart...".to_string(),
    chat_send: format!("{} Send", ICON_SEND),
    chat_clear: "Clear".to_string(),
    chat_thinking: "Thinking...".to_string(),
    chat_you: "You".to_string(),
    chat_ai: "AI".to_string(),

    tw_title: "Chart Templates".to_string(),
    tw_name: "Name".to_string(),
    tw_description: "Description".to_string(),
    tw_make_default: "Default".to_string(),
    tw_save: "Save current".to_string(),
    tw_load: "Load".to_string(),
    tw_set_default: "Set default".to_string(),
    tw_update_active: "Update active".to_string(),
    tw_empty: "No saved templates.".to_string(),
    tw_active: "active".to_string(),
    tw_default: "default".to_string(),

    sw_title: "Display Settings".to_string(),
    sw_theme: "Theme".to_string(),
    sw_background: "Pane background".to_string(),
    sw_moving_averages: "Moving averages".to_string(),
    sw_period: "Period".to_string(),
    sw_color: "Color".to_string(),
    sw_ai_drawings: "AI drawings".to_string(),
    sw_ltf_fibonacci: "LTF Fibonacci".to_string(),
    sw_w_signals: "W signals".to_string(),
    sw_w_signal_color: "W color".to_string(),
    sw_w_signal_opacity: "W opacity %".to_string(),
    sw_signals_opacity: "Signals opacity %".to_string(),
    sw_volume: "Volume bars".to_string(),
    sw_candles: "Candles".to_string(),
    sw_price_line: "Price line".to_string(),
    sw_favorites: "Favorite timeframes".to_string(),

    error_history: "Failed to load history".to_string(),
    error_no_price: "No price yet; wait for the chart to load.".to_string(),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_status_shares_the_toolbar_icon() {
        assert_eq!(UI_TEXT.icon_templates, ICON_TEMPLATES);
        assert!(UI_TEXT.tb_templates.starts_with(UI_TEXT.icon_templates.as_str()));
    }
}
