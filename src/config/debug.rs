//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Emit verbose logging for live kline stream connections and ticks.
    pub log_kline_stream: bool,

    /// Log every history fetch (symbol, interval, candle count).
    pub log_history_fetch: bool,

    /// Dump the raw LLM response text before parsing.
    pub log_llm_raw_response: bool,

    /// Template and preference repository activity.
    pub log_templates: bool,

    /// Overlay building (how many lines/markers an analysis produced).
    pub log_overlay: bool,
}

pub const DF: LogFlags = LogFlags {
    log_kline_stream: false,
    log_history_fetch: true,
    log_llm_raw_response: false,
    log_templates: true,
    log_overlay: false,
};
