mod binance;
mod json_file;
mod kline_parse;
mod kline_stream;
mod preferences;
mod provider;
mod templates;

pub use {
    kline_parse::{
        KlineParseError, parse_binance_rest, parse_binance_ws, parse_bingx_rest, parse_bingx_ws,
    },
    kline_stream::{ConnectionStatus, KlineStreamManager, StreamEvent, classify_frame},
    preferences::{JsonPreferencesRepository, PreferencesRepository, load_or_default},
    provider::{BinanceProvider, BingxProvider, MarketDataProvider, fetch_history, provider_for},
    templates::{JsonTemplateRepository, TemplateManager, TemplateRepository},
};
