// Domain types and value objects
mod candle;
mod data_source;

pub use candle::{Candle, CandleType, LiveCandle, merge_live_candle};
pub use data_source::{DataSource, display_symbol};
