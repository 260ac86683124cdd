use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One OHLCV bar. `timestamp_ms` is the bar's open time (UTC epoch millis).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: Option<f64>) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            volume,
        }
    }

    pub fn get_type(&self) -> CandleType {
        if self.close_price >= self.open_price {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open_price, self.close_price),
            CandleType::Bearish => (self.close_price, self.open_price),
        }
    }

    /// A bar is drawable when its time is positive and every price is a real number.
    /// Volume may be missing, but if present it must be finite too.
    pub fn is_valid(&self) -> bool {
        self.timestamp_ms > 0
            && [self.open_price, self.high_price, self.low_price, self.close_price]
                .iter()
                .all(|p| p.is_finite())
            && self.volume.is_none_or(|v| v.is_finite())
    }

    pub fn volume_or_zero(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }
}

/// A bar pushed by a live stream. `is_closed` is only known for Binance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveCandle {
    pub symbol: String,
    pub candle: Candle,
    pub is_closed: bool,
}

/// Folds a live update into an ascending series: same open time replaces the
/// last bar, a newer one is appended, anything older is dropped.
/// Returns true when the series changed.
pub fn merge_live_candle(series: &mut Vec<Candle>, candle: Candle) -> bool {
    if !candle.is_valid() {
        return false;
    }
    match series.last_mut() {
        Some(last) if last.timestamp_ms == candle.timestamp_ms => {
            *last = candle;
            true
        }
        Some(last) if last.timestamp_ms > candle.timestamp_ms => false,
        _ => {
            series.push(candle);
            true
        }
    }
}
