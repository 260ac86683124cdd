use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePoint {
    pub timestamp_ms: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, Display)]
pub enum MaKind {
    #[serde(rename = "MA")]
    #[strum(serialize = "MA")]
    Ma,
    #[serde(rename = "EMA")]
    #[strum(serialize = "EMA")]
    Ema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MaKind,
    pub period: usize,
    pub color: String,
    pub visible: bool,
}

impl MovingAverageConfig {
    pub fn new(id: &str, kind: MaKind, period: usize, color: &str) -> Self {
        MovingAverageConfig {
            id: id.to_string(),
            kind,
            period,
            color: color.to_string(),
            visible: true,
        }
    }

    /// EMA12, EMA20, MA50, MA200
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("ma1", MaKind::Ema, 12, "#34D399"),
            Self::new("ma2", MaKind::Ema, 20, "#F472B6"),
            Self::new("ma3", MaKind::Ma, 50, "#CBD5E1"),
            Self::new("ma4", MaKind::Ma, 200, "#FF0000"),
        ]
    }

    pub fn title(&self) -> String {
        format!("{} {}", self.kind, self.period)
    }

    pub fn compute(&self, candles: &[Candle]) -> Vec<LinePoint> {
        match self.kind {
            MaKind::Ma => sma(candles, self.period),
            MaKind::Ema => ema(candles, self.period),
        }
    }
}

/// Simple moving average of closes. First point sits on candle `period - 1`.
pub fn sma(candles: &[Candle], period: usize) -> Vec<LinePoint> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    candles
        .windows(period)
        .map(|w| LinePoint {
            timestamp_ms: w[period - 1].timestamp_ms,
            value: w.iter().map(|c| c.close_price).sum::<f64>() / period as f64,
        })
        .collect()
}

/// Exponential moving average seeded with the SMA of the first `period` closes.
pub fn ema(candles: &[Candle], period: usize) -> Vec<LinePoint> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = candles[..period].iter().map(|c| c.close_price).sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(candles.len() - period + 1);
    out.push(LinePoint {
        timestamp_ms: candles[period - 1].timestamp_ms,
        value: seed,
    });

    let mut value = seed;
    for c in &candles[period..] {
        value = (c.close_price - value) * multiplier + value;
        out.push(LinePoint {
            timestamp_ms: c.timestamp_ms,
            value,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Vec<Candle> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new((i as i64 + 1) * 60_000, c, c, c, c, None))
            .collect()
    }

    #[test]
    fn sma_windows() {
        let line = sma(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        let values: Vec<f64> = line.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(line[0].timestamp_ms, 3 * 60_000);
    }

    #[test]
    fn too_short_or_zero_period_is_empty() {
        assert!(sma(&closes(&[1.0, 2.0]), 3).is_empty());
        assert!(ema(&closes(&[1.0, 2.0]), 3).is_empty());
        assert!(sma(&closes(&[1.0]), 0).is_empty());
        assert!(ema(&closes(&[1.0]), 0).is_empty());
    }

    #[test]
    fn ema_seed_and_step() {
        let line = ema(&closes(&[2.0, 4.0, 6.0, 12.0]), 3);
        assert_eq!(line.len(), 2);
        assert_eq!(line[0].value, 4.0);
        // k = 0.5
        assert_eq!(line[1].value, 8.0);
    }

    #[test]
    fn config_dispatches_on_kind() {
        let data = closes(&[2.0, 4.0, 6.0, 12.0]);
        let mut cfg = MovingAverageConfig::new("x", MaKind::Ma, 3, "#fff");
        assert_eq!(cfg.compute(&data).last().map(|p| p.value), Some(22.0 / 3.0));
        cfg.kind = MaKind::Ema;
        assert_eq!(cfg.compute(&data).last().map(|p| p.value), Some(8.0));
        assert_eq!(cfg.title(), "EMA 3");
    }

    #[test]
    fn serde_uses_type_key() {
        let json = serde_json::to_string(&MovingAverageConfig::defaults()[0]).unwrap_or_default();
        assert!(json.contains(r#""type":"EMA""#));
        assert!(json.contains(r#""period":12"#));
    }
}
