//! Exchange kline payloads -> `Candle`.
//!
//! Prices arrive as strings on Binance and as strings or numbers on BingX, so
//! every numeric read goes through `num`. Points that fail validation are
//! dropped rather than failing the whole batch.

use {
    serde_json::Value,
    std::{error::Error, fmt},
};

use crate::domain::{Candle, LiveCandle};

#[derive(Debug, PartialEq)]
pub enum KlineParseError {
    NotJson(String),
    UnexpectedShape(&'static str),
    Exchange { code: String, msg: String },
}

impl fmt::Display for KlineParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KlineParseError::NotJson(e) => write!(f, "Payload is not JSON: {}", e),
            KlineParseError::UnexpectedShape(what) => write!(f, "Unexpected payload shape: {}", what),
            KlineParseError::Exchange { code, msg } => write!(f, "Exchange error {}: {}", code, msg),
        }
    }
}

impl Error for KlineParseError {}

pub fn to_json(text: &str) -> Result<Value, KlineParseError> {
    serde_json::from_str(text).map_err(|e| KlineParseError::NotJson(e.to_string()))
}

fn num(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn time_ms(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Missing volume is allowed; a volume that is present but unreadable makes the bar invalid.
fn volume(v: Option<&Value>) -> Result<Option<f64>, ()> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(v) => num(v).map(Some).ok_or(()),
    }
}

fn build(t: Option<&Value>, o: Option<&Value>, h: Option<&Value>, l: Option<&Value>, c: Option<&Value>, v: Option<&Value>) -> Option<Candle> {
    let field = |x: Option<&Value>| x.and_then(num);
    let candle = Candle::new(
        t.and_then(time_ms)?,
        field(o)?,
        field(h)?,
        field(l)?,
        field(c)?,
        volume(v).ok()?,
    );
    candle.is_valid().then_some(candle)
}

fn sorted(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp_ms);
    candles
}

/// Binance `/klines`: `[[openTime, "o", "h", "l", "c", "v", closeTime, ...], ...]`
pub fn parse_binance_rest(payload: &Value) -> Result<Vec<Candle>, KlineParseError> {
    let rows = payload
        .as_array()
        .ok_or(KlineParseError::UnexpectedShape("binance klines must be an array"))?;

    let candles = rows
        .iter()
        .filter_map(|row| {
            let r = row.as_array()?;
            build(r.first(), r.get(1), r.get(2), r.get(3), r.get(4), r.get(5))
        })
        .collect();
    Ok(sorted(candles))
}

/// Binance kline event, bare or wrapped in a combined-stream `{stream, data}` envelope.
pub fn parse_binance_ws(payload: &Value) -> Option<LiveCandle> {
    let event = payload.get("data").unwrap_or(payload);
    let k = event.get("k")?;
    let candle = build(k.get("t"), k.get("o"), k.get("h"), k.get("l"), k.get("c"), k.get("v"))?;

    let symbol = event
        .get("s")
        .or_else(|| k.get("s"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(LiveCandle {
        symbol,
        candle,
        is_closed: k.get("x").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn bingx_code_ok(code: Option<&Value>, ok_code: &str) -> bool {
    match code {
        Some(Value::String(s)) => s == ok_code,
        Some(Value::Number(n)) => n.to_string() == ok_code,
        _ => false,
    }
}

/// BingX swap `/quote/klines`: `{code: "0", data: [{time, open, high, low, close, volume}]}`
pub fn parse_bingx_rest(payload: &Value, ok_code: &str) -> Result<Vec<Candle>, KlineParseError> {
    if !bingx_code_ok(payload.get("code"), ok_code) {
        return Err(KlineParseError::Exchange {
            code: payload.get("code").map(|c| c.to_string()).unwrap_or_default(),
            msg: payload
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string(),
        });
    }

    let rows = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or(KlineParseError::UnexpectedShape("bingx klines without a data array"))?;

    let candles = rows
        .iter()
        .filter_map(|k| {
            build(k.get("time"), k.get("open"), k.get("high"), k.get("low"), k.get("close"), k.get("volume"))
        })
        .collect();
    Ok(sorted(candles))
}

/// BingX kline push. `data` is an object on some channels and an array on others.
/// Control replies (subscription acks) produce nothing.
pub fn parse_bingx_ws(payload: &Value) -> Vec<LiveCandle> {
    let symbol = payload
        .get("dataType")
        .and_then(Value::as_str)
        .and_then(|dt| dt.split('@').next())
        .unwrap_or_default()
        .to_string();

    let one = |k: &Value| {
        build(k.get("T"), k.get("o"), k.get("h"), k.get("l"), k.get("c"), k.get("v")).map(|candle| LiveCandle {
            symbol: symbol.clone(),
            candle,
            is_closed: false,
        })
    };

    match payload.get("data") {
        Some(Value::Array(items)) => items.iter().filter_map(one).collect(),
        Some(obj @ Value::Object(_)) => one(obj).into_iter().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binance_rest_rows() {
        let payload = json!([
            [1700000060000i64, "11.0", "12.0", "10.0", "11.5", "100.0", 1700000119999i64, "0", 5, "0", "0", "0"],
            [1700000000000i64, "10.0", "11.0", "9.5", "10.5", "80.0", 1700000059999i64, "0", 5, "0", "0", "0"],
            [1700000120000i64, "bad", "12.0", "10.0", "11.5", "100.0"],
            "not a row"
        ]);
        let candles = parse_binance_rest(&payload).expect("array payload");
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp_ms, 1_700_000_000_000);
        assert_eq!(candles[1].close_price, 11.5);
        assert_eq!(candles[1].volume, Some(100.0));
    }

    #[test]
    fn binance_rest_rejects_objects() {
        let err = parse_binance_rest(&json!({"code": -1121, "msg": "Invalid symbol."}));
        assert!(matches!(err, Err(KlineParseError::UnexpectedShape(_))));
    }

    #[test]
    fn binance_ws_bare_and_combined() {
        let bare = json!({"e": "kline", "s": "ETHUSDT",
            "k": {"t": 1700000000000i64, "o": "1", "h": "2", "l": "0.5", "c": "1.5", "v": "9", "x": true}});
        let live = parse_binance_ws(&bare).expect("kline");
        assert_eq!(live.symbol, "ETHUSDT");
        assert!(live.is_closed);
        assert_eq!(live.candle.close_price, 1.5);

        let combined = json!({"stream": "ethusdt@kline_1m", "data": bare});
        assert_eq!(parse_binance_ws(&combined), Some(live));

        assert!(parse_binance_ws(&json!({"result": null, "id": 1})).is_none());
    }

    #[test]
    fn bingx_rest_string_or_numeric_code() {
        let payload = json!({"code": 0, "msg": "", "data": [
            {"time": 1700000060000i64, "open": "2", "high": "3", "low": "1", "close": "2.5", "volume": "7"},
            {"time": 1700000000000i64, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 4.0},
            {"time": 0, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5}
        ]});
        let candles = parse_bingx_rest(&payload, "0").expect("ok code");
        assert_eq!(candles.len(), 2);
        assert!(candles[0].timestamp_ms < candles[1].timestamp_ms);

        let mut as_string = payload.clone();
        as_string["code"] = json!("0");
        assert!(parse_bingx_rest(&as_string, "0").is_ok());
    }

    #[test]
    fn bingx_rest_error_code() {
        let err = parse_bingx_rest(&json!({"code": 109400, "msg": "symbol not exist"}), "0");
        assert_eq!(
            err,
            Err(KlineParseError::Exchange {
                code: "109400".to_string(),
                msg: "symbol not exist".to_string()
            })
        );
    }

    #[test]
    fn bingx_ws_object_and_array() {
        let obj = json!({"code": 0, "dataType": "BTC-USDT@kline_1m",
            "data": {"T": 1700000000000i64, "o": "1", "h": "2", "l": "0.5", "c": "1.2", "v": "3"}});
        let out = parse_bingx_ws(&obj);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "BTC-USDT");

        let arr = json!({"dataType": "BTC-USDT@kline_1m", "data": [
            {"T": 1700000000000i64, "o": 1, "h": 2, "l": 0.5, "c": 1.2, "v": 3},
            {"T": 1700000060000i64, "o": 1, "h": 2, "l": 0.5, "c": "NaN?", "v": 3}
        ]});
        assert_eq!(parse_bingx_ws(&arr).len(), 1);

        assert!(parse_bingx_ws(&json!({"id": "abc", "code": 0, "msg": ""})).is_empty());
    }
}
