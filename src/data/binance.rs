use {
    anyhow::{Context, Result, anyhow},
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    std::{convert::TryFrom, error::Error, fmt},
};

use crate::{config::EXCHANGES, domain::Candle, utils::TimeUtils};

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, String> {
    use TimeUtils as T;
    match ms {
        T::MS_IN_S => Ok(KlinesIntervalEnum::Interval1s),
        T::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        T::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        T::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        T::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        T::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        T::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        T::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        T::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        T::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        T::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        T::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        T::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        T::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        T::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        T::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(format!("Unsupported interval: {}ms", ms)),
    }
}

pub fn try_interval_from_timeframe(timeframe: &str) -> Result<KlinesIntervalEnum> {
    let ms = TimeUtils::interval_from_str(timeframe)
        .ok_or_else(|| anyhow!("Unknown timeframe '{}'", timeframe))?;
    try_interval_from_ms(ms).map_err(|e| anyhow!(e))
}

#[derive(Debug)]
pub enum BinanceKlineError {
    InvalidLength,
    InvalidType(String),
    ConnectionFailed(String),
}

impl fmt::Display for BinanceKlineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            BinanceKlineError::InvalidLength => write!(f, "Invalid length"),
            BinanceKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BinanceKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for BinanceKlineError {}

fn item_as_f64(item: Option<KlinesItemInner>) -> Option<f64> {
    match item? {
        KlinesItemInner::String(s) => s.parse::<f64>().ok(),
        KlinesItemInner::Integer(i) => Some(i as f64),
        _ => None,
    }
}

/// One SDK kline row. Rows with unreadable prices come out as NaN and are
/// dropped by the caller's validity check.
struct SdkKline(Candle);

impl TryFrom<Vec<KlinesItemInner>> for SdkKline {
    type Error = BinanceKlineError;

    fn try_from(row: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = row.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BinanceKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BinanceKlineError::InvalidType("open_time".to_string())),
        };

        let open = item_as_f64(items.next()).unwrap_or(f64::NAN);
        let high = item_as_f64(items.next()).unwrap_or(f64::NAN);
        let low = item_as_f64(items.next()).unwrap_or(f64::NAN);
        let close = item_as_f64(items.next()).unwrap_or(f64::NAN);
        let volume = item_as_f64(items.next());

        Ok(SdkKline(Candle::new(open_timestamp_ms, open, high, low, close, volume)))
    }
}

pub(crate) fn configure_binance_client() -> Result<RestApi> {
    let client = &EXCHANGES.client;
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(client.timeout_ms)
        .retries(client.retries)
        .backoff(client.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

fn log_connector_error(conn_err: &errors::ConnectorError, context: &str) {
    match conn_err {
        connection_error::ConnectorClientError(msg) => {
            log::error!("{} Client error: Check your request parameters. {}", context, msg);
        }
        connection_error::TooManyRequestsError(msg) => {
            log::warn!("{} Rate limit exceeded. Please wait and try again. {}", context, msg);
        }
        connection_error::RateLimitBanError(msg) => {
            log::error!("{} IP address banned due to excessive rate limits. {}", context, msg);
        }
        errors::ConnectorError::ServerError { msg, status_code } => {
            log::error!("{} Server error: {} (status code: {:?})", context, msg, status_code);
        }
        errors::ConnectorError::NetworkError(msg) => {
            log::error!("{} Network error: Check your internet connection. {}", context, msg);
        }
        errors::ConnectorError::NotFoundError(msg) => {
            log::error!("{} Resource not found. {}", context, msg);
        }
        connection_error::BadRequestError(msg) => {
            log::warn!("{} Bad request: Verify your input parameters. {}", context, msg);
        }
        other => {
            log::error!("{} Unexpected ConnectionError variant: {:?}", context, other);
        }
    }
}

/// Latest `limit` klines for `symbol`, oldest first, invalid rows removed.
pub async fn load_recent_klines(
    rest_client: &RestApi,
    symbol: &str,
    timeframe: &str,
    limit: u32,
) -> Result<Vec<Candle>> {
    let context = format!("{}@{}", symbol, timeframe);
    let params = KlinesParams::builder(symbol.to_uppercase(), try_interval_from_timeframe(timeframe)?)
        .limit(limit as i32)
        .build()?;

    let rows = match rest_client.klines(params).await {
        Ok(r) => r.data().await?,
        Err(e) => {
            let msg = if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                log_connector_error(conn_err, &context);
                conn_err.to_string()
            } else {
                log::error!("An unexpected error occurred for {}: {:#}", context, e);
                e.to_string()
            };
            return Err(anyhow::Error::new(BinanceKlineError::ConnectionFailed(msg))
                .context(format!("Binance API call failed for {}", context)));
        }
    };

    let mut candles = rows
        .into_iter()
        .map(SdkKline::try_from)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("{} kline conversion failed", context))?
        .into_iter()
        .map(|k| k.0)
        .filter(Candle::is_valid)
        .collect::<Vec<_>>();
    candles.sort_by_key(|c| c.timestamp_ms);
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_maps_to_sdk_interval() {
        assert!(matches!(try_interval_from_timeframe("1h"), Ok(KlinesIntervalEnum::Interval1h)));
        assert!(matches!(try_interval_from_timeframe("1M"), Ok(KlinesIntervalEnum::Interval1M)));
        assert!(try_interval_from_timeframe("7m").is_err());
    }

    #[test]
    fn sdk_row_conversion() {
        let row = vec![
            KlinesItemInner::Integer(1_700_000_000_000),
            KlinesItemInner::String("1.0".into()),
            KlinesItemInner::String("2.0".into()),
            KlinesItemInner::String("0.5".into()),
            KlinesItemInner::String("1.5".into()),
            KlinesItemInner::String("42".into()),
        ];
        let SdkKline(c) = SdkKline::try_from(row).expect("valid row");
        assert_eq!(c.close_price, 1.5);
        assert_eq!(c.volume, Some(42.0));
        assert!(c.is_valid());

        let bad = vec![KlinesItemInner::String("x".into())];
        assert!(matches!(SdkKline::try_from(bad), Err(BinanceKlineError::InvalidType(_))));
        assert!(matches!(SdkKline::try_from(vec![]), Err(BinanceKlineError::InvalidLength)));
    }
}
