use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    binance_sdk::spot::rest_api::RestApi,
    serde_json::Value,
    std::time::Duration,
};

use crate::{
    config::EXCHANGES,
    data::{binance, kline_parse},
    domain::{Candle, DataSource},
    utils::TimeUtils,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Abstract interface for fetching market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest `limit` candles for a symbol and timeframe, oldest first.
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>>;
}

pub struct BinanceProvider {
    client: RestApi,
}

impl BinanceProvider {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: binance::configure_binance_client()?,
        })
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>> {
        binance::load_recent_klines(&self.client, symbol, timeframe, limit).await
    }
}

pub struct BingxProvider {
    http: reqwest::Client,
}

impl BingxProvider {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(EXCHANGES.client.timeout_ms))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MarketDataProvider for BingxProvider {
    async fn fetch_candles(&self, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>> {
        let interval = TimeUtils::timeframe_to_api(timeframe);
        let limit = limit.to_string();
        let resp = self
            .http
            .get(EXCHANGES.bingx.klines_url)
            .query(&[("symbol", symbol), ("interval", interval.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .with_context(|| format!("BingX klines request failed for {}@{}", symbol, timeframe))?
            .error_for_status()?;

        let payload: Value = resp.json().await?;
        let candles = kline_parse::parse_bingx_rest(&payload, EXCHANGES.bingx.ok_code)
            .with_context(|| format!("BingX klines for {}@{}", symbol, timeframe))?;
        Ok(candles)
    }
}

pub fn provider_for(source: DataSource) -> Result<Box<dyn MarketDataProvider>> {
    Ok(match source {
        DataSource::Binance => Box::new(BinanceProvider::new()?),
        DataSource::Bingx => Box::new(BingxProvider::new()?),
    })
}

/// Fetches history for the chart. Runs inside a background runtime.
pub async fn fetch_history(source: DataSource, symbol: &str, timeframe: &str, limit: u32) -> Result<Vec<Candle>> {
    let provider = provider_for(source)?;
    let candles = provider.fetch_candles(symbol, timeframe, limit).await?;

    #[cfg(debug_assertions)]
    if DF.log_history_fetch {
        log::info!(
            "Fetched {} candles for {} {} from {}",
            candles.len(),
            symbol,
            timeframe,
            source.label()
        );
    }
    Ok(candles)
}
