use {
    anyhow::{Context, Result},
    flate2::read::GzDecoder,
    futures::{SinkExt, StreamExt},
    std::{
        io::Read,
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
            mpsc::Sender,
        },
        thread,
        time::Duration,
    },
    tokio::{runtime::Runtime, time::sleep},
    tokio_tungstenite::{connect_async, tungstenite::Message},
};

use crate::{
    config::EXCHANGES,
    data::kline_parse,
    domain::{DataSource, LiveCandle},
    utils::TimeUtils,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// How often a quiet socket wakes up to check for `stop()`.
const STOP_POLL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Connecting,
    Disconnected,
}

/// What one inbound text frame means for the stream.
#[derive(Debug, PartialEq)]
pub enum StreamEvent {
    /// BingX application-level heartbeat; must be answered with `Pong`.
    Ping,
    Candles(Vec<LiveCandle>),
    Ignore,
}

pub fn stream_url(source: DataSource, symbol: &str, timeframe: &str) -> String {
    match source {
        DataSource::Binance => format!(
            "{}{}@kline_{}",
            EXCHANGES.binance.ws_base_url,
            symbol.to_lowercase(),
            TimeUtils::timeframe_to_api(timeframe)
        ),
        DataSource::Bingx => EXCHANGES.bingx.ws_url.to_string(),
    }
}

pub fn bingx_subscribe_message(symbol: &str, timeframe: &str, id: &str) -> String {
    serde_json::json!({
        "id": id,
        "reqType": "sub",
        "dataType": format!("{}@kline_{}", symbol, TimeUtils::timeframe_to_api(timeframe)),
    })
    .to_string()
}

/// BingX compresses every server frame with gzip.
pub fn gunzip_frame(bytes: &[u8]) -> Result<String> {
    let mut out = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut out)
        .context("BingX frame is not valid gzip/utf-8")?;
    Ok(out)
}

pub fn classify_frame(source: DataSource, text: &str) -> StreamEvent {
    if source == DataSource::Bingx && text.trim() == "Ping" {
        return StreamEvent::Ping;
    }
    let Ok(value) = kline_parse::to_json(text) else {
        log::warn!("Failed to parse WebSocket JSON message");
        return StreamEvent::Ignore;
    };
    let candles = match source {
        DataSource::Binance => kline_parse::parse_binance_ws(&value).into_iter().collect(),
        DataSource::Bingx => kline_parse::parse_bingx_ws(&value),
    };
    if candles.is_empty() {
        StreamEvent::Ignore
    } else {
        StreamEvent::Candles(candles)
    }
}

fn set_status(status_arc: &Mutex<ConnectionStatus>, status: ConnectionStatus) {
    if let Ok(mut s) = status_arc.lock() {
        *s = status;
    }
}

/// Live kline feed for the one chart on screen.
/// Runs on its own thread + runtime and reconnects with exponential backoff until stopped.
pub struct KlineStreamManager {
    latest_price: Arc<Mutex<Option<f64>>>,
    latest_volume: Arc<Mutex<Option<f64>>>,
    status: Arc<Mutex<ConnectionStatus>>,
    stopped: Arc<AtomicBool>,
    candle_tx: Option<Sender<LiveCandle>>,
}

impl KlineStreamManager {
    pub fn new() -> Self {
        Self {
            latest_price: Arc::new(Mutex::new(None)),
            latest_volume: Arc::new(Mutex::new(None)),
            status: Arc::new(Mutex::new(ConnectionStatus::Disconnected)),
            stopped: Arc::new(AtomicBool::new(false)),
            candle_tx: None,
        }
    }

    pub fn set_candle_sender(&mut self, tx: Sender<LiveCandle>) {
        self.candle_tx = Some(tx);
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.latest_price.lock().ok().and_then(|p| *p)
    }

    pub fn latest_volume(&self) -> Option<f64> {
        self.latest_volume.lock().ok().and_then(|v| *v)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
            .lock()
            .map(|s| *s)
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    /// Closes the socket at the next wake-up and ends the reconnect loop.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn start(&self, source: DataSource, symbol: &str, timeframe: &str) {
        let job = StreamJob {
            source,
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            latest_price: self.latest_price.clone(),
            latest_volume: self.latest_volume.clone(),
            status: self.status.clone(),
            stopped: self.stopped.clone(),
            candle_tx: self.candle_tx.clone(),
        };

        thread::spawn(move || match Runtime::new() {
            Ok(rt) => rt.block_on(job.run_with_reconnect()),
            Err(e) => log::error!("Failed to create runtime for kline stream: {}", e),
        });
    }
}

impl Default for KlineStreamManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KlineStreamManager {
    fn drop(&mut self) {
        self.stop();
    }
}

struct StreamJob {
    source: DataSource,
    symbol: String,
    timeframe: String,
    latest_price: Arc<Mutex<Option<f64>>>,
    latest_volume: Arc<Mutex<Option<f64>>>,
    status: Arc<Mutex<ConnectionStatus>>,
    stopped: Arc<AtomicBool>,
    candle_tx: Option<Sender<LiveCandle>>,
}

impl StreamJob {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    async fn run_with_reconnect(self) {
        let mut reconnect_delay = EXCHANGES.ws.initial_reconnect_delay_sec;
        let url = stream_url(self.source, &self.symbol, &self.timeframe);

        while !self.is_stopped() {
            set_status(&self.status, ConnectionStatus::Connecting);

            #[cfg(debug_assertions)]
            if DF.log_kline_stream {
                log::info!("Connecting kline stream {} {} via {}", self.symbol, self.timeframe, url);
            }

            match self.run_stream(&url).await {
                Ok(_) => {
                    if !self.is_stopped() {
                        log::warn!("WebSocket closed normally. Reconnecting...");
                    }
                    reconnect_delay = EXCHANGES.ws.initial_reconnect_delay_sec;
                }
                Err(e) => {
                    log::error!(
                        "WebSocket connection failed for {}: {:#}. Retrying in {}s...",
                        self.symbol,
                        e,
                        reconnect_delay
                    );
                }
            }

            set_status(&self.status, ConnectionStatus::Disconnected);
            if self.is_stopped() {
                break;
            }

            // Sleep in short steps so stop() is honoured during long backoffs
            let mut waited = Duration::ZERO;
            let target = Duration::from_secs(reconnect_delay);
            while waited < target && !self.is_stopped() {
                sleep(STOP_POLL).await;
                waited += STOP_POLL;
            }
            reconnect_delay = (reconnect_delay * 2).min(EXCHANGES.ws.max_reconnect_delay_sec);
        }

        #[cfg(debug_assertions)]
        if DF.log_kline_stream {
            log::info!("Kline stream {} {} stopped", self.symbol, self.timeframe);
        }
    }

    async fn run_stream(&self, url: &str) -> Result<()> {
        let (ws_stream, _) = connect_async(url).await?;
        set_status(&self.status, ConnectionStatus::Connected);

        let (mut write, mut read) = ws_stream.split();

        if self.source == DataSource::Bingx {
            let id = uuid::Uuid::new_v4().to_string();
            let sub = bingx_subscribe_message(&self.symbol, &self.timeframe, &id);
            write.send(Message::Text(sub.into())).await?;
        }

        while !self.is_stopped() {
            let msg = match tokio::time::timeout(STOP_POLL, read.next()).await {
                Err(_) => continue,
                Ok(None) => break,
                Ok(Some(msg)) => msg,
            };

            let text = match msg {
                Ok(Message::Text(text)) => text.as_str().to_string(),
                Ok(Message::Binary(bytes)) => match gunzip_frame(&bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("{:#}", e);
                        continue;
                    }
                },
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    log::error!("WebSocket error: {}", e);
                    return Err(e.into());
                }
                _ => continue,
            };

            match classify_frame(self.source, &text) {
                StreamEvent::Ping => {
                    write.send(Message::Text("Pong".into())).await?;
                }
                StreamEvent::Candles(candles) => {
                    for live in candles {
                        self.publish(live);
                    }
                }
                StreamEvent::Ignore => {}
            }
        }

        let _ = write.send(Message::Close(None)).await;
        Ok(())
    }

    fn publish(&self, live: LiveCandle) {
        if let Ok(mut p) = self.latest_price.lock() {
            *p = Some(live.candle.close_price);
        }
        if let Ok(mut v) = self.latest_volume.lock() {
            *v = live.candle.volume;
        }

        #[cfg(debug_assertions)]
        if DF.log_kline_stream {
            log::info!("[kline-tick] {} -> {:.6}", self.symbol, live.candle.close_price);
        }

        // Receiver gone means the chart was replaced; the next stop() ends us.
        if let Some(tx) = &self.candle_tx {
            let _ = tx.send(live);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    #[test]
    fn urls_per_exchange() {
        assert_eq!(
            stream_url(DataSource::Binance, "ETHUSDT", "1H"),
            "wss://stream.binance.com:9443/ws/ethusdt@kline_1h"
        );
        assert_eq!(stream_url(DataSource::Bingx, "BTC-USDT", "1h"), EXCHANGES.bingx.ws_url);
    }

    #[test]
    fn bingx_subscription_payload() {
        let msg = bingx_subscribe_message("BTC-USDT", "4h", "abc");
        let v: serde_json::Value = serde_json::from_str(&msg).expect("json");
        assert_eq!(v["reqType"], "sub");
        assert_eq!(v["dataType"], "BTC-USDT@kline_4h");
        assert_eq!(v["id"], "abc");
    }

    #[test]
    fn gzip_frames_decode() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"Ping").expect("write");
        let bytes = enc.finish().expect("finish");
        let text = gunzip_frame(&bytes).expect("gunzip");
        assert_eq!(classify_frame(DataSource::Bingx, &text), StreamEvent::Ping);

        assert!(gunzip_frame(b"plain").is_err());
    }

    #[test]
    fn frames_classify_by_exchange() {
        let binance = r#"{"e":"kline","s":"ETHUSDT","k":{"t":1700000000000,"o":"1","h":"2","l":"0.5","c":"1.5","v":"3","x":false}}"#;
        assert!(matches!(classify_frame(DataSource::Binance, binance), StreamEvent::Candles(c) if c.len() == 1));
        assert_eq!(classify_frame(DataSource::Binance, "Ping"), StreamEvent::Ignore);
        assert_eq!(classify_frame(DataSource::Bingx, r#"{"id":"x","code":0}"#), StreamEvent::Ignore);
    }

    #[test]
    fn stop_is_sticky() {
        let mgr = KlineStreamManager::new();
        assert!(!mgr.is_stopped());
        assert_eq!(mgr.status(), ConnectionStatus::Disconnected);
        mgr.stop();
        assert!(mgr.is_stopped());
        assert_eq!(mgr.latest_price(), None);
    }
}
