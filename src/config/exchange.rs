/// REST client behaviour shared by all exchange providers.
pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

pub struct WsConfig {
    pub max_reconnect_delay_sec: u64,
    pub initial_reconnect_delay_sec: u64,
}

pub struct BinanceEndpoints {
    /// Single-stream endpoint; append `<symbol>@kline_<interval>`.
    pub ws_base_url: &'static str,
}

pub struct BingxEndpoints {
    pub klines_url: &'static str,
    pub ws_url: &'static str,
    /// BingX marks success with this `code` value (number or string).
    pub ok_code: &'static str,
}

pub struct ExchangeConfig {
    pub client: ClientDefaults,
    pub ws: WsConfig,
    pub binance: BinanceEndpoints,
    pub bingx: BingxEndpoints,
}

pub const EXCHANGES: ExchangeConfig = ExchangeConfig {
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
    ws: WsConfig {
        max_reconnect_delay_sec: 300, // 5 minutes
        initial_reconnect_delay_sec: 1,
    },
    binance: BinanceEndpoints {
        ws_base_url: "wss://stream.binance.com:9443/ws/",
    },
    bingx: BingxEndpoints {
        klines_url: "https://open-api.bingx.com/openApi/swap/v2/quote/klines",
        ws_url: "wss://open-api-swap.bingx.com/swap-market",
        ok_code: "0",
    },
};
