//! Binance exchange info fetchers.
//!
//! Spot and USD-M perpetual share the same `exchangeInfo` payload shape and
//! differ only in host, path, and the instrument kind stamped on each record,
//! so both fetchers funnel through one parsing routine.

use async_trait::async_trait;
use refdata_core::{
    ExchangeInfoFetcher, InstrumentKind, RawExchangeInfo, RefdataError, SymbolRecord,
};
use serde::Deserialize;
use tracing::debug;

const SPOT_BASE_URL: &str = "https://api.binance.com";
const SPOT_EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";

const PERP_BASE_URL: &str = "https://fapi.binance.com";
const PERP_EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";

/// Status marker for symbols that are live on the book.
const STATUS_TRADING: &str = "TRADING";

// ---------------------------------------------------------------------------
// Payload models
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    #[serde(default)]
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    status: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    filters: Vec<SymbolFilter>,
}

/// The two filter entries the symbol table cares about. Every other
/// `filterType` collapses into `Other` and is ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price {
        #[serde(rename = "tickSize")]
        tick_size: String,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "stepSize")]
        step_size: String,
    },
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_exchange_info(
    raw: RawExchangeInfo,
    kind: InstrumentKind,
) -> Result<Vec<SymbolRecord>, RefdataError> {
    let info: ExchangeInfo = serde_json::from_value(raw.0)
        .map_err(|e| RefdataError::Payload(format!("malformed exchange info: {}", e)))?;
    Ok(parse_symbols(info, kind))
}

fn parse_symbols(info: ExchangeInfo, kind: InstrumentKind) -> Vec<SymbolRecord> {
    let mut records = Vec::new();
    for symbol in info.symbols {
        if symbol.status != STATUS_TRADING {
            continue;
        }
        if symbol.symbol.is_empty() || symbol.base_asset.is_empty() || symbol.quote_asset.is_empty()
        {
            continue;
        }

        let mut price_tick = None;
        let mut size_tick = None;
        for filter in &symbol.filters {
            match filter {
                SymbolFilter::Price { tick_size } => price_tick = Some(tick_size.clone()),
                SymbolFilter::LotSize { step_size } => size_tick = Some(step_size.clone()),
                SymbolFilter::Other => {}
            }
        }

        // A record needs both ticks; symbols missing either filter are dropped.
        match (price_tick, size_tick) {
            (Some(price_tick), Some(size_tick))
                if !price_tick.is_empty() && !size_tick.is_empty() =>
            {
                records.push(SymbolRecord {
                    symbol: symbol.symbol,
                    base: symbol.base_asset,
                    quote: symbol.quote_asset,
                    kind: kind.clone(),
                    price_tick,
                    size_tick,
                });
            }
            _ => {}
        }
    }
    records
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

async fn fetch_exchange_info(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
) -> Result<RawExchangeInfo, RefdataError> {
    let url = format!("{}{}", base_url, path);
    debug!(%url, "requesting exchange info");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RefdataError::Network(format!("GET {} failed: {}", url, e)))?
        .error_for_status()
        .map_err(|e| RefdataError::Network(format!("GET {} failed: {}", url, e)))?;

    let value = response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| RefdataError::Network(format!("reading body from {} failed: {}", url, e)))?;

    Ok(RawExchangeInfo(value))
}

// ---------------------------------------------------------------------------
// Fetchers
// ---------------------------------------------------------------------------

/// Fetcher for the Binance spot `exchangeInfo` endpoint.
pub struct BinanceSpotFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceSpotFetcher {
    pub fn new() -> Self {
        Self::with_base_url(SPOT_BASE_URL)
    }

    /// Point the fetcher at a non-production host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for BinanceSpotFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeInfoFetcher for BinanceSpotFetcher {
    async fn fetch_raw(&self) -> Result<RawExchangeInfo, RefdataError> {
        fetch_exchange_info(&self.client, &self.base_url, SPOT_EXCHANGE_INFO_PATH).await
    }

    fn parse(&self, raw: RawExchangeInfo) -> Result<Vec<SymbolRecord>, RefdataError> {
        parse_exchange_info(raw, InstrumentKind::Spot)
    }
}

/// Fetcher for the Binance USD-M futures `exchangeInfo` endpoint.
pub struct BinancePerpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl BinancePerpFetcher {
    pub fn new() -> Self {
        Self::with_base_url(PERP_BASE_URL)
    }

    /// Point the fetcher at a non-production host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for BinancePerpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeInfoFetcher for BinancePerpFetcher {
    async fn fetch_raw(&self) -> Result<RawExchangeInfo, RefdataError> {
        fetch_exchange_info(&self.client, &self.base_url, PERP_EXCHANGE_INFO_PATH).await
    }

    fn parse(&self, raw: RawExchangeInfo) -> Result<Vec<SymbolRecord>, RefdataError> {
        parse_exchange_info(raw, InstrumentKind::Perp)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
