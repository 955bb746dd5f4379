//! Bybit v5 instruments-info fetcher.
//!
//! One endpoint serves every product category. The fetcher walks the spot,
//! linear, and inverse categories in order, following the page cursor within
//! each, and stitches the pages back into a single payload. Each instrument
//! is tagged with its category on the way through, since the upstream
//! entries do not carry it and parsing needs it to pick the size tick.

use async_trait::async_trait;
use refdata_core::{
    ExchangeInfoFetcher, InstrumentKind, RawExchangeInfo, RefdataError, SymbolRecord,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

const BASE_URL: &str = "https://api.bybit.com";
const INSTRUMENTS_INFO_PATH: &str = "/v5/market/instruments-info";

/// Status marker for live instruments. Mixed case, unlike Binance.
const STATUS_TRADING: &str = "Trading";

/// Largest page size the endpoint accepts.
const PAGE_LIMIT: u32 = 1000;

/// Product categories fetched per run, in output order.
const CATEGORIES: [&str; 3] = ["spot", "linear", "inverse"];

// ---------------------------------------------------------------------------
// Payload models
// ---------------------------------------------------------------------------

/// Shape of a single paginated response, with instruments kept raw so the
/// category tag can be inserted before they are stitched together.
#[derive(Debug, Deserialize)]
struct InstrumentsPage {
    #[serde(default)]
    result: PageResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResult {
    #[serde(default)]
    list: Vec<Value>,
    #[serde(default)]
    next_page_cursor: Option<String>,
}

/// Shape of the stitched payload handed to `parse`.
#[derive(Debug, Deserialize)]
struct InstrumentsInfo {
    #[serde(default)]
    result: InstrumentList,
}

#[derive(Debug, Default, Deserialize)]
struct InstrumentList {
    #[serde(default)]
    list: Vec<Instrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    #[serde(default)]
    status: String,
    base_coin: String,
    quote_coin: String,
    /// Tag added during fetching; instruments from elsewhere default to spot.
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    price_filter: PriceFilter,
    #[serde(default)]
    lot_size_filter: LotSizeFilter,
}

fn default_category() -> String {
    "spot".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceFilter {
    #[serde(default)]
    tick_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LotSizeFilter {
    #[serde(default)]
    qty_step: Option<String>,
    #[serde(default)]
    base_precision: Option<String>,
}

fn kind_for_category(category: &str) -> InstrumentKind {
    match category {
        "spot" => InstrumentKind::Spot,
        "linear" => InstrumentKind::Perp,
        "inverse" => InstrumentKind::Inverse,
        other => InstrumentKind::Other(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Fetcher for the Bybit v5 `instruments-info` endpoint across all
/// supported categories.
pub struct BybitFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl BybitFetcher {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the fetcher at a non-production host.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Walk every page of one category, appending tagged instruments to
    /// `all`. Stops when a page comes back without a next cursor or without
    /// instruments.
    async fn fetch_category(&self, category: &str, all: &mut Vec<Value>) -> Result<(), RefdataError> {
        info!(category, "fetching instruments");
        let url = format!("{}{}", self.base_url, INSTRUMENTS_INFO_PATH);
        let limit = PAGE_LIMIT.to_string();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("category", category), ("limit", limit.as_str())]);
            if let Some(ref c) = cursor {
                request = request.query(&[("cursor", c.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| RefdataError::Network(format!("GET {} failed: {}", url, e)))?
                .error_for_status()
                .map_err(|e| RefdataError::Network(format!("GET {} failed: {}", url, e)))?;

            let page: InstrumentsPage = response.json().await.map_err(|e| {
                RefdataError::Network(format!("reading body from {} failed: {}", url, e))
            })?;

            let PageResult {
                list,
                next_page_cursor,
            } = page.result;

            let fetched = list.len();
            for mut item in list {
                if let Some(object) = item.as_object_mut() {
                    object.insert("category".to_string(), Value::String(category.to_string()));
                }
                all.push(item);
            }
            debug!(category, fetched, total = all.len(), "instrument page received");

            match next_page_cursor {
                Some(next) if !next.is_empty() && fetched > 0 => cursor = Some(next),
                _ => break,
            }
        }
        Ok(())
    }
}

impl Default for BybitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeInfoFetcher for BybitFetcher {
    async fn fetch_raw(&self) -> Result<RawExchangeInfo, RefdataError> {
        let mut all = Vec::new();
        for category in CATEGORIES {
            self.fetch_category(category, &mut all).await?;
        }
        Ok(RawExchangeInfo(json!({ "result": { "list": all } })))
    }

    fn parse(&self, raw: RawExchangeInfo) -> Result<Vec<SymbolRecord>, RefdataError> {
        let info: InstrumentsInfo = serde_json::from_value(raw.0)
            .map_err(|e| RefdataError::Payload(format!("malformed instruments info: {}", e)))?;

        let mut records = Vec::new();
        for instrument in info.result.list {
            if instrument.status != STATUS_TRADING {
                continue;
            }
            if instrument.symbol.is_empty()
                || instrument.base_coin.is_empty()
                || instrument.quote_coin.is_empty()
            {
                continue;
            }

            // Derivatives quantize size by qtyStep; spot quotes basePrecision.
            let size_tick = match instrument.category.as_str() {
                "linear" | "inverse" => instrument.lot_size_filter.qty_step,
                _ => instrument.lot_size_filter.base_precision,
            };
            let price_tick = instrument.price_filter.tick_size;

            match (price_tick, size_tick) {
                (Some(price_tick), Some(size_tick))
                    if !price_tick.is_empty() && !size_tick.is_empty() =>
                {
                    records.push(SymbolRecord {
                        symbol: instrument.symbol,
                        base: instrument.base_coin,
                        quote: instrument.quote_coin,
                        kind: kind_for_category(&instrument.category),
                        price_tick,
                        size_tick,
                    });
                }
                _ => {}
            }
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn linear_instrument(symbol: &str, qty_step: &str) -> Value {
        json!({
            "symbol": symbol,
            "status": "Trading",
            "baseCoin": symbol.trim_end_matches("USDT"),
            "quoteCoin": "USDT",
            "priceFilter": { "tickSize": "0.10", "minPrice": "0.10" },
            "lotSizeFilter": { "qtyStep": qty_step, "maxOrderQty": "100.000" }
        })
    }

    #[test]
    fn test_parse_linear_uses_qty_step() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "BTCUSDT",
                "status": "Trading",
                "baseCoin": "BTC",
                "quoteCoin": "USDT",
                "category": "linear",
                "priceFilter": { "tickSize": "0.10" },
                "lotSizeFilter": { "qtyStep": "0.001", "basePrecision": "0.000001" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert_eq!(
            records,
            vec![SymbolRecord {
                symbol: "BTCUSDT".to_string(),
                base: "BTC".to_string(),
                quote: "USDT".to_string(),
                kind: InstrumentKind::Perp,
                price_tick: "0.10".to_string(),
                size_tick: "0.001".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_spot_uses_base_precision() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "ETHUSDC",
                "status": "Trading",
                "baseCoin": "ETH",
                "quoteCoin": "USDC",
                "category": "spot",
                "priceFilter": { "tickSize": "0.01" },
                "lotSizeFilter": { "basePrecision": "0.00001", "quotePrecision": "0.0000001" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert_eq!(records[0].kind, InstrumentKind::Spot);
        assert_eq!(records[0].size_tick, "0.00001");
    }

    #[test]
    fn test_parse_inverse_uses_qty_step() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "BTCUSD",
                "status": "Trading",
                "baseCoin": "BTC",
                "quoteCoin": "USD",
                "category": "inverse",
                "priceFilter": { "tickSize": "0.50" },
                "lotSizeFilter": { "qtyStep": "1" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert_eq!(records[0].kind, InstrumentKind::Inverse);
        assert_eq!(records[0].size_tick, "1");
    }

    #[test]
    fn test_parse_defaults_missing_category_to_spot() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "SOLUSDT",
                "status": "Trading",
                "baseCoin": "SOL",
                "quoteCoin": "USDT",
                "priceFilter": { "tickSize": "0.001" },
                "lotSizeFilter": { "qtyStep": "0.1", "basePrecision": "0.01" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert_eq!(records[0].kind, InstrumentKind::Spot);
        assert_eq!(records[0].size_tick, "0.01");
    }

    #[test]
    fn test_parse_unknown_category_kept_verbatim() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "BTC-30AUG26-80000-C",
                "status": "Trading",
                "baseCoin": "BTC",
                "quoteCoin": "USDC",
                "category": "option",
                "priceFilter": { "tickSize": "5" },
                "lotSizeFilter": { "basePrecision": "0.01" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert_eq!(records[0].kind, InstrumentKind::Other("option".to_string()));
    }

    #[test]
    fn test_parse_skips_non_trading_and_missing_ticks() {
        let fetcher = BybitFetcher::new();
        let payload = json!({ "result": { "list": [
            {
                "symbol": "DELISTEDUSDT",
                "status": "Closed",
                "baseCoin": "DELISTED",
                "quoteCoin": "USDT",
                "category": "linear",
                "priceFilter": { "tickSize": "0.01" },
                "lotSizeFilter": { "qtyStep": "1" }
            },
            {
                "symbol": "NOTICKUSDT",
                "status": "Trading",
                "baseCoin": "NOTICK",
                "quoteCoin": "USDT",
                "category": "linear",
                "priceFilter": {},
                "lotSizeFilter": { "qtyStep": "1" }
            },
            {
                "symbol": "NOSTEPUSDT",
                "status": "Trading",
                "baseCoin": "NOSTEP",
                "quoteCoin": "USDT",
                "category": "linear",
                "priceFilter": { "tickSize": "0.01" },
                "lotSizeFilter": { "basePrecision": "0.01" }
            }
        ]}});

        let records = fetcher.parse(RawExchangeInfo(payload)).unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_raw_paginates_all_categories() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v5/market/instruments-info"))
            .and(query_param("category", "spot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "list": [{
                        "symbol": "BTCUSDT",
                        "status": "Trading",
                        "baseCoin": "BTC",
                        "quoteCoin": "USDT",
                        "priceFilter": { "tickSize": "0.01" },
                        "lotSizeFilter": { "basePrecision": "0.000001" }
                    }],
                    "nextPageCursor": ""
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v5/market/instruments-info"))
            .and(query_param("category", "linear"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "list": [
                        linear_instrument("ETHUSDT", "0.01"),
                        linear_instrument("XRPUSDT", "1")
                    ],
                    "nextPageCursor": "page-2"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v5/market/instruments-info"))
            .and(query_param("category", "linear"))
            .and(query_param("cursor", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "list": [linear_instrument("SOLUSDT", "0.1")],
                    "nextPageCursor": ""
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v5/market/instruments-info"))
            .and(query_param("category", "inverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "list": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = BybitFetcher::with_base_url(server.uri());
        let raw = fetcher.fetch_raw().await.unwrap();

        let list = raw.0["result"]["list"].as_array().unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0]["category"], "spot");
        assert_eq!(list[1]["category"], "linear");
        assert_eq!(list[3]["symbol"], "SOLUSDT");

        let records = fetcher.parse(raw).unwrap();
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "XRPUSDT", "SOLUSDT"]);
        assert_eq!(records[0].kind, InstrumentKind::Spot);
        assert_eq!(records[1].kind, InstrumentKind::Perp);
    }

    #[tokio::test]
    async fn test_fetch_raw_surfaces_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/market/instruments-info"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = BybitFetcher::with_base_url(server.uri());
        let err = fetcher.fetch_raw().await.unwrap_err();
        assert!(matches!(err, RefdataError::Network(_)));
    }
}
