//! Exchange connectivity for the symbol table pipeline.
//!
//! Each supported market gets a fetcher implementing
//! [`ExchangeInfoFetcher`](refdata_core::ExchangeInfoFetcher): `fetch_raw`
//! talks to the venue's public REST API, `parse` turns the payload into
//! normalized [`SymbolRecord`](refdata_core::SymbolRecord)s.

pub mod binance;
pub mod bybit;

pub use binance::{BinancePerpFetcher, BinanceSpotFetcher};
pub use bybit::BybitFetcher;

use refdata_core::{ExchangeInfoFetcher, Market};

/// Build the fetcher for a market.
pub fn fetcher_for(market: Market) -> Box<dyn ExchangeInfoFetcher> {
    match market {
        Market::Binance => Box::new(BinanceSpotFetcher::new()),
        Market::BinancePerp => Box::new(BinancePerpFetcher::new()),
        Market::Bybit => Box::new(BybitFetcher::new()),
    }
}
