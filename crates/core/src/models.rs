use crate::traits::RefdataError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// A market the tool knows how to fetch instrument metadata from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// Binance spot.
    Binance,
    /// Binance USDT-margined perpetual futures.
    BinancePerp,
    /// Bybit v5 (spot, linear, and inverse categories).
    Bybit,
}

impl Market {
    /// Every supported market, in the order they are advertised to users.
    pub const SUPPORTED: [Market; 3] = [Market::Binance, Market::BinancePerp, Market::Bybit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Binance => "binance",
            Market::BinancePerp => "binanceperp",
            Market::Bybit => "bybit",
        }
    }

    /// Comma-separated supported market names, for error messages and help text.
    pub fn supported_names() -> String {
        Market::SUPPORTED
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = RefdataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binance" => Ok(Market::Binance),
            "binanceperp" => Ok(Market::BinancePerp),
            "bybit" => Ok(Market::Bybit),
            other => Err(RefdataError::UnsupportedMarket(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Instrument taxonomy
// ---------------------------------------------------------------------------

/// Instrument category, mapped from each exchange's own vocabulary.
///
/// `Other` carries an upstream category the taxonomy does not know; it is
/// passed through verbatim rather than dropped, so new upstream categories
/// surface in the output instead of silently disappearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Spot,
    Perp,
    Inverse,
    Other(String),
}

impl InstrumentKind {
    pub fn as_str(&self) -> &str {
        match self {
            InstrumentKind::Spot => "spot",
            InstrumentKind::Perp => "perp",
            InstrumentKind::Inverse => "inverse",
            InstrumentKind::Other(category) => category,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstrumentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Symbol record
// ---------------------------------------------------------------------------

/// One normalized instrument row, the only entity the tool persists.
///
/// Tick values stay exactly as the exchange sent them; round-tripping
/// through a float would change their lexical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    pub symbol: String,
    pub base: String,
    pub quote: String,
    #[serde(rename = "instrument")]
    pub kind: InstrumentKind,
    #[serde(rename = "priceTick")]
    pub price_tick: String,
    #[serde(rename = "szTick")]
    pub size_tick: String,
}

// ---------------------------------------------------------------------------
// Raw payload
// ---------------------------------------------------------------------------

/// Raw exchange-info payload as fetched (or reassembled) by a fetcher.
///
/// Kept as loose JSON so a single fetcher contract covers differently shaped
/// upstream responses; each fetcher's `parse` deserializes it into its own
/// typed payload models.
#[derive(Debug, Clone)]
pub struct RawExchangeInfo(pub serde_json::Value);
