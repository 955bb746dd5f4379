use crate::models::{Market, RawExchangeInfo, SymbolRecord};
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors that can occur across the fetch → parse → write pipeline.
///
/// The orchestrator matches on the variant to phrase its final report:
/// `Network` failures are reported as fetch errors, everything else
/// generically. All variants terminate the run; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum RefdataError {
    /// HTTP transport failure or a non-success status from the exchange.
    #[error("{0}")]
    Network(String),
    /// Unknown market name given on the command line.
    #[error("unsupported market: {0} (supported markets: {supported})", supported = Market::supported_names())]
    UnsupportedMarket(String),
    /// A payload was missing an expected field or had an unexpected shape.
    #[error("{0}")]
    Payload(String),
    /// Failure creating or writing the output file.
    #[error("{0}")]
    Output(String),
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Fetcher trait
// ---------------------------------------------------------------------------

/// Retrieves and parses one exchange's instrument catalogue.
///
/// `fetch_raw` is the only operation that touches the network; `parse` is a
/// pure function over the returned payload, so parsing rules can be tested
/// against fixtures without any HTTP in the loop.
#[async_trait]
pub trait ExchangeInfoFetcher: Send + Sync {
    /// Retrieve the raw exchange-info payload.
    ///
    /// Fails with [`RefdataError::Network`] on transport failure or a
    /// non-success HTTP status.
    async fn fetch_raw(&self) -> Result<RawExchangeInfo, RefdataError>;

    /// Extract normalized symbol records from a raw payload.
    ///
    /// Instruments that are not actively trading, or whose price/size tick
    /// cannot be resolved, are skipped; the result may be empty.
    fn parse(&self, raw: RawExchangeInfo) -> Result<Vec<SymbolRecord>, RefdataError>;
}
