use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use refdata_core::{Market, RefdataError};
use refdata_exchanges::fetcher_for;
use refdata_table::write_symbol_table;

#[derive(Parser)]
#[command(name = "refdata")]
#[command(about = "Fetch exchange info and convert it to a CSV symbol table")]
#[command(version)]
struct Cli {
    /// Exchange market to fetch info from (binance, binanceperp, bybit)
    market: String,

    /// Output CSV file path (default: artifact/<market>.csv)
    #[arg(long)]
    dst: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        match e {
            RefdataError::Network(_) => eprintln!("Error fetching data: {}", e),
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RefdataError> {
    let market: Market = cli.market.parse()?;
    let dst = cli
        .dst
        .unwrap_or_else(|| PathBuf::from(format!("artifact/{}.csv", market)));

    let fetcher = fetcher_for(market);

    tracing::info!(market = %market, "fetching exchange info");
    let raw = fetcher.fetch_raw().await?;

    let records = fetcher.parse(raw)?;
    tracing::info!(symbols = records.len(), "found trading symbols");

    write_symbol_table(&records, &dst)?;
    println!("Successfully wrote {} symbols to {}", records.len(), dst.display());

    Ok(())
}
