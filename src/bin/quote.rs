use chrono::Datelike;
use clap::Parser;
use kse_tracker::core::psx::PsxClient;
use kse_tracker::utils::logger;

#[derive(Parser)]
#[command(name = "quote")]
#[command(about = "Fetches the latest daily bar for a PSX symbol")]
struct Args {
    /// Ticker symbol, e.g. HBL
    symbol: String,

    /// Month to query (defaults to the current month)
    #[arg(short, long)]
    month: Option<u32>,

    /// Year to query (defaults to the current year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Base URL of the PSX data portal
    #[arg(long, default_value = "https://dps.psx.com.pk")]
    dps_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let now = chrono::Local::now();
    let month = args.month.unwrap_or_else(|| now.month());
    let year = args.year.unwrap_or_else(|| now.year());
    let symbol = args.symbol.to_uppercase();

    tracing::info!("📡 Fetching {} quote for {}/{}", symbol, month, year);

    let client = PsxClient::new(&args.dps_url);
    match client.fetch_history(&symbol, month, year).await {
        Ok(quote) => {
            println!("📊 {} on {}", quote.symbol, quote.date);
            println!("  Open:   {}", quote.open);
            println!("  High:   {}", quote.high);
            println!("  Low:    {}", quote.low);
            println!("  Close:  {}", quote.close);
            println!("  Volume: {}", quote.volume);
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}
