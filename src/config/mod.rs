pub mod cli;
pub mod file;
#[cfg(feature = "lambda")]
pub mod lambda;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use rust_decimal::Decimal;

#[cfg(feature = "cli")]
use self::file::FileConfig;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_DPS_URL: &str = "https://dps.psx.com.pk";
pub const DEFAULT_INDEX: &str = "KSE100";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "kse-tracker")]
#[command(about = "Plans proportional KSE-100 share purchases from index weightings")]
pub struct CliConfig {
    /// Total money to distribute across the index constituents
    #[arg(long)]
    pub money_to_invest: Option<Decimal>,

    /// Existing portfolio CSV (SYMBOL, SHARE_PRICE, SHARES, TOTAL_INVESTED)
    #[arg(long)]
    pub portfolio: Option<String>,

    /// Price ceiling for the one-share minimum on unheld stocks
    #[arg(long)]
    pub threshold: Option<Decimal>,

    /// Index to track (defaults to KSE100)
    #[arg(long)]
    pub index: Option<String>,

    /// Base URL of the PSX data portal
    #[arg(long)]
    pub dps_url: Option<String>,

    /// Directory for the plan and snapshot files (defaults to ./output)
    #[arg(long)]
    pub output_path: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Skip writing the raw index snapshot CSV
    #[arg(long)]
    pub no_snapshot: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable system monitoring
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merges command line flags over file settings into a runnable config.
    /// Flags win, the file fills gaps and built-in defaults cover the rest.
    pub fn resolve(self, file: Option<FileConfig>) -> Result<TrackerConfig> {
        let file = file.unwrap_or_default();

        let money = self.money_to_invest.or_else(|| file.money_to_invest());
        let money_to_invest = *validation::validate_required_field("money_to_invest", &money)?;

        Ok(TrackerConfig {
            dps_url: self
                .dps_url
                .or_else(|| file.dps_url().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_DPS_URL.to_string()),
            index_symbol: self
                .index
                .or_else(|| file.index().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            portfolio_path: self
                .portfolio
                .or_else(|| file.portfolio_path().map(str::to_string)),
            money_to_invest,
            threshold: self
                .threshold
                .or_else(|| file.threshold())
                .unwrap_or(Decimal::ZERO),
            output_path: self
                .output_path
                .or_else(|| file.output_path().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
            snapshot_enabled: !self.no_snapshot && file.snapshot().unwrap_or(true),
            sort_by_amount: true,
            monitor: self.monitor || file.monitoring_enabled(),
        })
    }
}

/// Fully resolved runtime configuration for one tracking run.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub dps_url: String,
    pub index_symbol: String,
    pub portfolio_path: Option<String>,
    pub money_to_invest: Decimal,
    pub threshold: Decimal,
    pub output_path: String,
    pub snapshot_enabled: bool,
    pub sort_by_amount: bool,
    pub monitor: bool,
}

impl ConfigProvider for TrackerConfig {
    fn dps_url(&self) -> &str {
        &self.dps_url
    }

    fn index_symbol(&self) -> &str {
        &self.index_symbol
    }

    fn portfolio_path(&self) -> Option<&str> {
        self.portfolio_path.as_deref()
    }

    fn money_to_invest(&self) -> Decimal {
        self.money_to_invest
    }

    fn threshold(&self) -> Decimal {
        self.threshold
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn snapshot_enabled(&self) -> bool {
        self.snapshot_enabled
    }

    fn sort_by_amount(&self) -> bool {
        self.sort_by_amount
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("dps_url", &self.dps_url)?;
        validation::validate_non_empty_string("index", &self.index_symbol)?;
        validation::validate_path("output_path", &self.output_path)?;

        if let Some(path) = &self.portfolio_path {
            validation::validate_path("portfolio", path)?;
            validation::validate_csv_extension("portfolio", path)?;
        }

        validation::validate_positive_decimal("money_to_invest", self.money_to_invest)?;
        validation::validate_non_negative_decimal("threshold", self.threshold)?;

        Ok(())
    }
}
