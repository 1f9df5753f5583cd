//! Prints the gamma, vega and delta neutral allocation for a held option position.
//!
//! Inputs come from an optional TOML file (`--config`) and are overridden by flags.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hedging::{AllocationConfig, Conditioning, HedgeError, HedgeResult};
use pricing::ExerciseType;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gamma/vega neutral hedge allocation
#[derive(Parser)]
#[command(name = "asset-allocation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file with [position] and [conditioning] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Underlying price
    #[arg(long)]
    asset_price: Option<f64>,

    /// Implied volatility, e.g. 0.53
    #[arg(long)]
    volatility: Option<f64>,

    /// Calendar days to expiration
    #[arg(long)]
    days_to_expiry: Option<f64>,

    /// Continuously compounded risk-free rate
    #[arg(long, allow_hyphen_values = true)]
    risk_free_rate: Option<f64>,

    /// Signed number of held contracts, negative when short
    #[arg(long, allow_hyphen_values = true)]
    held_count: Option<i64>,

    /// Strike of the held option
    #[arg(long)]
    held_strike: Option<f64>,

    /// Strikes of the two hedge options
    #[arg(long, num_args = 2, value_names = ["K2", "K3"])]
    hedge_strikes: Option<Vec<f64>>,

    /// Price puts instead of calls
    #[arg(long)]
    put: bool,

    /// Solve with unrounded greeks
    #[arg(long)]
    raw_greeks: bool,
}

impl Cli {
    fn allocation_config(&self) -> Result<AllocationConfig, HedgeError> {
        let mut config = match &self.config {
            Some(path) => {
                info!(path = %path.display(), "loading configuration");
                AllocationConfig::from_toml_file(path)?
            }
            None => AllocationConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Flags take precedence over the file.
    fn apply_overrides(&self, config: &mut AllocationConfig) {
        let position = &mut config.position;
        if let Some(asset_price) = self.asset_price {
            position.asset_price = asset_price;
        }
        if let Some(volatility) = self.volatility {
            position.volatility = volatility;
        }
        if let Some(days) = self.days_to_expiry {
            *position = position.with_days_to_expiry(days);
        }
        if let Some(rate) = self.risk_free_rate {
            position.risk_free_rate = rate;
        }
        if let Some(count) = self.held_count {
            position.held_count = count;
        }
        if let Some(strike) = self.held_strike {
            position.held_strike = strike;
        }
        if let Some(strikes) = &self.hedge_strikes {
            if let [k2, k3] = strikes.as_slice() {
                position.hedge_strike_1 = *k2;
                position.hedge_strike_2 = *k3;
            }
        }
        if self.put {
            position.variant = ExerciseType::Put;
        }
        if self.raw_greeks {
            config.conditioning = Conditioning {
                round_decimals: None,
                ..config.conditioning
            };
        }
    }

    fn run(&self) -> Result<HedgeResult, HedgeError> {
        let config = self.allocation_config()?;
        info!(position = ?config.position, conditioning = ?config.conditioning, "allocating");
        config.run()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.run() {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            if err.is_singular() {
                warn!("hedge options need sufficiently different strikes or expiries");
            }
            ExitCode::FAILURE
        }
    }
}
