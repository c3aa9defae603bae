//! Curve Trader CLI
//!
//! Buys, sells or bumps a pump.fun bonding-curve token from the command line.
//!
//! ```text
//! curve-trader buy  <MINT> [--amount 1000.5]
//! curve-trader sell <MINT> --amount 250000
//! curve-trader bump <MINT>
//! ```
//!
//! Every subcommand accepts `--simulate-only` to stop after simulation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curve_trader::config::Config;
use curve_trader::quote_source::HttpQuoteSource;
use curve_trader::rpc::RpcLedgerClient;
use curve_trader::tx_builder::{
    parse_ui_amount, BuyAmount, TradeExecutor, TxBuildOutput, TxBuilder,
};
use curve_trader::wallet::{KeypairSigner, TransactionSigner};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "CURVE_TRADER_CONFIG")]
    config: String,

    /// Override the RPC endpoint from the config file
    #[arg(long, env = "CURVE_TRADER_RPC_URL")]
    rpc_url: Option<String>,

    /// Sign and simulate, but never broadcast
    #[arg(long, global = true)]
    simulate_only: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Buy tokens; without --amount the amount comes from the curve reserves
    ///
    /// The reserve-implied amount is the SOL-per-token ratio floored to raw
    /// units. On a typical pump.fun curve that ratio is far below one token,
    /// so the build fails with a zero-amount quote error; pass --amount.
    Buy {
        mint: String,
        /// Whole-token amount, decimal allowed; required on most live curves
        #[arg(long)]
        amount: Option<String>,
    },
    /// Sell tokens priced against the live curve
    Sell {
        mint: String,
        /// Whole-token amount, decimal allowed, in the configured decimals
        #[arg(long)]
        amount: String,
    },
    /// Buy and sell the reserve-implied amount in one transaction
    ///
    /// Fails with a zero-amount quote error when the reserve ratio floors to
    /// zero raw units, which is the usual case on live pump.fun curves.
    Bump { mint: String },
}

impl Command {
    fn mint(&self) -> &str {
        match self {
            Command::Buy { mint, .. } | Command::Sell { mint, .. } | Command::Bump { mint } => mint,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json_logs)?;
    info!("Curve Trader v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(url) = &args.rpc_url {
        config.rpc.url = url.clone();
    }
    config.validate().context("Invalid configuration")?;

    let signer = Arc::new(load_signer(&config)?);
    let user = signer.pubkey();
    info!(wallet = %user, "Wallet loaded");

    let mint = Pubkey::from_str(args.command.mint())
        .with_context(|| format!("Invalid mint address: {}", args.command.mint()))?;

    let ledger = Arc::new(RpcLedgerClient::new(
        config.rpc.url.clone(),
        config.rpc.commitment_config()?,
        config.rpc.timeout(),
    ));
    let quote_source = Arc::new(HttpQuoteSource::new(
        config.quote.base_url.clone(),
        config.quote.timeout(),
    )?);
    let builder = TxBuilder::new(
        ledger.clone(),
        quote_source,
        config.trading.builder_config(),
    );

    let output = build(&builder, &args.command, &user, &mint, config.trading.decimals).await?;
    info!(
        operation = output.operation.as_str(),
        correlation_id = output.correlation_id(),
        instructions = output.unsigned.instructions.len(),
        creates_token_account = output.creates_token_account(),
        "Transaction built"
    );

    let executor = TradeExecutor::new(
        ledger,
        signer,
        config.rpc.commitment_config()?,
        config.trading.simulate_before_send,
    );

    if args.simulate_only {
        let outcome = executor
            .simulate_only(&output)
            .await
            .context("Simulation failed")?;
        for line in &outcome.logs {
            println!("{}", line);
        }
        println!(
            "simulation ok, units consumed: {}",
            outcome
                .units_consumed
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        return Ok(());
    }

    let report = executor
        .execute(&output)
        .await
        .context("Trade execution failed")?;
    println!("{}", report.signature);

    Ok(())
}

async fn build(
    builder: &TxBuilder,
    command: &Command,
    user: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
) -> Result<TxBuildOutput> {
    let output = match command {
        Command::Buy { amount, .. } => {
            let amount = match amount {
                Some(ui) => BuyAmount::Exact(parse_ui_amount(ui, decimals)?),
                None => BuyAmount::FromReserves,
            };
            builder.build_buy(user, mint, amount).await?
        }
        Command::Sell { amount, .. } => {
            let raw = parse_ui_amount(amount, decimals)?;
            builder.build_sell(user, mint, raw).await?
        }
        Command::Bump { .. } => builder.build_bump(user, mint).await?,
    };
    Ok(output)
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose {
        "curve_trader=debug,info"
    } else {
        "curve_trader=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        dotenvy::dotenv().ok();
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}

/// Keypair file if configured, otherwise the base58 secret in the environment
fn load_signer(config: &Config) -> Result<KeypairSigner> {
    if let Some(path) = &config.wallet.keypair_path {
        return KeypairSigner::from_file(path).context("Failed to load wallet");
    }

    let secret = std::env::var(&config.wallet.secret_key_env).with_context(|| {
        format!(
            "No wallet.keypair_path set and {} is not in the environment",
            config.wallet.secret_key_env
        )
    })?;
    KeypairSigner::from_base58(&secret).context("Failed to load wallet from environment")
}
