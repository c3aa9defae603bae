//! Bonding-curve trade transaction builder
//!
//! Builds, signs, simulates and submits buy and sell transactions for the
//! pump.fun bonding-curve program.
//!
//! ## Architecture
//!
//! - **addresses**: program-derived and associated-token address derivation
//! - **encoding**: the 24-byte buy/sell instruction payload
//! - **accounts**: declarative per-operation account templates
//! - **quote**: token amounts and slippage bounds, integer math only
//! - **instructions**: instruction planning and ordering validation
//! - **assembler**: unsigned transaction assembly
//! - **context** / **output**: build-stage data handed to later stages
//! - **builder**: `TxBuilder`, orchestrating the above against the ledger
//! - **executor**: `TradeExecutor`, the sign/simulate/broadcast stages
//! - **errors**: the error taxonomy shared by every stage
//!
//! ## Transaction layout
//!
//! 1. Compute budget priority fee
//! 2. Idempotent token account creation, only when the account is absent
//! 3. Curve program instructions (one for buy and sell, two for bump)
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use curve_trader::rpc::RpcLedgerClient;
//! use curve_trader::quote_source::{HttpQuoteSource, DEFAULT_QUOTE_BASE_URL};
//! use curve_trader::tx_builder::{BuyAmount, TradeExecutor, TxBuilder, TxBuilderConfig};
//! use curve_trader::wallet::{KeypairSigner, TransactionSigner};
//! use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
//! use std::time::Duration;
//!
//! # async fn example(mint: Pubkey) -> anyhow::Result<()> {
//! let ledger = Arc::new(RpcLedgerClient::new(
//!     "https://api.mainnet-beta.solana.com",
//!     CommitmentConfig::confirmed(),
//!     Duration::from_secs(30),
//! ));
//! let quotes = Arc::new(HttpQuoteSource::new(DEFAULT_QUOTE_BASE_URL, Duration::from_secs(10))?);
//! let signer = Arc::new(KeypairSigner::from_file("id.json")?);
//!
//! let builder = TxBuilder::new(ledger.clone(), quotes, TxBuilderConfig::default());
//! let output = builder.build_buy(&signer.pubkey(), &mint, BuyAmount::FromReserves).await?;
//!
//! let executor = TradeExecutor::new(ledger, signer, CommitmentConfig::confirmed(), true);
//! let report = executor.execute(&output).await?;
//! println!("{}", report.signature);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::TransactionBuilderError;

pub mod accounts;
pub mod addresses;
pub mod assembler;
mod builder;
pub mod constants;
mod context;
pub mod encoding;
mod executor;
pub mod instructions;
mod output;
pub mod quote;

pub use accounts::{build_account_metas, AccountRole, AccountSlot, OperationKind, ResolvedAccounts};
pub use addresses::{derive, derive_associated_account, CurveAddresses};
pub use assembler::{assemble, UnsignedTransaction};
pub use builder::{BuyAmount, TxBuilder, TxBuilderConfig};
pub use context::ExecutionContext;
pub use encoding::{
    encode_buy, encode_sell, parse_ui_amount, scale_ui_amount, DecodedPayload,
    InstructionPayload, TradeSide,
};
pub use executor::{verify_fee_payer_signature, ExecutionReport, TradeExecutor};
pub use instructions::{plan_trade_instructions, sanity_check_ix_order, InstructionPlan};
pub use output::{SignedTransaction, TradeOperation, TxBuildOutput};
pub use quote::{
    buy_quote_exact, buy_quote_from_reserves, sell_quote, BuyBound, CurveReserves,
    CurveSnapshot, SellBound, TokenQuote, TradeBound,
};
