//! Curve Trader - pump.fun bonding-curve transaction builder
//!
//! This library exposes the transaction pipeline, its collaborator traits and
//! the production adapters used by the `curve-trader` binary.

// Solana SDK compatibility layer
pub mod compat;
pub mod config;
pub mod quote_source;
pub mod rpc;
pub mod structured_logging;
pub mod tx_builder;
pub mod wallet;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use solana_sdk::{message::VersionedMessage, pubkey::Pubkey, signature::Signature};
