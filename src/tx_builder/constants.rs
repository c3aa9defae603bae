//! Well-known addresses and wire constants for the bonding-curve exchange program

use solana_sdk::{pubkey, pubkey::Pubkey};

/// Bonding-curve exchange program
pub const PUMP_PROGRAM_ID: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");

/// Program global state account.
///
/// Used as a fixed address rather than derived from the `"global"` seed.
pub const PUMP_GLOBAL: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");

/// Protocol fee recipient
pub const PUMP_FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

/// Event authority used by the program's self-CPI event log
pub const PUMP_EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");

/// Seed prefix for the per-mint bonding curve account
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

pub const BUY_DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
pub const SELL_DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

/// Payload length: discriminator, amount, bound
pub const PAYLOAD_LEN: usize = 24;

/// Encoded buy bound meaning "no price limit"
pub const NO_BOUND_SENTINEL: i64 = -1;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimals used by curve-launched mints
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Default priority fee, micro-lamports per compute unit
pub const DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS: u64 = 10_000_000;
