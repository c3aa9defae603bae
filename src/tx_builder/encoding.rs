//! Instruction payload encoding for the curve program
//!
//! Layout (24 bytes, little-endian):
//!
//! | offset | size | field                                 |
//! |--------|------|---------------------------------------|
//! | 0      | 8    | operation discriminator               |
//! | 8      | 8    | token amount, raw units (`u64`)       |
//! | 16     | 8    | counter-amount bound (`i64`)          |
//!
//! For buys the bound is the maximum lamports in, for sells the minimum
//! lamports out. `-1` disables the bound.
//!
//! Amount scaling never goes through floating point: whole amounts are
//! multiplied by `10^decimals` with checked arithmetic and decimal strings are
//! parsed digit by digit.

use super::constants::{BUY_DISCRIMINATOR, PAYLOAD_LEN, SELL_DISCRIMINATOR};
use super::errors::TransactionBuilderError;

/// Which program entrypoint a payload targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn discriminator(self) -> [u8; 8] {
        match self {
            TradeSide::Buy => BUY_DISCRIMINATOR,
            TradeSide::Sell => SELL_DISCRIMINATOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size instruction data for a buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionPayload {
    bytes: [u8; PAYLOAD_LEN],
}

impl InstructionPayload {
    fn new(side: TradeSide, token_amount: u64, bound: i64) -> Self {
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[..8].copy_from_slice(&side.discriminator());
        bytes[8..16].copy_from_slice(&token_amount.to_le_bytes());
        bytes[16..24].copy_from_slice(&bound.to_le_bytes());
        Self { bytes }
    }

    /// Parse instruction data back into its fields
    pub fn decode(data: &[u8]) -> Result<DecodedPayload, TransactionBuilderError> {
        if data.len() != PAYLOAD_LEN {
            return Err(TransactionBuilderError::encoding(format!(
                "payload must be {} bytes, got {}",
                PAYLOAD_LEN,
                data.len()
            )));
        }

        let side = match &data[..8] {
            d if d == BUY_DISCRIMINATOR => TradeSide::Buy,
            d if d == SELL_DISCRIMINATOR => TradeSide::Sell,
            other => {
                return Err(TransactionBuilderError::encoding(format!(
                    "unknown discriminator {}",
                    hex::encode(other)
                )))
            }
        };

        let mut amount = [0u8; 8];
        amount.copy_from_slice(&data[8..16]);
        let mut bound = [0u8; 8];
        bound.copy_from_slice(&data[16..24]);

        Ok(DecodedPayload {
            side,
            token_amount: u64::from_le_bytes(amount),
            bound: i64::from_le_bytes(bound),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

/// Fields read back from a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPayload {
    pub side: TradeSide,
    pub token_amount: u64,
    pub bound: i64,
}

/// Encode a buy of `token_amount` raw units paying at most `max_input_bound` lamports
pub fn encode_buy(token_amount: u64, max_input_bound: i64) -> InstructionPayload {
    InstructionPayload::new(TradeSide::Buy, token_amount, max_input_bound)
}

/// Encode a sell of `token_amount` raw units receiving at least `min_output_bound` lamports
pub fn encode_sell(token_amount: u64, min_output_bound: i64) -> InstructionPayload {
    InstructionPayload::new(TradeSide::Sell, token_amount, min_output_bound)
}

/// `10^decimals` as u128, or an error when it does not fit a raw amount scale
pub(crate) fn decimal_scale(decimals: u8) -> Result<u128, TransactionBuilderError> {
    10u128
        .checked_pow(decimals as u32)
        .filter(|scale| *scale <= u64::MAX as u128)
        .ok_or_else(|| {
            TransactionBuilderError::encoding(format!("decimals {} out of range", decimals))
        })
}

/// Scale a whole-token amount to raw units
pub fn scale_ui_amount(whole: u64, decimals: u8) -> Result<u64, TransactionBuilderError> {
    let raw = (whole as u128) * decimal_scale(decimals)?;
    u64::try_from(raw).map_err(|_| {
        TransactionBuilderError::encoding(format!(
            "{} tokens at {} decimals overflows u64",
            whole, decimals
        ))
    })
}

/// Parse a decimal string such as `"0.25"` into raw units
///
/// Fractional digits beyond `decimals` are rejected rather than rounded.
pub fn parse_ui_amount(amount: &str, decimals: u8) -> Result<u64, TransactionBuilderError> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(TransactionBuilderError::encoding("empty amount"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(TransactionBuilderError::encoding(format!(
            "invalid amount '{}'",
            amount
        )));
    }
    if frac.len() > decimals as usize {
        return Err(TransactionBuilderError::encoding(format!(
            "amount '{}' has more than {} fractional digits",
            amount, decimals
        )));
    }

    let overflow = || {
        TransactionBuilderError::encoding(format!(
            "amount '{}' at {} decimals overflows u64",
            amount, decimals
        ))
    };

    let whole_value: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let whole_raw = scale_ui_amount(whole_value, decimals)?;

    let frac_raw = if frac.is_empty() {
        0
    } else {
        let padding = decimal_scale(decimals - frac.len() as u8)?;
        let digits: u128 = frac.parse().map_err(|_| overflow())?;
        digits * padding
    };

    u64::try_from(whole_raw as u128 + frac_raw).map_err(|_| overflow())
}

/// Convert a lamport bound into the signed wire field
pub fn bound_to_wire(lamports: u64) -> Result<i64, TransactionBuilderError> {
    i64::try_from(lamports).map_err(|_| {
        TransactionBuilderError::encoding(format!("bound {} exceeds i64::MAX", lamports))
    })
}
