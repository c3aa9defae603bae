//! Token amount and slippage bound calculation
//!
//! Two pricing sources feed the curve program:
//! - **Sell**: a live snapshot of the bonding curve's lamport balance and the
//!   mint supply. The expected payout is the token amount times the
//!   lamports-per-token ratio, floored; the minimum output applies the
//!   slippage percent to that.
//! - **Buy**: virtual reserves reported by an external quote source. The
//!   requested token amount is the reserve ratio scaled to raw units. The buy
//!   bound is always disabled.
//!
//! All arithmetic is integer `u128` with floor rounding.

use serde::{Deserialize, Serialize};

use super::constants::{LAMPORTS_PER_SOL, NO_BOUND_SENTINEL};
use super::encoding::{bound_to_wire, decimal_scale};
use super::errors::TransactionBuilderError;
use crate::rpc::TokenSupply;

/// Live curve state used to price a sell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveSnapshot {
    /// Lamports held by the bonding curve account
    pub curve_balance: u64,
    /// Mint supply in raw units
    pub supply: TokenSupply,
}

impl CurveSnapshot {
    /// Lamports per whole token, floored
    pub fn lamports_per_token(&self) -> Result<u64, TransactionBuilderError> {
        self.check_supply()?;
        let scale = decimal_scale(self.supply.decimals)?;
        let ratio = self.curve_balance as u128 * scale / self.supply.amount as u128;
        u64::try_from(ratio).map_err(|_| quote_err("lamports per token overflows u64"))
    }

    /// Expected lamports for selling `raw_amount` raw token units
    pub fn expected_output(&self, raw_amount: u64) -> Result<u64, TransactionBuilderError> {
        self.check_supply()?;
        let expected = raw_amount as u128 * self.curve_balance as u128 / self.supply.amount as u128;
        u64::try_from(expected).map_err(|_| quote_err("expected output overflows u64"))
    }

    fn check_supply(&self) -> Result<(), TransactionBuilderError> {
        if self.supply.amount == 0 {
            return Err(quote_err("mint supply is zero"));
        }
        Ok(())
    }
}

/// Virtual reserves of a bonding curve as reported off-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveReserves {
    /// Virtual SOL reserve, lamports
    pub virtual_sol: u64,
    /// Virtual token reserve, raw units
    pub virtual_token: u64,
}

/// Bound policy for buys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyBound {
    /// No maximum on lamports paid; encoded as `-1`
    AcceptAnyPrice,
}

impl BuyBound {
    pub fn to_wire(self) -> i64 {
        match self {
            BuyBound::AcceptAnyPrice => NO_BOUND_SENTINEL,
        }
    }
}

/// Bound policy for sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellBound {
    /// Minimum lamports out. Zero is a real bound, distinct from "no bound".
    MinOutput(u64),
}

impl SellBound {
    pub fn to_wire(self) -> Result<i64, TransactionBuilderError> {
        match self {
            SellBound::MinOutput(lamports) => bound_to_wire(lamports),
        }
    }

    pub fn min_output(self) -> u64 {
        match self {
            SellBound::MinOutput(lamports) => lamports,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeBound {
    Buy(BuyBound),
    Sell(SellBound),
}

impl TradeBound {
    pub fn to_wire(self) -> Result<i64, TransactionBuilderError> {
        match self {
            TradeBound::Buy(bound) => Ok(bound.to_wire()),
            TradeBound::Sell(bound) => bound.to_wire(),
        }
    }
}

/// A priced trade: raw token amount, its bound, and the expected counter amount if known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenQuote {
    pub token_amount: u64,
    pub bound: TradeBound,
    pub expected_counter_amount: Option<u64>,
}

/// Apply a slippage percent to an amount, floored
pub fn apply_slippage(amount: u64, slippage_percent: u8) -> Result<u64, TransactionBuilderError> {
    if slippage_percent > 100 {
        return Err(quote_err(format!(
            "slippage percent {} exceeds 100",
            slippage_percent
        )));
    }
    // Result never exceeds `amount`
    Ok((amount as u128 * (100 - slippage_percent as u128) / 100) as u64)
}

/// Price a sell of `raw_amount` against a live curve snapshot
pub fn sell_quote(
    snapshot: &CurveSnapshot,
    raw_amount: u64,
    slippage_percent: u8,
) -> Result<TokenQuote, TransactionBuilderError> {
    let expected = snapshot.expected_output(raw_amount)?;
    let min_output = apply_slippage(expected, slippage_percent)?;

    Ok(TokenQuote {
        token_amount: raw_amount,
        bound: TradeBound::Sell(SellBound::MinOutput(min_output)),
        expected_counter_amount: Some(expected),
    })
}

/// Raw token amount implied by the reserve ratio
///
/// `(virtual_sol / 1e9) / (virtual_token / 10^d)` whole tokens, scaled by
/// `10^d` and floored.
pub fn tokens_from_reserves(
    reserves: &CurveReserves,
    decimals: u8,
) -> Result<u64, TransactionBuilderError> {
    if reserves.virtual_sol == 0 || reserves.virtual_token == 0 {
        return Err(quote_err(format!(
            "zero reserves (virtual_sol={}, virtual_token={})",
            reserves.virtual_sol, reserves.virtual_token
        )));
    }

    let scale = decimal_scale(decimals)?;
    let numerator = (reserves.virtual_sol as u128)
        .checked_mul(scale)
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(|| quote_err("reserve ratio overflows"))?;
    let denominator = LAMPORTS_PER_SOL as u128 * reserves.virtual_token as u128;

    let raw = numerator / denominator;
    if raw == 0 {
        return Err(quote_err("reserves imply a zero token amount"));
    }
    u64::try_from(raw).map_err(|_| quote_err("token amount overflows u64"))
}

/// Price a buy from externally supplied reserves
pub fn buy_quote_from_reserves(
    reserves: &CurveReserves,
    decimals: u8,
) -> Result<TokenQuote, TransactionBuilderError> {
    Ok(buy_quote_exact(tokens_from_reserves(reserves, decimals)?))
}

/// Buy a caller-chosen raw amount with the bound disabled
pub fn buy_quote_exact(raw_amount: u64) -> TokenQuote {
    TokenQuote {
        token_amount: raw_amount,
        bound: TradeBound::Buy(BuyBound::AcceptAnyPrice),
        expected_counter_amount: None,
    }
}

/// Sell bound for the round-trip bump: a fraction of the lamports spent
pub fn bump_sell_bound(
    spend_lamports: u64,
    slippage_percent: u8,
) -> Result<SellBound, TransactionBuilderError> {
    Ok(SellBound::MinOutput(apply_slippage(
        spend_lamports,
        slippage_percent,
    )?))
}

fn quote_err(reason: impl Into<String>) -> TransactionBuilderError {
    TransactionBuilderError::Quote(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CurveSnapshot {
        CurveSnapshot {
            curve_balance: 1_000_000_000,
            supply: TokenSupply {
                amount: 500_000_000_000,
                decimals: 6,
            },
        }
    }

    #[test]
    fn test_sell_quote_reference_values() {
        let snap = snapshot();
        assert_eq!(snap.lamports_per_token().unwrap(), 2000);

        // 1_000_000 whole tokens at 6 decimals
        let quote = sell_quote(&snap, 1_000_000_000_000, 99).unwrap();
        assert_eq!(quote.token_amount, 1_000_000_000_000);
        assert_eq!(quote.expected_counter_amount, Some(2_000_000_000));
        assert_eq!(
            quote.bound,
            TradeBound::Sell(SellBound::MinOutput(20_000_000))
        );
        assert_eq!(quote.bound.to_wire().unwrap(), 20_000_000);
    }

    #[test]
    fn test_sell_quote_zero_bound_is_not_sentinel() {
        let quote = sell_quote(&snapshot(), 1, 100).unwrap();
        assert_eq!(quote.bound.to_wire().unwrap(), 0);
    }

    #[test]
    fn test_sell_quote_rejects_bad_inputs() {
        let mut snap = snapshot();
        assert!(matches!(
            sell_quote(&snap, 1, 101),
            Err(TransactionBuilderError::Quote(_))
        ));

        snap.supply.amount = 0;
        assert!(matches!(
            sell_quote(&snap, 1, 10),
            Err(TransactionBuilderError::Quote(_))
        ));
    }

    #[test]
    fn test_sell_quote_floors() {
        let snap = CurveSnapshot {
            curve_balance: 10,
            supply: TokenSupply {
                amount: 3,
                decimals: 0,
            },
        };
        // 1 * 10 / 3 = 3.33 -> 3, then 3 * 50 / 100 = 1.5 -> 1
        let quote = sell_quote(&snap, 1, 50).unwrap();
        assert_eq!(quote.expected_counter_amount, Some(3));
        assert_eq!(quote.bound, TradeBound::Sell(SellBound::MinOutput(1)));
    }

    #[test]
    fn test_buy_quote_from_reserves() {
        // 30 SOL against 1_073_000_000 whole tokens
        let reserves = CurveReserves {
            virtual_sol: 30_000_000_000,
            virtual_token: 1_073_000_000_000_000,
        };
        // (30 / 1.073e9) whole tokens -> 2.79e-8 * 1e6 raw = 0.0279 -> floors to 0
        assert!(buy_quote_from_reserves(&reserves, 6).is_err());

        let reserves = CurveReserves {
            virtual_sol: 2_000_000_000_000,
            virtual_token: 1_000_000,
        };
        // (2000 SOL) / (1 whole token) = 2000 tokens -> 2_000_000_000 raw
        let quote = buy_quote_from_reserves(&reserves, 6).unwrap();
        assert_eq!(quote.token_amount, 2_000_000_000);
        assert_eq!(quote.bound, TradeBound::Buy(BuyBound::AcceptAnyPrice));
        assert_eq!(quote.bound.to_wire().unwrap(), -1);
        assert_eq!(quote.expected_counter_amount, None);
    }

    #[test]
    fn test_buy_quote_zero_reserves() {
        for reserves in [
            CurveReserves {
                virtual_sol: 0,
                virtual_token: 1,
            },
            CurveReserves {
                virtual_sol: 1,
                virtual_token: 0,
            },
        ] {
            assert!(matches!(
                buy_quote_from_reserves(&reserves, 6),
                Err(TransactionBuilderError::Quote(_))
            ));
        }
    }

    #[test]
    fn test_bump_sell_bound() {
        assert_eq!(
            bump_sell_bound(100_000, 99).unwrap(),
            SellBound::MinOutput(1_000)
        );
        assert_eq!(bump_sell_bound(100_000, 100).unwrap().min_output(), 0);
        assert!(bump_sell_bound(100_000, 150).is_err());
    }

    #[test]
    fn test_apply_slippage_bounds() {
        assert_eq!(apply_slippage(u64::MAX, 0).unwrap(), u64::MAX);
        assert_eq!(apply_slippage(1_000, 0).unwrap(), 1_000);
        assert_eq!(apply_slippage(1_000, 100).unwrap(), 0);
    }
}
