//! Program-derived and associated-token address derivation
//!
//! All functions here are pure: no network access, same inputs always give the
//! same output. Derivation probes bump seeds from 255 down to 0 and returns the
//! first candidate that falls off the ed25519 curve.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use super::constants::{BONDING_CURVE_SEED, PUMP_PROGRAM_ID};
use super::errors::TransactionBuilderError;

/// Derive a program address and its bump seed
///
/// Fails only when every bump from 255 to 0 lands on the curve.
pub fn derive(program: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8), TransactionBuilderError> {
    Pubkey::try_find_program_address(seeds, program).ok_or_else(|| {
        TransactionBuilderError::derivation_failed(
            program,
            format!("no off-curve bump for {} seed(s)", seeds.len()),
        )
    })
}

/// Associated token account for `owner` holding `mint` under `token_program`
///
/// Seeds are `[owner, token_program, mint]` under the associated token
/// account program.
pub fn derive_associated_account(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, token_program)
}

/// Per-mint bonding curve account
pub fn derive_bonding_curve(mint: &Pubkey) -> Result<(Pubkey, u8), TransactionBuilderError> {
    derive(&PUMP_PROGRAM_ID, &[BONDING_CURVE_SEED, mint.as_ref()])
}

/// Token vault held by the bonding curve
pub fn derive_associated_bonding_curve(bonding_curve: &Pubkey, mint: &Pubkey) -> Pubkey {
    derive_associated_account(bonding_curve, mint, &spl_token::id())
}

/// The trader's token account for `mint`
pub fn derive_user_token_account(user: &Pubkey, mint: &Pubkey) -> Pubkey {
    derive_associated_account(user, mint, &spl_token::id())
}

/// Every curve-side address needed to trade one mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveAddresses {
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub bonding_curve_bump: u8,
    pub associated_bonding_curve: Pubkey,
}

impl CurveAddresses {
    pub fn for_mint(mint: &Pubkey) -> Result<Self, TransactionBuilderError> {
        let (bonding_curve, bonding_curve_bump) = derive_bonding_curve(mint)?;
        Ok(Self {
            mint: *mint,
            bonding_curve,
            bonding_curve_bump,
            associated_bonding_curve: derive_associated_bonding_curve(&bonding_curve, mint),
        })
    }
}
