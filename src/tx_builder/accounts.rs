//! Ordered account lists for curve program instructions
//!
//! Each operation has a declarative template: an array of `(slot, role)`
//! pairs in the exact order the program reads them. Slots are either fixed
//! well-known programs or resolved per trade by the caller. Resolution turns a
//! template into `AccountMeta`s.
//!
//! Buy and sell templates differ only at positions 8 and 9 (0-based).

use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, system_program, sysvar};

use super::constants::{PUMP_EVENT_AUTHORITY, PUMP_FEE_RECIPIENT, PUMP_GLOBAL, PUMP_PROGRAM_ID};
use super::errors::TransactionBuilderError;

/// Access an instruction needs on an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Readonly,
    Writable,
    ReadonlySigner,
    WritableSigner,
}

impl AccountRole {
    pub fn is_signer(self) -> bool {
        matches!(self, AccountRole::ReadonlySigner | AccountRole::WritableSigner)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, AccountRole::Writable | AccountRole::WritableSigner)
    }

    pub fn to_meta(self, pubkey: Pubkey) -> AccountMeta {
        if self.is_writable() {
            AccountMeta::new(pubkey, self.is_signer())
        } else {
            AccountMeta::new_readonly(pubkey, self.is_signer())
        }
    }
}

/// Semantic position in an instruction's account list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountSlot {
    Global,
    FeeRecipient,
    Mint,
    BondingCurve,
    AssociatedBondingCurve,
    UserTokenAccount,
    User,
    SystemProgram,
    TokenProgram,
    AssociatedTokenProgram,
    RentSysvar,
    EventAuthority,
    Program,
}

impl AccountSlot {
    pub fn name(self) -> &'static str {
        match self {
            AccountSlot::Global => "global",
            AccountSlot::FeeRecipient => "fee_recipient",
            AccountSlot::Mint => "mint",
            AccountSlot::BondingCurve => "bonding_curve",
            AccountSlot::AssociatedBondingCurve => "associated_bonding_curve",
            AccountSlot::UserTokenAccount => "user_token_account",
            AccountSlot::User => "user",
            AccountSlot::SystemProgram => "system_program",
            AccountSlot::TokenProgram => "token_program",
            AccountSlot::AssociatedTokenProgram => "associated_token_program",
            AccountSlot::RentSysvar => "rent",
            AccountSlot::EventAuthority => "event_authority",
            AccountSlot::Program => "program",
        }
    }

    /// Address of a slot that never varies between trades
    pub fn fixed_address(self) -> Option<Pubkey> {
        match self {
            AccountSlot::Global => Some(PUMP_GLOBAL),
            AccountSlot::FeeRecipient => Some(PUMP_FEE_RECIPIENT),
            AccountSlot::SystemProgram => Some(system_program::id()),
            AccountSlot::TokenProgram => Some(spl_token::id()),
            AccountSlot::AssociatedTokenProgram => Some(spl_associated_token_account::id()),
            AccountSlot::RentSysvar => Some(sysvar::rent::id()),
            AccountSlot::EventAuthority => Some(PUMP_EVENT_AUTHORITY),
            AccountSlot::Program => Some(PUMP_PROGRAM_ID),
            AccountSlot::Mint
            | AccountSlot::BondingCurve
            | AccountSlot::AssociatedBondingCurve
            | AccountSlot::UserTokenAccount
            | AccountSlot::User => None,
        }
    }
}

/// Curve program instruction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Buy,
    Sell,
}

pub const TEMPLATE_LEN: usize = 12;

type Template = [(AccountSlot, AccountRole); TEMPLATE_LEN];

const BUY_TEMPLATE: Template = [
    (AccountSlot::Global, AccountRole::Readonly),
    (AccountSlot::FeeRecipient, AccountRole::Writable),
    (AccountSlot::Mint, AccountRole::Readonly),
    (AccountSlot::BondingCurve, AccountRole::Writable),
    (AccountSlot::AssociatedBondingCurve, AccountRole::Writable),
    (AccountSlot::UserTokenAccount, AccountRole::Writable),
    (AccountSlot::User, AccountRole::WritableSigner),
    (AccountSlot::SystemProgram, AccountRole::Readonly),
    (AccountSlot::TokenProgram, AccountRole::Readonly),
    (AccountSlot::RentSysvar, AccountRole::Readonly),
    (AccountSlot::EventAuthority, AccountRole::Readonly),
    (AccountSlot::Program, AccountRole::Readonly),
];

const SELL_TEMPLATE: Template = [
    (AccountSlot::Global, AccountRole::Readonly),
    (AccountSlot::FeeRecipient, AccountRole::Writable),
    (AccountSlot::Mint, AccountRole::Readonly),
    (AccountSlot::BondingCurve, AccountRole::Writable),
    (AccountSlot::AssociatedBondingCurve, AccountRole::Writable),
    (AccountSlot::UserTokenAccount, AccountRole::Writable),
    (AccountSlot::User, AccountRole::WritableSigner),
    (AccountSlot::SystemProgram, AccountRole::Readonly),
    (AccountSlot::AssociatedTokenProgram, AccountRole::Readonly),
    (AccountSlot::TokenProgram, AccountRole::Readonly),
    (AccountSlot::EventAuthority, AccountRole::Readonly),
    (AccountSlot::Program, AccountRole::Readonly),
];

impl OperationKind {
    pub fn template(self) -> &'static [(AccountSlot, AccountRole)] {
        match self {
            OperationKind::Buy => &BUY_TEMPLATE,
            OperationKind::Sell => &SELL_TEMPLATE,
        }
    }
}

/// Per-trade addresses for every slot without a fixed address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAccounts {
    pub mint: Pubkey,
    pub bonding_curve: Pubkey,
    pub associated_bonding_curve: Pubkey,
    pub user_token_account: Pubkey,
    pub user: Pubkey,
}

impl ResolvedAccounts {
    fn caller_address(&self, slot: AccountSlot) -> Option<Pubkey> {
        match slot {
            AccountSlot::Mint => Some(self.mint),
            AccountSlot::BondingCurve => Some(self.bonding_curve),
            AccountSlot::AssociatedBondingCurve => Some(self.associated_bonding_curve),
            AccountSlot::UserTokenAccount => Some(self.user_token_account),
            AccountSlot::User => Some(self.user),
            _ => None,
        }
    }

    fn address_for(&self, slot: AccountSlot) -> Result<Pubkey, TransactionBuilderError> {
        if let Some(fixed) = slot.fixed_address() {
            return Ok(fixed);
        }

        let address = self
            .caller_address(slot)
            .ok_or_else(|| TransactionBuilderError::InvalidAccount {
                slot: slot.name(),
                reason: "slot has no address".to_string(),
            })?;

        // The system program is the all-zero key, but it is fixed and never reaches here
        if address == Pubkey::default() {
            return Err(TransactionBuilderError::InvalidAccount {
                slot: slot.name(),
                reason: "zero address".to_string(),
            });
        }

        Ok(address)
    }
}

/// Resolve an operation's template into ordered account metas
pub fn build_account_metas(
    kind: OperationKind,
    accounts: &ResolvedAccounts,
) -> Result<Vec<AccountMeta>, TransactionBuilderError> {
    kind.template()
        .iter()
        .map(|(slot, role)| Ok(role.to_meta(accounts.address_for(*slot)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedAccounts {
        ResolvedAccounts {
            mint: Pubkey::new_unique(),
            bonding_curve: Pubkey::new_unique(),
            associated_bonding_curve: Pubkey::new_unique(),
            user_token_account: Pubkey::new_unique(),
            user: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_templates_same_length() {
        assert_eq!(OperationKind::Buy.template().len(), TEMPLATE_LEN);
        assert_eq!(OperationKind::Sell.template().len(), TEMPLATE_LEN);
    }

    #[test]
    fn test_templates_differ_only_at_program_slots() {
        let buy = OperationKind::Buy.template();
        let sell = OperationKind::Sell.template();
        for (idx, (b, s)) in buy.iter().zip(sell.iter()).enumerate() {
            if idx == 8 || idx == 9 {
                assert_ne!(b.0, s.0, "position {} should differ", idx);
            } else {
                assert_eq!(b, s, "position {} should match", idx);
            }
        }
        assert_eq!(buy[8].0, AccountSlot::TokenProgram);
        assert_eq!(buy[9].0, AccountSlot::RentSysvar);
        assert_eq!(sell[8].0, AccountSlot::AssociatedTokenProgram);
        assert_eq!(sell[9].0, AccountSlot::TokenProgram);
    }

    #[test]
    fn test_buy_metas_order_and_roles() {
        let accounts = resolved();
        let metas = build_account_metas(OperationKind::Buy, &accounts).unwrap();

        assert_eq!(metas.len(), 12);
        assert_eq!(metas[0].pubkey, PUMP_GLOBAL);
        assert!(!metas[0].is_writable);
        assert_eq!(metas[1].pubkey, PUMP_FEE_RECIPIENT);
        assert!(metas[1].is_writable);
        assert_eq!(metas[2].pubkey, accounts.mint);
        assert_eq!(metas[3].pubkey, accounts.bonding_curve);
        assert_eq!(metas[4].pubkey, accounts.associated_bonding_curve);
        assert_eq!(metas[5].pubkey, accounts.user_token_account);
        assert_eq!(metas[6].pubkey, accounts.user);
        assert!(metas[6].is_signer && metas[6].is_writable);
        assert_eq!(metas[7].pubkey, system_program::id());
        assert_eq!(metas[8].pubkey, spl_token::id());
        assert_eq!(metas[9].pubkey, sysvar::rent::id());
        assert_eq!(metas[10].pubkey, PUMP_EVENT_AUTHORITY);
        assert_eq!(metas[11].pubkey, PUMP_PROGRAM_ID);

        let signers: Vec<_> = metas.iter().filter(|m| m.is_signer).collect();
        assert_eq!(signers.len(), 1);
    }

    #[test]
    fn test_sell_metas_program_slots() {
        let metas = build_account_metas(OperationKind::Sell, &resolved()).unwrap();
        assert_eq!(metas[8].pubkey, spl_associated_token_account::id());
        assert_eq!(metas[9].pubkey, spl_token::id());
        assert!(metas[8..].iter().all(|m| !m.is_writable && !m.is_signer));
    }

    #[test]
    fn test_zero_caller_address_rejected() {
        let mut accounts = resolved();
        accounts.bonding_curve = Pubkey::default();

        let err = build_account_metas(OperationKind::Sell, &accounts).unwrap_err();
        match err {
            TransactionBuilderError::InvalidAccount { slot, .. } => {
                assert_eq!(slot, "bonding_curve")
            }
            other => panic!("Expected InvalidAccount, got {:?}", other),
        }
    }

    #[test]
    fn test_system_program_zero_key_allowed() {
        assert_eq!(system_program::id(), Pubkey::default());
        assert!(build_account_metas(OperationKind::Buy, &resolved()).is_ok());
    }

    #[test]
    fn test_role_conversion() {
        let key = Pubkey::new_unique();
        assert_eq!(AccountRole::Readonly.to_meta(key), AccountMeta::new_readonly(key, false));
        assert_eq!(AccountRole::Writable.to_meta(key), AccountMeta::new(key, false));
        assert_eq!(AccountRole::ReadonlySigner.to_meta(key), AccountMeta::new_readonly(key, true));
        assert_eq!(AccountRole::WritableSigner.to_meta(key), AccountMeta::new(key, true));
    }
}
