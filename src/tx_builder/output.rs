//! Transaction build output
//!
//! [`TxBuildOutput`] is what the BUILD stage hands to the rest of the
//! pipeline: the unsigned transaction, the quotes that priced it and the
//! execution context. It is plain data and can be simulated any number of
//! times. [`SignedTransaction`] is the SIGN stage's result.

use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};

use crate::tx_builder::assembler::UnsignedTransaction;
use crate::tx_builder::context::ExecutionContext;
use crate::tx_builder::quote::TokenQuote;

/// Curve program operation the output performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOperation {
    Buy,
    Sell,
    /// Buy and sell of the same amount in one transaction
    Bump,
}

impl TradeOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeOperation::Buy => "buy",
            TradeOperation::Sell => "sell",
            TradeOperation::Bump => "bump",
        }
    }
}

/// Result of building a trade transaction
#[derive(Debug, Clone)]
pub struct TxBuildOutput {
    pub operation: TradeOperation,

    /// Mint being traded
    pub mint: Pubkey,

    /// Ordered, validated instructions with fee payer and lifetime
    pub unsigned: UnsignedTransaction,

    /// One quote per program instruction, in instruction order
    pub quotes: Vec<TokenQuote>,

    pub context: ExecutionContext,
}

impl TxBuildOutput {
    pub fn fee_payer(&self) -> Pubkey {
        self.unsigned.fee_payer
    }

    pub fn creates_token_account(&self) -> bool {
        self.unsigned.creates_token_account()
    }

    pub fn correlation_id(&self) -> &str {
        self.context.correlation_id()
    }
}

/// Signed transaction ready for simulation or broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx: VersionedTransaction,

    /// Required signers, taken from the message header
    pub required_signers: Vec<Pubkey>,
}

impl SignedTransaction {
    pub fn new(tx: VersionedTransaction) -> Self {
        let required_signers = crate::compat::get_required_signers(&tx.message).to_vec();
        Self {
            tx,
            required_signers,
        }
    }

    pub fn tx_ref(&self) -> &VersionedTransaction {
        &self.tx
    }

    pub fn into_tx(self) -> VersionedTransaction {
        self.tx
    }

    /// Fee payer's signature
    pub fn fee_payer_signature(&self) -> Option<Signature> {
        let payer = self.required_signers.first()?;
        crate::compat::get_signer_signature(&self.tx, payer).copied()
    }
}
