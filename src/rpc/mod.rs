//! Ledger collaborator interface
//!
//! The transaction builder never talks to the network directly. Everything it
//! needs from the ledger goes through [`LedgerClient`], which keeps the
//! construction core testable against mocked account state.

use async_trait::async_trait;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::VersionedTransaction,
};

pub mod errors;
pub mod rpc_client;

pub use errors::LedgerError;
pub use rpc_client::RpcLedgerClient;

/// Blockhash-based lifetime for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    /// Recent blockhash the message is bound to
    pub blockhash: Hash,
    /// Last block height at which the blockhash is still valid
    pub last_valid_block_height: u64,
}

/// Mint supply snapshot, raw units at the mint's decimal scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSupply {
    pub amount: u64,
    pub decimals: u8,
}

/// Result of simulating a signed transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Transaction error reported by the runtime, if the program rejected it
    pub err: Option<String>,
    /// Program logs
    pub logs: Vec<String>,
    /// Compute units consumed, when reported
    pub units_consumed: Option<u64>,
}

impl SimulationOutcome {
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

/// Read and submit access to the ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Latest blockhash and its validity window
    async fn get_latest_lifetime(&self) -> Result<Lifetime, LedgerError>;

    /// Account state, `None` when the account does not exist
    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    /// Lamport balance of an account
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// Total supply of a mint
    async fn get_token_supply(&self, mint: &Pubkey) -> Result<TokenSupply, LedgerError>;

    /// Simulate a signed transaction without submitting it
    async fn simulate(&self, tx: &VersionedTransaction) -> Result<SimulationOutcome, LedgerError>;

    /// Submit a signed transaction and wait for the given commitment
    ///
    /// A transaction that lands but fails on-chain is a `Broadcast` error.
    /// One still unconfirmed when its blockhash expires is a
    /// `ConfirmationTimeout`.
    async fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError>;
}
