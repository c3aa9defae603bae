//! Test Utilities Module
//!
//! Mock collaborators for deterministic tests of the transaction pipeline:
//! a ledger with scriptable account state and failures, a fixed reserve quote
//! source and a signer that returns unverifiable signatures.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::quote_source::ReserveQuoteSource;
use crate::rpc::{LedgerClient, LedgerError, Lifetime, SimulationOutcome, TokenSupply};
use crate::tx_builder::{CurveReserves, TransactionBuilderError};
use crate::wallet::TransactionSigner;

/// In-memory ledger
///
/// Defaults: curve balance 1 SOL, supply 500_000 tokens at 6 decimals, every
/// account absent, simulation and broadcast succeed.
pub struct MockLedger {
    lifetime: Lifetime,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balance: Mutex<u64>,
    supply: Mutex<TokenSupply>,

    fail_blockhash: bool,
    fail_account_lookup: bool,
    fail_balance: bool,
    fail_supply: bool,
    simulation_error: Option<(String, Vec<String>)>,
    send_error: Option<LedgerError>,

    calls: AtomicUsize,
    account_lookups: AtomicUsize,
    simulations: AtomicUsize,
    sent: Mutex<Vec<Signature>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            lifetime: Lifetime {
                blockhash: Hash::new_unique(),
                last_valid_block_height: 1_000,
            },
            accounts: Mutex::new(HashMap::new()),
            balance: Mutex::new(1_000_000_000),
            supply: Mutex::new(TokenSupply {
                amount: 500_000_000_000,
                decimals: 6,
            }),
            fail_blockhash: false,
            fail_account_lookup: false,
            fail_balance: false,
            fail_supply: false,
            simulation_error: None,
            send_error: None,
            calls: AtomicUsize::new(0),
            account_lookups: AtomicUsize::new(0),
            simulations: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failing_blockhash(mut self) -> Self {
        self.fail_blockhash = true;
        self
    }

    pub fn with_failing_account_lookup(mut self) -> Self {
        self.fail_account_lookup = true;
        self
    }

    pub fn with_failing_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    pub fn with_failing_supply(mut self) -> Self {
        self.fail_supply = true;
        self
    }

    pub fn with_simulation_error(mut self, err: &str, logs: Vec<String>) -> Self {
        self.simulation_error = Some((err.to_string(), logs));
        self
    }

    pub fn with_send_error(mut self, err: LedgerError) -> Self {
        self.send_error = Some(err);
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Make `address` exist with an empty token-program-owned account
    pub fn insert_account(&self, address: Pubkey) {
        let account = Account {
            lamports: 2_039_280,
            data: vec![0; 165],
            owner: spl_token::id(),
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn set_balance(&self, lamports: u64) {
        *self.balance.lock().unwrap() = lamports;
    }

    pub fn set_supply(&self, amount: u64, decimals: u8) {
        *self.supply.lock().unwrap() = TokenSupply { amount, decimals };
    }

    /// Every collaborator call, of any kind
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::SeqCst)
    }

    pub fn simulation_count(&self) -> usize {
        self.simulations.load(Ordering::SeqCst)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_sent_signature(&self) -> Option<Signature> {
        self.sent.lock().unwrap().last().copied()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn unavailable(what: &str) -> LedgerError {
        LedgerError::Request {
            endpoint: "mock".to_string(),
            message: format!("{} unavailable", what),
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_latest_lifetime(&self) -> Result<Lifetime, LedgerError> {
        self.record_call();
        if self.fail_blockhash {
            return Err(Self::unavailable("blockhash"));
        }
        Ok(self.lifetime)
    }

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        self.record_call();
        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_account_lookup {
            return Err(Self::unavailable("account"));
        }
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, LedgerError> {
        self.record_call();
        if self.fail_balance {
            return Err(Self::unavailable("balance"));
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn get_token_supply(&self, _mint: &Pubkey) -> Result<TokenSupply, LedgerError> {
        self.record_call();
        if self.fail_supply {
            return Err(Self::unavailable("supply"));
        }
        Ok(*self.supply.lock().unwrap())
    }

    async fn simulate(&self, _tx: &VersionedTransaction) -> Result<SimulationOutcome, LedgerError> {
        self.record_call();
        self.simulations.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.simulation_error {
            Some((err, logs)) => SimulationOutcome {
                err: Some(err.clone()),
                logs: logs.clone(),
                units_consumed: Some(12_000),
            },
            None => SimulationOutcome {
                err: None,
                logs: vec!["Program log: Instruction: Buy".to_string()],
                units_consumed: Some(45_000),
            },
        })
    }

    async fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        _commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError> {
        self.record_call();
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        let signature = tx
            .signatures
            .first()
            .copied()
            .ok_or_else(|| LedgerError::Broadcast("unsigned transaction".to_string()))?;
        self.sent.lock().unwrap().push(signature);
        Ok(signature)
    }
}

/// Quote source returning fixed reserves
pub struct MockQuoteSource {
    reserves: Option<CurveReserves>,
    calls: AtomicUsize,
}

impl MockQuoteSource {
    pub fn new(reserves: CurveReserves) -> Self {
        Self {
            reserves: Some(reserves),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            reserves: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReserveQuoteSource for MockQuoteSource {
    async fn get_reserves(&self, mint: &Pubkey) -> Result<CurveReserves, TransactionBuilderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reserves
            .ok_or_else(|| TransactionBuilderError::lookup_failed(mint, "quote source unavailable"))
    }
}

/// Signer that claims a public key but cannot produce valid signatures
pub struct MockSigner {
    pubkey: Pubkey,
    should_fail: bool,
}

impl MockSigner {
    pub fn new(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            should_fail: false,
        }
    }

    pub fn new_failing(pubkey: Pubkey) -> Self {
        Self {
            pubkey,
            should_fail: true,
        }
    }
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Signature, TransactionBuilderError> {
        if self.should_fail {
            return Err(TransactionBuilderError::Signing(
                "mock signer configured to fail".to_string(),
            ));
        }
        Ok(Signature::from([7u8; 64]))
    }
}
