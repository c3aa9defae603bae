//! Core TxBuilder implementation
//!
//! Orchestrates derivation, pricing, encoding, account listing and assembly
//! for the three trade operations against the ledger and quote collaborators.
//!
//! ## Pipeline per build
//! 1. Derive curve and user addresses and resolve the account template
//!    (pure, fails before any network call)
//! 2. Price the trade (quote source for buys, curve snapshot for sells)
//! 3. Fetch the blockhash lifetime, concurrently with the token account
//!    existence check where creation is possible
//! 4. Encode payloads and assemble the unsigned transaction

use std::sync::Arc;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::quote_source::ReserveQuoteSource;
use crate::rpc::{LedgerClient, Lifetime};
use crate::structured_logging::TradeLogger;

use super::accounts::{build_account_metas, OperationKind, ResolvedAccounts};
use super::addresses::{derive_user_token_account, CurveAddresses};
use super::assembler::assemble;
use super::constants::{
    DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS, DEFAULT_TOKEN_DECIMALS, PUMP_PROGRAM_ID,
};
use super::context::ExecutionContext;
use super::encoding::{encode_buy, encode_sell, InstructionPayload};
use super::errors::TransactionBuilderError;
use super::instructions::{create_token_account_instruction, priority_fee_instruction};
use super::output::{TradeOperation, TxBuildOutput};
use super::quote::{
    bump_sell_bound, buy_quote_exact, buy_quote_from_reserves, sell_quote, CurveSnapshot,
    TokenQuote, TradeBound,
};

/// Pricing and fee parameters applied to every build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxBuilderConfig {
    /// Decimals used to scale reserve-implied buy amounts
    pub decimals: u8,
    pub priority_fee_micro_lamports: u64,
    /// Slippage applied to the expected sell payout, 0..=100
    pub sell_slippage_percent: u8,
    /// Lamports the bump round-trip is sized against
    pub bump_spend_lamports: u64,
    /// Slippage applied to `bump_spend_lamports` for the bump's sell bound
    pub bump_sell_slippage_percent: u8,
}

impl Default for TxBuilderConfig {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_TOKEN_DECIMALS,
            priority_fee_micro_lamports: DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS,
            sell_slippage_percent: 99,
            bump_spend_lamports: 100_000,
            bump_sell_slippage_percent: 99,
        }
    }
}

/// How much a buy requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyAmount {
    /// Amount implied by the quote source's reserve ratio
    FromReserves,
    /// Caller-chosen amount in raw units
    Exact(u64),
}

/// Builds unsigned trade transactions for the bonding-curve program
pub struct TxBuilder {
    ledger: Arc<dyn LedgerClient>,
    quote_source: Arc<dyn ReserveQuoteSource>,
    config: TxBuilderConfig,
}

/// Addresses resolved for one user and mint
struct TradeAccounts {
    curve: CurveAddresses,
    user_token_account: Pubkey,
    resolved: ResolvedAccounts,
}

impl TradeAccounts {
    fn resolve(user: &Pubkey, mint: &Pubkey) -> Result<Self, TransactionBuilderError> {
        let curve = CurveAddresses::for_mint(mint)?;
        let user_token_account = derive_user_token_account(user, mint);
        let resolved = ResolvedAccounts {
            mint: *mint,
            bonding_curve: curve.bonding_curve,
            associated_bonding_curve: curve.associated_bonding_curve,
            user_token_account,
            user: *user,
        };
        Ok(Self {
            curve,
            user_token_account,
            resolved,
        })
    }

    fn metas(&self, kind: OperationKind) -> Result<Vec<AccountMeta>, TransactionBuilderError> {
        build_account_metas(kind, &self.resolved)
    }
}

fn program_instruction(accounts: Vec<AccountMeta>, payload: InstructionPayload) -> Instruction {
    Instruction {
        program_id: PUMP_PROGRAM_ID,
        accounts,
        data: payload.to_vec(),
    }
}

fn encode_quote(
    kind: OperationKind,
    quote: &TokenQuote,
) -> Result<InstructionPayload, TransactionBuilderError> {
    let bound = quote.bound.to_wire()?;
    match (kind, quote.bound) {
        (OperationKind::Buy, TradeBound::Buy(_)) => Ok(encode_buy(quote.token_amount, bound)),
        (OperationKind::Sell, TradeBound::Sell(_)) => Ok(encode_sell(quote.token_amount, bound)),
        _ => Err(TransactionBuilderError::encoding(format!(
            "{:?} instruction cannot carry bound {:?}",
            kind, quote.bound
        ))),
    }
}

impl TxBuilder {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        quote_source: Arc<dyn ReserveQuoteSource>,
        config: TxBuilderConfig,
    ) -> Self {
        Self {
            ledger,
            quote_source,
            config,
        }
    }

    pub fn config(&self) -> &TxBuilderConfig {
        &self.config
    }

    /// Build a buy, creating the user's token account first when absent
    ///
    /// The buy bound is always disabled (`-1`).
    pub async fn build_buy(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        amount: BuyAmount,
    ) -> Result<TxBuildOutput, TransactionBuilderError> {
        let logger = TradeLogger::new(TradeOperation::Buy.as_str());
        logger.log_build_start(&mint.to_string(), &user.to_string());

        let accounts = TradeAccounts::resolve(user, mint)?;
        let metas = accounts.metas(OperationKind::Buy)?;

        let quote = match amount {
            BuyAmount::Exact(0) => {
                return Err(TransactionBuilderError::Quote(
                    "buy amount must be positive".to_string(),
                ))
            }
            BuyAmount::Exact(raw) => buy_quote_exact(raw),
            BuyAmount::FromReserves => self.quote_from_reserves(mint).await?,
        };
        let payload = encode_quote(OperationKind::Buy, &quote)?;
        logger.log_quote(
            &mint.to_string(),
            quote.token_amount,
            quote.bound.to_wire()?,
            quote.expected_counter_amount,
        );

        let (lifetime, needs_account) = self
            .lifetime_and_account_state(&accounts.user_token_account, &logger)
            .await?;

        let creation = needs_account.then(|| create_token_account_instruction(user, user, mint));
        let unsigned = assemble(
            *user,
            lifetime,
            priority_fee_instruction(self.config.priority_fee_micro_lamports),
            creation,
            vec![program_instruction(metas, payload)],
        )?;

        logger.log_built(
            &mint.to_string(),
            unsigned.instructions.len(),
            unsigned.creates_token_account(),
        );

        Ok(TxBuildOutput {
            operation: TradeOperation::Buy,
            mint: *mint,
            unsigned,
            quotes: vec![quote],
            context: ExecutionContext::new(lifetime, logger),
        })
    }

    /// Build a sell of `raw_amount` priced against the live curve
    ///
    /// Never creates the token account: it must already hold the tokens.
    /// `raw_amount` is in the configured decimals; a mint reporting other
    /// decimals is a `Configuration` error.
    pub async fn build_sell(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
        raw_amount: u64,
    ) -> Result<TxBuildOutput, TransactionBuilderError> {
        let logger = TradeLogger::new(TradeOperation::Sell.as_str());
        logger.log_build_start(&mint.to_string(), &user.to_string());

        if raw_amount == 0 {
            return Err(TransactionBuilderError::Quote(
                "sell amount must be positive".to_string(),
            ));
        }

        let accounts = TradeAccounts::resolve(user, mint)?;
        let metas = accounts.metas(OperationKind::Sell)?;

        let snapshot = self.curve_snapshot(&accounts.curve).await?;
        if snapshot.supply.decimals != self.config.decimals {
            return Err(TransactionBuilderError::Configuration(format!(
                "mint {} has {} decimals, configured for {}",
                mint, snapshot.supply.decimals, self.config.decimals
            )));
        }
        let quote = sell_quote(&snapshot, raw_amount, self.config.sell_slippage_percent)?;
        let payload = encode_quote(OperationKind::Sell, &quote)?;
        logger.log_quote(
            &mint.to_string(),
            quote.token_amount,
            quote.bound.to_wire()?,
            quote.expected_counter_amount,
        );

        let lifetime = self.fetch_lifetime().await?;
        let unsigned = assemble(
            *user,
            lifetime,
            priority_fee_instruction(self.config.priority_fee_micro_lamports),
            None,
            vec![program_instruction(metas, payload)],
        )?;

        logger.log_built(&mint.to_string(), unsigned.instructions.len(), false);

        Ok(TxBuildOutput {
            operation: TradeOperation::Sell,
            mint: *mint,
            unsigned,
            quotes: vec![quote],
            context: ExecutionContext::new(lifetime, logger),
        })
    }

    /// Build a buy immediately followed by a sell of the same amount
    ///
    /// The amount comes from the reserve ratio. The sell bound is the
    /// configured spend with the bump slippage applied.
    pub async fn build_bump(
        &self,
        user: &Pubkey,
        mint: &Pubkey,
    ) -> Result<TxBuildOutput, TransactionBuilderError> {
        let logger = TradeLogger::new(TradeOperation::Bump.as_str());
        logger.log_build_start(&mint.to_string(), &user.to_string());

        let accounts = TradeAccounts::resolve(user, mint)?;
        let buy_metas = accounts.metas(OperationKind::Buy)?;
        let sell_metas = accounts.metas(OperationKind::Sell)?;
        let sell_bound = bump_sell_bound(
            self.config.bump_spend_lamports,
            self.config.bump_sell_slippage_percent,
        )?;

        let buy = self.quote_from_reserves(mint).await?;
        let sell = TokenQuote {
            token_amount: buy.token_amount,
            bound: TradeBound::Sell(sell_bound),
            expected_counter_amount: None,
        };
        let buy_payload = encode_quote(OperationKind::Buy, &buy)?;
        let sell_payload = encode_quote(OperationKind::Sell, &sell)?;
        logger.log_quote(
            &mint.to_string(),
            buy.token_amount,
            sell.bound.to_wire()?,
            None,
        );

        let (lifetime, needs_account) = self
            .lifetime_and_account_state(&accounts.user_token_account, &logger)
            .await?;

        let creation = needs_account.then(|| create_token_account_instruction(user, user, mint));
        let unsigned = assemble(
            *user,
            lifetime,
            priority_fee_instruction(self.config.priority_fee_micro_lamports),
            creation,
            vec![
                program_instruction(buy_metas, buy_payload),
                program_instruction(sell_metas, sell_payload),
            ],
        )?;

        logger.log_built(
            &mint.to_string(),
            unsigned.instructions.len(),
            unsigned.creates_token_account(),
        );

        Ok(TxBuildOutput {
            operation: TradeOperation::Bump,
            mint: *mint,
            unsigned,
            quotes: vec![buy, sell],
            context: ExecutionContext::new(lifetime, logger),
        })
    }

    async fn quote_from_reserves(&self, mint: &Pubkey) -> Result<TokenQuote, TransactionBuilderError> {
        let reserves = self.quote_source.get_reserves(mint).await?;
        buy_quote_from_reserves(&reserves, self.config.decimals)
    }

    async fn fetch_lifetime(&self) -> Result<Lifetime, TransactionBuilderError> {
        self.ledger
            .get_latest_lifetime()
            .await
            .map_err(|e| TransactionBuilderError::blockhash_unavailable(e.to_string()))
    }

    /// Lifetime plus whether the token account must be created
    ///
    /// A failed existence lookup counts as "absent".
    async fn lifetime_and_account_state(
        &self,
        token_account: &Pubkey,
        logger: &TradeLogger,
    ) -> Result<(Lifetime, bool), TransactionBuilderError> {
        let (lifetime, account) = tokio::join!(
            self.ledger.get_latest_lifetime(),
            self.ledger.get_account_info(token_account)
        );

        let lifetime =
            lifetime.map_err(|e| TransactionBuilderError::blockhash_unavailable(e.to_string()))?;

        let needs_account = match account {
            Ok(Some(_)) => {
                logger.log_token_account_check(&token_account.to_string(), true, false);
                false
            }
            Ok(None) => {
                logger.log_token_account_check(&token_account.to_string(), false, false);
                true
            }
            Err(_) => {
                logger.log_token_account_check(&token_account.to_string(), false, true);
                true
            }
        };

        Ok((lifetime, needs_account))
    }

    /// Curve balance and mint supply, read concurrently
    async fn curve_snapshot(
        &self,
        curve: &CurveAddresses,
    ) -> Result<CurveSnapshot, TransactionBuilderError> {
        let (balance, supply) = tokio::join!(
            self.ledger.get_balance(&curve.bonding_curve),
            self.ledger.get_token_supply(&curve.mint)
        );

        let curve_balance =
            balance.map_err(|e| TransactionBuilderError::lookup_failed(curve.bonding_curve, e))?;
        let supply = supply.map_err(|e| TransactionBuilderError::lookup_failed(curve.mint, e))?;

        Ok(CurveSnapshot {
            curve_balance,
            supply,
        })
    }
}
