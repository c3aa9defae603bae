//! SIMULATE, SIGN, BROADCAST and CONFIRM stages
//!
//! The executor takes a [`TxBuildOutput`] and drives it to a confirmed
//! signature. Nothing here retries: a simulation rejection or broadcast
//! failure is returned to the caller with the program's own error text.

use std::sync::Arc;
use std::time::Instant;

use solana_sdk::{
    commitment_config::CommitmentConfig, signature::Signature, transaction::VersionedTransaction,
};

use crate::compat;
use crate::rpc::{LedgerClient, SimulationOutcome};
use crate::structured_logging::TradeLogger;
use crate::wallet::TransactionSigner;

use super::errors::TransactionBuilderError;
use super::output::{SignedTransaction, TxBuildOutput};

/// Outcome of a full execution
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub signature: Signature,
    /// Present when the transaction was simulated before broadcast
    pub simulation: Option<SimulationOutcome>,
}

/// Drives built transactions through simulation and broadcast
pub struct TradeExecutor {
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn TransactionSigner>,
    commitment: CommitmentConfig,
    simulate_before_send: bool,
}

impl TradeExecutor {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn TransactionSigner>,
        commitment: CommitmentConfig,
        simulate_before_send: bool,
    ) -> Self {
        Self {
            ledger,
            signer,
            commitment,
            simulate_before_send,
        }
    }

    /// Compile and sign with the configured signer
    ///
    /// # Errors
    ///
    /// - `SignatureMissing` if the signer is not the fee payer, the message
    ///   needs other signers, or the produced signature does not verify
    /// - `Signing` if the signer itself fails
    pub async fn sign(
        &self,
        output: &TxBuildOutput,
    ) -> Result<SignedTransaction, TransactionBuilderError> {
        let fee_payer = output.fee_payer();
        if self.signer.pubkey() != fee_payer {
            return Err(TransactionBuilderError::SignatureMissing(format!(
                "{} (signer is {})",
                fee_payer,
                self.signer.pubkey()
            )));
        }

        let message = output.unsigned.compile()?;
        let required = compat::get_required_signers(&message);
        if required != [fee_payer] {
            return Err(TransactionBuilderError::SignatureMissing(format!(
                "{} (message requires {} signers)",
                fee_payer,
                required.len()
            )));
        }

        let signature = self.signer.sign_message(&message.serialize()).await?;
        let tx = VersionedTransaction {
            signatures: vec![signature],
            message,
        };

        verify_fee_payer_signature(&tx)?;
        Ok(SignedTransaction::new(tx))
    }

    /// Simulate a signed transaction
    ///
    /// A program rejection becomes `TransactionBuilderError::Simulation`
    /// carrying the error and logs unchanged.
    pub async fn simulate(
        &self,
        signed: &SignedTransaction,
        logger: &TradeLogger,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        let outcome = self.ledger.simulate(signed.tx_ref()).await?;
        logger.log_simulation(
            outcome.is_success(),
            outcome.units_consumed,
            outcome.logs.len(),
        );

        match outcome.err {
            Some(err) => Err(TransactionBuilderError::Simulation {
                err,
                logs: outcome.logs,
            }),
            None => Ok(outcome),
        }
    }

    /// Send and wait for the configured commitment
    ///
    /// The fee payer's signature is checked again here; a transaction that
    /// fails the check is never sent.
    pub async fn broadcast(
        &self,
        signed: &SignedTransaction,
    ) -> Result<Signature, TransactionBuilderError> {
        verify_fee_payer_signature(signed.tx_ref())?;
        let signature = self
            .ledger
            .send_and_confirm(signed.tx_ref(), self.commitment)
            .await?;
        Ok(signature)
    }

    /// Sign and simulate without broadcasting
    pub async fn simulate_only(
        &self,
        output: &TxBuildOutput,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        let logger = output.context.logger.child("simulate");
        let result = async {
            let signed = self.sign(output).await?;
            self.simulate(&signed, &logger).await
        }
        .await;

        if let Err(e) = &result {
            logger.log_failure("simulate", e.category(), &e.to_string());
        }
        result
    }

    /// Full pipeline: SIGN, optional SIMULATE, BROADCAST, CONFIRM
    pub async fn execute(
        &self,
        output: &TxBuildOutput,
    ) -> Result<ExecutionReport, TransactionBuilderError> {
        let logger = output.context.logger.child("execute");
        let started = Instant::now();

        let result = self.run(output, &logger).await;
        match &result {
            Ok(report) => logger.log_broadcast_success(
                &report.signature.to_string(),
                started.elapsed().as_millis() as u64,
            ),
            Err(e) => logger.log_failure("execute", e.category(), &e.to_string()),
        }
        result
    }

    async fn run(
        &self,
        output: &TxBuildOutput,
        logger: &TradeLogger,
    ) -> Result<ExecutionReport, TransactionBuilderError> {
        let signed = self.sign(output).await?;

        let simulation = if self.simulate_before_send {
            Some(self.simulate(&signed, logger).await?)
        } else {
            None
        };

        let signature = self.broadcast(&signed).await?;
        Ok(ExecutionReport {
            signature,
            simulation,
        })
    }
}

/// Check that the fee payer's signature is present and valid for the message
pub fn verify_fee_payer_signature(tx: &VersionedTransaction) -> Result<(), TransactionBuilderError> {
    let fee_payer = compat::get_fee_payer(&tx.message)
        .ok_or_else(|| TransactionBuilderError::SignatureMissing("no fee payer".to_string()))?;

    let valid = compat::get_signer_signature(tx, fee_payer)
        .filter(|sig| **sig != Signature::default())
        .map(|sig| sig.verify(fee_payer.as_ref(), &tx.message.serialize()))
        .unwrap_or(false);

    if !valid {
        return Err(TransactionBuilderError::SignatureMissing(fee_payer.to_string()));
    }
    Ok(())
}
