//! [`LedgerClient`] backed by the Solana JSON-RPC nonblocking client

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use std::time::Duration;
use tracing::debug;

use super::{LedgerClient, LedgerError, Lifetime, SimulationOutcome, TokenSupply};

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// JSON-RPC ledger adapter
///
/// Timeouts and transport behaviour are whatever the underlying
/// [`RpcClient`] provides.
pub struct RpcLedgerClient {
    rpc: RpcClient,
    endpoint: String,
    commitment: CommitmentConfig,
}

impl RpcLedgerClient {
    pub fn new(endpoint: impl Into<String>, commitment: CommitmentConfig, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        let rpc = RpcClient::new_with_timeout_and_commitment(endpoint.clone(), timeout, commitment);
        Self::from_client(rpc, endpoint, commitment)
    }

    /// Wrap an already configured client
    pub fn from_client(rpc: RpcClient, endpoint: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc,
            endpoint: endpoint.into(),
            commitment,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for RpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedgerClient")
            .field("endpoint", &self.endpoint)
            .field("commitment", &self.commitment.commitment)
            .finish()
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_latest_lifetime(&self) -> Result<Lifetime, LedgerError> {
        let (blockhash, last_valid_block_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?;

        Ok(Lifetime {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn get_account_info(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.rpc
            .get_balance_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> Result<TokenSupply, LedgerError> {
        let supply = self
            .rpc
            .get_token_supply_with_commitment(mint, self.commitment)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?
            .value;

        let amount = supply.amount.parse::<u64>().map_err(|e| {
            LedgerError::InvalidResponse(format!(
                "token supply amount '{}' is not a u64: {}",
                supply.amount, e
            ))
        })?;

        Ok(TokenSupply {
            amount,
            decimals: supply.decimals,
        })
    }

    async fn simulate(&self, tx: &VersionedTransaction) -> Result<SimulationOutcome, LedgerError> {
        let result = self
            .rpc
            .simulate_transaction(tx)
            .await
            .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?
            .value;

        debug!(
            endpoint = %self.endpoint,
            units_consumed = ?result.units_consumed,
            failed = result.err.is_some(),
            "Simulation response received"
        );

        Ok(SimulationOutcome {
            err: result.err.map(|e| format!("{:?}", e)),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    async fn send_and_confirm(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> Result<Signature, LedgerError> {
        let signature = self
            .rpc
            .send_transaction(tx)
            .await
            .map_err(LedgerError::from_send_error)?;

        debug!(signature = %signature, "Transaction sent, awaiting confirmation");

        let blockhash = *tx.message.recent_blockhash();
        loop {
            let status = self
                .rpc
                .get_signature_status_with_commitment(&signature, commitment)
                .await
                .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?;

            match status {
                Some(Ok(())) => return Ok(signature),
                Some(Err(err)) => {
                    return Err(LedgerError::Broadcast(format!(
                        "{} failed on-chain: {}",
                        signature, err
                    )))
                }
                None => {
                    let still_valid = self
                        .rpc
                        .is_blockhash_valid(&blockhash, CommitmentConfig::processed())
                        .await
                        .map_err(|e| LedgerError::from_client_error(e, &self.endpoint))?;
                    if !still_valid {
                        return Err(LedgerError::ConfirmationTimeout(format!(
                            "{} not confirmed before blockhash {} expired",
                            signature, blockhash
                        )));
                    }
                    tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use solana_client::rpc_client::Mocks;
    use solana_client::rpc_request::RpcRequest;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::{v0, VersionedMessage},
        signature::{Keypair, Signer},
    };

    fn context() -> Value {
        json!({ "slot": 1 })
    }

    fn mock_client(mocks: Mocks) -> RpcLedgerClient {
        RpcLedgerClient::from_client(
            RpcClient::new_mock_with_mocks("succeeds".to_string(), mocks),
            "mock",
            CommitmentConfig::confirmed(),
        )
    }

    fn signed_tx() -> VersionedTransaction {
        let payer = Keypair::new();
        let ix = Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1, 2, 3],
            vec![AccountMeta::new(payer.pubkey(), true)],
        );
        let message = v0::Message::try_compile(&payer.pubkey(), &[ix], &[], Hash::new_unique())
            .unwrap();
        VersionedTransaction::try_new(VersionedMessage::V0(message), &[&payer]).unwrap()
    }

    fn status_response(status: Value, err: Value) -> Value {
        json!({
            "context": context(),
            "value": [{
                "slot": 1,
                "confirmations": null,
                "status": status,
                "err": err,
                "confirmationStatus": "finalized"
            }]
        })
    }

    #[tokio::test]
    async fn test_send_and_confirm_rejects_failed_transaction() {
        let tx = signed_tx();
        let program_err = json!({ "InstructionError": [2, { "Custom": 6003 }] });

        let mut mocks = Mocks::new();
        mocks.insert(RpcRequest::SendTransaction, json!(tx.signatures[0].to_string()));
        mocks.insert(
            RpcRequest::GetSignatureStatuses,
            status_response(json!({ "Err": program_err.clone() }), program_err),
        );

        let err = mock_client(mocks)
            .send_and_confirm(&tx, CommitmentConfig::confirmed())
            .await
            .unwrap_err();

        match err {
            LedgerError::Broadcast(msg) => {
                assert!(msg.contains(&tx.signatures[0].to_string()));
                assert!(msg.contains("failed on-chain"));
            }
            other => panic!("expected broadcast error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_and_confirm_returns_signature_on_success() {
        let tx = signed_tx();

        let mut mocks = Mocks::new();
        mocks.insert(RpcRequest::SendTransaction, json!(tx.signatures[0].to_string()));
        mocks.insert(
            RpcRequest::GetSignatureStatuses,
            status_response(json!({ "Ok": null }), Value::Null),
        );

        let signature = mock_client(mocks)
            .send_and_confirm(&tx, CommitmentConfig::confirmed())
            .await
            .unwrap();
        assert_eq!(signature, tx.signatures[0]);
    }

    #[tokio::test]
    async fn test_send_and_confirm_times_out_when_blockhash_expires() {
        let tx = signed_tx();

        let mut mocks = Mocks::new();
        mocks.insert(RpcRequest::SendTransaction, json!(tx.signatures[0].to_string()));
        mocks.insert(
            RpcRequest::GetSignatureStatuses,
            json!({ "context": context(), "value": [null] }),
        );
        mocks.insert(
            RpcRequest::IsBlockhashValid,
            json!({ "context": context(), "value": false }),
        );

        let err = mock_client(mocks)
            .send_and_confirm(&tx, CommitmentConfig::confirmed())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ConfirmationTimeout(_)));
    }

    #[tokio::test]
    async fn test_token_supply_parses_amount() {
        let mut mocks = Mocks::new();
        mocks.insert(
            RpcRequest::GetTokenSupply,
            json!({
                "context": context(),
                "value": {
                    "amount": "500000000000",
                    "decimals": 6,
                    "uiAmount": 500000.0,
                    "uiAmountString": "500000"
                }
            }),
        );

        let supply = mock_client(mocks)
            .get_token_supply(&Pubkey::new_unique())
            .await
            .unwrap();
        assert_eq!(supply.amount, 500_000_000_000);
        assert_eq!(supply.decimals, 6);
    }

    #[tokio::test]
    async fn test_token_supply_rejects_non_numeric_amount() {
        let mut mocks = Mocks::new();
        mocks.insert(
            RpcRequest::GetTokenSupply,
            json!({
                "context": context(),
                "value": {
                    "amount": "lots",
                    "decimals": 6,
                    "uiAmount": null,
                    "uiAmountString": "lots"
                }
            }),
        );

        let err = mock_client(mocks)
            .get_token_supply(&Pubkey::new_unique())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_simulate_maps_error_and_logs() {
        let mut mocks = Mocks::new();
        mocks.insert(
            RpcRequest::SimulateTransaction,
            json!({
                "context": context(),
                "value": {
                    "err": { "InstructionError": [2, { "Custom": 6003 }] },
                    "logs": ["Program log: Instruction: Sell", "Program log: Error"],
                    "accounts": null,
                    "unitsConsumed": 1200
                }
            }),
        );

        let outcome = mock_client(mocks).simulate(&signed_tx()).await.unwrap();
        assert!(!outcome.is_success());
        assert!(outcome.err.unwrap().contains("6003"));
        assert_eq!(outcome.logs.len(), 2);
        assert_eq!(outcome.units_consumed, Some(1200));
    }

    #[tokio::test]
    async fn test_simulate_success_without_logs() {
        let outcome = mock_client(Mocks::new()).simulate(&signed_tx()).await.unwrap();
        assert!(outcome.is_success());
        assert!(outcome.logs.is_empty());
    }

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let account = mock_client(Mocks::new())
            .get_account_info(&Pubkey::new_unique())
            .await
            .unwrap();
        assert!(account.is_none());
    }

    #[tokio::test]
    async fn test_balance_and_lifetime() {
        let client = mock_client(Mocks::new());
        assert_eq!(client.get_balance(&Pubkey::new_unique()).await.unwrap(), 50);

        let lifetime = client.get_latest_lifetime().await.unwrap();
        assert_eq!(lifetime.last_valid_block_height, 1234);
    }

    #[tokio::test]
    async fn test_request_failure_carries_endpoint() {
        // Null responses fail to deserialize
        let client = RpcLedgerClient::from_client(
            RpcClient::new_mock("fails".to_string()),
            "http://unreachable",
            CommitmentConfig::confirmed(),
        );
        let err = client.get_balance(&Pubkey::new_unique()).await.unwrap_err();
        assert!(matches!(err, LedgerError::Request { ref endpoint, .. } if endpoint == "http://unreachable"));
    }
}
