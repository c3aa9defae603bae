//! Off-chain reserve quotes for the buy path

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tracing::debug;

use crate::tx_builder::{CurveReserves, TransactionBuilderError};

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://frontend-api.pump.fun";

/// Source of a mint's virtual curve reserves
#[async_trait]
pub trait ReserveQuoteSource: Send + Sync {
    async fn get_reserves(&self, mint: &Pubkey) -> Result<CurveReserves, TransactionBuilderError>;
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    virtual_sol_reserves: u64,
    virtual_token_reserves: u64,
}

/// Reads reserves from the public coin endpoint, `GET {base}/coins/{mint}`
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: Client,
    base_url: String,
}

impl HttpQuoteSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransactionBuilderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransactionBuilderError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn coin_url(&self, mint: &Pubkey) -> String {
        format!("{}/coins/{}", self.base_url, mint)
    }
}

#[async_trait]
impl ReserveQuoteSource for HttpQuoteSource {
    async fn get_reserves(&self, mint: &Pubkey) -> Result<CurveReserves, TransactionBuilderError> {
        let url = self.coin_url(mint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TransactionBuilderError::lookup_failed(mint, e))?;

        let coin: CoinResponse = response.json().await.map_err(|e| {
            TransactionBuilderError::Quote(format!("unexpected coin response for {}: {}", mint, e))
        })?;

        debug!(
            mint = %mint,
            virtual_sol = coin.virtual_sol_reserves,
            virtual_token = coin.virtual_token_reserves,
            "Reserves fetched"
        );

        Ok(CurveReserves {
            virtual_sol: coin.virtual_sol_reserves,
            virtual_token: coin.virtual_token_reserves,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_url_trims_slash() {
        let source = HttpQuoteSource::new("https://example.test/", Duration::from_secs(1)).unwrap();
        let mint = Pubkey::new_unique();
        assert_eq!(
            source.coin_url(&mint),
            format!("https://example.test/coins/{}", mint)
        );
    }

    #[test]
    fn test_coin_response_ignores_extra_fields() {
        let body = r#"{
            "mint": "x",
            "virtual_sol_reserves": 30000000000,
            "virtual_token_reserves": 1073000000000000,
            "complete": false
        }"#;
        let coin: CoinResponse = serde_json::from_str(body).unwrap();
        assert_eq!(coin.virtual_sol_reserves, 30_000_000_000);
        assert_eq!(coin.virtual_token_reserves, 1_073_000_000_000_000);
    }
}
