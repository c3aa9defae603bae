//! Signing collaborator and the local keypair signer

use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};

use crate::tx_builder::TransactionBuilderError;

/// Signs serialized transaction messages
///
/// Implementations never expose key material. A remote or hardware signer
/// only has to return a signature over the bytes it is given.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Public key of the signing account
    fn pubkey(&self) -> Pubkey;

    /// Sign the serialized message bytes
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, TransactionBuilderError>;
}

/// Local in-memory keypair signer
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load from a keypair file: raw 64 bytes or the Solana CLI JSON array
    pub fn from_file(path: &str) -> Result<Self> {
        let keypair_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path))?;

        if keypair_bytes.len() == 64 {
            return Self::from_bytes(&keypair_bytes).context("Invalid keypair bytes");
        }

        let json: Vec<u8> =
            serde_json::from_slice(&keypair_bytes).context("Failed to parse keypair JSON")?;
        Self::from_bytes(&json).context("Invalid keypair from JSON")
    }

    /// Load from a base58-encoded 64-byte secret key
    pub fn from_base58(secret: &str) -> Result<Self> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .context("Secret key is not valid base58")?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            anyhow::bail!(
                "Invalid keypair length: expected 64 bytes, got {}",
                bytes.len()
            );
        }
        if bytes.iter().all(|&b| b == 0) {
            anyhow::bail!("Invalid keypair: all-zero key rejected");
        }
        let keypair = Keypair::try_from(bytes).context("Invalid keypair bytes")?;
        Ok(Self { keypair })
    }
}

impl std::fmt::Debug for KeypairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, TransactionBuilderError> {
        self.keypair
            .try_sign_message(message)
            .map_err(|e| TransactionBuilderError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_sign_message_verifies() {
        let signer = KeypairSigner::new(Keypair::new());
        let message = b"curve trade";
        let sig = signer.sign_message(message).await.unwrap();
        assert!(sig.verify(signer.pubkey().as_ref(), message));
    }

    #[test]
    fn test_from_json_file() {
        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let signer = KeypairSigner::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(signer.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_from_base58() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let signer = KeypairSigner::from_base58(&encoded).unwrap();
        assert_eq!(signer.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(KeypairSigner::from_bytes(&[0u8; 64]).is_err());
        assert!(KeypairSigner::from_bytes(&[1u8; 32]).is_err());
        assert!(KeypairSigner::from_base58("not-base58-0OIl").is_err());
    }
}
