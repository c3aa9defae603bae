use solana_client::client_error::ClientError;
use thiserror::Error;

/// Errors reported by a [`LedgerClient`](super::LedgerClient)
///
/// The transaction builder propagates these unchanged; classification only
/// exists so the caller can tell a rejected broadcast from a confirmation that
/// simply ran out of time.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Transport or RPC failure while reading ledger state
    #[error("Ledger request failed: {message} (endpoint: {endpoint})")]
    Request {
        endpoint: String,
        message: String,
    },

    /// The node answered with something that could not be interpreted
    #[error("Invalid ledger response: {0}")]
    InvalidResponse(String),

    /// The transaction was rejected when sent
    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    /// The transaction was sent but not confirmed at the requested commitment
    #[error("Confirmation timed out: {0}")]
    ConfirmationTimeout(String),
}

impl LedgerError {
    /// Create from a read-path ClientError with endpoint context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        LedgerError::Request {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    /// Classify a ClientError raised while sending or confirming
    pub fn from_send_error(err: ClientError) -> Self {
        let err_str = err.to_string().to_lowercase();

        if err_str.contains("unable to confirm")
            || err_str.contains("timed out")
            || err_str.contains("timeout")
            || err_str.contains("block height exceeded")
        {
            LedgerError::ConfirmationTimeout(err.to_string())
        } else {
            LedgerError::Broadcast(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::client_error::ClientErrorKind;

    fn custom(msg: &str) -> ClientError {
        ClientError::from(ClientErrorKind::Custom(msg.to_string()))
    }

    #[test]
    fn test_send_error_classification() {
        assert!(matches!(
            LedgerError::from_send_error(custom("Unable to confirm transaction")),
            LedgerError::ConfirmationTimeout(_)
        ));
        assert!(matches!(
            LedgerError::from_send_error(custom("block height exceeded")),
            LedgerError::ConfirmationTimeout(_)
        ));
        assert!(matches!(
            LedgerError::from_send_error(custom("Transaction simulation failed")),
            LedgerError::Broadcast(_)
        ));
    }

    #[test]
    fn test_request_error_keeps_endpoint() {
        let err = LedgerError::from_client_error(custom("connection refused"), "http://rpc");
        assert!(err.to_string().contains("http://rpc"));
        assert!(err.to_string().contains("connection refused"));
    }
}
