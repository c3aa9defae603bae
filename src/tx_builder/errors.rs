//! Error types for the trade transaction builder
//!
//! Errors fall into two families:
//! - Local construction errors (derivation, encoding, account listing, ordering).
//!   These abort a build before any network call is made.
//! - Pipeline errors (lookup, simulation, signing, broadcast). These are surfaced
//!   to the caller unchanged; nothing in this crate retries a price-sensitive
//!   operation on its own.

use crate::rpc::LedgerError;
use thiserror::Error;

/// Error type for every stage of building and submitting a trade transaction
#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// All 256 bump seeds were probed without finding an off-curve address
    #[error("Address derivation failed (program={program}): {reason}")]
    Derivation {
        /// Program the address was derived under
        program: String,
        /// What was being derived
        reason: String,
    },

    /// An amount or bound could not be represented in its wire field
    ///
    /// Raised when scaling a UI amount by `10^decimals` overflows `u64`, when a
    /// bound does not fit `i64`, or when a decimal string is malformed.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A caller-resolved account slot held an unusable address
    #[error("Invalid account for slot {slot}: {reason}")]
    InvalidAccount {
        /// Semantic slot name in the account template
        slot: &'static str,
        /// Why the address was rejected
        reason: String,
    },

    /// Reserve or curve data cannot produce a quote (zero reserves, bad percent)
    #[error("Quote error: {0}")]
    Quote(String),

    /// Balance or supply lookup needed for pricing failed
    ///
    /// Only fatal lookups end up here. A failed existence check for the
    /// caller's token account is treated as "absent" and never produces this.
    #[error("Account lookup failed for {account}: {reason}")]
    AccountLookup {
        /// The account that could not be read
        account: String,
        /// Underlying failure
        reason: String,
    },

    /// Instruction list violates the required ordering
    ///
    /// Required order:
    /// 1. Compute budget (priority fee)
    /// 2. Associated token account creation (optional)
    /// 3. Program instructions
    #[error("Invalid instruction order: {0}")]
    InvalidInstructionOrder(String),

    /// The program rejected the simulated transaction
    ///
    /// Carried verbatim, including program logs, so the caller can see exactly
    /// why the curve program refused it.
    #[error("Simulation failed: {err}")]
    Simulation {
        /// Transaction error reported by the ledger
        err: String,
        /// Program logs captured during simulation
        logs: Vec<String>,
    },

    /// Fee payer signature absent or invalid after signing; never broadcast
    #[error("Signature missing for fee payer {0}")]
    SignatureMissing(String),

    /// The signer failed to produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Could not obtain a blockhash lifetime
    #[error("Blockhash error: {0}")]
    Blockhash(String),

    /// Broadcast, confirmation and other ledger failures, propagated unchanged
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Configuration or validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wrapped error from external crates
    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl TransactionBuilderError {
    /// Check if this error is potentially retryable
    ///
    /// Only failures that happen before a price decision is committed are
    /// retryable. Simulation, broadcast and confirmation failures are not: a
    /// retry would reuse a stale quote.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Blockhash(_) => true,
            Self::AccountLookup { .. } => true,

            Self::Derivation { .. } => false,
            Self::Encoding(_) => false,
            Self::InvalidAccount { .. } => false,
            Self::Quote(_) => false,
            Self::InvalidInstructionOrder(_) => false,
            Self::Simulation { .. } => false,
            Self::SignatureMissing(_) => false,
            Self::Signing(_) => false,
            Self::Ledger(_) => false,
            Self::Configuration(_) => false,
            Self::External(_) => false,
        }
    }

    /// Whether this error was raised while constructing the transaction locally
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::Derivation { .. }
                | Self::Encoding(_)
                | Self::InvalidAccount { .. }
                | Self::Quote(_)
                | Self::InvalidInstructionOrder(_)
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Derivation { .. } => "derivation",
            Self::Encoding(_) => "encoding",
            Self::InvalidAccount { .. } => "accounts",
            Self::Quote(_) => "quote",
            Self::AccountLookup { .. } => "lookup",
            Self::InvalidInstructionOrder(_) => "validation",
            Self::Simulation { .. } => "simulation",
            Self::SignatureMissing(_) => "signature",
            Self::Signing(_) => "signing",
            Self::Blockhash(_) => "blockhash",
            Self::Ledger(_) => "ledger",
            Self::Configuration(_) => "config",
            Self::External(_) => "external",
        }
    }
}

// Convenience constructors for common error scenarios
impl TransactionBuilderError {
    /// Create a derivation error for a specific program
    pub fn derivation_failed(program: impl ToString, reason: impl Into<String>) -> Self {
        Self::Derivation {
            program: program.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding(reason.into())
    }

    /// Create an account lookup error
    pub fn lookup_failed(account: impl ToString, reason: impl ToString) -> Self {
        Self::AccountLookup {
            account: account.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid instruction order error
    pub fn invalid_order(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionOrder(reason.into())
    }

    /// Create a blockhash error
    pub fn blockhash_unavailable(reason: impl Into<String>) -> Self {
        Self::Blockhash(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransactionBuilderError::Encoding("amount overflow".to_string());
        assert_eq!(err.to_string(), "Encoding error: amount overflow");

        let err = TransactionBuilderError::InvalidAccount {
            slot: "mint",
            reason: "zero address".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid account for slot mint: zero address");
    }

    #[test]
    fn test_simulation_error_keeps_logs() {
        let err = TransactionBuilderError::Simulation {
            err: "InstructionError(2, Custom(6002))".to_string(),
            logs: vec!["Program log: slippage".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Simulation failed: InstructionError(2, Custom(6002))"
        );
        if let TransactionBuilderError::Simulation { logs, .. } = err {
            assert_eq!(logs.len(), 1);
        }
    }

    #[test]
    fn test_error_retryability() {
        assert!(TransactionBuilderError::Blockhash("stale".to_string()).is_retryable());
        assert!(TransactionBuilderError::lookup_failed("curve", "timeout").is_retryable());

        assert!(!TransactionBuilderError::Simulation {
            err: "x".to_string(),
            logs: vec![]
        }
        .is_retryable());
        assert!(!TransactionBuilderError::SignatureMissing("payer".to_string()).is_retryable());
        assert!(!TransactionBuilderError::Ledger(LedgerError::ConfirmationTimeout(
            "sig".to_string()
        ))
        .is_retryable());
    }

    #[test]
    fn test_construction_errors() {
        assert!(TransactionBuilderError::encoding("overflow").is_construction_error());
        assert!(TransactionBuilderError::derivation_failed("prog", "exhausted")
            .is_construction_error());
        assert!(TransactionBuilderError::invalid_order("late create").is_construction_error());
        assert!(!TransactionBuilderError::Signing("hsm".to_string()).is_construction_error());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(TransactionBuilderError::encoding("x").category(), "encoding");
        assert_eq!(
            TransactionBuilderError::Ledger(LedgerError::Broadcast("x".to_string())).category(),
            "ledger"
        );
        assert_eq!(
            TransactionBuilderError::Quote("zero reserves".to_string()).category(),
            "quote"
        );
    }
}
