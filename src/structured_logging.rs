//! Structured logging for trade pipeline events

use uuid::Uuid;

/// Structured logger bound to one trade build
///
/// Every event carries the same `correlation_id`, so build, simulate and
/// broadcast lines for one trade can be joined.
#[derive(Debug, Clone)]
pub struct TradeLogger {
    correlation_id: String,
    operation: &'static str,
}

impl TradeLogger {
    pub fn new(operation: &'static str) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            operation,
        }
    }

    /// Logger that continues an existing correlation id under another operation
    pub fn child(&self, operation: &'static str) -> Self {
        Self {
            correlation_id: self.correlation_id.clone(),
            operation,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn log_build_start(&self, mint: &str, user: &str) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            mint = %mint,
            user = %user,
            "Building trade transaction"
        );
    }

    pub fn log_quote(&self, mint: &str, token_amount: u64, bound: i64, expected: Option<u64>) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            mint = %mint,
            token_amount = token_amount,
            bound = bound,
            expected = ?expected,
            "Quote computed"
        );
    }

    pub fn log_token_account_check(&self, account: &str, exists: bool, lookup_failed: bool) {
        if lookup_failed {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                operation = self.operation,
                account = %account,
                "Token account lookup failed, including idempotent creation"
            );
        } else {
            tracing::debug!(
                correlation_id = %self.correlation_id,
                operation = self.operation,
                account = %account,
                exists = exists,
                "Token account existence checked"
            );
        }
    }

    pub fn log_built(&self, mint: &str, instruction_count: usize, creates_token_account: bool) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            mint = %mint,
            instruction_count = instruction_count,
            creates_token_account = creates_token_account,
            "Trade transaction built"
        );
    }

    pub fn log_simulation(&self, success: bool, units_consumed: Option<u64>, log_count: usize) {
        if success {
            tracing::info!(
                correlation_id = %self.correlation_id,
                operation = self.operation,
                units_consumed = ?units_consumed,
                "Simulation succeeded"
            );
        } else {
            tracing::warn!(
                correlation_id = %self.correlation_id,
                operation = self.operation,
                units_consumed = ?units_consumed,
                log_count = log_count,
                "Simulation rejected by program"
            );
        }
    }

    pub fn log_broadcast_success(&self, signature: &str, latency_ms: u64) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            signature = %signature,
            latency_ms = latency_ms,
            "Trade transaction confirmed"
        );
    }

    pub fn log_failure(&self, stage: &str, category: &str, error: &str) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            operation = self.operation,
            stage = %stage,
            category = %category,
            error = %error,
            "Trade pipeline failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_keeps_correlation_id() {
        let logger = TradeLogger::new("buy");
        let child = logger.child("execute");
        assert_eq!(logger.correlation_id(), child.correlation_id());
        assert_eq!(child.operation(), "execute");
    }

    #[test]
    fn test_new_loggers_are_distinct() {
        let a = TradeLogger::new("sell");
        let b = TradeLogger::new("sell");
        assert_ne!(a.correlation_id(), b.correlation_id());
        assert!(Uuid::parse_str(a.correlation_id()).is_ok());
    }
}
