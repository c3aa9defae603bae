//! Execution context for transaction building
//!
//! Holds the blockhash lifetime a transaction is bound to, together with the
//! trade logger whose correlation id follows the transaction through
//! simulation and broadcast.

use solana_sdk::hash::Hash;

use crate::rpc::Lifetime;
use crate::structured_logging::TradeLogger;

/// Execution context for building one transaction
///
/// # Lifecycle
///
/// 1. Created from a freshly fetched [`Lifetime`]
/// 2. Used to compile the message
/// 3. Moved into the build output so later stages log under the same id
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Blockhash lifetime the message is compiled against
    pub lifetime: Lifetime,

    /// Logger carrying the trade's correlation id
    pub logger: TradeLogger,
}

impl ExecutionContext {
    pub fn new(lifetime: Lifetime, logger: TradeLogger) -> Self {
        Self { lifetime, logger }
    }

    pub fn blockhash(&self) -> Hash {
        self.lifetime.blockhash
    }

    pub fn last_valid_block_height(&self) -> u64 {
        self.lifetime.last_valid_block_height
    }

    pub fn correlation_id(&self) -> &str {
        self.logger.correlation_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_accessors() {
        let lifetime = Lifetime {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 321,
        };
        let logger = TradeLogger::new("buy");
        let id = logger.correlation_id().to_string();

        let ctx = ExecutionContext::new(lifetime, logger);
        assert_eq!(ctx.blockhash(), lifetime.blockhash);
        assert_eq!(ctx.last_valid_block_height(), 321);
        assert_eq!(ctx.correlation_id(), id);
    }
}
