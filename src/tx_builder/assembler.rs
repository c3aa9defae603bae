//! Unsigned transaction assembly
//!
//! Composes the fee payer, blockhash lifetime, priority fee, optional token
//! account creation and program instructions into one ordered, validated
//! [`UnsignedTransaction`]. The result is plain data: it can be cloned,
//! compiled repeatedly for simulation, and signed later.

use solana_sdk::{
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
};

use super::errors::TransactionBuilderError;
use super::instructions::{plan_trade_instructions, sanity_check_ix_order, InstructionKind};
use crate::rpc::Lifetime;

/// Ordered instructions bound to a fee payer and blockhash lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTransaction {
    pub fee_payer: Pubkey,
    pub lifetime: Lifetime,
    pub instructions: Vec<Instruction>,
}

impl UnsignedTransaction {
    /// Compile to a v0 message without address lookup tables
    pub fn compile(&self) -> Result<VersionedMessage, TransactionBuilderError> {
        let message = v0::Message::try_compile(
            &self.fee_payer,
            &self.instructions,
            &[],
            self.lifetime.blockhash,
        )
        .map_err(|e| TransactionBuilderError::encoding(format!("message compile failed: {}", e)))?;

        Ok(VersionedMessage::V0(message))
    }

    pub fn creates_token_account(&self) -> bool {
        self.instructions
            .iter()
            .any(|ix| InstructionKind::of(ix) == InstructionKind::AccountCreation)
    }

    /// Curve program instructions, in order
    pub fn program_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions
            .iter()
            .filter(|ix| InstructionKind::of(ix) == InstructionKind::Program)
    }
}

/// Assemble and validate an unsigned transaction
///
/// Order is priority fee, then the optional creation instruction, then the
/// program instructions in the order given.
///
/// # Errors
///
/// - `InvalidInstructionOrder` for an empty program list, a priority fee
///   instruction that is not a compute budget instruction, or a fee payer
///   referenced without the signer role
pub fn assemble(
    fee_payer: Pubkey,
    lifetime: Lifetime,
    priority_fee_ix: Instruction,
    account_creation_ix: Option<Instruction>,
    program_ixs: Vec<Instruction>,
) -> Result<UnsignedTransaction, TransactionBuilderError> {
    if InstructionKind::of(&priority_fee_ix) != InstructionKind::ComputeBudget {
        return Err(TransactionBuilderError::invalid_order(format!(
            "Priority fee instruction targets {}, expected the compute budget program",
            priority_fee_ix.program_id
        )));
    }
    if let Some(create_ix) = &account_creation_ix {
        if InstructionKind::of(create_ix) != InstructionKind::AccountCreation {
            return Err(TransactionBuilderError::invalid_order(format!(
                "Account creation instruction targets {}, expected the associated token program",
                create_ix.program_id
            )));
        }
    }

    let plan = plan_trade_instructions(priority_fee_ix, account_creation_ix, program_ixs)?;
    sanity_check_ix_order(&plan.instructions, &fee_payer)?;

    Ok(UnsignedTransaction {
        fee_payer,
        lifetime,
        instructions: plan.instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx_builder::instructions::{
        create_token_account_instruction, priority_fee_instruction,
    };
    use solana_sdk::{compute_budget, hash::Hash, instruction::AccountMeta};

    fn lifetime() -> Lifetime {
        Lifetime {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 100,
        }
    }

    fn program_ix(payer: &Pubkey) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[9; 24],
            vec![AccountMeta::new(*payer, true)],
        )
    }

    #[test]
    fn test_assemble_orders_instructions() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let first = program_ix(&payer);
        let second = program_ix(&payer);

        let unsigned = assemble(
            payer,
            lifetime(),
            priority_fee_instruction(10_000_000),
            Some(create_token_account_instruction(&payer, &payer, &mint)),
            vec![first.clone(), second.clone()],
        )
        .unwrap();

        assert_eq!(unsigned.instructions.len(), 4);
        assert_eq!(unsigned.instructions[0].program_id, compute_budget::id());
        assert!(unsigned.creates_token_account());
        assert_eq!(unsigned.instructions[2], first);
        assert_eq!(unsigned.instructions[3], second);
        assert_eq!(unsigned.program_instructions().count(), 2);
    }

    #[test]
    fn test_assemble_keeps_priority_fee_without_creation() {
        let payer = Pubkey::new_unique();
        let fee_ix = priority_fee_instruction(42);

        let unsigned =
            assemble(payer, lifetime(), fee_ix.clone(), None, vec![program_ix(&payer)]).unwrap();

        assert_eq!(unsigned.instructions[0], fee_ix);
        assert!(!unsigned.creates_token_account());
    }

    #[test]
    fn test_assemble_rejects_misplaced_instructions() {
        let payer = Pubkey::new_unique();

        let result = assemble(
            payer,
            lifetime(),
            program_ix(&payer),
            None,
            vec![program_ix(&payer)],
        );
        assert!(matches!(
            result,
            Err(TransactionBuilderError::InvalidInstructionOrder(_))
        ));

        let result = assemble(
            payer,
            lifetime(),
            priority_fee_instruction(1),
            Some(priority_fee_instruction(2)),
            vec![program_ix(&payer)],
        );
        assert!(matches!(
            result,
            Err(TransactionBuilderError::InvalidInstructionOrder(_))
        ));

        let result = assemble(payer, lifetime(), priority_fee_instruction(1), None, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_places_fee_payer_first() {
        let payer = Pubkey::new_unique();
        let lt = lifetime();
        let unsigned = assemble(
            payer,
            lt,
            priority_fee_instruction(1),
            None,
            vec![program_ix(&payer)],
        )
        .unwrap();

        let message = unsigned.compile().unwrap();
        assert_eq!(message.static_account_keys()[0], payer);
        assert_eq!(message.header().num_required_signatures, 1);
        assert_eq!(*message.recent_blockhash(), lt.blockhash);
    }
}
