//! Instruction planning and ordering validation
//!
//! A trade transaction is always laid out as:
//! 1. Compute budget (priority fee)
//! 2. Associated token account creation (optional)
//! 3. Curve program instructions, in caller order
//!
//! Planning is stateless. Validation runs on every assembled transaction in
//! all build profiles.

use crate::tx_builder::errors::TransactionBuilderError;
use solana_sdk::{
    compute_budget::{self, ComputeBudgetInstruction},
    instruction::Instruction,
    pubkey::Pubkey,
};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

/// Role of an instruction within a trade transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    ComputeBudget,
    AccountCreation,
    Program,
}

impl InstructionKind {
    pub fn of(ix: &Instruction) -> Self {
        if ix.program_id == compute_budget::id() {
            InstructionKind::ComputeBudget
        } else if ix.program_id == spl_associated_token_account::id() {
            InstructionKind::AccountCreation
        } else {
            InstructionKind::Program
        }
    }
}

/// Ordered instructions for one transaction
#[derive(Debug, Clone)]
pub struct InstructionPlan {
    pub instructions: Vec<Instruction>,

    /// Whether an associated token account creation step is included
    pub creates_token_account: bool,
}

impl InstructionPlan {
    pub fn new(instructions: Vec<Instruction>, creates_token_account: bool) -> Self {
        Self {
            instructions,
            creates_token_account,
        }
    }
}

/// Priority fee instruction, micro-lamports per compute unit
pub fn priority_fee_instruction(micro_lamports: u64) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_price(micro_lamports)
}

/// Idempotent creation of `owner`'s token account for `mint`, funded by `payer`
///
/// Succeeds on-chain when the account already exists.
pub fn create_token_account_instruction(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, &spl_token::id())
}

/// Lay out instructions in the required order
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionOrder` if there are no
/// program instructions.
pub fn plan_trade_instructions(
    priority_fee_ix: Instruction,
    account_creation_ix: Option<Instruction>,
    program_ixs: Vec<Instruction>,
) -> Result<InstructionPlan, TransactionBuilderError> {
    if program_ixs.is_empty() {
        return Err(TransactionBuilderError::invalid_order(
            "No program instructions to submit",
        ));
    }

    let creates_token_account = account_creation_ix.is_some();
    let mut instructions = Vec::with_capacity(program_ixs.len() + 2);

    instructions.push(priority_fee_ix);
    if let Some(create_ix) = account_creation_ix {
        instructions.push(create_ix);
    }
    instructions.extend(program_ixs);

    Ok(InstructionPlan::new(instructions, creates_token_account))
}

/// Validate instruction ordering and fee payer roles
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionOrder` if:
/// - The list contains no program instruction
/// - A compute budget instruction follows any other instruction
/// - An account creation follows a program instruction
/// - A program instruction references the fee payer without a signer tag
pub fn sanity_check_ix_order(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
) -> Result<(), TransactionBuilderError> {
    if instructions.is_empty() {
        return Err(TransactionBuilderError::invalid_order(
            "Instruction list is empty",
        ));
    }

    let mut seen_non_budget = false;
    let mut seen_program = false;

    for (idx, ix) in instructions.iter().enumerate() {
        match InstructionKind::of(ix) {
            InstructionKind::ComputeBudget => {
                if seen_non_budget {
                    return Err(TransactionBuilderError::invalid_order(format!(
                        "Compute budget instruction at position {} follows a non-budget instruction",
                        idx
                    )));
                }
            }
            InstructionKind::AccountCreation => {
                seen_non_budget = true;
                if seen_program {
                    return Err(TransactionBuilderError::invalid_order(format!(
                        "Account creation at position {} follows a program instruction",
                        idx
                    )));
                }
            }
            InstructionKind::Program => {
                seen_non_budget = true;
                seen_program = true;

                let unsigned_payer = ix
                    .accounts
                    .iter()
                    .any(|meta| meta.pubkey == *fee_payer && !meta.is_signer);
                if unsigned_payer {
                    return Err(TransactionBuilderError::invalid_order(format!(
                        "Fee payer {} referenced without signer role at position {}",
                        fee_payer, idx
                    )));
                }
            }
        }
    }

    if !seen_program {
        return Err(TransactionBuilderError::invalid_order(
            "No program instruction present",
        ));
    }

    Ok(())
}
