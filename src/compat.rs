//! Uniform accessors over `VersionedMessage` and `VersionedTransaction`
//!
//! Legacy and V0 messages expose the same header and static keys through
//! different structs. The helpers here give one API for both, and locate a
//! given signer's signature slot in a signed transaction.

use solana_sdk::{
    message::{MessageHeader, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

/// Message header for Legacy or V0 messages
#[inline]
#[must_use]
pub fn get_message_header(message: &VersionedMessage) -> &MessageHeader {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.header,
        VersionedMessage::V0(v0_msg) => &v0_msg.header,
    }
}

/// Static account keys, excluding any lookup-table addresses
#[inline]
#[must_use]
pub fn get_static_account_keys(message: &VersionedMessage) -> &[Pubkey] {
    match message {
        VersionedMessage::Legacy(legacy_msg) => &legacy_msg.account_keys,
        VersionedMessage::V0(v0_msg) => &v0_msg.account_keys,
    }
}

/// Accounts that must sign: the first `num_required_signatures` static keys
#[inline]
#[must_use]
pub fn get_required_signers(message: &VersionedMessage) -> &[Pubkey] {
    let header = get_message_header(message);
    let account_keys = get_static_account_keys(message);
    let num_signers = header.num_required_signatures as usize;

    &account_keys[..num_signers.min(account_keys.len())]
}

/// Fee payer, always the first static key
#[inline]
#[must_use]
pub fn get_fee_payer(message: &VersionedMessage) -> Option<&Pubkey> {
    get_required_signers(message).first()
}

/// Signature slot belonging to `signer`, if it is a required signer
///
/// Returns `None` when `signer` is not required or the signature vector is
/// shorter than the header demands. Default (all-zero) signatures are
/// returned as-is; callers decide whether a slot is filled.
#[must_use]
pub fn get_signer_signature<'a>(
    tx: &'a VersionedTransaction,
    signer: &Pubkey,
) -> Option<&'a Signature> {
    let index = get_required_signers(&tx.message)
        .iter()
        .position(|key| key == signer)?;
    tx.signatures.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        instruction::{AccountMeta, Instruction},
        message::{v0, Message},
    };

    fn instruction(payer: &Pubkey, other_signer: Option<&Pubkey>) -> Instruction {
        let mut accounts = vec![AccountMeta::new(*payer, true)];
        if let Some(other) = other_signer {
            accounts.push(AccountMeta::new_readonly(*other, true));
        }
        accounts.push(AccountMeta::new(Pubkey::new_unique(), false));
        Instruction::new_with_bytes(Pubkey::new_unique(), &[0], accounts)
    }

    #[test]
    fn test_legacy_and_v0_agree() {
        let payer = Pubkey::new_unique();
        let ix = instruction(&payer, None);

        let legacy = VersionedMessage::Legacy(Message::new(&[ix.clone()], Some(&payer)));
        let v0 = VersionedMessage::V0(
            v0::Message::try_compile(&payer, &[ix], &[], Hash::new_unique()).unwrap(),
        );

        for message in [&legacy, &v0] {
            assert_eq!(get_message_header(message).num_required_signatures, 1);
            assert_eq!(get_required_signers(message), &[payer]);
            assert_eq!(get_fee_payer(message), Some(&payer));
            assert_eq!(get_static_account_keys(message).len(), 3);
        }
    }

    #[test]
    fn test_signer_signature_lookup() {
        let payer = Pubkey::new_unique();
        let cosigner = Pubkey::new_unique();
        let message = VersionedMessage::V0(
            v0::Message::try_compile(
                &payer,
                &[instruction(&payer, Some(&cosigner))],
                &[],
                Hash::new_unique(),
            )
            .unwrap(),
        );

        let first = Signature::from([1u8; 64]);
        let tx = VersionedTransaction {
            signatures: vec![first],
            message,
        };

        assert_eq!(get_signer_signature(&tx, &payer), Some(&first));
        // cosigner is required but has no slot filled
        assert_eq!(get_signer_signature(&tx, &cosigner), None);
        assert_eq!(get_signer_signature(&tx, &Pubkey::new_unique()), None);
    }
}
