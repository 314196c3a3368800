//! Multi-signature envelopes.
//!
//! A multi-sig submission carries two layers of authorization over two
//! *different* payloads:
//!
//! 1. Each co-signer signs the digest of `[multiSigUser, outerSigner,
//!    innerAction]` (lower-cased addresses, inner action with its `type`
//!    tag) through the regular Agent path.
//! 2. The outer signer then hashes the assembled `multiSig` action body
//!    (collected signatures included) with the request's vault/nonce/expiry
//!    context, and user-signs `{hyperliquidChain, multiSigActionHash, nonce}`
//!    under `HyperliquidTransaction:SendMultiSig`.
//!
//! All signers must use the same nonce.

use alloy::{
    primitives::{Address, B256},
    signers::SignerSync,
};
use serde::Serialize;

use crate::{
    chain::Chain,
    error::Result,
    hash::rmp_hash,
    signing::{self, SEND_MULTI_SIG_SIGN_TYPES, UserSignedAction, sign_l1_action},
    types::{Action, ActionRequest, MultiSigAction, MultiSigPayload, Signature},
};

/// Envelope message signed by the outer signer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMultiSig {
    signature_chain_id: String,
    hyperliquid_chain: Chain,
    multi_sig_action_hash: B256,
    nonce: u64,
}

impl UserSignedAction for SendMultiSig {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:SendMultiSig";
    const SIGN_TYPES: &'static [signing::FieldDef] = SEND_MULTI_SIG_SIGN_TYPES;
}

/// Produces one co-signer's signature over the inner action.
pub fn co_sign<S: SignerSync>(
    signer: &S,
    multi_sig_user: Address,
    outer_signer: Address,
    inner_action: &Action,
    nonce: u64,
    chain: Chain,
) -> Result<Signature> {
    let multi_sig_user = multi_sig_user.to_string().to_lowercase();
    let outer_signer = outer_signer.to_string().to_lowercase();
    let connection_id = rmp_hash(
        &(&multi_sig_user, &outer_signer, inner_action),
        nonce,
        None,
        None,
    )?;
    sign_l1_action(signer, chain, connection_id)
}

/// Collects co-signatures from every signer and assembles the `multiSig`
/// action around the inner action.
pub fn collect_signatures<'a, S: SignerSync + 'a>(
    outer_signer: Address,
    multi_sig_user: Address,
    signers: impl Iterator<Item = &'a S>,
    inner_action: Action,
    nonce: u64,
    chain: Chain,
) -> Result<MultiSigAction> {
    let mut signatures = vec![];
    for signer in signers {
        let signature = co_sign(signer, multi_sig_user, outer_signer, &inner_action, nonce, chain)?;
        signatures.push(signature);
    }

    Ok(MultiSigAction {
        signature_chain_id: crate::chain::SIGNATURE_CHAIN_ID.to_string(),
        signatures,
        payload: MultiSigPayload {
            multi_sig_user: multi_sig_user.to_string().to_lowercase(),
            outer_signer: outer_signer.to_string().to_lowercase(),
            action: Box::new(inner_action),
        },
    })
}

/// Signs the envelope as the outer signer and assembles the outbound request.
pub(crate) fn lead_sign<S: SignerSync>(
    signer: &S,
    action: MultiSigAction,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
    chain: Chain,
) -> Result<ActionRequest> {
    // the hash covers the action body without its type tag, signatures and
    // payload included
    let multi_sig_action_hash = rmp_hash(&action, nonce, vault_address, expires_after)?;

    let envelope = SendMultiSig {
        signature_chain_id: action.signature_chain_id.clone(),
        hyperliquid_chain: chain,
        multi_sig_action_hash,
        nonce,
    };
    let signature = signing::sign_typed(signer, &envelope.typed_data()?)?;

    Ok(ActionRequest {
        action: Action::MultiSig(action),
        nonce,
        signature,
        vault_address,
        expires_after,
    })
}

#[cfg(test)]
mod tests {
    use alloy::signers::local::PrivateKeySigner;

    use super::*;
    use crate::types::ScheduleCancel;

    const NONCE: u64 = 1_700_000_000_000;

    fn signer(seed: u8) -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::repeat_byte(seed)).unwrap()
    }

    fn inner() -> Action {
        Action::ScheduleCancel(ScheduleCancel { time: Some(NONCE + 60_000) })
    }

    #[test]
    fn collects_one_signature_per_signer() {
        let lead = signer(1);
        let co_signers = [signer(2), signer(3)];
        let multi_sig_user = Address::repeat_byte(0xaa);

        let action = collect_signatures(
            lead.address(),
            multi_sig_user,
            co_signers.iter(),
            inner(),
            NONCE,
            Chain::Testnet,
        )
        .unwrap();

        assert_eq!(action.signatures.len(), 2);
        assert_ne!(action.signatures[0], action.signatures[1]);
        assert_eq!(
            action.payload.multi_sig_user,
            multi_sig_user.to_string().to_lowercase()
        );
        assert_eq!(
            action.payload.outer_signer,
            lead.address().to_string().to_lowercase()
        );
    }

    #[test]
    fn co_signatures_commit_to_the_multi_sig_user() {
        let lead = signer(1);
        let co_signer = signer(2);

        let one = co_sign(
            &co_signer,
            Address::repeat_byte(0xaa),
            lead.address(),
            &inner(),
            NONCE,
            Chain::Testnet,
        )
        .unwrap();
        let other = co_sign(
            &co_signer,
            Address::repeat_byte(0xbb),
            lead.address(),
            &inner(),
            NONCE,
            Chain::Testnet,
        )
        .unwrap();

        assert_ne!(one, other);
    }

    #[test]
    fn envelope_signatures_differ_across_multi_sig_users() {
        let lead = signer(1);
        let co_signers = [signer(2)];

        let request_for = |user: Address| {
            let action = collect_signatures(
                lead.address(),
                user,
                co_signers.iter(),
                inner(),
                NONCE,
                Chain::Testnet,
            )
            .unwrap();
            lead_sign(&lead, action, NONCE, None, None, Chain::Testnet).unwrap()
        };

        let one = request_for(Address::repeat_byte(0xaa));
        let other = request_for(Address::repeat_byte(0xbb));
        assert_ne!(one.signature, other.signature);
    }

    #[test]
    fn envelope_hash_covers_collected_signatures() {
        let lead = signer(1);
        let multi_sig_user = Address::repeat_byte(0xaa);

        let with_one = collect_signatures(
            lead.address(),
            multi_sig_user,
            [signer(2)].iter(),
            inner(),
            NONCE,
            Chain::Testnet,
        )
        .unwrap();
        let with_two = collect_signatures(
            lead.address(),
            multi_sig_user,
            [signer(2), signer(3)].iter(),
            inner(),
            NONCE,
            Chain::Testnet,
        )
        .unwrap();

        assert_ne!(
            rmp_hash(&with_one, NONCE, None, None).unwrap(),
            rmp_hash(&with_two, NONCE, None, None).unwrap()
        );
    }
}
