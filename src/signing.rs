//! Signature construction for exchange actions.
//!
//! The venue authenticates actions through two distinct EIP-712 paths:
//!
//! - **Agent (L1) signing** for trading actions (orders, cancels, leverage,
//!   margin, TWAPs, ...): the action is msgpack-hashed with its signing
//!   context ([`crate::hash`]) and the resulting digest is signed as the
//!   `connectionId` of a fixed `Agent { source, connectionId }` struct under
//!   the `Exchange` domain. Mainnet and testnet differ only in `source`.
//!
//! - **User-signed actions** for transfers, staking, delegation and
//!   approvals: the action's own fields are the typed-data message, signed
//!   under the `HyperliquidSignTransaction` domain with a per-action primary
//!   type such as `HyperliquidTransaction:UsdSend`. These must be signed by
//!   the account owner itself, never by an agent key.
//!
//! [`sign_action`] dispatches between the two (and the multi-sig envelope)
//! based on the action variant.

use alloy::{
    dyn_abi::{Resolver, TypedData},
    primitives::{Address, B256},
    signers::SignerSync,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    chain::{self, Chain},
    error::Result,
    types::{
        Action, ActionRequest, ApproveAgent, ApproveBuilderFee, CDeposit, CWithdraw,
        ConvertToMultiSigUser, SendAsset, Signature, SpotSend, TokenDelegate, UsdClassTransfer,
        UsdSend, Withdraw, solidity,
    },
};

/// A `(name, solidity type)` pair in a user-signed schema.
pub type FieldDef = (&'static str, &'static str);

pub(crate) const USD_SEND_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("destination", "string"),
    ("amount", "string"),
    ("time", "uint64"),
];

pub(crate) const SPOT_SEND_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("destination", "string"),
    ("token", "string"),
    ("amount", "string"),
    ("time", "uint64"),
];

pub(crate) const WITHDRAW_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("destination", "string"),
    ("amount", "string"),
    ("time", "uint64"),
];

pub(crate) const USD_CLASS_TRANSFER_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("amount", "string"),
    ("toPerp", "bool"),
    ("nonce", "uint64"),
];

pub(crate) const SEND_ASSET_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("destination", "string"),
    ("sourceDex", "string"),
    ("destinationDex", "string"),
    ("token", "string"),
    ("amount", "string"),
    ("fromSubAccount", "string"),
    ("nonce", "uint64"),
];

pub(crate) const STAKING_TRANSFER_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("wei", "uint64"),
    ("nonce", "uint64"),
];

pub(crate) const TOKEN_DELEGATE_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("validator", "address"),
    ("wei", "uint64"),
    ("isUndelegate", "bool"),
    ("nonce", "uint64"),
];

pub(crate) const APPROVE_AGENT_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("agentAddress", "address"),
    ("agentName", "string"),
    ("nonce", "uint64"),
];

pub(crate) const APPROVE_BUILDER_FEE_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("maxFeeRate", "string"),
    ("builder", "address"),
    ("nonce", "uint64"),
];

pub(crate) const CONVERT_TO_MULTI_SIG_USER_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("signers", "string"),
    ("nonce", "uint64"),
];

pub(crate) const SEND_MULTI_SIG_SIGN_TYPES: &[FieldDef] = &[
    ("hyperliquidChain", "string"),
    ("multiSigActionHash", "bytes32"),
    ("nonce", "uint64"),
];

/// An action signed directly over its own fields rather than over a hash.
///
/// The typed-data message is the serialized action; fields outside the
/// schema (notably `signatureChainId`, which parameterizes the domain
/// instead) are ignored by the encoder. Because actions are fully typed, a
/// partially-populated message is unrepresentable; schema mismatches that
/// survive construction still fail inside the encoder before any signature
/// is produced.
pub trait UserSignedAction: Serialize {
    /// EIP-712 primary type, e.g. `HyperliquidTransaction:UsdSend`.
    const PRIMARY_TYPE: &'static str;
    /// Ordered field schema of the primary type.
    const SIGN_TYPES: &'static [FieldDef];

    /// The typed-data message. The default is the serialized action.
    fn message(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Builds the complete typed-data structure: domain, schema and message.
    fn typed_data(&self) -> Result<TypedData> {
        user_signed_typed_data(Self::PRIMARY_TYPE, Self::SIGN_TYPES, self.message()?)
    }
}

impl UserSignedAction for UsdSend {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:UsdSend";
    const SIGN_TYPES: &'static [FieldDef] = USD_SEND_SIGN_TYPES;
}

impl UserSignedAction for SpotSend {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:SpotSend";
    const SIGN_TYPES: &'static [FieldDef] = SPOT_SEND_SIGN_TYPES;
}

impl UserSignedAction for Withdraw {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:Withdraw";
    const SIGN_TYPES: &'static [FieldDef] = WITHDRAW_SIGN_TYPES;
}

impl UserSignedAction for UsdClassTransfer {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:UsdClassTransfer";
    const SIGN_TYPES: &'static [FieldDef] = USD_CLASS_TRANSFER_SIGN_TYPES;
}

impl UserSignedAction for SendAsset {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:SendAsset";
    const SIGN_TYPES: &'static [FieldDef] = SEND_ASSET_SIGN_TYPES;
}

impl UserSignedAction for CDeposit {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:CDeposit";
    const SIGN_TYPES: &'static [FieldDef] = STAKING_TRANSFER_SIGN_TYPES;
}

impl UserSignedAction for CWithdraw {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:CWithdraw";
    const SIGN_TYPES: &'static [FieldDef] = STAKING_TRANSFER_SIGN_TYPES;
}

impl UserSignedAction for TokenDelegate {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:TokenDelegate";
    const SIGN_TYPES: &'static [FieldDef] = TOKEN_DELEGATE_SIGN_TYPES;
}

impl UserSignedAction for ApproveAgent {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:ApproveAgent";
    const SIGN_TYPES: &'static [FieldDef] = APPROVE_AGENT_SIGN_TYPES;

    /// The signature covers an empty `agentName` when none was given, even
    /// though the wire action omits the field.
    fn message(&self) -> Result<Value> {
        let mut message = serde_json::to_value(self)?;
        let fields = message
            .as_object_mut()
            .expect("action serializes to an object");
        fields
            .entry("agentName")
            .or_insert_with(|| Value::String(String::new()));
        Ok(message)
    }
}

impl UserSignedAction for ApproveBuilderFee {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:ApproveBuilderFee";
    const SIGN_TYPES: &'static [FieldDef] = APPROVE_BUILDER_FEE_SIGN_TYPES;
}

impl UserSignedAction for ConvertToMultiSigUser {
    const PRIMARY_TYPE: &'static str = "HyperliquidTransaction:ConvertToMultiSigUser";
    const SIGN_TYPES: &'static [FieldDef] = CONVERT_TO_MULTI_SIG_USER_SIGN_TYPES;
}

/// Builds the typed-data structure for a user-signed message: the
/// `HyperliquidSignTransaction` domain (chain id taken from the message's
/// `signatureChainId`), the per-action schema, and the message itself.
pub(crate) fn user_signed_typed_data(
    primary_type: &'static str,
    fields: &[FieldDef],
    message: Value,
) -> Result<TypedData> {
    let raw_chain_id = message
        .get("signatureChainId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let chain_id = chain::parse_chain_id(raw_chain_id)?;

    Ok(TypedData {
        domain: chain::user_signed_domain(chain_id),
        resolver: schema_resolver(primary_type, fields)?,
        primary_type: primary_type.to_string(),
        message,
    })
}

/// Materializes a schema table as a typed-data resolver.
fn schema_resolver(primary_type: &str, fields: &[FieldDef]) -> Result<Resolver> {
    let properties: Vec<Value> = fields
        .iter()
        .map(|(name, kind)| json!({ "name": name, "type": kind }))
        .collect();
    Ok(serde_json::from_value(json!({ primary_type: properties }))?)
}

/// Signs an action digest as an L1 Agent message.
pub fn sign_l1_action<S: SignerSync>(
    signer: &S,
    chain: Chain,
    connection_id: B256,
) -> Result<Signature> {
    let signature = signer.sign_typed_data_sync(
        &solidity::Agent {
            source: chain.agent_source().to_string(),
            connectionId: connection_id,
        },
        &chain::agent_domain(),
    )?;
    Ok(signature.into())
}

/// Signs a dynamic typed-data structure.
pub(crate) fn sign_typed<S: SignerSync>(signer: &S, typed_data: &TypedData) -> Result<Signature> {
    let signature = signer.sign_dynamic_typed_data_sync(typed_data)?;
    Ok(signature.into())
}

impl Action {
    /// Typed data for user-signed variants, `None` for hash-signed ones.
    pub(crate) fn user_typed_data(&self) -> Option<Result<TypedData>> {
        match self {
            Action::UsdSend(action) => Some(action.typed_data()),
            Action::SpotSend(action) => Some(action.typed_data()),
            Action::Withdraw(action) => Some(action.typed_data()),
            Action::UsdClassTransfer(action) => Some(action.typed_data()),
            Action::SendAsset(action) => Some(action.typed_data()),
            Action::CDeposit(action) => Some(action.typed_data()),
            Action::CWithdraw(action) => Some(action.typed_data()),
            Action::TokenDelegate(action) => Some(action.typed_data()),
            Action::ApproveAgent(action) => Some(action.typed_data()),
            Action::ApproveBuilderFee(action) => Some(action.typed_data()),
            Action::ConvertToMultiSigUser(action) => Some(action.typed_data()),
            _ => None,
        }
    }
}

/// Signs an action and assembles the outbound request.
///
/// User-signed actions never carry vault or expiry context; hash-signed
/// actions fold both into the digest and echo them in the request.
pub fn sign_action<S: SignerSync>(
    signer: &S,
    action: Action,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<DateTime<Utc>>,
    chain: Chain,
) -> Result<ActionRequest> {
    let expires_after = expires_after.map(|at| at.timestamp_millis() as u64);

    let action = match action {
        Action::MultiSig(multi_sig) => {
            return crate::multisig::lead_sign(
                signer,
                multi_sig,
                nonce,
                vault_address,
                expires_after,
                chain,
            );
        }
        action => action,
    };

    match action.user_typed_data() {
        Some(typed_data) => {
            let signature = sign_typed(signer, &typed_data?)?;
            Ok(ActionRequest {
                action,
                nonce,
                signature,
                vault_address: None,
                expires_after: None,
            })
        }
        None => {
            let connection_id = action.hash(nonce, vault_address, expires_after)?;
            let signature = sign_l1_action(signer, chain, connection_id)?;
            Ok(ActionRequest {
                action,
                nonce,
                signature,
                vault_address,
                expires_after,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::U256,
        signers::local::PrivateKeySigner,
        sol_types::SolStruct,
    };
    use hex_literal::hex;
    use rust_decimal::Decimal;

    use super::*;
    use crate::chain::ARBITRUM_MAINNET_CHAIN_ID;

    fn get_signer() -> PrivateKeySigner {
        let priv_key = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
        priv_key.parse::<PrivateKeySigner>().unwrap()
    }

    fn usd_send() -> UsdSend {
        UsdSend {
            signature_chain_id: ARBITRUM_MAINNET_CHAIN_ID.into(),
            hyperliquid_chain: Chain::Mainnet,
            destination: "0x0D1d9635D0640821d15e323ac8AdADfA9c111414"
                .parse()
                .unwrap(),
            amount: Decimal::ONE,
            time: 1690393044548,
        }
    }

    #[test]
    fn test_sign_usd_transfer_action() {
        let signer = get_signer();
        let typed_data = usd_send().typed_data().unwrap();
        let signature = sign_typed(&signer, &typed_data).unwrap();

        assert_eq!(
            signature.r,
            B256::new(hex!(
                "eca6267bcaadc4c0ae1aed73f5a2c45fcdbb7271f2e9356992404e5d4bad75a3"
            ))
        );
        assert_eq!(
            signature.s,
            B256::new(hex!(
                "572e08fe93f17755abadb7f84be7d1e9c4ce48bb5633e339bc430c672d5a20ed"
            ))
        );
        assert_eq!(signature.v, 27);
    }

    #[test]
    fn user_signed_typed_data_shape() {
        let typed_data = usd_send().typed_data().unwrap();
        assert_eq!(typed_data.primary_type, "HyperliquidTransaction:UsdSend");
        assert_eq!(typed_data.domain.chain_id, Some(U256::from(42161u64)));
        assert_eq!(
            typed_data.domain.name.as_deref(),
            Some("HyperliquidSignTransaction")
        );
        assert_eq!(typed_data.message["amount"], "1");
        assert_eq!(
            typed_data.message["destination"],
            "0x0D1d9635D0640821d15e323ac8AdADfA9c111414"
        );
    }

    #[test]
    fn agent_signature_recovers_to_signer() {
        let signer = get_signer();
        let connection_id = B256::repeat_byte(7);
        let signature = sign_l1_action(&signer, Chain::Mainnet, connection_id).unwrap();

        let agent = solidity::Agent {
            source: "a".to_string(),
            connectionId: connection_id,
        };
        let prehash = agent.eip712_signing_hash(&chain::agent_domain());
        let recovered = alloy::primitives::Signature::from_scalars_and_parity(
            signature.r,
            signature.s,
            signature.v == 28,
        )
        .recover_address_from_prehash(&prehash)
        .unwrap();

        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn agent_source_distinguishes_networks() {
        let signer = get_signer();
        let connection_id = B256::repeat_byte(1);
        let mainnet = sign_l1_action(&signer, Chain::Mainnet, connection_id).unwrap();
        let testnet = sign_l1_action(&signer, Chain::Testnet, connection_id).unwrap();
        assert_ne!(mainnet, testnet);
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = get_signer();
        let connection_id = B256::repeat_byte(9);
        assert_eq!(
            sign_l1_action(&signer, Chain::Mainnet, connection_id).unwrap(),
            sign_l1_action(&signer, Chain::Mainnet, connection_id).unwrap()
        );
    }

    #[test]
    fn approve_agent_signs_empty_name() {
        let action = ApproveAgent {
            signature_chain_id: "0x66eee".into(),
            hyperliquid_chain: Chain::Testnet,
            agent_address: Address::repeat_byte(2),
            agent_name: None,
            nonce: 1,
        };

        // signed message carries the empty name, the wire action omits it
        let message = action.message().unwrap();
        assert_eq!(message["agentName"], "");
        let wire = serde_json::to_value(&action).unwrap();
        assert!(wire.get("agentName").is_none());

        // and the typed data still signs + recovers cleanly
        let signer = get_signer();
        let typed_data = action.typed_data().unwrap();
        let signature = sign_typed(&signer, &typed_data).unwrap();
        let prehash = typed_data.eip712_signing_hash().unwrap();
        let recovered = alloy::primitives::Signature::from_scalars_and_parity(
            signature.r,
            signature.s,
            signature.v == 28,
        )
        .recover_address_from_prehash(&prehash)
        .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn user_signed_action_drops_vault_context() {
        let signer = get_signer();
        let request = sign_action(
            &signer,
            Action::UsdSend(usd_send()),
            1690393044548,
            Some(Address::repeat_byte(3)),
            None,
            Chain::Mainnet,
        )
        .unwrap();
        assert_eq!(request.vault_address, None);
        assert_eq!(request.expires_after, None);
    }

    #[test]
    fn hash_signed_action_keeps_vault_context() {
        let signer = get_signer();
        let vault = Address::repeat_byte(3);
        let request = sign_action(
            &signer,
            Action::Noop,
            1,
            Some(vault),
            None,
            Chain::Mainnet,
        )
        .unwrap();
        assert_eq!(request.vault_address, Some(vault));
    }
}
