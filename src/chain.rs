//! Chain selection and EIP-712 domains.
//!
//! Hyperliquid signs two kinds of payloads with two distinct domains:
//!
//! - L1 (Agent) actions use a fixed domain with `chainId` 1337 and the zero
//!   verifying contract, regardless of network. Mainnet and testnet are
//!   distinguished by the Agent `source` field (`"a"` / `"b"`).
//! - User-signed actions use the `HyperliquidSignTransaction` domain whose
//!   `chainId` is taken from the action's `signatureChainId` field.

use alloy::{
    dyn_abi::Eip712Domain,
    primitives::{Address, U256},
    sol_types::eip712_domain,
};

use crate::error::{Error, Result};

/// Default `signatureChainId` for user-signed actions (Arbitrum Sepolia).
///
/// The venue accepts any chain id here as long as the signature was produced
/// over the same value; this constant mirrors what the frontend uses.
pub const SIGNATURE_CHAIN_ID: &str = "0x66eee";

/// Arbitrum One chain id, as a `signatureChainId` value.
pub const ARBITRUM_MAINNET_CHAIN_ID: &str = "0xa4b1";

/// Network selector.
///
/// Serializes to the `hyperliquidChain` wire values `"Mainnet"` / `"Testnet"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Chain {
    Mainnet,
    Testnet,
}

impl Chain {
    /// Returns true for [`Chain::Mainnet`].
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Chain::Mainnet)
    }

    /// The `source` field of the Agent signing wrapper.
    pub fn agent_source(&self) -> &'static str {
        if self.is_mainnet() { "a" } else { "b" }
    }
}

/// Domain for L1 (Agent) action signatures.
pub(crate) fn agent_domain() -> Eip712Domain {
    eip712_domain! {
        name: "Exchange",
        version: "1",
        chain_id: 1337,
        verifying_contract: Address::ZERO,
    }
}

/// Domain for user-signed actions, parameterized by the action's
/// `signatureChainId`.
pub(crate) fn user_signed_domain(chain_id: u64) -> Eip712Domain {
    Eip712Domain::new(
        Some("HyperliquidSignTransaction".into()),
        Some("1".into()),
        Some(U256::from(chain_id)),
        Some(Address::ZERO),
        None,
    )
}

/// Parses a `signatureChainId` value such as `"0x66eee"`.
pub(crate) fn parse_chain_id(raw: &str) -> Result<u64> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidChainId(raw.to_string()))?;
    u64::from_str_radix(digits, 16).map_err(|_| Error::InvalidChainId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_wire_values() {
        assert_eq!(Chain::Mainnet.to_string(), "Mainnet");
        assert_eq!(serde_json::to_value(Chain::Testnet).unwrap(), "Testnet");
        assert_eq!(Chain::Mainnet.agent_source(), "a");
        assert_eq!(Chain::Testnet.agent_source(), "b");
    }

    #[test]
    fn parses_signature_chain_ids() {
        assert_eq!(parse_chain_id(SIGNATURE_CHAIN_ID).unwrap(), 0x66eee);
        assert_eq!(parse_chain_id(ARBITRUM_MAINNET_CHAIN_ID).unwrap(), 42161);
        assert!(parse_chain_id("66eee").is_err());
        assert!(parse_chain_id("0xzz").is_err());
    }
}
