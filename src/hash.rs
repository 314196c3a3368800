//! Deterministic action hashing.
//!
//! An action digest (the Agent `connectionId`) is the Keccak-256 of:
//!
//! ```text
//! msgpack(action) || nonce:u64be || (0x00 | 0x01 ‖ vault:20B) || [0x00 || expires:u64be]
//! ```
//!
//! The msgpack encoding uses string keys in struct declaration order
//! (`rmp_serde::to_vec_named`), which the venue reproduces when it verifies
//! the signature. The lone `0x00` before the expiry is required by the
//! venue's deserializer.

use alloy::primitives::{Address, B256, keccak256};
use serde::Serialize;

use crate::{error::Result, types::Action};

/// Hashes any serializable value with the signing context appended.
///
/// Exposed beyond [`Action::hash`] because multi-sig co-signing hashes a
/// `[user, outerSigner, action]` triple rather than a bare action.
pub fn rmp_hash<T: Serialize>(
    value: &T,
    nonce: u64,
    vault_address: Option<Address>,
    expires_after: Option<u64>,
) -> Result<B256> {
    let mut bytes = rmp_serde::to_vec_named(value)?;
    bytes.extend_from_slice(&nonce.to_be_bytes());

    match vault_address {
        Some(vault) => {
            bytes.push(1);
            bytes.extend_from_slice(vault.as_slice());
        }
        None => bytes.push(0),
    }

    if let Some(expires_after) = expires_after {
        bytes.push(0);
        bytes.extend_from_slice(&expires_after.to_be_bytes());
    }

    Ok(keccak256(bytes))
}

impl Action {
    /// Computes the digest signed by the Agent wrapper.
    ///
    /// Identical inputs, including field order, always produce the identical
    /// digest; changing the vault presence or the expiry changes it.
    pub fn hash(
        &self,
        nonce: u64,
        vault_address: Option<Address>,
        expires_after: Option<u64>,
    ) -> Result<B256> {
        rmp_hash(self, nonce, vault_address, expires_after)
    }
}
