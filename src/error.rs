//! Error taxonomy for the signing pipeline.
//!
//! Every failure aborts before a signature is produced: the crate never signs
//! a payload it could not faithfully canonicalize.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors surfaced by encoding, hashing and signing.
#[derive(Debug, Error)]
pub enum Error {
    /// Canonical formatting would alter the value beyond tolerance.
    #[error("value {value} cannot be encoded without precision loss")]
    PrecisionLoss {
        /// The offending input, rendered as supplied.
        value: String,
    },

    /// The value does not fit the wire decimal range.
    #[error("value {value} is out of range for wire encoding")]
    Overflow { value: f64 },

    /// Client order ids are `0x` followed by exactly 32 hex characters.
    #[error("invalid client order id {0:?}, expected 0x followed by 32 hex characters")]
    InvalidCloid(String),

    /// `signatureChainId` values are `0x`-prefixed hex chain ids.
    #[error("invalid signature chain id {0:?}")]
    InvalidChainId(String),

    /// The operation requires the signer to hold the key of the acted-for
    /// account, not merely agent authority over it.
    #[error("signing key for account {address} is required for this action")]
    SigningKeyRequired { address: Address },

    /// Canonical msgpack serialization of an action failed.
    #[error("action serialization failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Typed-data construction failed for a user-signed action.
    #[error("typed data construction failed: {0}")]
    TypedData(#[from] serde_json::Error),

    /// The signer rejected the payload.
    #[error("signing failed: {0}")]
    Signer(#[from] alloy::signers::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
