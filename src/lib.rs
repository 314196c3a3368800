//! # hypersign
//!
//! Action signing and request encoding for the Hyperliquid exchange.
//!
//! Every state-changing request to Hyperliquid carries an off-chain EIP-712
//! signature over a deterministic encoding of the action. This crate is that
//! pipeline, and nothing else: no HTTP, no WebSocket, no market metadata.
//! It turns structured actions into signed [`types::ActionRequest`] payloads
//! that any transport can post to the `/exchange` endpoint.
//!
//! ## Pipeline
//!
//! - [`num`]: canonical decimal strings for prices, sizes and amounts, with
//!   precision-loss detection instead of silent rounding.
//! - [`types`]: the action catalogue. Serde field order is the wire order.
//! - [`hash`]: deterministic msgpack + Keccak-256 action digests.
//! - [`signing`]: the two signature paths (hash-wrapped Agent actions and
//!   user-signed transfers/approvals) and the dispatch between them.
//! - [`multisig`]: co-signature collection and the multi-sig envelope.
//! - [`exchange`]: a convenience facade assembling complete signed requests.
//!
//! All of it is synchronous, side-effect free and safe to call concurrently;
//! nonce uniqueness is the only cross-call concern, owned by
//! [`nonce::NonceSource`].
//!
//! ## Placing an order
//!
//! ```no_run
//! use hypersign::{Chain, Exchange, PrivateKeySigner};
//! use hypersign::types::{Limit, OrderGrouping, OrderRequest, OrderType, TimeInForce};
//!
//! # fn main() -> Result<(), hypersign::Error> {
//! let signer: PrivateKeySigner = "0x...".parse().expect("private key");
//! let mut exchange = Exchange::new(signer, Chain::Mainnet);
//!
//! let request = exchange.place_orders(
//!     &[OrderRequest {
//!         asset: 0,
//!         is_buy: true,
//!         limit_px: 87_000.0,
//!         sz: 0.01,
//!         reduce_only: false,
//!         order_type: OrderType::Limit(Limit { tif: TimeInForce::Alo }),
//!         cloid: None,
//!     }],
//!     OrderGrouping::Na,
//!     None,
//! )?;
//!
//! // hand `serde_json::to_string(&request)?` to your transport
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod error;
pub mod exchange;
pub mod hash;
pub mod multisig;
pub mod nonce;
pub mod num;
pub mod signing;
pub mod types;

pub use chain::{Chain, SIGNATURE_CHAIN_ID};
pub use error::Error;
pub use exchange::Exchange;

/// Re-exported Ethereum primitives from Alloy.
///
/// Used throughout the crate for account, vault and builder addresses and
/// for 32-byte digests.
pub use alloy::primitives::{Address, B256, address};
/// Re-exported local signer from Alloy.
pub use alloy::signers::local::PrivateKeySigner;
/// Re-exported decimal type from rust_decimal.
///
/// Used for transfer and staking amounts.
pub use rust_decimal::Decimal;
