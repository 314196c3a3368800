//! Solidity struct definitions for EIP-712 signing.
//!
//! Only the L1 `Agent` wrapper has a static Solidity shape. User-signed
//! actions use primary types such as `HyperliquidTransaction:UsdSend`, which
//! are not valid Solidity identifiers; their schemas are built dynamically in
//! [`crate::signing`].

use alloy::sol;

sol! {
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}
