//! Wire types for exchange actions.
//!
//! Every action is a typed struct whose serde field order **is** the wire
//! order: the msgpack hash in [`crate::hash`] serializes fields exactly as
//! declared, and the venue re-serializes the JSON it receives the same way
//! before verifying the signature. Reordering a field here changes the digest
//! and silently invalidates signatures, so declaration order is part of the
//! contract.

use std::{fmt, str::FromStr};

use alloy::primitives::{Address, B128, B256};
use either::Either;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_with::skip_serializing_none;

use crate::{
    chain::Chain,
    error::{Error, Result},
    num,
};

pub mod solidity;

/// Client order id: an opaque 16-byte value chosen by the caller.
///
/// Textual form is `0x` followed by exactly 32 hex characters; anything else
/// fails validation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cloid(u128);

impl Cloid {
    /// Builds a cloid from its integer value.
    pub fn new(id: u128) -> Self {
        Self(id)
    }

    /// Generates a random cloid.
    pub fn random() -> Self {
        Self(u128::from_be_bytes(B128::random().0))
    }

    /// The fixed-length wire form, `0x` + 32 hex characters.
    pub fn to_raw(&self) -> String {
        format!("{:#034x}", self.0)
    }
}

impl FromStr for Cloid {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let digits = raw
            .strip_prefix("0x")
            .ok_or_else(|| Error::InvalidCloid(raw.to_string()))?;
        if digits.len() != 32 {
            return Err(Error::InvalidCloid(raw.to_string()));
        }
        let bytes: [u8; 16] =
            const_hex::decode_to_array(digits).map_err(|_| Error::InvalidCloid(raw.to_string()))?;
        Ok(Self(u128::from_be_bytes(bytes)))
    }
}

impl fmt::Display for Cloid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl fmt::Debug for Cloid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cloid({})", self.to_raw())
    }
}

impl Serialize for Cloid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cloid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Exchange-assigned order id or client order id, wherever either is accepted.
pub type OidOrCloid = Either<u64, Cloid>;

/// An (r, s, v) signature in the venue's wire form: 32-byte zero-padded hex
/// components and `v = 27 + parity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl From<alloy::primitives::Signature> for Signature {
    fn from(signature: alloy::primitives::Signature) -> Self {
        Self {
            r: signature.r().into(),
            s: signature.s().into(),
            v: 27 + signature.v() as u8,
        }
    }
}

/// Time in force for limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Add liquidity only (post-only).
    Alo,
    /// Immediate or cancel.
    Ioc,
    /// Good till canceled.
    Gtc,
}

/// Take-profit / stop-loss selector for trigger orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TpSl {
    Tp,
    Sl,
}

/// Limit order options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub tif: TimeInForce,
}

/// Trigger order options as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub is_market: bool,
    pub trigger_px: f64,
    pub tpsl: TpSl,
}

/// Order flavor. Exactly one variant exists per order by construction, which
/// retires the "limit and trigger both set" class of invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit(Limit),
    Trigger(Trigger),
}

impl OrderType {
    /// Canonicalizes the order type for the wire; a trigger price that cannot
    /// be formatted faithfully fails here, before anything is signed.
    pub fn encode(&self) -> Result<EncodedOrderType> {
        match self {
            OrderType::Limit(limit) => Ok(EncodedOrderType::Limit(*limit)),
            OrderType::Trigger(trigger) => Ok(EncodedOrderType::Trigger(EncodedTrigger {
                is_market: trigger.is_market,
                trigger_px: num::to_wire(trigger.trigger_px)?,
                tpsl: trigger.tpsl,
            })),
        }
    }
}

/// Trigger options in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTrigger {
    pub is_market: bool,
    pub trigger_px: String,
    pub tpsl: TpSl,
}

/// Order flavor in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodedOrderType {
    Limit(Limit),
    Trigger(EncodedTrigger),
}

/// A single order as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub asset: u32,
    pub is_buy: bool,
    pub limit_px: f64,
    pub sz: f64,
    pub reduce_only: bool,
    pub order_type: OrderType,
    pub cloid: Option<Cloid>,
}

impl OrderRequest {
    /// Maps the order into the fixed wire field set `{a, b, p, s, r, t, c?}`.
    pub fn encode(&self) -> Result<EncodedOrder> {
        Ok(EncodedOrder {
            asset: self.asset,
            is_buy: self.is_buy,
            limit_px: num::to_wire(self.limit_px)?,
            sz: num::to_wire(self.sz)?,
            reduce_only: self.reduce_only,
            order_type: self.order_type.encode()?,
            cloid: self.cloid,
        })
    }
}

/// A single order in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedOrder {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "p")]
    pub limit_px: String,
    #[serde(rename = "s")]
    pub sz: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    #[serde(rename = "t")]
    pub order_type: EncodedOrderType,
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub cloid: Option<Cloid>,
}

/// Grouping mode for a batch of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderGrouping {
    Na,
    NormalTpsl,
    PositionTpsl,
}

/// Builder fee attachment: builder address (lower-cased on the wire) and fee
/// rate in tenths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuilderFee {
    #[serde(rename = "b")]
    pub builder: Address,
    #[serde(rename = "f")]
    pub fee: u64,
}

/// The `order` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOrder {
    pub orders: Vec<EncodedOrder>,
    pub grouping: OrderGrouping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderFee>,
}

impl BatchOrder {
    /// Encodes a batch of caller-side orders into the `order` action.
    pub fn new(
        orders: &[OrderRequest],
        grouping: OrderGrouping,
        builder: Option<BuilderFee>,
    ) -> Result<Self> {
        Ok(Self {
            orders: orders.iter().map(OrderRequest::encode).collect::<Result<_>>()?,
            grouping,
            builder,
        })
    }
}

/// Cancel by exchange order id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelRequest {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "o")]
    pub oid: u64,
}

/// The `cancel` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchCancel {
    pub cancels: Vec<CancelRequest>,
}

/// Cancel by client order id. Unlike [`CancelRequest`] this uses long field
/// names on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CancelByCloidRequest {
    pub asset: u32,
    pub cloid: Cloid,
}

/// The `cancelByCloid` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchCancelCloid {
    pub cancels: Vec<CancelByCloidRequest>,
}

/// A single modification inside `batchModify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifyRequest {
    #[serde(with = "either::serde_untagged")]
    pub oid: OidOrCloid,
    pub order: EncodedOrder,
}

/// The `batchModify` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchModify {
    pub modifies: Vec<ModifyRequest>,
}

/// The `scheduleCancel` (dead man's switch) action. `time` is serialized as
/// `null` when absent; omitting the key changes the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleCancel {
    pub time: Option<u64>,
}

/// The `updateLeverage` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverage {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

/// The `updateIsolatedMargin` action. `ntli` is in micro-dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIsolatedMargin {
    pub asset: u32,
    pub is_buy: bool,
    pub ntli: i64,
}

/// The `vaultTransfer` action. `usd` is in micro-dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTransfer {
    #[serde(serialize_with = "checksummed")]
    pub vault_address: Address,
    pub is_deposit: bool,
    pub usd: u64,
}

/// The `setReferrer` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetReferrer {
    pub code: String,
}

/// The `createSubAccount` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSubAccount {
    pub name: String,
}

/// TWAP parameters for [`TwapOrder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Twap {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "b")]
    pub is_buy: bool,
    #[serde(rename = "s")]
    pub sz: String,
    #[serde(rename = "r")]
    pub reduce_only: bool,
    #[serde(rename = "m")]
    pub minutes: u64,
    #[serde(rename = "t")]
    pub randomize: bool,
}

/// The `twapOrder` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwapOrder {
    pub twap: Twap,
}

/// The `twapCancel` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TwapCancel {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "t")]
    pub twap_id: u64,
}

/// The `reserveRequestWeight` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReserveRequestWeight {
    pub weight: u64,
}

/// The `evmUserModify` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmUserModify {
    pub using_big_blocks: bool,
}

/// The `usdSend` user-signed action (perp USDC transfer).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdSend {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub destination: Address,
    pub amount: Decimal,
    pub time: u64,
}

/// The `spotSend` user-signed action. `token` is `NAME:tokenId`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotSend {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub destination: Address,
    pub token: String,
    pub amount: Decimal,
    pub time: u64,
}

/// The `withdraw3` user-signed action (withdrawal to the signing address).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub destination: Address,
    pub amount: Decimal,
    pub time: u64,
}

/// The `usdClassTransfer` user-signed action (perp <> spot USDC).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdClassTransfer {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub amount: Decimal,
    pub to_perp: bool,
    pub nonce: u64,
}

/// The `sendAsset` user-signed action (cross-DEX and sub-account transfers).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAsset {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub destination: Address,
    pub source_dex: String,
    pub destination_dex: String,
    pub token: String,
    pub amount: Decimal,
    pub from_sub_account: String,
    pub nonce: u64,
}

/// The `cDeposit` user-signed action (stake HYPE). `wei` is 8-decimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CDeposit {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub wei: u64,
    pub nonce: u64,
}

/// The `cWithdraw` user-signed action (unstake HYPE).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CWithdraw {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub wei: u64,
    pub nonce: u64,
}

/// The `tokenDelegate` user-signed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDelegate {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub validator: Address,
    pub wei: u64,
    pub is_undelegate: bool,
    pub nonce: u64,
}

/// The `approveAgent` user-signed action.
///
/// The signature always covers an `agentName` (empty string when unnamed),
/// while the wire action omits the field entirely when it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgent {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    #[serde(serialize_with = "checksummed")]
    pub agent_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub nonce: u64,
}

/// The `approveBuilderFee` user-signed action. `max_fee_rate` is a percentage
/// string such as `"0.100%"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBuilderFee {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub max_fee_rate: String,
    #[serde(serialize_with = "checksummed")]
    pub builder: Address,
    pub nonce: u64,
}

/// The `convertToMultiSigUser` user-signed action. `signers` is the
/// JSON-encoded [`MultiSigSigners`] document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertToMultiSigUser {
    pub signature_chain_id: String,
    pub hyperliquid_chain: Chain,
    pub signers: String,
    pub nonce: u64,
}

/// Authorized signer set for a multi-sig conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSigSigners {
    pub authorized_users: Vec<String>,
    pub threshold: u32,
}

/// Payload of a `multiSig` action: the wrapped inner action plus the
/// addresses involved, both lower-cased on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSigPayload {
    pub multi_sig_user: String,
    pub outer_signer: String,
    pub action: Box<Action>,
}

/// The `multiSig` action: an inner action co-signed by a quorum of signers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSigAction {
    pub signature_chain_id: String,
    pub signatures: Vec<Signature>,
    pub payload: MultiSigPayload,
}

/// A tagged exchange action.
///
/// The serde representation, a `type` tag followed by the variant's fields
/// in declaration order, is the canonical encoding both for the outbound
/// JSON and for the msgpack bytes that get hashed and signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order(BatchOrder),
    Cancel(BatchCancel),
    CancelByCloid(BatchCancelCloid),
    BatchModify(BatchModify),
    ScheduleCancel(ScheduleCancel),
    UpdateLeverage(UpdateLeverage),
    UpdateIsolatedMargin(UpdateIsolatedMargin),
    VaultTransfer(VaultTransfer),
    SetReferrer(SetReferrer),
    CreateSubAccount(CreateSubAccount),
    TwapOrder(TwapOrder),
    TwapCancel(TwapCancel),
    ReserveRequestWeight(ReserveRequestWeight),
    EvmUserModify(EvmUserModify),
    /// Consumes a nonce without any effect.
    Noop,
    UsdSend(UsdSend),
    SpotSend(SpotSend),
    #[serde(rename = "withdraw3")]
    Withdraw(Withdraw),
    UsdClassTransfer(UsdClassTransfer),
    SendAsset(SendAsset),
    CDeposit(CDeposit),
    CWithdraw(CWithdraw),
    TokenDelegate(TokenDelegate),
    ApproveAgent(ApproveAgent),
    ApproveBuilderFee(ApproveBuilderFee),
    ConvertToMultiSigUser(ConvertToMultiSigUser),
    MultiSig(MultiSigAction),
}

/// A signed action ready to be posted to the exchange endpoint.
///
/// Serializes to the outbound payload consumed by the transport:
/// `action`, `nonce`, `signature`, plus `vaultAddress` / `expiresAfter` when
/// present. Constructed per call, never mutated afterwards.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Action,
    pub nonce: u64,
    pub signature: Signature,
    pub vault_address: Option<Address>,
    pub expires_after: Option<u64>,
}

/// Serializes an address in EIP-55 checksummed form, the representation the
/// venue's user-signed schemas hash.
fn checksummed<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloid_round_trips() {
        let cloid: Cloid = "0x00000000000000000000000000c0ffee".parse().unwrap();
        assert_eq!(cloid, Cloid::new(0xc0ffee));
        assert_eq!(cloid.to_raw(), "0x00000000000000000000000000c0ffee");
    }

    #[test]
    fn cloid_rejects_malformed_input() {
        // missing prefix
        assert!(matches!(
            "00000000000000000000000000c0ffee".parse::<Cloid>(),
            Err(Error::InvalidCloid(_))
        ));
        // wrong length
        assert!(matches!(
            "0xc0ffee".parse::<Cloid>(),
            Err(Error::InvalidCloid(_))
        ));
        assert!(matches!(
            "0x00000000000000000000000000c0ffee00".parse::<Cloid>(),
            Err(Error::InvalidCloid(_))
        ));
        // not hex
        assert!(matches!(
            "0x0000000000000000000000000000zzzz".parse::<Cloid>(),
            Err(Error::InvalidCloid(_))
        ));
    }

    #[test]
    fn encodes_order_with_short_keys() {
        let order = OrderRequest {
            asset: 0,
            is_buy: true,
            limit_px: 105000.0,
            sz: 0.0001,
            reduce_only: false,
            order_type: OrderType::Limit(Limit {
                tif: TimeInForce::Ioc,
            }),
            cloid: None,
        };

        let encoded = order.encode().unwrap();
        assert_eq!(
            serde_json::to_string(&encoded).unwrap(),
            r#"{"a":0,"b":true,"p":"105000","s":"0.0001","r":false,"t":{"limit":{"tif":"Ioc"}}}"#
        );
    }

    #[test]
    fn cloid_appears_as_c_key() {
        let order = OrderRequest {
            asset: 3,
            is_buy: false,
            limit_px: 1.5,
            sz: 2.0,
            reduce_only: true,
            order_type: OrderType::Limit(Limit {
                tif: TimeInForce::Gtc,
            }),
            cloid: Some(Cloid::new(1)),
        };

        let value = serde_json::to_value(order.encode().unwrap()).unwrap();
        assert_eq!(value["c"], "0x00000000000000000000000000000001");
    }

    #[test]
    fn trigger_price_is_canonicalized() {
        let order_type = OrderType::Trigger(Trigger {
            is_market: true,
            trigger_px: 1900.50,
            tpsl: TpSl::Sl,
        });

        let encoded = order_type.encode().unwrap();
        assert_eq!(
            serde_json::to_string(&encoded).unwrap(),
            r#"{"trigger":{"isMarket":true,"triggerPx":"1900.5","tpsl":"sl"}}"#
        );
    }

    #[test]
    fn trigger_price_precision_loss_fails_encoding() {
        let order_type = OrderType::Trigger(Trigger {
            is_market: false,
            trigger_px: 123.456789012345,
            tpsl: TpSl::Tp,
        });
        assert!(matches!(
            order_type.encode(),
            Err(Error::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn action_tags_are_camel_case() {
        let cases = [
            (
                Action::ScheduleCancel(ScheduleCancel { time: None }),
                "scheduleCancel",
            ),
            (Action::Noop, "noop"),
            (
                Action::CWithdraw(CWithdraw {
                    signature_chain_id: "0x66eee".into(),
                    hyperliquid_chain: Chain::Mainnet,
                    wei: 1,
                    nonce: 1,
                }),
                "cWithdraw",
            ),
            (
                Action::EvmUserModify(EvmUserModify {
                    using_big_blocks: true,
                }),
                "evmUserModify",
            ),
        ];
        for (action, tag) in cases {
            assert_eq!(serde_json::to_value(&action).unwrap()["type"], tag);
        }
    }

    #[test]
    fn withdraw_uses_versioned_tag() {
        let action = Action::Withdraw(Withdraw {
            signature_chain_id: "0x66eee".into(),
            hyperliquid_chain: Chain::Testnet,
            destination: Address::ZERO,
            amount: Decimal::ONE,
            time: 7,
        });
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "withdraw3");
        assert_eq!(value["hyperliquidChain"], "Testnet");
    }

    #[test]
    fn schedule_cancel_serializes_null_time() {
        assert_eq!(
            serde_json::to_string(&Action::ScheduleCancel(ScheduleCancel { time: None })).unwrap(),
            r#"{"type":"scheduleCancel","time":null}"#
        );
    }

    #[test]
    fn grouping_wire_values() {
        assert_eq!(serde_json::to_value(OrderGrouping::Na).unwrap(), "na");
        assert_eq!(
            serde_json::to_value(OrderGrouping::NormalTpsl).unwrap(),
            "normalTpsl"
        );
        assert_eq!(
            serde_json::to_value(OrderGrouping::PositionTpsl).unwrap(),
            "positionTpsl"
        );
    }

    #[test]
    fn builder_fee_serializes_lowercase_address() {
        let builder = BuilderFee {
            builder: "0x0D1d9635D0640821d15e323ac8AdADfA9c111414"
                .parse()
                .unwrap(),
            fee: 10,
        };
        assert_eq!(
            serde_json::to_string(&builder).unwrap(),
            r#"{"b":"0x0d1d9635d0640821d15e323ac8adadfa9c111414","f":10}"#
        );
    }

    #[test]
    fn modify_accepts_oid_or_cloid() {
        let order = OrderRequest {
            asset: 1,
            is_buy: true,
            limit_px: 10.0,
            sz: 1.0,
            reduce_only: false,
            order_type: OrderType::Limit(Limit {
                tif: TimeInForce::Alo,
            }),
            cloid: None,
        };
        let by_oid = ModifyRequest {
            oid: Either::Left(42),
            order: order.encode().unwrap(),
        };
        let by_cloid = ModifyRequest {
            oid: Either::Right(Cloid::new(2)),
            order: order.encode().unwrap(),
        };

        assert_eq!(serde_json::to_value(&by_oid).unwrap()["oid"], 42);
        assert_eq!(
            serde_json::to_value(&by_cloid).unwrap()["oid"],
            "0x00000000000000000000000000000002"
        );
    }
}
