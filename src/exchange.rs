//! Request assembly: one method per exchange action.
//!
//! [`Exchange`] owns no transport. Every method draws a nonce, signs, and
//! returns the finished [`ActionRequest`]; serializing that request with
//! `serde_json` yields exactly the payload the `/exchange` endpoint expects.

use alloy::{
    primitives::Address,
    signers::{Signer, SignerSync},
};
use chrono::{DateTime, Utc};
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    chain::{Chain, SIGNATURE_CHAIN_ID},
    error::{Error, Result},
    nonce::{NonceSource, WallClock},
    num,
    signing::sign_action,
    types::{
        Action, ActionRequest, ApproveAgent, ApproveBuilderFee, BatchCancel, BatchCancelCloid,
        BatchModify, BatchOrder, BuilderFee, CDeposit, CWithdraw, CancelByCloidRequest,
        CancelRequest, ConvertToMultiSigUser, CreateSubAccount, EvmUserModify, ModifyRequest,
        MultiSigSigners, OidOrCloid, OrderGrouping, OrderRequest, ReserveRequestWeight,
        ScheduleCancel, SendAsset, SetReferrer, Signature, SpotSend, TokenDelegate, Twap,
        TwapCancel, TwapOrder, UpdateIsolatedMargin, UpdateLeverage, UsdClassTransfer, UsdSend,
        VaultTransfer, Withdraw,
    },
};

/// USD amounts are wired in micro-dollars.
const USD_FACTOR: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// HYPE staking amounts are wired in 8-decimal wei.
const HYPE_FACTOR: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Builds and signs exchange requests for one account.
///
/// The signer may be the account's own key or an approved agent key acting
/// for `address`. Agent keys can submit trading actions but not user-signed
/// ones; those check [`Exchange::require_signing_key`] and fail with
/// [`Error::SigningKeyRequired`] when the signer does not hold the account's
/// key itself.
pub struct Exchange<S, N = WallClock> {
    signer: S,
    address: Address,
    chain: Chain,
    vault_address: Option<Address>,
    expires_after: Option<DateTime<Utc>>,
    nonces: N,
}

impl<S: Signer> Exchange<S, WallClock> {
    /// An exchange for the signer's own account.
    pub fn new(signer: S, chain: Chain) -> Self {
        let address = signer.address();
        Self::for_account(signer, address, chain)
    }

    /// An exchange where `signer` is an agent key acting for `address`.
    pub fn for_account(signer: S, address: Address, chain: Chain) -> Self {
        Self {
            signer,
            address,
            chain,
            vault_address: None,
            expires_after: None,
            nonces: WallClock,
        }
    }
}

impl<S, N> Exchange<S, N> {
    /// Routes subsequent trading actions through a vault or sub-account.
    pub fn with_vault(mut self, vault_address: Address) -> Self {
        self.vault_address = Some(vault_address);
        self
    }

    /// Asks the venue to reject subsequent actions after `expires_after`.
    pub fn with_expires_after(mut self, expires_after: DateTime<Utc>) -> Self {
        self.expires_after = Some(expires_after);
        self
    }

    /// Replaces the nonce source, e.g. with [`crate::nonce::Monotonic`] or a
    /// fixed source in tests.
    pub fn with_nonce_source<M: NonceSource>(self, nonces: M) -> Exchange<S, M> {
        Exchange {
            signer: self.signer,
            address: self.address,
            chain: self.chain,
            vault_address: self.vault_address,
            expires_after: self.expires_after,
            nonces,
        }
    }

    /// The account actions are signed for.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl<S: SignerSync + Signer, N: NonceSource> Exchange<S, N> {
    /// Checks that the signer holds the key of the acted-for account, not
    /// merely agent authority over it.
    pub fn require_signing_key(&self) -> Result<()> {
        if self.signer.address() != self.address {
            return Err(Error::SigningKeyRequired {
                address: self.address,
            });
        }
        Ok(())
    }

    fn post(&mut self, action: Action) -> Result<ActionRequest> {
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(action, nonce)
    }

    fn post_with_nonce(&mut self, action: Action, nonce: u64) -> Result<ActionRequest> {
        let request = sign_action(
            &self.signer,
            action,
            nonce,
            self.vault_address,
            self.expires_after,
            self.chain,
        )?;
        debug!("signed action request: {request:?}");
        Ok(request)
    }

    /// Places a batch of orders.
    pub fn place_orders(
        &mut self,
        orders: &[OrderRequest],
        grouping: OrderGrouping,
        builder: Option<BuilderFee>,
    ) -> Result<ActionRequest> {
        let batch = BatchOrder::new(orders, grouping, builder)?;
        self.post(Action::Order(batch))
    }

    /// Cancels orders by exchange order id.
    pub fn cancel_orders(&mut self, cancels: Vec<CancelRequest>) -> Result<ActionRequest> {
        self.post(Action::Cancel(BatchCancel { cancels }))
    }

    /// Cancels orders by client order id.
    pub fn cancel_orders_by_cloid(
        &mut self,
        cancels: Vec<CancelByCloidRequest>,
    ) -> Result<ActionRequest> {
        self.post(Action::CancelByCloid(BatchCancelCloid { cancels }))
    }

    /// Modifies resting orders in place.
    pub fn modify_orders(
        &mut self,
        modifies: Vec<(OidOrCloid, OrderRequest)>,
    ) -> Result<ActionRequest> {
        let modifies = modifies
            .into_iter()
            .map(|(oid, order)| {
                Ok(ModifyRequest {
                    oid,
                    order: order.encode()?,
                })
            })
            .collect::<Result<_>>()?;
        self.post(Action::BatchModify(BatchModify { modifies }))
    }

    /// Arms (or, with `None`, disarms) the dead man's switch.
    pub fn schedule_cancel(&mut self, time: Option<DateTime<Utc>>) -> Result<ActionRequest> {
        self.post(Action::ScheduleCancel(ScheduleCancel {
            time: time.map(|at| at.timestamp_millis() as u64),
        }))
    }

    /// Sets leverage for an asset.
    pub fn update_leverage(
        &mut self,
        asset: u32,
        leverage: u32,
        is_cross: bool,
    ) -> Result<ActionRequest> {
        self.post(Action::UpdateLeverage(UpdateLeverage {
            asset,
            is_cross,
            leverage,
        }))
    }

    /// Adds or removes isolated margin. `usd` must be representable in whole
    /// micro-dollars.
    pub fn update_isolated_margin(&mut self, asset: u32, usd: Decimal) -> Result<ActionRequest> {
        let scaled = usd * USD_FACTOR;
        if scaled.fract().abs() >= Decimal::new(1, 3) {
            return Err(Error::PrecisionLoss {
                value: usd.to_string(),
            });
        }
        let ntli = scaled.floor().to_i64().ok_or(Error::Overflow {
            value: usd.to_f64().unwrap_or(f64::NAN),
        })?;
        self.post(Action::UpdateIsolatedMargin(UpdateIsolatedMargin {
            asset,
            is_buy: true,
            ntli,
        }))
    }

    /// Deposits to or withdraws from a vault.
    pub fn vault_transfer(
        &mut self,
        vault_address: Address,
        amount: Decimal,
        is_deposit: bool,
    ) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let usd = to_scaled_u64(amount, USD_FACTOR)?;
        self.post(Action::VaultTransfer(VaultTransfer {
            vault_address,
            is_deposit,
            usd,
        }))
    }

    /// Sets a referral code.
    pub fn set_referrer(&mut self, code: String) -> Result<ActionRequest> {
        self.post(Action::SetReferrer(SetReferrer { code }))
    }

    /// Creates a named sub-account.
    pub fn create_sub_account(&mut self, name: String) -> Result<ActionRequest> {
        self.require_signing_key()?;
        self.post(Action::CreateSubAccount(CreateSubAccount { name }))
    }

    /// Starts a TWAP order.
    pub fn twap_order(
        &mut self,
        asset: u32,
        is_buy: bool,
        sz: f64,
        minutes: u64,
        reduce_only: bool,
        randomize: bool,
    ) -> Result<ActionRequest> {
        self.post(Action::TwapOrder(TwapOrder {
            twap: Twap {
                asset,
                is_buy,
                sz: num::to_wire(sz)?,
                reduce_only,
                minutes,
                randomize,
            },
        }))
    }

    /// Cancels a running TWAP order.
    pub fn twap_cancel(&mut self, asset: u32, twap_id: u64) -> Result<ActionRequest> {
        self.post(Action::TwapCancel(TwapCancel { asset, twap_id }))
    }

    /// Reserves additional request weight against the rate limiter.
    pub fn reserve_request_weight(&mut self, weight: u64) -> Result<ActionRequest> {
        self.post(Action::ReserveRequestWeight(ReserveRequestWeight { weight }))
    }

    /// Toggles big blocks for HyperEVM transactions.
    pub fn evm_user_modify(&mut self, using_big_blocks: bool) -> Result<ActionRequest> {
        self.post(Action::EvmUserModify(EvmUserModify { using_big_blocks }))
    }

    /// Consumes a nonce without any other effect.
    pub fn noop(&mut self) -> Result<ActionRequest> {
        self.post(Action::Noop)
    }

    /// Sends perp USDC to another address. Amounts are rounded to cents.
    pub fn usd_send(&mut self, destination: Address, amount: Decimal) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::UsdSend(UsdSend {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                destination,
                amount: round_usd(amount),
                time: nonce,
            }),
            nonce,
        )
    }

    /// Sends a spot token. `token` is `NAME:tokenId` and `amount` must
    /// already respect the token's wei decimals.
    pub fn spot_send(
        &mut self,
        destination: Address,
        token: String,
        amount: Decimal,
    ) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::SpotSend(SpotSend {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                destination,
                token,
                amount,
                time: nonce,
            }),
            nonce,
        )
    }

    /// Initiates a withdrawal to the account's own address.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::Withdraw(Withdraw {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                destination: self.address,
                amount: round_usd(amount),
                time: nonce,
            }),
            nonce,
        )
    }

    /// Moves USDC between the perp and spot balances.
    pub fn usd_class_transfer(&mut self, amount: Decimal, to_perp: bool) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::UsdClassTransfer(UsdClassTransfer {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                amount: round_usd(amount),
                to_perp,
                nonce,
            }),
            nonce,
        )
    }

    /// Moves an asset across DEXs or sub-accounts.
    #[allow(clippy::too_many_arguments)]
    pub fn send_asset(
        &mut self,
        destination: Address,
        source_dex: String,
        destination_dex: String,
        token: String,
        amount: Decimal,
        from_sub_account: String,
    ) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::SendAsset(SendAsset {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                destination,
                source_dex,
                destination_dex,
                token,
                amount,
                from_sub_account,
                nonce,
            }),
            nonce,
        )
    }

    /// Stakes HYPE.
    pub fn staking_deposit(&mut self, amount: Decimal) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let wei = to_scaled_u64(amount, HYPE_FACTOR)?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::CDeposit(CDeposit {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                wei,
                nonce,
            }),
            nonce,
        )
    }

    /// Unstakes HYPE.
    pub fn staking_withdraw(&mut self, amount: Decimal) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let wei = to_scaled_u64(amount, HYPE_FACTOR)?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::CWithdraw(CWithdraw {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                wei,
                nonce,
            }),
            nonce,
        )
    }

    /// Delegates (or undelegates) staked HYPE to a validator.
    pub fn token_delegate(
        &mut self,
        validator: Address,
        amount: Decimal,
        is_undelegate: bool,
    ) -> Result<ActionRequest> {
        self.require_signing_key()?;
        let wei = to_scaled_u64(amount, HYPE_FACTOR)?;
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::TokenDelegate(TokenDelegate {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                validator,
                wei,
                is_undelegate,
                nonce,
            }),
            nonce,
        )
    }

    /// Approves an agent key to trade for this account.
    pub fn approve_agent(
        &mut self,
        agent_address: Address,
        agent_name: Option<String>,
    ) -> Result<ActionRequest> {
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::ApproveAgent(ApproveAgent {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                agent_address,
                agent_name,
                nonce,
            }),
            nonce,
        )
    }

    /// Approves a builder fee rate, e.g. `0.001` for 0.1%.
    pub fn approve_builder_fee(
        &mut self,
        builder: Address,
        max_fee_rate: f64,
    ) -> Result<ActionRequest> {
        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::ApproveBuilderFee(ApproveBuilderFee {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                max_fee_rate: format!("{:.3}%", max_fee_rate * 100.0),
                builder,
                nonce,
            }),
            nonce,
        )
    }

    /// Converts this account into a multi-sig user.
    pub fn convert_to_multi_sig_user(
        &mut self,
        authorized_users: Vec<Address>,
        threshold: u32,
    ) -> Result<ActionRequest> {
        let mut users: Vec<String> = authorized_users
            .into_iter()
            .map(|user| user.to_string().to_lowercase())
            .collect();
        users.sort();

        let signers = serde_json::to_string(&MultiSigSigners {
            authorized_users: users,
            threshold,
        })?;

        let nonce = self.nonces.next_nonce();
        self.post_with_nonce(
            Action::ConvertToMultiSigUser(ConvertToMultiSigUser {
                signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
                hyperliquid_chain: self.chain,
                signers,
                nonce,
            }),
            nonce,
        )
    }

    /// Wraps an inner action and its collected co-signatures into a
    /// `multiSig` submission signed by this account as the outer signer.
    pub fn multi_sig(
        &mut self,
        multi_sig_user: Address,
        inner_action: Action,
        signatures: Vec<Signature>,
        nonce: u64,
    ) -> Result<ActionRequest> {
        use crate::types::{MultiSigAction, MultiSigPayload};

        let action = MultiSigAction {
            signature_chain_id: SIGNATURE_CHAIN_ID.to_string(),
            signatures,
            payload: MultiSigPayload {
                multi_sig_user: multi_sig_user.to_string().to_lowercase(),
                outer_signer: self.address.to_string().to_lowercase(),
                action: Box::new(inner_action),
            },
        };
        self.post_with_nonce(Action::MultiSig(action), nonce)
    }
}

/// Rounds a USD amount to cents.
fn round_usd(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors an amount into integer units of `factor`.
fn to_scaled_u64(amount: Decimal, factor: Decimal) -> Result<u64> {
    (amount * factor).floor().to_u64().ok_or(Error::Overflow {
        value: amount.to_f64().unwrap_or(f64::NAN),
    })
}
