/// SAFE ledger: Operations and Notifications
///
/// `Operation` is the input side: one variant per public state-changing
/// call, pure data, no logic. `LedgerEvent` is the output side: the
/// notification published after a successful commit, carrying the
/// resulting totals.

use serde::{Deserialize, Serialize};

use crate::domain::{Account, CollateralTag};
use crate::units::{Rad, RadDelta, Raw, Ray, RayDelta, Wad, WadDelta};

/// A state-changing call, as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    GrantCapability {
        account: Account,
    },
    RevokeCapability {
        account: Account,
    },
    ApproveConsent {
        delegate: Account,
    },
    DenyConsent {
        delegate: Account,
    },
    InitializeType {
        collateral_type: CollateralTag,
    },
    SetParameter {
        parameter: String,
        value: Raw,
    },
    SetTypeParameter {
        collateral_type: CollateralTag,
        parameter: String,
        value: Raw,
    },
    Disable,
    CreditCollateral {
        collateral_type: CollateralTag,
        account: Account,
        delta: WadDelta,
    },
    TransferCollateral {
        collateral_type: CollateralTag,
        src: Account,
        dst: Account,
        amount: Wad,
    },
    TransferCoin {
        src: Account,
        dst: Account,
        amount: Rad,
    },
    ModifyPosition {
        collateral_type: CollateralTag,
        owner: Account,
        collateral_source: Account,
        debt_destination: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    },
    TransferPosition {
        collateral_type: CollateralTag,
        src: Account,
        dst: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    },
    ConfiscatePosition {
        collateral_type: CollateralTag,
        owner: Account,
        collateral_counterparty: Account,
        debt_counterparty: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    },
    AccrueRate {
        collateral_type: CollateralTag,
        surplus_destination: Account,
        rate_delta: RayDelta,
    },
    SettleDebt {
        amount: Rad,
    },
    CreateUnbackedDebt {
        debt_destination: Account,
        coin_destination: Account,
        amount: Rad,
    },
}

impl Operation {
    /// snake_case name, identical to the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::GrantCapability { .. } => "grant_capability",
            Operation::RevokeCapability { .. } => "revoke_capability",
            Operation::ApproveConsent { .. } => "approve_consent",
            Operation::DenyConsent { .. } => "deny_consent",
            Operation::InitializeType { .. } => "initialize_type",
            Operation::SetParameter { .. } => "set_parameter",
            Operation::SetTypeParameter { .. } => "set_type_parameter",
            Operation::Disable => "disable",
            Operation::CreditCollateral { .. } => "credit_collateral",
            Operation::TransferCollateral { .. } => "transfer_collateral",
            Operation::TransferCoin { .. } => "transfer_coin",
            Operation::ModifyPosition { .. } => "modify_position",
            Operation::TransferPosition { .. } => "transfer_position",
            Operation::ConfiscatePosition { .. } => "confiscate_position",
            Operation::AccrueRate { .. } => "accrue_rate",
            Operation::SettleDebt { .. } => "settle_debt",
            Operation::CreateUnbackedDebt { .. } => "create_unbacked_debt",
        }
    }
}

/// Notification emitted after a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    CapabilityGranted {
        account: Account,
    },
    CapabilityRevoked {
        account: Account,
    },
    ConsentApproved {
        owner: Account,
        delegate: Account,
    },
    ConsentDenied {
        owner: Account,
        delegate: Account,
    },
    CollateralTypeInitialized {
        collateral_type: CollateralTag,
        accumulated_rate: Ray,
    },
    ParameterSet {
        parameter: String,
        value: Raw,
    },
    TypeParameterSet {
        collateral_type: CollateralTag,
        parameter: String,
        value: Raw,
    },
    LedgerDisabled,
    CollateralCredited {
        collateral_type: CollateralTag,
        account: Account,
        delta: WadDelta,
        balance: Wad,
    },
    CollateralTransferred {
        collateral_type: CollateralTag,
        src: Account,
        dst: Account,
        amount: Wad,
        src_balance: Wad,
        dst_balance: Wad,
    },
    CoinTransferred {
        src: Account,
        dst: Account,
        amount: Rad,
        src_balance: Rad,
        dst_balance: Rad,
    },
    PositionModified {
        collateral_type: CollateralTag,
        owner: Account,
        collateral_source: Account,
        debt_destination: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
        locked_collateral: Wad,
        generated_debt: Wad,
        type_debt_amount: Wad,
        global_debt: Rad,
        source_collateral_balance: Wad,
        destination_coin_balance: Rad,
    },
    PositionTransferred {
        collateral_type: CollateralTag,
        src: Account,
        dst: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
        src_locked_collateral: Wad,
        src_generated_debt: Wad,
        dst_locked_collateral: Wad,
        dst_generated_debt: Wad,
    },
    PositionConfiscated {
        collateral_type: CollateralTag,
        owner: Account,
        collateral_counterparty: Account,
        debt_counterparty: Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
        locked_collateral: Wad,
        generated_debt: Wad,
        type_debt_amount: Wad,
        global_unbacked_debt: Rad,
    },
    RateAccrued {
        collateral_type: CollateralTag,
        surplus_destination: Account,
        rate_delta: RayDelta,
        accumulated_rate: Ray,
        delta_surplus: RadDelta,
        destination_coin_balance: Rad,
        global_debt: Rad,
    },
    DebtSettled {
        account: Account,
        amount: Rad,
        coin_balance: Rad,
        debt_balance: Rad,
        global_unbacked_debt: Rad,
        global_debt: Rad,
    },
    UnbackedDebtCreated {
        debt_destination: Account,
        coin_destination: Account,
        amount: Rad,
        debt_balance: Rad,
        coin_balance: Rad,
        global_unbacked_debt: Rad,
        global_debt: Rad,
    },
}

/// A committed notification with its position in the ledger history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub caller: Account,
    pub event: LedgerEvent,
}
