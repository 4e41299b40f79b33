//! Hand-written protobuf types for the operation journal.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Scaled quantities travel as decimal strings (they exceed 64 bits);
//! signed deltas carry a leading `-` when negative.

use prost::Message;

// ── Journal Entry ──────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoJournalEntry {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(string, tag = "2")]
    pub caller: String,
    #[prost(message, optional, tag = "3")]
    pub operation: Option<ProtoOperation>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoOperation {
    #[prost(
        oneof = "OperationKind",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17"
    )]
    pub kind: Option<OperationKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum OperationKind {
    #[prost(message, tag = "1")]
    GrantCapability(AccountTarget),
    #[prost(message, tag = "2")]
    RevokeCapability(AccountTarget),
    #[prost(message, tag = "3")]
    ApproveConsent(AccountTarget),
    #[prost(message, tag = "4")]
    DenyConsent(AccountTarget),
    #[prost(message, tag = "5")]
    InitializeType(InitializeType),
    #[prost(message, tag = "6")]
    SetParameter(SetParameter),
    #[prost(message, tag = "7")]
    SetTypeParameter(SetTypeParameter),
    #[prost(message, tag = "8")]
    Disable(Disable),
    #[prost(message, tag = "9")]
    CreditCollateral(CreditCollateral),
    #[prost(message, tag = "10")]
    TransferCollateral(TransferCollateral),
    #[prost(message, tag = "11")]
    TransferCoin(TransferCoin),
    #[prost(message, tag = "12")]
    ModifyPosition(ModifyPosition),
    #[prost(message, tag = "13")]
    TransferPosition(TransferPosition),
    #[prost(message, tag = "14")]
    ConfiscatePosition(ConfiscatePosition),
    #[prost(message, tag = "15")]
    AccrueRate(AccrueRate),
    #[prost(message, tag = "16")]
    SettleDebt(SettleDebt),
    #[prost(message, tag = "17")]
    CreateUnbackedDebt(CreateUnbackedDebt),
}

// ── Capability Table ───────────────────────────────────────────

/// Grant/revoke target or consent delegate.
#[derive(Clone, PartialEq, Message)]
pub struct AccountTarget {
    #[prost(string, tag = "1")]
    pub account: String,
}

// ── Registry ───────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct InitializeType {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct SetParameter {
    #[prost(string, tag = "1")]
    pub parameter: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct SetTypeParameter {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub parameter: String,
    #[prost(string, tag = "3")]
    pub value: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Disable {}

// ── Balances ───────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct CreditCollateral {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub account: String,
    #[prost(string, tag = "3")]
    pub delta: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferCollateral {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub src: String,
    #[prost(string, tag = "3")]
    pub dst: String,
    #[prost(string, tag = "4")]
    pub amount: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferCoin {
    #[prost(string, tag = "1")]
    pub src: String,
    #[prost(string, tag = "2")]
    pub dst: String,
    #[prost(string, tag = "3")]
    pub amount: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct SettleDebt {
    #[prost(string, tag = "1")]
    pub amount: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct CreateUnbackedDebt {
    #[prost(string, tag = "1")]
    pub debt_destination: String,
    #[prost(string, tag = "2")]
    pub coin_destination: String,
    #[prost(string, tag = "3")]
    pub amount: String,
}

// ── Positions ──────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ModifyPosition {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub owner: String,
    #[prost(string, tag = "3")]
    pub collateral_source: String,
    #[prost(string, tag = "4")]
    pub debt_destination: String,
    #[prost(string, tag = "5")]
    pub delta_collateral: String,
    #[prost(string, tag = "6")]
    pub delta_debt: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransferPosition {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub src: String,
    #[prost(string, tag = "3")]
    pub dst: String,
    #[prost(string, tag = "4")]
    pub delta_collateral: String,
    #[prost(string, tag = "5")]
    pub delta_debt: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ConfiscatePosition {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub owner: String,
    #[prost(string, tag = "3")]
    pub collateral_counterparty: String,
    #[prost(string, tag = "4")]
    pub debt_counterparty: String,
    #[prost(string, tag = "5")]
    pub delta_collateral: String,
    #[prost(string, tag = "6")]
    pub delta_debt: String,
}

// ── Rates ──────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct AccrueRate {
    #[prost(string, tag = "1")]
    pub collateral_type: String,
    #[prost(string, tag = "2")]
    pub surplus_destination: String,
    #[prost(string, tag = "3")]
    pub rate_delta: String,
}
