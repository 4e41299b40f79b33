//! Proto ↔ Kernel conversion bridge.
//!
//! Converts between the journal's protobuf messages (proto_types.rs) and
//! the kernel's `Operation`. Encoding is total; decoding fails on a
//! missing operation, an empty identifier or a malformed number.

use std::str::FromStr;

use thiserror::Error;

use safe_engine::arithmetic::ParseScalarError;
use safe_engine::{Account, CollateralTag, Operation};

use crate::journal::JournalEntry;
use crate::proto_types::*;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("journal entry #{sequence} carries no operation")]
    MissingOperation { sequence: u64 },

    #[error("field {field} is empty")]
    EmptyField { field: &'static str },

    #[error("field {field} holds a malformed number {text:?}: {source}")]
    InvalidNumber {
        field: &'static str,
        text: String,
        #[source]
        source: ParseScalarError,
    },
}

fn account(field: &'static str, text: &str) -> Result<Account, BridgeError> {
    if text.is_empty() {
        return Err(BridgeError::EmptyField { field });
    }
    Ok(Account::new(text))
}

fn tag(text: &str) -> Result<CollateralTag, BridgeError> {
    if text.is_empty() {
        return Err(BridgeError::EmptyField { field: "collateral_type" });
    }
    Ok(CollateralTag::new(text))
}

fn number<T>(field: &'static str, text: &str) -> Result<T, BridgeError>
where
    T: FromStr<Err = ParseScalarError>,
{
    text.parse().map_err(|source| BridgeError::InvalidNumber {
        field,
        text: text.to_string(),
        source,
    })
}

/// Convert a journal entry to the kernel's view.
pub fn proto_to_entry(proto: &ProtoJournalEntry) -> Result<JournalEntry, BridgeError> {
    let operation = proto
        .operation
        .as_ref()
        .ok_or(BridgeError::MissingOperation { sequence: proto.sequence })?;
    Ok(JournalEntry {
        sequence: proto.sequence,
        caller: account("caller", &proto.caller)?,
        operation: proto_to_operation(proto.sequence, operation)?,
    })
}

/// Convert a committed kernel operation to a journal entry.
pub fn entry_to_proto(sequence: u64, caller: &Account, operation: &Operation) -> ProtoJournalEntry {
    ProtoJournalEntry {
        sequence,
        caller: caller.to_string(),
        operation: Some(operation_to_proto(operation)),
    }
}

/// Decode a protobuf operation. `sequence` is only used for error context.
pub fn proto_to_operation(sequence: u64, proto: &ProtoOperation) -> Result<Operation, BridgeError> {
    let kind = proto
        .kind
        .as_ref()
        .ok_or(BridgeError::MissingOperation { sequence })?;

    let operation = match kind {
        OperationKind::GrantCapability(t) => Operation::GrantCapability {
            account: account("account", &t.account)?,
        },
        OperationKind::RevokeCapability(t) => Operation::RevokeCapability {
            account: account("account", &t.account)?,
        },
        OperationKind::ApproveConsent(t) => Operation::ApproveConsent {
            delegate: account("account", &t.account)?,
        },
        OperationKind::DenyConsent(t) => Operation::DenyConsent {
            delegate: account("account", &t.account)?,
        },
        OperationKind::InitializeType(it) => Operation::InitializeType {
            collateral_type: tag(&it.collateral_type)?,
        },
        OperationKind::SetParameter(sp) => Operation::SetParameter {
            parameter: sp.parameter.clone(),
            value: number("value", &sp.value)?,
        },
        OperationKind::SetTypeParameter(sp) => Operation::SetTypeParameter {
            collateral_type: tag(&sp.collateral_type)?,
            parameter: sp.parameter.clone(),
            value: number("value", &sp.value)?,
        },
        OperationKind::Disable(_) => Operation::Disable,
        OperationKind::CreditCollateral(cc) => Operation::CreditCollateral {
            collateral_type: tag(&cc.collateral_type)?,
            account: account("account", &cc.account)?,
            delta: number("delta", &cc.delta)?,
        },
        OperationKind::TransferCollateral(tc) => Operation::TransferCollateral {
            collateral_type: tag(&tc.collateral_type)?,
            src: account("src", &tc.src)?,
            dst: account("dst", &tc.dst)?,
            amount: number("amount", &tc.amount)?,
        },
        OperationKind::TransferCoin(tc) => Operation::TransferCoin {
            src: account("src", &tc.src)?,
            dst: account("dst", &tc.dst)?,
            amount: number("amount", &tc.amount)?,
        },
        OperationKind::ModifyPosition(mp) => Operation::ModifyPosition {
            collateral_type: tag(&mp.collateral_type)?,
            owner: account("owner", &mp.owner)?,
            collateral_source: account("collateral_source", &mp.collateral_source)?,
            debt_destination: account("debt_destination", &mp.debt_destination)?,
            delta_collateral: number("delta_collateral", &mp.delta_collateral)?,
            delta_debt: number("delta_debt", &mp.delta_debt)?,
        },
        OperationKind::TransferPosition(tp) => Operation::TransferPosition {
            collateral_type: tag(&tp.collateral_type)?,
            src: account("src", &tp.src)?,
            dst: account("dst", &tp.dst)?,
            delta_collateral: number("delta_collateral", &tp.delta_collateral)?,
            delta_debt: number("delta_debt", &tp.delta_debt)?,
        },
        OperationKind::ConfiscatePosition(cp) => Operation::ConfiscatePosition {
            collateral_type: tag(&cp.collateral_type)?,
            owner: account("owner", &cp.owner)?,
            collateral_counterparty: account("collateral_counterparty", &cp.collateral_counterparty)?,
            debt_counterparty: account("debt_counterparty", &cp.debt_counterparty)?,
            delta_collateral: number("delta_collateral", &cp.delta_collateral)?,
            delta_debt: number("delta_debt", &cp.delta_debt)?,
        },
        OperationKind::AccrueRate(ar) => Operation::AccrueRate {
            collateral_type: tag(&ar.collateral_type)?,
            surplus_destination: account("surplus_destination", &ar.surplus_destination)?,
            rate_delta: number("rate_delta", &ar.rate_delta)?,
        },
        OperationKind::SettleDebt(sd) => Operation::SettleDebt {
            amount: number("amount", &sd.amount)?,
        },
        OperationKind::CreateUnbackedDebt(cu) => Operation::CreateUnbackedDebt {
            debt_destination: account("debt_destination", &cu.debt_destination)?,
            coin_destination: account("coin_destination", &cu.coin_destination)?,
            amount: number("amount", &cu.amount)?,
        },
    };
    Ok(operation)
}

/// Encode a kernel operation for the journal.
pub fn operation_to_proto(operation: &Operation) -> ProtoOperation {
    let kind = match operation {
        Operation::GrantCapability { account } => {
            OperationKind::GrantCapability(AccountTarget { account: account.to_string() })
        }
        Operation::RevokeCapability { account } => {
            OperationKind::RevokeCapability(AccountTarget { account: account.to_string() })
        }
        Operation::ApproveConsent { delegate } => {
            OperationKind::ApproveConsent(AccountTarget { account: delegate.to_string() })
        }
        Operation::DenyConsent { delegate } => {
            OperationKind::DenyConsent(AccountTarget { account: delegate.to_string() })
        }
        Operation::InitializeType { collateral_type } => {
            OperationKind::InitializeType(InitializeType {
                collateral_type: collateral_type.to_string(),
            })
        }
        Operation::SetParameter { parameter, value } => OperationKind::SetParameter(SetParameter {
            parameter: parameter.clone(),
            value: value.to_string(),
        }),
        Operation::SetTypeParameter {
            collateral_type,
            parameter,
            value,
        } => OperationKind::SetTypeParameter(SetTypeParameter {
            collateral_type: collateral_type.to_string(),
            parameter: parameter.clone(),
            value: value.to_string(),
        }),
        Operation::Disable => OperationKind::Disable(Disable {}),
        Operation::CreditCollateral {
            collateral_type,
            account,
            delta,
        } => OperationKind::CreditCollateral(CreditCollateral {
            collateral_type: collateral_type.to_string(),
            account: account.to_string(),
            delta: delta.to_string(),
        }),
        Operation::TransferCollateral {
            collateral_type,
            src,
            dst,
            amount,
        } => OperationKind::TransferCollateral(TransferCollateral {
            collateral_type: collateral_type.to_string(),
            src: src.to_string(),
            dst: dst.to_string(),
            amount: amount.to_string(),
        }),
        Operation::TransferCoin { src, dst, amount } => OperationKind::TransferCoin(TransferCoin {
            src: src.to_string(),
            dst: dst.to_string(),
            amount: amount.to_string(),
        }),
        Operation::ModifyPosition {
            collateral_type,
            owner,
            collateral_source,
            debt_destination,
            delta_collateral,
            delta_debt,
        } => OperationKind::ModifyPosition(ModifyPosition {
            collateral_type: collateral_type.to_string(),
            owner: owner.to_string(),
            collateral_source: collateral_source.to_string(),
            debt_destination: debt_destination.to_string(),
            delta_collateral: delta_collateral.to_string(),
            delta_debt: delta_debt.to_string(),
        }),
        Operation::TransferPosition {
            collateral_type,
            src,
            dst,
            delta_collateral,
            delta_debt,
        } => OperationKind::TransferPosition(TransferPosition {
            collateral_type: collateral_type.to_string(),
            src: src.to_string(),
            dst: dst.to_string(),
            delta_collateral: delta_collateral.to_string(),
            delta_debt: delta_debt.to_string(),
        }),
        Operation::ConfiscatePosition {
            collateral_type,
            owner,
            collateral_counterparty,
            debt_counterparty,
            delta_collateral,
            delta_debt,
        } => OperationKind::ConfiscatePosition(ConfiscatePosition {
            collateral_type: collateral_type.to_string(),
            owner: owner.to_string(),
            collateral_counterparty: collateral_counterparty.to_string(),
            debt_counterparty: debt_counterparty.to_string(),
            delta_collateral: delta_collateral.to_string(),
            delta_debt: delta_debt.to_string(),
        }),
        Operation::AccrueRate {
            collateral_type,
            surplus_destination,
            rate_delta,
        } => OperationKind::AccrueRate(AccrueRate {
            collateral_type: collateral_type.to_string(),
            surplus_destination: surplus_destination.to_string(),
            rate_delta: rate_delta.to_string(),
        }),
        Operation::SettleDebt { amount } => OperationKind::SettleDebt(SettleDebt {
            amount: amount.to_string(),
        }),
        Operation::CreateUnbackedDebt {
            debt_destination,
            coin_destination,
            amount,
        } => OperationKind::CreateUnbackedDebt(CreateUnbackedDebt {
            debt_destination: debt_destination.to_string(),
            coin_destination: coin_destination.to_string(),
            amount: amount.to_string(),
        }),
    };
    ProtoOperation { kind: Some(kind) }
}
