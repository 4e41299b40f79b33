//! Position engines: mutation, transfer between positions, confiscation.
//!
//! Check order in `modify_position` is part of the contract: callers
//! assert on the first violated rule.

use crate::access::ConsentSubject;
use crate::domain::{Account, CollateralTag, CollateralType, LedgerState, Safe};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::units::WadDelta;

use super::require_enabled;

/// Deltas applied to one position, plus the accounts whose balances absorb
/// them: the collateral account is debited by `delta_collateral`, the debt
/// account absorbs the adjusted debt change.
pub(super) struct PositionChange<'a> {
    pub collateral_type: &'a CollateralTag,
    pub owner: &'a Account,
    pub collateral_account: &'a Account,
    pub debt_account: &'a Account,
    pub delta_collateral: WadDelta,
    pub delta_debt: WadDelta,
}

/// Apply the deltas to the position and the type aggregate.
fn apply_deltas(
    safe: Safe,
    record: CollateralType,
    delta_collateral: WadDelta,
    delta_debt: WadDelta,
) -> Result<(Safe, CollateralType), LedgerError> {
    let safe = Safe {
        locked_collateral: safe.locked_collateral.add_delta(delta_collateral)?,
        generated_debt: safe.generated_debt.add_delta(delta_debt)?,
    };
    let record = CollateralType {
        debt_amount: record.debt_amount.add_delta(delta_debt)?,
        ..record
    };
    Ok((safe, record))
}

/// `generated_debt * rate <= locked_collateral * safety_price`.
fn is_solvent(safe: &Safe, record: &CollateralType) -> Result<bool, LedgerError> {
    let debt = safe.generated_debt.mul_ray(record.accumulated_rate)?;
    let value = safe.locked_collateral.mul_ray(record.safety_price)?;
    Ok(debt <= value)
}

/// No debt at all, or adjusted debt at least the floor.
fn is_above_floor(safe: &Safe, record: &CollateralType) -> Result<bool, LedgerError> {
    if safe.generated_debt.is_zero() {
        return Ok(true);
    }
    let debt = safe.generated_debt.mul_ray(record.accumulated_rate)?;
    Ok(debt >= record.debt_floor)
}

pub(super) fn modify_position(
    state: &mut LedgerState,
    caller: &Account,
    change: PositionChange<'_>,
) -> Result<LedgerEvent, LedgerError> {
    let PositionChange {
        collateral_type: tag,
        owner,
        collateral_account: collateral_source,
        debt_account: debt_destination,
        delta_collateral,
        delta_debt,
    } = change;

    require_enabled(state)?;
    let record = state.initialized_collateral_type(tag)?;

    let (safe, record) = apply_deltas(state.safe(tag, owner), record, delta_collateral, delta_debt)?;
    let delta_adjusted_debt = record.accumulated_rate.mul_wad_delta(delta_debt)?;
    let global_debt = state.global_debt.add_delta(delta_adjusted_debt)?;

    let debt_increases = delta_debt.is_positive();
    let safer = !debt_increases && !delta_collateral.is_negative();

    if debt_increases {
        let type_debt = record.debt_amount.mul_ray(record.accumulated_rate)?;
        if type_debt > record.debt_ceiling || global_debt > state.global_debt_ceiling {
            return Err(LedgerError::DebtCeilingExceeded { tag: tag.clone() });
        }
    }
    if !safer && !is_solvent(&safe, &record)? {
        return Err(LedgerError::InsolventPosition {
            tag: tag.clone(),
            owner: owner.clone(),
        });
    }
    if !safer {
        state
            .capabilities
            .require_consent(owner, caller, ConsentSubject::Position)?;
    }
    if delta_collateral.is_positive() {
        state
            .capabilities
            .require_consent(collateral_source, caller, ConsentSubject::CollateralSource)?;
    }
    if delta_debt.is_negative() {
        state
            .capabilities
            .require_consent(debt_destination, caller, ConsentSubject::DebtDestination)?;
    }
    if !is_above_floor(&safe, &record)? {
        return Err(LedgerError::Dust {
            tag: tag.clone(),
            owner: owner.clone(),
        });
    }
    if debt_increases && safe.generated_debt > state.safe_debt_ceiling {
        return Err(LedgerError::PositionDebtCapExceeded {
            tag: tag.clone(),
            owner: owner.clone(),
        });
    }

    let source_collateral_balance = state
        .token_collateral(tag, collateral_source)
        .sub_delta(delta_collateral)?;
    state.put_token_collateral(tag, collateral_source, source_collateral_balance);
    let destination_coin_balance = state
        .coin_balance(debt_destination)
        .add_delta(delta_adjusted_debt)?;
    state.put_coin_balance(debt_destination, destination_coin_balance);

    state.put_safe(tag, owner, safe);
    state.put_collateral_type(tag, record);
    state.global_debt = global_debt;

    Ok(LedgerEvent::PositionModified {
        collateral_type: tag.clone(),
        owner: owner.clone(),
        collateral_source: collateral_source.clone(),
        debt_destination: debt_destination.clone(),
        delta_collateral,
        delta_debt,
        locked_collateral: safe.locked_collateral,
        generated_debt: safe.generated_debt,
        type_debt_amount: record.debt_amount,
        global_debt,
        source_collateral_balance,
        destination_coin_balance,
    })
}

/// Move collateral and debt from `src` to `dst` within one collateral type.
/// Global counters and balances are untouched.
pub(super) fn transfer_position(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
    src: &Account,
    dst: &Account,
    delta_collateral: WadDelta,
    delta_debt: WadDelta,
) -> Result<LedgerEvent, LedgerError> {
    require_enabled(state)?;
    let record = state.initialized_collateral_type(tag)?;

    let src_before = state.safe(tag, src);
    let src_after = Safe {
        locked_collateral: src_before.locked_collateral.sub_delta(delta_collateral)?,
        generated_debt: src_before.generated_debt.sub_delta(delta_debt)?,
    };
    state.put_safe(tag, src, src_after);

    // Read after the debit so `src == dst` nets to zero.
    let dst_before = state.safe(tag, dst);
    let dst_after = Safe {
        locked_collateral: dst_before.locked_collateral.add_delta(delta_collateral)?,
        generated_debt: dst_before.generated_debt.add_delta(delta_debt)?,
    };
    state.put_safe(tag, dst, dst_after);
    let src_after = state.safe(tag, src);

    state
        .capabilities
        .require_consent(src, caller, ConsentSubject::TransferSource)?;
    state
        .capabilities
        .require_consent(dst, caller, ConsentSubject::TransferDestination)?;

    for (owner, safe) in [(src, &src_after), (dst, &dst_after)] {
        if !is_solvent(safe, &record)? {
            return Err(LedgerError::InsolventPosition {
                tag: tag.clone(),
                owner: owner.clone(),
            });
        }
    }
    for (owner, safe) in [(src, &src_after), (dst, &dst_after)] {
        if !is_above_floor(safe, &record)? {
            return Err(LedgerError::Dust {
                tag: tag.clone(),
                owner: owner.clone(),
            });
        }
    }

    Ok(LedgerEvent::PositionTransferred {
        collateral_type: tag.clone(),
        src: src.clone(),
        dst: dst.clone(),
        delta_collateral,
        delta_debt,
        src_locked_collateral: src_after.locked_collateral,
        src_generated_debt: src_after.generated_debt,
        dst_locked_collateral: dst_after.locked_collateral,
        dst_generated_debt: dst_after.generated_debt,
    })
}

/// Privileged, unchecked position change for liquidation and settlement.
///
/// The collateral counterparty is debited by `delta_collateral`; the
/// adjusted debt change is subtracted from the debt counterparty's unbacked
/// debt and from `global_unbacked_debt`. No solvency, dust, ceiling or
/// lifecycle checks.
pub(super) fn confiscate_position(
    state: &mut LedgerState,
    caller: &Account,
    change: PositionChange<'_>,
) -> Result<LedgerEvent, LedgerError> {
    let PositionChange {
        collateral_type: tag,
        owner,
        collateral_account: collateral_counterparty,
        debt_account: debt_counterparty,
        delta_collateral,
        delta_debt,
    } = change;

    state.capabilities.require_authorized(caller)?;
    let record = state.initialized_collateral_type(tag)?;

    let (safe, record) = apply_deltas(state.safe(tag, owner), record, delta_collateral, delta_debt)?;
    let delta_total_issued_debt = record.accumulated_rate.mul_wad_delta(delta_debt)?;

    let counterparty_collateral = state
        .token_collateral(tag, collateral_counterparty)
        .sub_delta(delta_collateral)?;
    state.put_token_collateral(tag, collateral_counterparty, counterparty_collateral);
    let counterparty_debt = state
        .debt_balance(debt_counterparty)
        .sub_delta(delta_total_issued_debt)?;
    state.put_debt_balance(debt_counterparty, counterparty_debt);
    let global_unbacked_debt = state
        .global_unbacked_debt
        .sub_delta(delta_total_issued_debt)?;

    state.put_safe(tag, owner, safe);
    state.put_collateral_type(tag, record);
    state.global_unbacked_debt = global_unbacked_debt;

    Ok(LedgerEvent::PositionConfiscated {
        collateral_type: tag.clone(),
        owner: owner.clone(),
        collateral_counterparty: collateral_counterparty.clone(),
        debt_counterparty: debt_counterparty.clone(),
        delta_collateral,
        delta_debt,
        locked_collateral: safe.locked_collateral,
        generated_debt: safe.generated_debt,
        type_debt_amount: record.debt_amount,
        global_unbacked_debt,
    })
}
