/// SAFE ledger: Accounting Invariants
///
/// Ledger-wide identities that every reachable state satisfies:
///   - global_debt == sum of coin balances
///   - global_unbacked_debt == sum of debt balances
///   - per type, debt_amount == sum of generated debt over its positions
///   - positions exist only under initialized types
///
/// Per-position rules (solvency, dust, ceilings) are enforced by the
/// transitions at mutation time, not here: a later price or floor change
/// can legitimately leave an old position outside them.

use thiserror::Error;

use crate::arithmetic::ArithmeticError;
use crate::domain::LedgerState;
use crate::units::{Rad, Wad};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[INVARIANT:{tag}] {detail}")]
pub struct InvariantViolation {
    pub tag: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    fn new(tag: &'static str, detail: String) -> Self {
        Self { tag, detail }
    }
}

/// Run every check. Returns the first failure.
pub fn validate_invariants(state: &LedgerState) -> Result<(), InvariantViolation> {
    check_coin_supply(state)?;
    check_unbacked_debt(state)?;
    check_positions_initialized(state)?;
    check_type_debt(state)?;
    Ok(())
}

fn sum_rad<'a>(
    tag: &'static str,
    mut values: impl Iterator<Item = &'a Rad>,
) -> Result<Rad, InvariantViolation> {
    values.try_fold(Rad::ZERO, |total, value| {
        total
            .checked_add(*value)
            .map_err(|err: ArithmeticError| InvariantViolation::new(tag, format!("sum {}", err)))
    })
}

fn check_coin_supply(state: &LedgerState) -> Result<(), InvariantViolation> {
    let total = sum_rad("coin_supply", state.coin_balance.values())?;
    if total != state.global_debt {
        return Err(InvariantViolation::new(
            "coin_supply",
            format!(
                "global_debt={} but coin balances sum to {}",
                state.global_debt, total
            ),
        ));
    }
    Ok(())
}

fn check_unbacked_debt(state: &LedgerState) -> Result<(), InvariantViolation> {
    let total = sum_rad("unbacked_debt", state.debt_balance.values())?;
    if total != state.global_unbacked_debt {
        return Err(InvariantViolation::new(
            "unbacked_debt",
            format!(
                "global_unbacked_debt={} but debt balances sum to {}",
                state.global_unbacked_debt, total
            ),
        ));
    }
    Ok(())
}

fn check_positions_initialized(state: &LedgerState) -> Result<(), InvariantViolation> {
    for tag in state.safes.keys() {
        if !state.collateral_type(tag).is_initialized() {
            return Err(InvariantViolation::new(
                "uninitialized_type",
                format!("positions exist under uninitialized collateral type {}", tag),
            ));
        }
    }
    Ok(())
}

fn check_type_debt(state: &LedgerState) -> Result<(), InvariantViolation> {
    for (tag, record) in &state.collateral_types {
        let mut total = Wad::ZERO;
        if let Some(by_owner) = state.safes.get(tag) {
            for safe in by_owner.values() {
                total = total.checked_add(safe.generated_debt).map_err(|err| {
                    InvariantViolation::new("type_debt", format!("sum {}", err))
                })?;
            }
        }
        if total != record.debt_amount {
            return Err(InvariantViolation::new(
                "type_debt",
                format!(
                    "collateral type {} records debt_amount={} but positions sum to {}",
                    tag, record.debt_amount, total
                ),
            ));
        }
    }
    Ok(())
}
