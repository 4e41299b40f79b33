//! Rate accrual: stability fees folded into a collateral type's rate.

use crate::arithmetic::ArithmeticError;
use crate::domain::{Account, CollateralTag, CollateralType, LedgerState};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::units::RayDelta;

use super::require_admin;

/// Move the accumulated rate of `tag` by `rate_delta` and book the change in
/// outstanding debt (`debt_amount * rate_delta`) as coin to
/// `surplus_destination`. Negative deltas debit the destination.
pub(super) fn accrue_rate(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
    surplus_destination: &Account,
    rate_delta: RayDelta,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;
    let record = state.initialized_collateral_type(tag)?;

    let accumulated_rate = record.accumulated_rate.add_delta(rate_delta)?;
    // A zero rate would read as "uninitialized".
    if accumulated_rate.is_zero() {
        return Err(ArithmeticError::Underflow.into());
    }
    let delta_surplus = record.debt_amount.mul_ray_delta(rate_delta)?;

    let destination_coin_balance = state
        .coin_balance(surplus_destination)
        .add_delta(delta_surplus)?;
    let global_debt = state.global_debt.add_delta(delta_surplus)?;

    state.put_coin_balance(surplus_destination, destination_coin_balance);
    state.global_debt = global_debt;
    state.put_collateral_type(
        tag,
        CollateralType {
            accumulated_rate,
            ..record
        },
    );

    Ok(LedgerEvent::RateAccrued {
        collateral_type: tag.clone(),
        surplus_destination: surplus_destination.clone(),
        rate_delta,
        accumulated_rate,
        delta_surplus,
        destination_coin_balance,
        global_debt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::I256;
    use crate::config::LedgerConfig;
    use crate::domain::Safe;
    use crate::state::create_initial_state;
    use crate::units::{Rad, Ray, Wad};

    fn gov() -> Account {
        Account::from("gov")
    }

    /// One position of 100 wad debt at rate 1.0, coin held by `alice`.
    fn ledger() -> (LedgerState, CollateralTag) {
        let tag = CollateralTag::from("ETH-A");
        let alice = Account::from("alice");
        let mut state = create_initial_state(&LedgerConfig::default(), &gov());
        state.put_collateral_type(
            &tag,
            CollateralType {
                debt_amount: Wad::from_units(100),
                accumulated_rate: Ray::one(),
                ..Default::default()
            },
        );
        state.put_safe(
            &tag,
            &alice,
            Safe { locked_collateral: Wad::from_units(100), generated_debt: Wad::from_units(100) },
        );
        state.put_coin_balance(&alice, Rad::from_units(100));
        state.global_debt = Rad::from_units(100);
        (state, tag)
    }

    fn tenth() -> RayDelta {
        RayDelta::from_raw(I256::from(10i128.pow(26)))
    }

    #[test]
    fn test_accrual_books_surplus() {
        let (mut state, tag) = ledger();
        let surplus = Account::from("surplus");
        accrue_rate(&mut state, &gov(), &tag, &surplus, tenth()).unwrap();

        let rate = state.collateral_type(&tag).accumulated_rate;
        assert_eq!(rate.raw(), Ray::one().raw() + tenth().raw().magnitude());
        assert_eq!(state.coin_balance(&surplus), Rad::from_units(10));
        assert_eq!(state.global_debt, Rad::from_units(110));
    }

    #[test]
    fn test_negative_accrual_debits_destination() {
        let (mut state, tag) = ledger();
        let surplus = Account::from("surplus");
        accrue_rate(&mut state, &gov(), &tag, &surplus, tenth()).unwrap();
        let back = tenth().checked_neg().unwrap();
        accrue_rate(&mut state, &gov(), &tag, &surplus, back).unwrap();
        assert_eq!(state.coin_balance(&surplus), Rad::ZERO);
        assert_eq!(state.global_debt, Rad::from_units(100));
        assert_eq!(state.collateral_type(&tag).accumulated_rate, Ray::one());
    }

    #[test]
    fn test_rate_cannot_reach_zero() {
        let (mut state, tag) = ledger();
        let to_zero = RayDelta::from_units(-1);
        let err = accrue_rate(&mut state, &gov(), &tag, &gov(), to_zero).unwrap_err();
        assert_eq!(err.rule(), "arithmetic-underflow");
    }

    #[test]
    fn test_accrual_requires_initialized_type() {
        let (mut state, _) = ledger();
        let err = accrue_rate(&mut state, &gov(), &"nope".into(), &gov(), tenth()).unwrap_err();
        assert_eq!(err.rule(), "collateral-type-not-initialized");
    }
}
