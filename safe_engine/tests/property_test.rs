/// Property tests over random operation sequences.

mod common;

use common::*;
use proptest::prelude::*;
use safe_engine::arithmetic::I256;
use safe_engine::invariants::validate_invariants;
use safe_engine::{Account, Rad, RayDelta, SafeEngine, Wad, WadDelta};

fn owners() -> [Account; 3] {
    [alice(), bob(), Account::from("carol")]
}

/// Three owners with 1_000 wad of free collateral each, a debt floor of 10.
fn populated_engine() -> SafeEngine {
    let mut engine = funded_engine();
    engine
        .set_type_parameter(&gov(), &eth(), "debtFloor", raw(Rad::from_units(10)))
        .unwrap();
    for owner in owners() {
        engine
            .credit_collateral(&gov(), &eth(), &owner, WadDelta::from_units(1_000))
            .unwrap();
    }
    engine
}

/// Every stored position is non-dusty, solvent and under the cap.
fn assert_positions_sound(engine: &SafeEngine) {
    let record = engine.collateral_type(&eth());
    for safe in engine.state().safes.values().flat_map(|by_owner| by_owner.values()) {
        let debt = safe.generated_debt.mul_ray(record.accumulated_rate).unwrap();
        if !safe.generated_debt.is_zero() {
            assert!(debt >= record.debt_floor, "dusty position {:?}", safe);
        }
        let value = safe.locked_collateral.mul_ray(record.safety_price).unwrap();
        assert!(debt <= value, "insolvent position {:?}", safe);
        assert!(safe.generated_debt <= engine.safe_debt_ceiling());
    }
}

fn position_change() -> impl Strategy<Value = (usize, usize, i64, i64)> {
    (0..3usize, 0..3usize, -300i64..300, -300i64..300)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn modify_sequences_keep_positions_sound(changes in prop::collection::vec(position_change(), 1..40)) {
        let mut engine = populated_engine();
        let people = owners();
        for (caller, owner, dink, dart) in changes {
            let before = engine.canonical_hash().unwrap();
            let result = modify(&mut engine, &people[caller], &people[owner], dink, dart);
            if result.is_err() {
                prop_assert_eq!(engine.canonical_hash().unwrap(), before);
            }
            assert_positions_sound(&engine);
            prop_assert!(validate_invariants(engine.state()).is_ok());
        }
    }

    #[test]
    fn transfer_conserves_collateral_and_debt(
        draw in 10u64..500,
        dink in -200i64..200,
        dart in -200i64..200,
    ) {
        let mut engine = populated_engine();
        modify(&mut engine, &alice(), &alice(), 1_000, draw as i64).unwrap();
        modify(&mut engine, &bob(), &bob(), 500, 100).unwrap();
        engine.approve_consent(&bob(), &alice()).unwrap();

        let total = |engine: &SafeEngine| {
            let a = engine.safe(&eth(), &alice());
            let b = engine.safe(&eth(), &bob());
            (
                a.locked_collateral.checked_add(b.locked_collateral).unwrap(),
                a.generated_debt.checked_add(b.generated_debt).unwrap(),
            )
        };
        let before = total(&engine);
        let global_debt = engine.global_debt();

        let moved = engine
            .transfer_position(
                &alice(),
                &eth(),
                &alice(),
                &bob(),
                WadDelta::from_units(dink),
                WadDelta::from_units(dart),
            )
            .is_ok();
        prop_assert_eq!(total(&engine), before);
        prop_assert_eq!(engine.global_debt(), global_debt);
        if moved {
            assert_positions_sound(&engine);
        }
    }

    #[test]
    fn accrual_moves_global_debt_by_exact_surplus(
        draw in 10u64..400,
        bump in 1i64..1_000_000,
    ) {
        let mut engine = populated_engine();
        modify(&mut engine, &alice(), &alice(), 1_000, draw as i64).unwrap();
        let treasury = Account::from("treasury");
        let debt_amount = engine.collateral_type(&eth()).debt_amount;
        let global_before = engine.global_debt();

        // bump / 10^6 of a ray
        let rate_delta = RayDelta::from_raw(I256::from(bump as i128 * 10i128.pow(21)));
        engine.accrue_rate(&gov(), &eth(), &treasury, rate_delta).unwrap();

        let expected = debt_amount.mul_ray_delta(rate_delta).unwrap();
        let surplus = engine.coin_balance(&treasury);
        prop_assert_eq!(surplus.to_delta().unwrap(), expected);
        prop_assert_eq!(global_before.checked_add(surplus).unwrap(), engine.global_debt());
        prop_assert!(validate_invariants(engine.state()).is_ok());
    }

    #[test]
    fn failed_transfers_never_mint(amount in 0u64..2_000) {
        let mut engine = populated_engine();
        let before: Wad = engine.token_collateral(&eth(), &alice());
        let moved = engine
            .transfer_collateral(&alice(), &eth(), &alice(), &bob(), wad(amount))
            .is_ok();
        let after = engine
            .token_collateral(&eth(), &alice())
            .checked_add(engine.token_collateral(&eth(), &bob()))
            .unwrap();
        prop_assert_eq!(after, before.checked_add(wad(1_000)).unwrap());
        prop_assert_eq!(moved, amount <= 1_100);
    }
}
