#![allow(dead_code)]

use safe_engine::units::{Amount, Scale};
use safe_engine::{Account, CollateralTag, LedgerConfig, Rad, Raw, Ray, SafeEngine, Wad, WadDelta};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn gov() -> Account {
    Account::from("gov")
}

pub fn alice() -> Account {
    Account::from("alice")
}

pub fn bob() -> Account {
    Account::from("bob")
}

pub fn eth() -> CollateralTag {
    CollateralTag::from("ETH-A")
}

/// Parameter values travel unscaled.
pub fn raw<S: Scale>(amount: Amount<S>) -> Raw {
    Raw::from_raw(amount.raw())
}

/// ETH-A initialized at safety price 2, ceilings at 10_000 coin, alice
/// holding 100 wad of free collateral.
pub fn funded_engine() -> SafeEngine {
    init_logging();
    let mut engine = SafeEngine::new(LedgerConfig::default(), &gov());
    engine.initialize_type(&gov(), &eth()).unwrap();
    engine
        .set_type_parameter(&gov(), &eth(), "safetyPrice", raw(Ray::from_units(2)))
        .unwrap();
    engine
        .set_type_parameter(&gov(), &eth(), "debtCeiling", raw(Rad::from_units(10_000)))
        .unwrap();
    engine
        .set_parameter(&gov(), "globalDebtCeiling", raw(Rad::from_units(10_000)))
        .unwrap();
    engine
        .credit_collateral(&gov(), &eth(), &alice(), WadDelta::from_units(100))
        .unwrap();
    engine
}

/// `funded_engine` after alice locks 100 and draws 150.
pub fn engine_with_position() -> SafeEngine {
    let mut engine = funded_engine();
    modify(&mut engine, &alice(), &alice(), 100, 150).unwrap();
    engine
}

/// Owner-funded position change: the owner is collateral source and debt
/// destination.
pub fn modify(
    engine: &mut SafeEngine,
    caller: &Account,
    owner: &Account,
    dink: i64,
    dart: i64,
) -> Result<(), safe_engine::LedgerError> {
    engine
        .modify_position(
            caller,
            &eth(),
            owner,
            owner,
            owner,
            WadDelta::from_units(dink),
            WadDelta::from_units(dart),
        )
        .map(|_| ())
}

pub fn wad(units: u64) -> Wad {
    Wad::from_units(units)
}
