//! Collateral type registry: initialization and parameter updates.

use log::info;

use crate::domain::{Account, CollateralParameter, CollateralTag, GlobalParameter, LedgerState};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::units::{Raw, Ray};

use super::require_admin;

pub(super) fn initialize_type(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;

    let mut record = state.collateral_type(tag);
    if record.is_initialized() {
        return Err(LedgerError::UnknownCollateralType {
            tag: tag.clone(),
            already_initialized: true,
        });
    }
    record.accumulated_rate = Ray::one();
    state.put_collateral_type(tag, record);

    info!("collateral type {} initialized", tag);
    Ok(LedgerEvent::CollateralTypeInitialized {
        collateral_type: tag.clone(),
        accumulated_rate: record.accumulated_rate,
    })
}

/// Ledger-wide parameter. The name decides the scale of `value`.
pub(super) fn set_parameter(
    state: &mut LedgerState,
    caller: &Account,
    name: &str,
    value: Raw,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;

    match name.parse::<GlobalParameter>()? {
        GlobalParameter::GlobalDebtCeiling => state.global_debt_ceiling = value.into_scale(),
        GlobalParameter::SafeDebtCeiling => state.safe_debt_ceiling = value.into_scale(),
    }

    Ok(LedgerEvent::ParameterSet {
        parameter: name.to_string(),
        value,
    })
}

/// Per-type parameter. Does not require the type to be initialized.
pub(super) fn set_type_parameter(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
    name: &str,
    value: Raw,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;

    let mut record = state.collateral_type(tag);
    match name.parse::<CollateralParameter>()? {
        CollateralParameter::SafetyPrice => record.safety_price = value.into_scale(),
        CollateralParameter::LiquidationPrice => record.liquidation_price = value.into_scale(),
        CollateralParameter::DebtCeiling => record.debt_ceiling = value.into_scale(),
        CollateralParameter::DebtFloor => record.debt_floor = value.into_scale(),
    }
    state.put_collateral_type(tag, record);

    Ok(LedgerEvent::TypeParameterSet {
        collateral_type: tag.clone(),
        parameter: name.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::state::create_initial_state;
    use crate::units::{Rad, Wad};

    fn gov() -> Account {
        Account::from("gov")
    }

    fn fresh() -> LedgerState {
        create_initial_state(&LedgerConfig::default(), &gov())
    }

    #[test]
    fn test_initialize_sets_unit_rate_once() {
        let mut state = fresh();
        let tag = CollateralTag::from("ETH-A");
        initialize_type(&mut state, &gov(), &tag).unwrap();
        assert_eq!(state.collateral_type(&tag).accumulated_rate, Ray::one());

        let err = initialize_type(&mut state, &gov(), &tag).unwrap_err();
        assert_eq!(err.rule(), "collateral-type-already-init");
    }

    #[test]
    fn test_type_parameters_land_in_their_scale() {
        let mut state = fresh();
        let tag = CollateralTag::from("ETH-A");
        set_type_parameter(&mut state, &gov(), &tag, "safetyPrice", Raw::from_raw(Ray::from_units(2).raw())).unwrap();
        set_type_parameter(&mut state, &gov(), &tag, "debtFloor", Raw::from_raw(Rad::from_units(10).raw())).unwrap();
        let record = state.collateral_type(&tag);
        assert_eq!(record.safety_price, Ray::from_units(2));
        assert_eq!(record.debt_floor, Rad::from_units(10));
        assert!(!record.is_initialized());
    }

    #[test]
    fn test_global_parameters() {
        let mut state = fresh();
        set_parameter(&mut state, &gov(), "safeDebtCeiling", Raw::from_raw(Wad::from_units(5).raw())).unwrap();
        assert_eq!(state.safe_debt_ceiling, Wad::from_units(5));

        let err = set_parameter(&mut state, &gov(), "debtCeiling", Raw::ZERO).unwrap_err();
        assert_eq!(err, LedgerError::UnrecognizedParameter { name: "debtCeiling".to_string() });
    }

    #[test]
    fn test_registry_is_privileged() {
        let mut state = fresh();
        let err = initialize_type(&mut state, &"eve".into(), &"ETH-A".into()).unwrap_err();
        assert_eq!(err.rule(), "not-authorized");
        let err = set_type_parameter(&mut state, &"eve".into(), &"ETH-A".into(), "bogus", Raw::ZERO).unwrap_err();
        // Capability is checked before the parameter name.
        assert_eq!(err.rule(), "not-authorized");
    }
}
