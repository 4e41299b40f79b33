/// SAFE ledger: Centralized Transition Logic
///
/// ALL state mutation lives under this module. Each operation runs against
/// a private copy of the state; the copy is returned only if every step and
/// every check succeeded, so a failed operation leaves no trace.

mod balances;
mod positions;
mod rates;
mod registry;

use log::info;

use crate::domain::{Account, LedgerState};
use crate::error::LedgerError;
use crate::events::{LedgerEvent, Operation};

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `operation` on behalf of `caller` and return `(new_state, event)`.
/// The input state is never mutated.
pub fn apply_operation(
    state: &LedgerState,
    caller: &Account,
    operation: &Operation,
) -> Result<(LedgerState, LedgerEvent), LedgerError> {
    let mut next = state.clone();

    let event = match operation {
        Operation::GrantCapability { account } => grant_capability(&mut next, caller, account)?,
        Operation::RevokeCapability { account } => revoke_capability(&mut next, caller, account)?,
        Operation::ApproveConsent { delegate } => approve_consent(&mut next, caller, delegate),
        Operation::DenyConsent { delegate } => deny_consent(&mut next, caller, delegate),
        Operation::Disable => disable(&mut next, caller)?,
        Operation::InitializeType { collateral_type } => {
            registry::initialize_type(&mut next, caller, collateral_type)?
        }
        Operation::SetParameter { parameter, value } => {
            registry::set_parameter(&mut next, caller, parameter, *value)?
        }
        Operation::SetTypeParameter {
            collateral_type,
            parameter,
            value,
        } => registry::set_type_parameter(&mut next, caller, collateral_type, parameter, *value)?,
        Operation::CreditCollateral {
            collateral_type,
            account,
            delta,
        } => balances::credit_collateral(&mut next, caller, collateral_type, account, *delta)?,
        Operation::TransferCollateral {
            collateral_type,
            src,
            dst,
            amount,
        } => balances::transfer_collateral(&mut next, caller, collateral_type, src, dst, *amount)?,
        Operation::TransferCoin { src, dst, amount } => {
            balances::transfer_coin(&mut next, caller, src, dst, *amount)?
        }
        Operation::SettleDebt { amount } => balances::settle_debt(&mut next, caller, *amount)?,
        Operation::CreateUnbackedDebt {
            debt_destination,
            coin_destination,
            amount,
        } => balances::create_unbacked_debt(
            &mut next,
            caller,
            debt_destination,
            coin_destination,
            *amount,
        )?,
        Operation::ModifyPosition {
            collateral_type,
            owner,
            collateral_source,
            debt_destination,
            delta_collateral,
            delta_debt,
        } => positions::modify_position(
            &mut next,
            caller,
            positions::PositionChange {
                collateral_type,
                owner,
                collateral_account: collateral_source,
                debt_account: debt_destination,
                delta_collateral: *delta_collateral,
                delta_debt: *delta_debt,
            },
        )?,
        Operation::TransferPosition {
            collateral_type,
            src,
            dst,
            delta_collateral,
            delta_debt,
        } => positions::transfer_position(
            &mut next,
            caller,
            collateral_type,
            src,
            dst,
            *delta_collateral,
            *delta_debt,
        )?,
        Operation::ConfiscatePosition {
            collateral_type,
            owner,
            collateral_counterparty,
            debt_counterparty,
            delta_collateral,
            delta_debt,
        } => positions::confiscate_position(
            &mut next,
            caller,
            positions::PositionChange {
                collateral_type,
                owner,
                collateral_account: collateral_counterparty,
                debt_account: debt_counterparty,
                delta_collateral: *delta_collateral,
                delta_debt: *delta_debt,
            },
        )?,
        Operation::AccrueRate {
            collateral_type,
            surplus_destination,
            rate_delta,
        } => rates::accrue_rate(&mut next, caller, collateral_type, surplus_destination, *rate_delta)?,
    };

    Ok((next, event))
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

fn require_enabled(state: &LedgerState) -> Result<(), LedgerError> {
    if state.contract_enabled {
        Ok(())
    } else {
        Err(LedgerError::LedgerDisabled)
    }
}

/// Capability first, then lifecycle.
fn require_admin(state: &LedgerState, caller: &Account) -> Result<(), LedgerError> {
    state.capabilities.require_authorized(caller)?;
    require_enabled(state)
}

// ---------------------------------------------------------------------------
// Capability table and lifecycle
// ---------------------------------------------------------------------------

fn grant_capability(
    state: &mut LedgerState,
    caller: &Account,
    account: &Account,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;
    state.capabilities.grant(account);
    info!("capability granted to {} by {}", account, caller);
    Ok(LedgerEvent::CapabilityGranted {
        account: account.clone(),
    })
}

fn revoke_capability(
    state: &mut LedgerState,
    caller: &Account,
    account: &Account,
) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;
    state.capabilities.revoke(account);
    info!("capability revoked from {} by {}", account, caller);
    Ok(LedgerEvent::CapabilityRevoked {
        account: account.clone(),
    })
}

fn approve_consent(state: &mut LedgerState, caller: &Account, delegate: &Account) -> LedgerEvent {
    state.capabilities.approve(caller, delegate);
    LedgerEvent::ConsentApproved {
        owner: caller.clone(),
        delegate: delegate.clone(),
    }
}

fn deny_consent(state: &mut LedgerState, caller: &Account, delegate: &Account) -> LedgerEvent {
    state.capabilities.deny(caller, delegate);
    LedgerEvent::ConsentDenied {
        owner: caller.clone(),
        delegate: delegate.clone(),
    }
}

fn disable(state: &mut LedgerState, caller: &Account) -> Result<LedgerEvent, LedgerError> {
    require_admin(state, caller)?;
    state.contract_enabled = false;
    info!("ledger disabled by {}", caller);
    Ok(LedgerEvent::LedgerDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::state::create_initial_state;

    fn gov() -> Account {
        Account::from("gov")
    }

    fn fresh() -> LedgerState {
        create_initial_state(&LedgerConfig::default(), &gov())
    }

    #[test]
    fn test_input_state_is_not_mutated() {
        let state = fresh();
        let op = Operation::GrantCapability { account: "ops".into() };
        let (next, _) = apply_operation(&state, &gov(), &op).unwrap();
        assert!(!state.capabilities.is_authorized(&"ops".into()));
        assert!(next.capabilities.is_authorized(&"ops".into()));
    }

    #[test]
    fn test_grant_requires_capability() {
        let op = Operation::GrantCapability { account: "eve".into() };
        let err = apply_operation(&fresh(), &"eve".into(), &op).unwrap_err();
        assert_eq!(err.rule(), "not-authorized");
    }

    #[test]
    fn test_disable_is_one_way_and_freezes_grants() {
        let (disabled, event) = apply_operation(&fresh(), &gov(), &Operation::Disable).unwrap();
        assert_eq!(event, LedgerEvent::LedgerDisabled);
        assert!(!disabled.contract_enabled);

        let again = apply_operation(&disabled, &gov(), &Operation::Disable).unwrap_err();
        assert_eq!(again, LedgerError::LedgerDisabled);

        let grant = Operation::GrantCapability { account: "ops".into() };
        assert_eq!(
            apply_operation(&disabled, &gov(), &grant).unwrap_err(),
            LedgerError::LedgerDisabled
        );
        let revoke = Operation::RevokeCapability { account: gov() };
        assert_eq!(
            apply_operation(&disabled, &gov(), &revoke).unwrap_err(),
            LedgerError::LedgerDisabled
        );
    }

    #[test]
    fn test_consent_needs_no_capability_and_survives_disable() {
        let (disabled, _) = apply_operation(&fresh(), &gov(), &Operation::Disable).unwrap();
        let op = Operation::ApproveConsent { delegate: "bob".into() };
        let (next, event) = apply_operation(&disabled, &"alice".into(), &op).unwrap();
        assert!(next.capabilities.can_act(&"alice".into(), &"bob".into()));
        assert_eq!(
            event,
            LedgerEvent::ConsentApproved { owner: "alice".into(), delegate: "bob".into() }
        );

        let deny = Operation::DenyConsent { delegate: "bob".into() };
        let (next, _) = apply_operation(&next, &"alice".into(), &deny).unwrap();
        assert!(!next.capabilities.can_act(&"alice".into(), &"bob".into()));
    }
}
