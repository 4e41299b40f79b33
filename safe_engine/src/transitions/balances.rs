//! Balance-level primitives: collateral and coin moves, unbacked debt.
//!
//! None of these touch positions. Consent gates every debit of another
//! account; the capability gates every credit from nowhere.

use crate::access::ConsentSubject;
use crate::domain::{Account, CollateralTag, LedgerState};
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::units::{Rad, Wad, WadDelta};

pub(super) fn credit_collateral(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
    account: &Account,
    delta: WadDelta,
) -> Result<LedgerEvent, LedgerError> {
    state.capabilities.require_authorized(caller)?;

    let balance = state.token_collateral(tag, account).add_delta(delta)?;
    state.put_token_collateral(tag, account, balance);

    Ok(LedgerEvent::CollateralCredited {
        collateral_type: tag.clone(),
        account: account.clone(),
        delta,
        balance,
    })
}

pub(super) fn transfer_collateral(
    state: &mut LedgerState,
    caller: &Account,
    tag: &CollateralTag,
    src: &Account,
    dst: &Account,
    amount: Wad,
) -> Result<LedgerEvent, LedgerError> {
    state
        .capabilities
        .require_consent(src, caller, ConsentSubject::CollateralBalance)?;

    let src_balance = state.token_collateral(tag, src).checked_sub(amount)?;
    state.put_token_collateral(tag, src, src_balance);
    // Read after the debit so `src == dst` nets to zero.
    let dst_balance = state.token_collateral(tag, dst).checked_add(amount)?;
    state.put_token_collateral(tag, dst, dst_balance);

    Ok(LedgerEvent::CollateralTransferred {
        collateral_type: tag.clone(),
        src: src.clone(),
        dst: dst.clone(),
        amount,
        src_balance: state.token_collateral(tag, src),
        dst_balance,
    })
}

pub(super) fn transfer_coin(
    state: &mut LedgerState,
    caller: &Account,
    src: &Account,
    dst: &Account,
    amount: Rad,
) -> Result<LedgerEvent, LedgerError> {
    state
        .capabilities
        .require_consent(src, caller, ConsentSubject::CoinBalance)?;

    let src_balance = state.coin_balance(src).checked_sub(amount)?;
    state.put_coin_balance(src, src_balance);
    let dst_balance = state.coin_balance(dst).checked_add(amount)?;
    state.put_coin_balance(dst, dst_balance);

    Ok(LedgerEvent::CoinTransferred {
        src: src.clone(),
        dst: dst.clone(),
        amount,
        src_balance: state.coin_balance(src),
        dst_balance,
    })
}

/// Burn `amount` of the caller's coin against the same amount of its
/// unbacked debt.
pub(super) fn settle_debt(
    state: &mut LedgerState,
    caller: &Account,
    amount: Rad,
) -> Result<LedgerEvent, LedgerError> {
    let debt_balance = state.debt_balance(caller).checked_sub(amount)?;
    let coin_balance = state.coin_balance(caller).checked_sub(amount)?;
    let global_unbacked_debt = state.global_unbacked_debt.checked_sub(amount)?;
    let global_debt = state.global_debt.checked_sub(amount)?;

    state.put_debt_balance(caller, debt_balance);
    state.put_coin_balance(caller, coin_balance);
    state.global_unbacked_debt = global_unbacked_debt;
    state.global_debt = global_debt;

    Ok(LedgerEvent::DebtSettled {
        account: caller.clone(),
        amount,
        coin_balance,
        debt_balance,
        global_unbacked_debt,
        global_debt,
    })
}

/// Mint coin to `coin_destination` backed by nothing but a matching debt
/// entry on `debt_destination`.
pub(super) fn create_unbacked_debt(
    state: &mut LedgerState,
    caller: &Account,
    debt_destination: &Account,
    coin_destination: &Account,
    amount: Rad,
) -> Result<LedgerEvent, LedgerError> {
    state.capabilities.require_authorized(caller)?;

    let debt_balance = state.debt_balance(debt_destination).checked_add(amount)?;
    let coin_balance = state.coin_balance(coin_destination).checked_add(amount)?;
    let global_unbacked_debt = state.global_unbacked_debt.checked_add(amount)?;
    let global_debt = state.global_debt.checked_add(amount)?;

    state.put_debt_balance(debt_destination, debt_balance);
    state.put_coin_balance(coin_destination, coin_balance);
    state.global_unbacked_debt = global_unbacked_debt;
    state.global_debt = global_debt;

    Ok(LedgerEvent::UnbackedDebtCreated {
        debt_destination: debt_destination.clone(),
        coin_destination: coin_destination.clone(),
        amount,
        debt_balance,
        coin_balance,
        global_unbacked_debt,
        global_debt,
    })
}
