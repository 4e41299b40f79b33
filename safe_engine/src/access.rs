//! Capability table and position consent.
//!
//! Two independent relations:
//!   - `authorized`: accounts allowed to call privileged operations
//!   - `consents`: owner -> delegates allowed to act on the owner's
//!     positions and balances
//!
//! Every gated operation goes through `require_authorized` or
//! `require_consent`; nothing else reads these sets for access decisions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Account;
use crate::error::LedgerError;

/// What a consent check protects; carried in `LedgerError::Consent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentSubject {
    Position,
    CollateralSource,
    DebtDestination,
    TransferSource,
    TransferDestination,
    CollateralBalance,
    CoinBalance,
}

impl fmt::Display for ConsentSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConsentSubject::Position => "position",
            ConsentSubject::CollateralSource => "collateral source",
            ConsentSubject::DebtDestination => "debt destination",
            ConsentSubject::TransferSource => "transfer source",
            ConsentSubject::TransferDestination => "transfer destination",
            ConsentSubject::CollateralBalance => "collateral balance",
            ConsentSubject::CoinBalance => "coin balance",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    authorized: BTreeSet<Account>,
    consents: BTreeMap<Account, BTreeSet<Account>>,
}

impl Capabilities {
    pub fn with_authorized(account: Account) -> Self {
        let mut table = Self::default();
        table.authorized.insert(account);
        table
    }

    pub fn is_authorized(&self, account: &Account) -> bool {
        self.authorized.contains(account)
    }

    pub fn authorized(&self) -> impl Iterator<Item = &Account> {
        self.authorized.iter()
    }

    /// `caller == owner`, or `owner` has approved `caller`.
    pub fn can_act(&self, owner: &Account, caller: &Account) -> bool {
        owner == caller
            || self
                .consents
                .get(owner)
                .map_or(false, |delegates| delegates.contains(caller))
    }

    pub fn require_authorized(&self, caller: &Account) -> Result<(), LedgerError> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            Err(LedgerError::Authorization {
                caller: caller.clone(),
            })
        }
    }

    pub fn require_consent(
        &self,
        owner: &Account,
        caller: &Account,
        subject: ConsentSubject,
    ) -> Result<(), LedgerError> {
        if self.can_act(owner, caller) {
            Ok(())
        } else {
            Err(LedgerError::Consent {
                owner: owner.clone(),
                caller: caller.clone(),
                subject,
            })
        }
    }

    pub(crate) fn grant(&mut self, account: &Account) {
        self.authorized.insert(account.clone());
    }

    pub(crate) fn revoke(&mut self, account: &Account) {
        self.authorized.remove(account);
    }

    pub(crate) fn approve(&mut self, owner: &Account, delegate: &Account) {
        self.consents
            .entry(owner.clone())
            .or_default()
            .insert(delegate.clone());
    }

    pub(crate) fn deny(&mut self, owner: &Account, delegate: &Account) {
        if let Some(delegates) = self.consents.get_mut(owner) {
            delegates.remove(delegate);
            if delegates.is_empty() {
                self.consents.remove(owner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_always_act() {
        let table = Capabilities::default();
        let alice = Account::from("alice");
        assert!(table.can_act(&alice, &alice));
        assert!(!table.can_act(&alice, &Account::from("bob")));
    }

    #[test]
    fn test_consent_is_directional() {
        let mut table = Capabilities::default();
        let alice = Account::from("alice");
        let bob = Account::from("bob");
        table.approve(&bob, &alice);
        assert!(table.can_act(&bob, &alice));
        assert!(!table.can_act(&alice, &bob));

        table.deny(&bob, &alice);
        assert!(!table.can_act(&bob, &alice));
        assert_eq!(table, Capabilities::default());
    }

    #[test]
    fn test_require_guards() {
        let gov = Account::from("gov");
        let mut table = Capabilities::with_authorized(gov.clone());
        assert!(table.require_authorized(&gov).is_ok());

        let err = table.require_authorized(&Account::from("eve")).unwrap_err();
        assert_eq!(err.rule(), "not-authorized");

        table.revoke(&gov);
        assert!(!table.is_authorized(&gov));

        let err = table
            .require_consent(&Account::from("a"), &Account::from("b"), ConsentSubject::CoinBalance)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Consent { subject: ConsentSubject::CoinBalance, .. }
        ));
    }
}
