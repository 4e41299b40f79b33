/// SAFE ledger: Core Domain Types
///
/// Pure data: collateral types, positions, balances and global counters.
/// Mutation happens only in `transitions`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::access::Capabilities;
use crate::error::LedgerError;
use crate::units::{Rad, Ray, Wad};

// ── Keys ───────────────────────────────────────────────────────────

/// Opaque caller / owner identity supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Account {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a collateral type, e.g. `ETH-A`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollateralTag(String);

impl CollateralTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CollateralTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for CollateralTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Records ────────────────────────────────────────────────────────

/// Risk parameters and aggregate debt of one collateral type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollateralType {
    pub debt_amount: Wad,       // total nominal debt under this type
    pub accumulated_rate: Ray,  // zero until initialized
    pub safety_price: Ray,
    pub debt_ceiling: Rad,
    pub debt_floor: Rad,
    pub liquidation_price: Ray, // informational only
}

impl CollateralType {
    pub fn is_initialized(&self) -> bool {
        !self.accumulated_rate.is_zero()
    }
}

/// A collateralized debt position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Safe {
    pub locked_collateral: Wad,
    pub generated_debt: Wad,
}

impl Safe {
    pub fn is_empty(&self) -> bool {
        self.locked_collateral.is_zero() && self.generated_debt.is_zero()
    }
}

// ── Parameters ─────────────────────────────────────────────────────

/// Settable per-type parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateralParameter {
    SafetyPrice,      // ray
    LiquidationPrice, // ray
    DebtCeiling,      // rad
    DebtFloor,        // rad
}

impl FromStr for CollateralParameter {
    type Err = LedgerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "safetyPrice" => Ok(Self::SafetyPrice),
            "liquidationPrice" => Ok(Self::LiquidationPrice),
            "debtCeiling" => Ok(Self::DebtCeiling),
            "debtFloor" => Ok(Self::DebtFloor),
            _ => Err(LedgerError::UnrecognizedParameter {
                name: name.to_string(),
            }),
        }
    }
}

/// Settable ledger-wide parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalParameter {
    GlobalDebtCeiling, // rad
    SafeDebtCeiling,   // wad
}

impl FromStr for GlobalParameter {
    type Err = LedgerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "globalDebtCeiling" => Ok(Self::GlobalDebtCeiling),
            "safeDebtCeiling" => Ok(Self::SafeDebtCeiling),
            _ => Err(LedgerError::UnrecognizedParameter {
                name: name.to_string(),
            }),
        }
    }
}

// ── Ledger store ───────────────────────────────────────────────────

/// Complete ledger state.
///
/// Zero-valued positions and balances are not stored, so two states with
/// the same observable values serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerState {
    pub collateral_types: BTreeMap<CollateralTag, CollateralType>,
    pub safes: BTreeMap<CollateralTag, BTreeMap<Account, Safe>>,
    pub token_collateral: BTreeMap<CollateralTag, BTreeMap<Account, Wad>>,
    pub coin_balance: BTreeMap<Account, Rad>,
    pub debt_balance: BTreeMap<Account, Rad>,
    pub global_debt: Rad,
    pub global_unbacked_debt: Rad,
    pub global_debt_ceiling: Rad,
    pub safe_debt_ceiling: Wad,
    pub contract_enabled: bool,
    pub capabilities: Capabilities,
}

impl LedgerState {
    /// Collateral type record; all-zero if never touched.
    pub fn collateral_type(&self, tag: &CollateralTag) -> CollateralType {
        self.collateral_types.get(tag).copied().unwrap_or_default()
    }

    /// Collateral type record, or `UnknownCollateralType` if not initialized.
    pub fn initialized_collateral_type(
        &self,
        tag: &CollateralTag,
    ) -> Result<CollateralType, LedgerError> {
        let record = self.collateral_type(tag);
        if !record.is_initialized() {
            return Err(LedgerError::UnknownCollateralType {
                tag: tag.clone(),
                already_initialized: false,
            });
        }
        Ok(record)
    }

    pub fn safe(&self, tag: &CollateralTag, owner: &Account) -> Safe {
        self.safes
            .get(tag)
            .and_then(|by_owner| by_owner.get(owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn token_collateral(&self, tag: &CollateralTag, account: &Account) -> Wad {
        self.token_collateral
            .get(tag)
            .and_then(|by_account| by_account.get(account))
            .copied()
            .unwrap_or_default()
    }

    pub fn coin_balance(&self, account: &Account) -> Rad {
        self.coin_balance.get(account).copied().unwrap_or_default()
    }

    pub fn debt_balance(&self, account: &Account) -> Rad {
        self.debt_balance.get(account).copied().unwrap_or_default()
    }

    // -- writers, used by transitions only --

    pub(crate) fn put_collateral_type(&mut self, tag: &CollateralTag, record: CollateralType) {
        self.collateral_types.insert(tag.clone(), record);
    }

    pub(crate) fn put_safe(&mut self, tag: &CollateralTag, owner: &Account, safe: Safe) {
        if safe.is_empty() {
            if let Some(by_owner) = self.safes.get_mut(tag) {
                by_owner.remove(owner);
                if by_owner.is_empty() {
                    self.safes.remove(tag);
                }
            }
        } else {
            self.safes
                .entry(tag.clone())
                .or_default()
                .insert(owner.clone(), safe);
        }
    }

    pub(crate) fn put_token_collateral(&mut self, tag: &CollateralTag, account: &Account, amount: Wad) {
        if amount.is_zero() {
            if let Some(by_account) = self.token_collateral.get_mut(tag) {
                by_account.remove(account);
                if by_account.is_empty() {
                    self.token_collateral.remove(tag);
                }
            }
        } else {
            self.token_collateral
                .entry(tag.clone())
                .or_default()
                .insert(account.clone(), amount);
        }
    }

    pub(crate) fn put_coin_balance(&mut self, account: &Account, amount: Rad) {
        put_balance(&mut self.coin_balance, account, amount);
    }

    pub(crate) fn put_debt_balance(&mut self, account: &Account, amount: Rad) {
        put_balance(&mut self.debt_balance, account, amount);
    }
}

fn put_balance(balances: &mut BTreeMap<Account, Rad>, account: &Account, amount: Rad) {
    if amount.is_zero() {
        balances.remove(account);
    } else {
        balances.insert(account.clone(), amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::state::create_initial_state;

    #[test]
    fn test_parameter_names() {
        assert_eq!("debtFloor".parse::<CollateralParameter>(), Ok(CollateralParameter::DebtFloor));
        assert_eq!("safeDebtCeiling".parse::<GlobalParameter>(), Ok(GlobalParameter::SafeDebtCeiling));
        assert!(matches!(
            "debt_floor".parse::<CollateralParameter>(),
            Err(LedgerError::UnrecognizedParameter { .. })
        ));
        // Per-type names are not global names.
        assert!("debtCeiling".parse::<GlobalParameter>().is_err());
    }

    #[test]
    fn test_zero_entries_are_pruned() {
        let mut state = create_initial_state(&LedgerConfig::default(), &Account::from("gov"));
        let tag = CollateralTag::from("ETH-A");
        let alice = Account::from("alice");

        state.put_safe(&tag, &alice, Safe { locked_collateral: Wad::one(), generated_debt: Wad::ZERO });
        assert_eq!(state.safe(&tag, &alice).locked_collateral, Wad::one());
        state.put_safe(&tag, &alice, Safe::default());
        assert!(state.safes.is_empty());

        state.put_token_collateral(&tag, &alice, Wad::one());
        state.put_token_collateral(&tag, &alice, Wad::ZERO);
        assert!(state.token_collateral.is_empty());

        state.put_coin_balance(&alice, Rad::one());
        state.put_coin_balance(&alice, Rad::ZERO);
        assert!(state.coin_balance.is_empty());
    }

    #[test]
    fn test_uninitialized_type_is_rejected() {
        let state = create_initial_state(&LedgerConfig::default(), &Account::from("gov"));
        let err = state.initialized_collateral_type(&CollateralTag::from("nope")).unwrap_err();
        assert_eq!(err.rule(), "collateral-type-not-initialized");
    }
}
