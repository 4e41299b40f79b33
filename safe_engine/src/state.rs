/// SAFE ledger: State Construction

use std::collections::BTreeMap;

use crate::access::Capabilities;
use crate::config::LedgerConfig;
use crate::domain::{Account, LedgerState};
use crate::units::Rad;

/// Create a fresh, enabled ledger. `deployer` holds the only capability.
pub fn create_initial_state(config: &LedgerConfig, deployer: &Account) -> LedgerState {
    LedgerState {
        collateral_types: BTreeMap::new(),
        safes: BTreeMap::new(),
        token_collateral: BTreeMap::new(),
        coin_balance: BTreeMap::new(),
        debt_balance: BTreeMap::new(),
        global_debt: Rad::ZERO,
        global_unbacked_debt: Rad::ZERO,
        global_debt_ceiling: config.global_debt_ceiling,
        safe_debt_ceiling: config.safe_debt_ceiling,
        contract_enabled: true,
        capabilities: Capabilities::with_authorized(deployer.clone()),
    }
}
