/// SAFE ledger: Configuration
///
/// Starting values for the ledger-wide parameters plus engine switches.
/// Loaded from JSON; every field is optional and falls back to `Default`.

use serde::{Deserialize, Serialize};

use crate::units::{Rad, Wad};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Cap on `global_debt` while debt is being generated.
    pub global_debt_ceiling: Rad,
    /// Cap on any single position's nominal debt, across all types.
    pub safe_debt_ceiling: Wad,
    /// Run the accounting invariants after every operation, before commit.
    pub check_invariants: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            global_debt_ceiling: Rad::ZERO,
            safe_debt_ceiling: Wad::MAX,
            check_invariants: true,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
