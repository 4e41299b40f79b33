/// SAFE ledger: Error Taxonomy
///
/// Every rejected operation returns exactly one of these. The state is
/// untouched whenever an error is returned.

use thiserror::Error;

use crate::access::ConsentSubject;
use crate::arithmetic::ArithmeticError;
use crate::domain::{Account, CollateralTag};
use crate::invariants::InvariantViolation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("account {caller} lacks the ledger capability")]
    Authorization { caller: Account },

    #[error("account {caller} may not act on the {subject} of {owner}")]
    Consent {
        owner: Account,
        caller: Account,
        subject: ConsentSubject,
    },

    #[error("ledger is disabled")]
    LedgerDisabled,

    #[error("unknown collateral type {tag} (already initialized: {already_initialized})")]
    UnknownCollateralType {
        tag: CollateralTag,
        already_initialized: bool,
    },

    #[error("unrecognized parameter {name:?}")]
    UnrecognizedParameter { name: String },

    #[error("debt ceiling exceeded for collateral type {tag}")]
    DebtCeilingExceeded { tag: CollateralTag },

    #[error("position {owner} in {tag} would be insolvent")]
    InsolventPosition { tag: CollateralTag, owner: Account },

    #[error("position {owner} in {tag} would carry debt below the debt floor")]
    Dust { tag: CollateralTag, owner: Account },

    #[error("position {owner} in {tag} would exceed the per-position debt ceiling")]
    PositionDebtCapExceeded { tag: CollateralTag, owner: Account },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl LedgerError {
    /// Stable tag of the violated rule, for logs and assertions.
    pub fn rule(&self) -> &'static str {
        match self {
            LedgerError::Arithmetic(ArithmeticError::Overflow) => "arithmetic-overflow",
            LedgerError::Arithmetic(ArithmeticError::Underflow) => "arithmetic-underflow",
            LedgerError::Authorization { .. } => "not-authorized",
            LedgerError::Consent { .. } => "not-allowed",
            LedgerError::LedgerDisabled => "contract-not-enabled",
            LedgerError::UnknownCollateralType {
                already_initialized: false,
                ..
            } => "collateral-type-not-initialized",
            LedgerError::UnknownCollateralType {
                already_initialized: true,
                ..
            } => "collateral-type-already-init",
            LedgerError::UnrecognizedParameter { .. } => "unrecognized-param",
            LedgerError::DebtCeilingExceeded { .. } => "ceiling-exceeded",
            LedgerError::InsolventPosition { .. } => "not-safe",
            LedgerError::Dust { .. } => "dust",
            LedgerError::PositionDebtCapExceeded { .. } => "above-debt-limit",
            LedgerError::Invariant(_) => "invariant",
        }
    }
}
