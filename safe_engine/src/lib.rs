#![forbid(unsafe_code)]

//! Accounting core of a collateralized-debt ledger.
//!
//! Positions ("SAFEs") lock collateral and generate debt against it. The
//! engine enforces solvency, debt ceilings, dust floors and consent, and
//! accrues interest through a per-type accumulated rate. All arithmetic is
//! checked 256-bit fixed point (wad / ray / rad).

/// Ledger format version, bound into every canonical hash.
pub const LEDGER_VERSION: u32 = 1;

pub mod arithmetic;
pub mod units;
pub mod domain;
pub mod access;
pub mod error;
pub mod config;
pub mod events;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use config::LedgerConfig;
pub use domain::{Account, CollateralTag, CollateralType, LedgerState, Safe};
pub use engine::SafeEngine;
pub use error::LedgerError;
pub use events::{EventEnvelope, LedgerEvent, Operation};
pub use units::{Rad, RadDelta, Raw, Ray, RayDelta, Wad, WadDelta};
