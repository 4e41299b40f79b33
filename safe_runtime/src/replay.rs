//! Replay orchestrator: rebuild a ledger from journal entries.
//!
//! Delegates all domain logic to the kernel. Every journaled operation was
//! committed once, so any rejection during replay means the journal does
//! not belong to this genesis (deployer + config).

use log::info;
use thiserror::Error;

use safe_engine::{Account, LedgerConfig, LedgerError, LedgerState, SafeEngine};

use crate::journal::JournalEntry;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay out of order: expected #{expected}, got #{got}")]
    SequenceMismatch { expected: u64, got: u64 },

    #[error("journaled operation #{sequence} rejected on replay: {source}")]
    Rejected {
        sequence: u64,
        #[source]
        source: LedgerError,
    },

    #[error("state hash: {0}")]
    Hash(#[from] serde_json::Error),
}

/// Apply `entries` on top of `engine`. The first entry must follow the
/// engine's current sequence.
pub fn replay_onto(engine: &mut SafeEngine, entries: &[JournalEntry]) -> Result<(), ReplayError> {
    for entry in entries {
        let expected = engine.sequence() + 1;
        if entry.sequence != expected {
            return Err(ReplayError::SequenceMismatch {
                expected,
                got: entry.sequence,
            });
        }
        engine
            .execute(&entry.caller, &entry.operation)
            .map_err(|source| ReplayError::Rejected {
                sequence: entry.sequence,
                source,
            })?;
    }
    // Replayed events were already published the first time round.
    engine.drain_events();
    Ok(())
}

/// Rebuild a ledger from genesis.
pub fn rebuild_engine(
    config: &LedgerConfig,
    deployer: &Account,
    entries: &[JournalEntry],
) -> Result<SafeEngine, ReplayError> {
    let mut engine = SafeEngine::new(config.clone(), deployer);
    replay_onto(&mut engine, entries)?;
    info!("replayed {} journal entries", entries.len());
    Ok(engine)
}

/// Rebuild and return `(final_state, canonical_hash)`.
pub fn rebuild_state(
    config: &LedgerConfig,
    deployer: &Account,
    entries: &[JournalEntry],
) -> Result<(LedgerState, String), ReplayError> {
    let engine = rebuild_engine(config, deployer, entries)?;
    let hash = engine.canonical_hash()?;
    Ok((engine.state().clone(), hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(
    config: &LedgerConfig,
    deployer: &Account,
    entries: &[JournalEntry],
) -> Result<String, ReplayError> {
    rebuild_state(config, deployer, entries).map(|(_, hash)| hash)
}
