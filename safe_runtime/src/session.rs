//! Session manager: isolated ledgers with apply-then-persist semantics.
//!
//! Each session gets its own directory with a journal and snapshots.
//! Concurrency: Mutex for write serialization, no global mutable state.
//!
//! Apply-then-persist order:
//!   1. engine.execute(caller, op)  (a rejected operation stops here)
//!   2. journal.append(entry)  (only if step 1 succeeded)
//!   3. snapshot if interval reached
//!
//! If step 2 fails the journal trims any partial frame and the engine is
//! rolled back, so memory never runs ahead of the journal.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use safe_engine::{Account, EventEnvelope, LedgerConfig, LedgerError, LedgerState, Operation, SafeEngine};

use crate::journal::{Journal, JournalEntry, JournalError};
use crate::proto_bridge::{entry_to_proto, proto_to_entry, BridgeError};
use crate::replay::{self, ReplayError};
use crate::snapshot;
use crate::snapshot_codec::SnapshotError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("state hash: {0}")]
    Hash(#[from] serde_json::Error),

    #[error("session lock poisoned")]
    LockPoisoned,
}

/// Per-session settings. `deployer` and `ledger` define the genesis that
/// the journal replays onto, so they must not change over a session's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub deployer: Account,
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Write a snapshot every N sequences; 0 disables snapshots.
    #[serde(default)]
    pub snapshot_interval: u64,
}

impl SessionConfig {
    pub fn new(deployer: Account) -> Self {
        Self {
            deployer,
            ledger: LedgerConfig::default(),
            snapshot_interval: 0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// An isolated ledger with its own journal and snapshots.
pub struct Session {
    session_id: String,
    session_dir: PathBuf,
    config: SessionConfig,
    engine: SafeEngine,
    journal: Journal,
}

impl Session {
    /// Open (or create) a session.
    ///
    /// Directory structure:
    ///   <base_dir>/<session_id>/journal.log
    ///   <base_dir>/<session_id>/snapshots/
    ///
    /// Restores the latest verified snapshot and replays the journal tail;
    /// without a usable snapshot the whole journal is replayed.
    pub fn open(base_dir: &Path, session_id: &str, config: SessionConfig) -> Result<Self, SessionError> {
        let session_dir = base_dir.join(session_id);
        let journal = Journal::open(&session_dir.join("journal.log"))?;
        let entries = load_entries(&journal)?;

        let snapshot_dir = session_dir.join("snapshots");
        let mut engine = match restore_latest(&snapshot_dir, &config, journal.last_sequence())? {
            Some(engine) => engine,
            None => SafeEngine::new(config.ledger.clone(), &config.deployer),
        };
        let resume_from = engine.sequence();
        let tail: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|e| e.sequence > resume_from)
            .collect();
        replay::replay_onto(&mut engine, &tail)?;

        info!(
            "session {} opened at #{} ({} replayed)",
            session_id,
            engine.sequence(),
            tail.len()
        );
        Ok(Self {
            session_id: session_id.to_string(),
            session_dir,
            config,
            engine,
            journal,
        })
    }

    /// Execute an operation and persist it. Rejected operations are never
    /// journaled.
    pub fn execute(&mut self, caller: &Account, operation: &Operation) -> Result<EventEnvelope, SessionError> {
        let checkpoint = self.engine.clone();
        let envelope = self.engine.execute(caller, operation)?.clone();
        self.engine.drain_events();

        let proto = entry_to_proto(envelope.sequence, caller, operation);
        if let Err(err) = self.journal.append(&proto) {
            self.engine = checkpoint;
            return Err(err.into());
        }

        let interval = self.config.snapshot_interval;
        if interval > 0 && envelope.sequence % interval == 0 {
            // The operation is durable already; a failed snapshot only
            // lengthens the next replay.
            if let Err(err) = self.take_snapshot() {
                warn!("session {}: snapshot #{} failed: {}", self.session_id, envelope.sequence, err);
            }
        }
        Ok(envelope)
    }

    /// Write a snapshot of the current state.
    pub fn take_snapshot(&self) -> Result<PathBuf, SessionError> {
        let path = snapshot::save_snapshot(&self.snapshot_dir(), self.engine.sequence(), self.engine.state())?;
        Ok(path)
    }

    /// Discard in-memory state and rebuild from the full journal.
    pub fn replay_full(&mut self) -> Result<(LedgerState, String), SessionError> {
        let entries = load_entries(&self.journal)?;
        let engine = replay::rebuild_engine(&self.config.ledger, &self.config.deployer, &entries)?;
        let hash = engine.canonical_hash()?;
        self.engine = engine;
        Ok((self.engine.state().clone(), hash))
    }

    pub fn engine(&self) -> &SafeEngine {
        &self.engine
    }

    pub fn state(&self) -> &LedgerState {
        self.engine.state()
    }

    pub fn current_hash(&self) -> Result<String, SessionError> {
        Ok(self.engine.canonical_hash()?)
    }

    pub fn current_sequence(&self) -> u64 {
        self.engine.sequence()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.session_dir.join("snapshots")
    }
}

fn load_entries(journal: &Journal) -> Result<Vec<JournalEntry>, SessionError> {
    journal
        .load_all()?
        .iter()
        .map(|proto| proto_to_entry(proto).map_err(SessionError::from))
        .collect()
}

/// Engine restored from the newest snapshot that verifies and is not ahead
/// of the journal. Unusable snapshots are logged and skipped.
fn restore_latest(
    dir: &Path,
    config: &SessionConfig,
    journal_sequence: u64,
) -> Result<Option<SafeEngine>, SessionError> {
    for sequence in snapshot::list_snapshots(dir)?.into_iter().rev() {
        if sequence > journal_sequence {
            warn!("snapshot #{} is ahead of the journal (#{}); skipped", sequence, journal_sequence);
            continue;
        }
        let restored = snapshot::load_snapshot(dir, sequence)
            .and_then(|snap| snap.ok_or(SnapshotError::Io(missing(sequence))))
            .and_then(|snap| snap.restore_state());
        match restored {
            Ok(state) => {
                let engine = SafeEngine::from_state(state, config.ledger.clone(), sequence)?;
                return Ok(Some(engine));
            }
            Err(err) => warn!("snapshot #{} unusable: {}", sequence, err),
        }
    }
    Ok(None)
}

fn missing(sequence: u64) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::NotFound,
        snapshot::snapshot_file_name(sequence),
    )
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>, SessionError> {
        self.inner.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Execute under lock.
    pub fn execute(&self, caller: &Account, operation: &Operation) -> Result<EventEnvelope, SessionError> {
        self.lock()?.execute(caller, operation)
    }

    pub fn current_hash(&self) -> Result<String, SessionError> {
        self.lock()?.current_hash()
    }

    pub fn current_sequence(&self) -> Result<u64, SessionError> {
        Ok(self.lock()?.current_sequence())
    }

    /// Run a read-only query against the engine under lock.
    pub fn with_engine<T>(&self, query: impl FnOnce(&SafeEngine) -> T) -> Result<T, SessionError> {
        Ok(query(self.lock()?.engine()))
    }
}
