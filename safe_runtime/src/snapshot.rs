//! Snapshot layer: deterministic, sequence-numbered state snapshots.
//!
//! Snapshots hold the ledger's canonical JSON plus its hash, so a snapshot
//! verifies against `SafeEngine::canonical_hash` directly.
//! No timestamps in snapshot content (determinism).
//!
//! A snapshot that fails verification is skipped in favour of replay.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use safe_engine::hashing::{canonical_serialize, hex_digest};
use safe_engine::{LedgerState, LEDGER_VERSION};

use crate::snapshot_codec::{restore_state, SnapshotError};

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number of the last operation folded into the state.
    pub sequence: u64,
    /// Canonical JSON of the state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    /// Ledger format version at snapshot time.
    pub ledger_version: u32,
}

/// The canonical document written by `canonical_serialize`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CanonicalDocument {
    ledger_version: u32,
    state: LedgerState,
}

impl Snapshot {
    pub fn capture(sequence: u64, state: &LedgerState) -> Result<Self, SnapshotError> {
        let bytes = canonical_serialize(state).map_err(SnapshotError::Serialization)?;
        let hash = hex_digest(&bytes);
        Ok(Self {
            sequence,
            canonical_json: String::from_utf8(bytes)?,
            hash,
            ledger_version: LEDGER_VERSION,
        })
    }

    /// Check the recorded hash and version, decode the state and validate
    /// its invariants.
    pub fn restore_state(&self) -> Result<LedgerState, SnapshotError> {
        if !verify_snapshot_hash(self) {
            return Err(SnapshotError::HashMismatch {
                sequence: self.sequence,
                recorded: self.hash.clone(),
                computed: hex_digest(self.canonical_json.as_bytes()),
            });
        }
        let document: CanonicalDocument = serde_json::from_str(&self.canonical_json)
            .map_err(SnapshotError::Deserialization)?;
        for found in [self.ledger_version, document.ledger_version] {
            if found != LEDGER_VERSION {
                return Err(SnapshotError::VersionMismatch {
                    found,
                    expected: LEDGER_VERSION,
                });
            }
        }
        restore_state(document.state)
    }
}

pub fn snapshot_file_name(sequence: u64) -> String {
    format!("snapshot_{:06}.json", sequence)
}

/// Save a deterministic snapshot of `state` at `sequence`.
pub fn save_snapshot(dir: &Path, sequence: u64, state: &LedgerState) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let snap = Snapshot::capture(sequence, state)?;
    let content = serde_json::to_string(&snap).map_err(SnapshotError::Serialization)?;

    let path = dir.join(snapshot_file_name(sequence));
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    info!("snapshot #{} written to {}", sequence, path.display());
    Ok(path)
}

/// Load the snapshot at `sequence`; `None` if there is none.
pub fn load_snapshot(dir: &Path, sequence: u64) -> Result<Option<Snapshot>, SnapshotError> {
    let path = dir.join(snapshot_file_name(sequence));
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let snap = serde_json::from_str(&content).map_err(SnapshotError::Deserialization)?;
    Ok(Some(snap))
}

/// Sequence numbers of every snapshot file in `dir`, ascending.
pub fn list_snapshots(dir: &Path) -> Result<Vec<u64>, SnapshotError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut sequences = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if let Some(seq) = name
            .strip_prefix("snapshot_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok())
        {
            sequences.push(seq);
        }
    }
    sequences.sort_unstable();
    Ok(sequences)
}

/// Load the snapshot with the highest sequence number.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    match list_snapshots(dir)?.last() {
        Some(&seq) => load_snapshot(dir, seq),
        None => Ok(None),
    }
}

/// True if the recorded hash matches the canonical JSON content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    hex_digest(snap.canonical_json.as_bytes()) == snap.hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use safe_engine::{Account, LedgerConfig, SafeEngine};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("safe_snapshot_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn engine() -> SafeEngine {
        let gov = Account::from("gov");
        let mut engine = SafeEngine::new(LedgerConfig::default(), &gov);
        engine.initialize_type(&gov, &"ETH-A".into()).unwrap();
        engine
    }

    #[test]
    fn snapshot_hash_is_the_ledger_hash() {
        let engine = engine();
        let snap = Snapshot::capture(1, engine.state()).unwrap();
        assert_eq!(snap.hash, engine.canonical_hash().unwrap());
        assert_eq!(snap.restore_state().unwrap(), *engine.state());
    }

    #[test]
    fn latest_snapshot_wins() {
        let dir = scratch("latest");
        let engine = engine();
        save_snapshot(&dir, 2, engine.state()).unwrap();
        save_snapshot(&dir, 10, engine.state()).unwrap();
        fs::write(dir.join("notes.txt"), b"ignored").unwrap();

        assert_eq!(list_snapshots(&dir).unwrap(), vec![2, 10]);
        let latest = load_latest_snapshot(&dir).unwrap().unwrap();
        assert_eq!(latest.sequence, 10);
        assert!(dir.join("snapshot_000010.json").exists());
    }

    #[test]
    fn tampered_snapshot_is_refused() {
        let mut snap = Snapshot::capture(3, engine().state()).unwrap();
        snap.canonical_json = snap.canonical_json.replace("ETH-A", "ETH-B");
        assert!(!verify_snapshot_hash(&snap));
        assert!(matches!(
            snap.restore_state(),
            Err(SnapshotError::HashMismatch { sequence: 3, .. })
        ));
    }

    #[test]
    fn missing_directory_has_no_snapshot() {
        assert!(load_latest_snapshot(&scratch("absent")).unwrap().is_none());
    }
}
