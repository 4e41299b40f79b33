//! Snapshot Codec: deterministic LedgerState encoder/decoder.
//!
//! Pure codec layer. No side-effects, no timestamps, no envelope.
//!
//! - `encode_snapshot`:  LedgerState → JSON string
//! - `decode_snapshot`:  JSON string → LedgerState (strict, no defaults)
//! - `restore_snapshot`: decode + invariant validation
//! - `export_snapshot_to_file` / `import_snapshot_from_file`: file I/O
//! - `snapshot_hash`:    SHA-256 of the JSON encoding (lowercase hex)

use std::fs;
use std::io;
use std::path::Path;
use std::string::FromUtf8Error;

use thiserror::Error;

use safe_engine::hashing::hex_digest;
use safe_engine::invariants::{validate_invariants, InvariantViolation};
use safe_engine::LedgerState;

/// All possible snapshot failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Malformed JSON, missing fields or unknown fields.
    #[error("snapshot deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("snapshot violates ledger invariants: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("snapshot I/O: {0}")]
    Io(#[from] io::Error),

    #[error("canonical JSON is not UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("snapshot #{sequence} hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch {
        sequence: u64,
        recorded: String,
        computed: String,
    },

    #[error("snapshot written by ledger version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Encode a LedgerState to JSON. BTreeMaps keep the key order sorted.
pub fn encode_snapshot(state: &LedgerState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Serialization)
}

/// Strict decode: unknown fields and missing fields are errors. No
/// invariant validation; use `restore_snapshot` for validated loading.
pub fn decode_snapshot(json: &str) -> Result<LedgerState, SnapshotError> {
    serde_json::from_str::<LedgerState>(json).map_err(SnapshotError::Deserialization)
}

/// Validate an already-decoded state against the ledger invariants.
pub fn restore_state(state: LedgerState) -> Result<LedgerState, SnapshotError> {
    validate_invariants(&state)?;
    Ok(state)
}

/// Decode and validate. The entry point for untrusted input.
pub fn restore_snapshot(json: &str) -> Result<LedgerState, SnapshotError> {
    restore_state(decode_snapshot(json)?)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Byte-for-byte identical across identical states.
pub fn export_snapshot_to_file(state: &LedgerState, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(state)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_snapshot_from_file(path: &Path) -> Result<LedgerState, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of `encode_snapshot(state)`, i.e. of an exported file's bytes.
///
/// Not the ledger's `canonical_hash`, which also binds the ledger version.
pub fn snapshot_hash(state: &LedgerState) -> Result<String, SnapshotError> {
    let json = encode_snapshot(state)?;
    Ok(hex_digest(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use safe_engine::units::WadDelta;
    use safe_engine::{Account, CollateralTag, LedgerConfig, Rad, SafeEngine};

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("safe_snapshot_codec_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    /// A ledger with one initialized type and some free collateral.
    fn make_test_state() -> LedgerState {
        let gov = Account::from("gov");
        let tag = CollateralTag::from("ETH-A");
        let mut engine = SafeEngine::new(LedgerConfig::default(), &gov);
        engine.initialize_type(&gov, &tag).unwrap();
        engine
            .credit_collateral(&gov, &tag, &Account::from("alice"), WadDelta::from_units(7))
            .unwrap();
        engine.state().clone()
    }

    #[test]
    fn roundtrip_produces_identical_json() {
        let state = make_test_state();
        let json1 = encode_snapshot(&state).unwrap();
        let decoded = decode_snapshot(&json1).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(json1, encode_snapshot(&decoded).unwrap());
    }

    #[test]
    fn unbalanced_supply_is_an_invariant_violation() {
        let mut state = make_test_state();
        state.global_debt = Rad::one();
        let json = encode_snapshot(&state).unwrap();
        match restore_snapshot(&json) {
            Err(SnapshotError::Invariant(violation)) => assert_eq!(violation.tag, "coin_supply"),
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }

    #[test]
    fn file_roundtrip_matches() {
        let state = make_test_state();
        let path = scratch("file_roundtrip").join("state.json");
        export_snapshot_to_file(&state, &path).unwrap();
        assert_eq!(import_snapshot_from_file(&path).unwrap(), state);

        let file_bytes = fs::read(&path).unwrap();
        assert_eq!(snapshot_hash(&state).unwrap(), hex_digest(&file_bytes));
    }

    #[test]
    fn corrupted_file_returns_deserialization_error() {
        let dir = scratch("corrupted");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        fs::write(&path, b"{ not valid json !!!}").unwrap();
        assert!(matches!(
            import_snapshot_from_file(&path),
            Err(SnapshotError::Deserialization(_))
        ));
    }

    #[test]
    fn missing_field_returns_deserialization_error() {
        assert!(matches!(
            decode_snapshot(r#"{"collateral_types":{}}"#),
            Err(SnapshotError::Deserialization(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = scratch("missing").join("nope.json");
        assert!(matches!(import_snapshot_from_file(&path), Err(SnapshotError::Io(_))));
    }
}
