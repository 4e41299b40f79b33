/// SAFE ledger: Canonical Hashing
///
/// Deterministic serialization + SHA-256 of the ledger state.
///
/// Rules:
///   - `ledger_version` first, then the state
///   - all maps are BTreeMaps (sorted by key), zero entries are never stored
///   - scalars as decimal strings, no whitespace

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::LedgerState;
use crate::LEDGER_VERSION;

/// Canonical UTF-8 JSON bytes of `state`.
pub fn canonical_serialize(state: &LedgerState) -> Result<Vec<u8>, serde_json::Error> {
    let mut root = Map::new();
    root.insert(
        "ledger_version".to_string(),
        Value::Number(LEDGER_VERSION.into()),
    );
    root.insert("state".to_string(), serde_json::to_value(state)?);
    serde_json::to_vec(&Value::Object(root))
}

/// Lowercase hex SHA-256 of `canonical_serialize(state)`.
pub fn canonical_hash(state: &LedgerState) -> Result<String, serde_json::Error> {
    let bytes = canonical_serialize(state)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::domain::Account;
    use crate::state::create_initial_state;
    use crate::units::Rad;

    #[test]
    fn test_hash_is_stable_and_hex() {
        let state = create_initial_state(&LedgerConfig::default(), &Account::from("gov"));
        let h1 = canonical_hash(&state).unwrap();
        let h2 = canonical_hash(&state.clone()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_version_leads_serialization() {
        let state = create_initial_state(&LedgerConfig::default(), &Account::from("gov"));
        let text = String::from_utf8(canonical_serialize(&state).unwrap()).unwrap();
        assert!(text.starts_with("{\"ledger_version\":1,"));
    }

    #[test]
    fn test_hash_tracks_changes() {
        let mut state = create_initial_state(&LedgerConfig::default(), &Account::from("gov"));
        let before = canonical_hash(&state).unwrap();
        state.global_debt_ceiling = Rad::one();
        assert_ne!(before, canonical_hash(&state).unwrap());
    }
}
