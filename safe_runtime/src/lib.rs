#![forbid(unsafe_code)]

//! SAFE ledger: Runtime
//!
//! Wraps the `safe_engine` kernel with an operation journal, replay,
//! snapshots and session management.
//!
//! No domain logic lives here: all transitions and invariants
//! are delegated to the kernel.

pub mod proto_types;
pub mod proto_bridge;
pub mod journal;
pub mod replay;
pub mod snapshot;
pub mod snapshot_codec;
pub mod session;
