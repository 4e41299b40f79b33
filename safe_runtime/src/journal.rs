//! Append-only operation journal: binary protobuf log.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - Strict append only: no mutation, no deletion, no reordering
//!   - fsync after every write
//!   - Sequence strictly increasing, no gaps (validated on append and load)
//!   - Only operations the ledger committed are ever written

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use prost::Message;
use thiserror::Error;

use safe_engine::{Account, Operation};

use crate::proto_types::ProtoJournalEntry;

/// Upper bound on a single frame.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O: {0}")]
    Io(#[from] io::Error),

    #[error("sequence violation in journal: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("invalid frame length {len} at offset {offset}")]
    FrameLength { len: usize, offset: u64 },

    #[error("truncated frame at offset {offset}")]
    Truncated { offset: u64 },

    #[error("protobuf decode error at offset {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: prost::DecodeError,
    },
}

/// A committed operation as the ledger saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub sequence: u64,
    pub caller: Account,
    pub operation: Operation,
}

/// Append-only operation log backed by a binary file.
pub struct Journal {
    path: PathBuf,
    last_sequence: u64,
}

impl Journal {
    /// Open or create a journal at the given path.
    /// Reads existing frames to determine the last sequence number.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            let entries = Self::read_all_from_file(path)?;
            entries.last().map(|e| e.sequence).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    /// Append a single entry. Its sequence must be `last_sequence() + 1`.
    pub fn append(&mut self, entry: &ProtoJournalEntry) -> Result<(), JournalError> {
        let expected = self.last_sequence + 1;
        if entry.sequence != expected {
            return Err(JournalError::SequenceGap {
                expected,
                got: entry.sequence,
            });
        }

        let buf = entry.encode_to_vec();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let start = file.metadata()?.len();

        // The reader refuses such frames, so they must never reach the disk.
        if buf.len() > MAX_FRAME_LEN {
            return Err(JournalError::FrameLength {
                len: buf.len(),
                offset: start,
            });
        }

        append_frame(&mut file, start, &buf, write_frame)?;

        self.last_sequence = entry.sequence;
        debug!("journal {}: appended #{}", self.path.display(), entry.sequence);
        Ok(())
    }

    /// Load all entries in sequence order.
    pub fn load_all(&self) -> Result<Vec<ProtoJournalEntry>, JournalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every frame, validating frame integrity and sequence continuity.
    pub fn read_all_from_file(path: &Path) -> Result<Vec<ProtoJournalEntry>, JournalError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut entries: Vec<ProtoJournalEntry> = Vec::new();
        let mut len_buf = [0u8; 4];
        let mut offset: u64 = 0;

        loop {
            let mut filled = 0;
            while filled < len_buf.len() {
                let n = reader.read(&mut len_buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            match filled {
                0 => break,
                4 => {}
                _ => return Err(JournalError::Truncated { offset }),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME_LEN {
                return Err(JournalError::FrameLength { len, offset });
            }

            let mut frame = vec![0u8; len];
            reader.read_exact(&mut frame).map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => JournalError::Truncated { offset },
                _ => JournalError::Io(e),
            })?;

            let entry = ProtoJournalEntry::decode(frame.as_slice())
                .map_err(|source| JournalError::Decode { offset, source })?;

            let expected = entries.last().map(|e| e.sequence).unwrap_or(0) + 1;
            if entry.sequence != expected {
                return Err(JournalError::SequenceGap {
                    expected,
                    got: entry.sequence,
                });
            }

            offset += 4 + len as u64;
            entries.push(entry);
        }

        Ok(entries)
    }
}

fn write_frame(file: &mut File, buf: &[u8]) -> io::Result<()> {
    let len = buf.len() as u32;
    {
        let mut writer = BufWriter::new(&mut *file);
        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(buf)?;
        writer.flush()?;
    }
    file.sync_all()
}

/// Run `write`; on failure cut the file back to `start` so no partial or
/// unacknowledged frame survives.
fn append_frame<W>(file: &mut File, start: u64, buf: &[u8], write: W) -> Result<(), JournalError>
where
    W: FnOnce(&mut File, &[u8]) -> io::Result<()>,
{
    if let Err(err) = write(file, buf) {
        if let Err(trim) = file.set_len(start).and_then(|_| file.sync_all()) {
            warn!("could not trim journal back to {} bytes: {}", start, trim);
        }
        return Err(err.into());
    }
    Ok(())
}
