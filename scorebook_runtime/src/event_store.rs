//! Append-only command store: binary protobuf log.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - strict append only, no mutation, deletion or reordering
//!   - fsync after every write
//!   - sequence strictly increasing from 1 (validated on append and on read)

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;
use tracing::{debug, trace};

use scorebook_engine::events::EventEnvelope;

use crate::error::{RuntimeError, RuntimeResult};
use crate::proto_bridge::proto_to_command;
use crate::proto_types::ProtoCommandEnvelope;

/// Largest frame accepted when reading the log back.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Append-only command log backed by a binary file.
pub struct EventStore {
    path: PathBuf,
    last_sequence: u64,
}

impl EventStore {
    /// Open or create a command log at the given path.
    /// Reads existing frames to determine the last sequence number.
    pub fn open(path: &Path) -> RuntimeResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_sequence = if path.exists() {
            let frames = Self::read_all_from_file(path)?;
            frames.last().map(|e| e.sequence).unwrap_or(0)
        } else {
            0
        };
        debug!(path = %path.display(), last_sequence, "command log opened");

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
        })
    }

    /// Append a single frame to the log.
    ///
    /// Validates strict sequence ordering, writes the length-prefixed
    /// protobuf and fsyncs.
    pub fn append_event(&mut self, event: &ProtoCommandEnvelope) -> RuntimeResult<()> {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(RuntimeError::Sequence {
                expected,
                got: event.sequence,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let buf = event.encode_to_vec();
        let len = buf.len() as u32;

        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(&buf)?;
            writer.flush()?;
        }
        file.sync_all()?;

        self.last_sequence = event.sequence;
        trace!(sequence = event.sequence, bytes = len, "frame appended");
        Ok(())
    }

    /// Load all raw frames from the log in sequence order.
    pub fn load_all_events(&self) -> RuntimeResult<Vec<ProtoCommandEnvelope>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path)
    }

    /// Load and decode every command in the log.
    pub fn load_all_commands(&self) -> RuntimeResult<Vec<EventEnvelope>> {
        self.load_all_events()?
            .iter()
            .map(proto_to_command)
            .collect()
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all frames from a file, validating frame integrity and
    /// sequence contiguity.
    fn read_all_from_file(path: &Path) -> RuntimeResult<Vec<ProtoCommandEnvelope>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut frames = Vec::new();
        let mut len_buf = [0u8; 4];

        loop {
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME_LEN {
                return Err(RuntimeError::CorruptLog(format!(
                    "invalid frame length {len} after {} frames",
                    frames.len()
                )));
            }

            let mut frame = vec![0u8; len];
            reader.read_exact(&mut frame).map_err(|e| {
                RuntimeError::CorruptLog(format!("truncated frame {}: {e}", frames.len() + 1))
            })?;

            let event = ProtoCommandEnvelope::decode(frame.as_slice())?;
            let expected = frames.len() as u64 + 1;
            if event.sequence != expected {
                return Err(RuntimeError::CorruptLog(format!(
                    "frame {expected} carries sequence {}",
                    event.sequence
                )));
            }
            frames.push(event);
        }

        Ok(frames)
    }
}
