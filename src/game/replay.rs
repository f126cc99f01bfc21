//! Action logs.
//!
//! A game is fully determined by its configuration, the seating names, the
//! seed and the accepted actions. `encode` packs the action records into a
//! small versioned binary blob with `bincode`; `GameSession::replay`
//! rebuilds a session by processing them again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ActionRecord, ConfigError, GameConfig};

use super::session::GameSession;

/// Magic bytes identifying an action log.
const MAGIC: &[u8; 4] = b"18XX";

/// Current format version.
const VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("not an action log")]
    BadMagic,

    #[error("unsupported log version {0}")]
    Version(u8),

    #[error("serialization failed: {0}")]
    Serialize(#[from] bincode::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("action {sequence} ({action}) was rejected: {reason}")]
    Rejected {
        sequence: u32,
        action: &'static str,
        reason: String,
    },
}

#[derive(Serialize, Deserialize)]
struct ActionLog {
    seed: u64,
    records: Vec<ActionRecord>,
}

/// Serialize a seed and action records.
pub fn encode(seed: u64, records: &[ActionRecord]) -> Result<Vec<u8>, ReplayError> {
    let log = ActionLog {
        seed,
        records: records.to_vec(),
    };
    let mut bytes = MAGIC.to_vec();
    bytes.push(VERSION);
    bytes.extend(bincode::serialize(&log)?);
    Ok(bytes)
}

/// Read back what `encode` wrote.
pub fn decode(bytes: &[u8]) -> Result<(u64, Vec<ActionRecord>), ReplayError> {
    if bytes.len() < MAGIC.len() + 1 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ReplayError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != VERSION {
        return Err(ReplayError::Version(version));
    }
    let log: ActionLog = bincode::deserialize(&bytes[MAGIC.len() + 1..])?;
    Ok((log.seed, log.records))
}

impl GameSession {
    /// Rebuild a session from its seed and accepted actions.
    pub fn replay(
        config: GameConfig,
        names: &[&str],
        seed: u64,
        records: &[ActionRecord],
    ) -> Result<Self, ReplayError> {
        let mut session = GameSession::new(config, names, seed)?;
        for record in records {
            session
                .try_process(record.player, &record.action)
                .map_err(|e| ReplayError::Rejected {
                    sequence: record.sequence,
                    action: record.action.name(),
                    reason: e.to_string(),
                })?;
        }
        Ok(session)
    }

    /// Encode this session's history.
    pub fn save(&self) -> Result<Vec<u8>, ReplayError> {
        encode(self.seed(), self.history())
    }
}
