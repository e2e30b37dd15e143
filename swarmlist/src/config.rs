use thiserror::Error;

use crate::types::Lamport;

/// Invalid replica configuration. Construction fails; there is no partial
/// recovery from a bad config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ticks_to_inactive must be at least 1")]
    ZeroTicksToInactive,

    #[error("lamport_threshold must be at least 1")]
    ZeroLamportThreshold,

    #[error("entries_per_message must be at least 1 when set")]
    ZeroEntriesPerMessage,

    #[error("entries_per_message {requested} exceeds the {capacity} entries a {packet_size}-byte packet can carry")]
    EntriesPerMessageTooLarge {
        requested: u16,
        capacity: u16,
        packet_size: u16,
    },

    #[error("packet size {packet_size} cannot fit a single gossip entry")]
    PacketTooSmall { packet_size: u16 },
}

/// Contains Config properties used by a swarmlist replica. All values are
/// captured once at construction and never change afterwards.
#[derive(Clone, Debug)]
pub struct SwarmlistConfig {
    /// Ticks without a fresher observation before an entry is considered
    /// inactive.
    pub ticks_to_inactive: u32,
    /// Entries carried per gossip packet. `None` derives the most that fit
    /// the transport's packet size.
    pub entries_per_message: Option<u16>,
    /// When false, aging is skipped entirely: entries stay active forever
    /// once learned.
    pub entries_become_inactive: bool,
    /// Maximum forward distance at which an incoming Lamport clock is still
    /// considered newer than a stored one.
    pub lamport_threshold: Lamport,
}

impl Default for SwarmlistConfig {
    fn default() -> Self {
        Self {
            ticks_to_inactive: 100,
            entries_per_message: None,
            entries_become_inactive: true,
            lamport_threshold: 50,
        }
    }
}

impl SwarmlistConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_to_inactive == 0 {
            return Err(ConfigError::ZeroTicksToInactive);
        }
        if self.lamport_threshold == 0 {
            return Err(ConfigError::ZeroLamportThreshold);
        }
        if self.entries_per_message == Some(0) {
            return Err(ConfigError::ZeroEntriesPerMessage);
        }
        Ok(())
    }
}
