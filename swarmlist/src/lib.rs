//! # Swarmlist
//! Each robot in a wireless swarm keeps a replica of the swarm's membership
//! list and gossips fixed-size chunks of it every tick. Replicas converge
//! under lossy broadcast and bounded bandwidth: freshness is decided by a
//! circular Lamport clock with a bounded forward window, and members that
//! fall silent age out of the active set without ever being forgotten.
//!
//! The crate is the replica only. The loop driver that ticks it and the
//! radio that moves its packets are the host's business; the replica
//! consumes a [`Transport`] and exposes a query surface.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod census;
mod config;
mod entry;
mod lamport;
mod replica;
mod table;
mod transport;
mod types;
mod wire;

pub use census::SwarmCensus;
pub use config::{ConfigError, SwarmlistConfig};
pub use entry::Entry;
pub use lamport::{lamport_newer_than, LamportValue};
pub use replica::Swarmlist;
pub use table::{EntryTable, TableError};
pub use transport::{Transport, TransportError};
pub use types::{Lamport, RobotId, SwarmMask};
pub use wire::{
    max_entries, read_packet, write_packet, PacketError, WireEntry, ENTRY_SIZE, HEADER_SIZE,
    LAMPORT_POS, ROBOT_ID_POS, SWARM_MASK_POS,
};
