use log::{debug, trace, warn};

use crate::{
    census::SwarmCensus,
    config::{ConfigError, SwarmlistConfig},
    entry::Entry,
    lamport::lamport_newer_than,
    table::{EntryTable, TableError},
    transport::Transport,
    types::{RobotId, SwarmMask},
    wire::{self, WireEntry},
};

/// A robot's replica of the swarm membership list, plus the gossip machinery
/// that keeps it converging with every other replica in radio range.
///
/// The replica is driven from the outside: the host calls
/// [`control_step`](Swarmlist::control_step) exactly once per simulated
/// tick. Everything runs synchronously on the calling thread.
pub struct Swarmlist<T: Transport> {
    table: EntryTable,
    config: SwarmlistConfig,
    transport: T,
    entries_per_message: u16,

    num_msgs_tx: u64,
    num_msgs_rx: u64,
    num_msgs_malformed: u64,
}

impl<T: Transport> Swarmlist<T> {
    /// Creates a replica that knows only its owner. Fails on an invalid
    /// configuration or a transport whose packets cannot carry gossip.
    pub fn try_new(
        owner_id: RobotId,
        config: SwarmlistConfig,
        transport: T,
        census: SwarmCensus,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let packet_size = transport.packet_size();
        let capacity = wire::max_entries(packet_size);
        if capacity == 0 {
            return Err(ConfigError::PacketTooSmall { packet_size });
        }
        let entries_per_message = match config.entries_per_message {
            Some(requested) if requested > capacity => {
                return Err(ConfigError::EntriesPerMessageTooLarge {
                    requested,
                    capacity,
                    packet_size,
                });
            }
            Some(requested) => requested,
            None => capacity,
        };

        debug!(
            "swarmlist up for robot {owner_id}: {entries_per_message} entries per message, \
             {} ticks to inactive",
            config.ticks_to_inactive
        );

        Ok(Self {
            table: EntryTable::new(owner_id, config.ticks_to_inactive, census),
            config,
            transport,
            entries_per_message,
            num_msgs_tx: 0,
            num_msgs_rx: 0,
            num_msgs_malformed: 0,
        })
    }

    /// Creates a replica that knows only its owner.
    ///
    /// # Panics
    /// Panics on an invalid configuration; see [`try_new`](Swarmlist::try_new).
    pub fn new(
        owner_id: RobotId,
        config: SwarmlistConfig,
        transport: T,
        census: SwarmCensus,
    ) -> Self {
        Self::try_new(owner_id, config, transport, census)
            .expect("invalid swarmlist configuration")
    }

    /// Runs one simulated timestep: ages the timers, advances the owner's
    /// clock, broadcasts the next gossip chunk, then folds in whatever the
    /// radio has delivered since the previous step.
    pub fn control_step(&mut self) {
        if self.config.entries_become_inactive {
            self.table.age_entries();
        }
        self.table.increment_owner_lamport();
        self.send_swarm_chunk();
        while let Some(payload) = self.transport.receive() {
            self.receive_packet(&payload);
        }
    }

    /// Folds one delivered packet into the table. Malformed packets are
    /// dropped and counted; the periodic broadcast is the retry.
    pub fn receive_packet(&mut self, payload: &[u8]) {
        self.num_msgs_rx += 1;
        let entries = match wire::read_packet(payload) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("robot {}: dropping malformed gossip packet: {err}", self.owner_id());
                self.num_msgs_malformed += 1;
                return;
            }
        };
        for incoming in entries {
            self.merge(incoming);
        }
    }

    /// Clears the replica back to owner-only and zeroes every counter.
    pub fn reset(&mut self) {
        self.table.reset();
        self.num_msgs_tx = 0;
        self.num_msgs_rx = 0;
        self.num_msgs_malformed = 0;
    }

    /// Places the replica in a known consensus state: one entry per robot
    /// in `existing_robots`, every timer rewound to the maximum, and the
    /// send cursor re-seeded at random. Experiment harnesses use this to
    /// measure propagation latency from a synchronized start.
    pub fn force_consensus(&mut self, existing_robots: &[RobotId]) {
        self.table.force_consensus(existing_robots);
        self.table.randomize_cursor(&mut rand::thread_rng());
    }

    /// Updates the owner's shared payload. The owner's clock advances on
    /// the next control step, carrying the new mask to peers as a fresher
    /// observation.
    pub fn set_swarm_mask(&mut self, swarm_mask: SwarmMask) {
        self.table.set_owner_swarm_mask(swarm_mask);
    }

    // Observations

    pub fn owner_id(&self) -> RobotId {
        self.table.owner_id()
    }

    /// Total number of entries, active or not.
    pub fn size(&self) -> u32 {
        self.table.size()
    }

    /// Number of active entries; the owner always counts.
    pub fn num_active(&self) -> u32 {
        self.table.num_active()
    }

    pub fn get(&self, robot_id: RobotId) -> Result<&Entry, TableError> {
        self.table.get(robot_id)
    }

    pub fn is_active(&self, robot_id: RobotId) -> Result<bool, TableError> {
        let owner_id = self.owner_id();
        self.table.get(robot_id).map(|entry| entry.is_active(owner_id))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.table.entries()
    }

    /// Packets broadcast since construction or the last reset.
    pub fn num_msgs_tx(&self) -> u64 {
        self.num_msgs_tx
    }

    /// Packets received since construction or the last reset.
    pub fn num_msgs_rx(&self) -> u64 {
        self.num_msgs_rx
    }

    /// Received packets dropped because they could not be parsed.
    pub fn num_msgs_malformed(&self) -> u64 {
        self.num_msgs_malformed
    }

    /// Highest timer value any entry held right before an update rewound it.
    pub fn highest_tti(&self) -> u32 {
        self.table.highest_tti()
    }

    /// Mean timer value at the moment of update; zero before any update.
    pub fn average_tti(&self) -> f64 {
        self.table.average_tti()
    }

    pub fn config(&self) -> &SwarmlistConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Text dump of the table, one `id{elem}lamport{elem}tti{entry}` group
    /// per entry, in insertion order.
    pub fn serialize_data(&self, elem_delim: char, entry_delim: char) -> String {
        let mut out = String::new();
        for entry in self.table.entries() {
            out.push_str(&entry.robot_id().to_string());
            out.push(elem_delim);
            out.push_str(&entry.lamport().to_string());
            out.push(elem_delim);
            out.push_str(&entry.time_to_inactive().to_string());
            out.push(entry_delim);
        }
        out
    }

    /// Encodes the next chunk of the table and hands it to the radio. The
    /// cursor wraps, so a table smaller than the chunk repeats entries.
    fn send_swarm_chunk(&mut self) {
        let mut entries = Vec::with_capacity(self.entries_per_message as usize);
        for _ in 0..self.entries_per_message {
            let entry = self.table.next_to_send();
            entries.push(WireEntry {
                robot_id: entry.robot_id(),
                swarm_mask: entry.swarm_mask(),
                lamport: entry.lamport(),
            });
        }
        let payload = wire::write_packet(&entries, self.transport.packet_size());
        match self.transport.broadcast(&payload) {
            Ok(()) => self.num_msgs_tx += 1,
            Err(err) => warn!("robot {}: gossip broadcast failed: {err}", self.owner_id()),
        }
    }

    /// Merges one received observation under the Lamport freshness order.
    fn merge(&mut self, incoming: WireEntry) {
        if incoming.robot_id == self.owner_id() {
            // Own state is authoritative, never taken from the network.
            return;
        }

        let local_lamport = match self.table.get(incoming.robot_id) {
            Ok(local) => local.lamport(),
            Err(TableError::NotFound { .. }) => {
                debug!(
                    "robot {}: learned robot {} (lamport {})",
                    self.owner_id(),
                    incoming.robot_id,
                    incoming.lamport
                );
                self.table.set(Entry::new(
                    incoming.robot_id,
                    incoming.swarm_mask,
                    incoming.lamport,
                    self.config.ticks_to_inactive,
                ));
                return;
            }
        };

        if lamport_newer_than(incoming.lamport, local_lamport, self.config.lamport_threshold) {
            self.table
                .update(incoming.robot_id, incoming.swarm_mask, incoming.lamport);
        } else {
            trace!(
                "robot {}: stale gossip for robot {} ignored",
                self.owner_id(),
                incoming.robot_id
            );
        }
    }
}
