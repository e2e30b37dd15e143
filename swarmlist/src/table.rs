use std::collections::HashMap;

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::{
    census::SwarmCensus,
    entry::Entry,
    types::{Lamport, RobotId, SwarmMask},
};

/// Errors raised by entry table queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The queried robot has never been gossiped to this replica.
    #[error("robot {robot_id} is not in the swarmlist")]
    NotFound { robot_id: RobotId },
}

/// Dense, insertion-ordered table of entries with O(1) id lookup.
///
/// The table owns everything that moves in lockstep with its rows: the
/// active-entry count (published to the shared census as deltas), the
/// round-robin send cursor, and the timer statistics recorded on each
/// freshness update. Entries are never removed; a timer that runs out only
/// demotes its entry to inactive, so a later, fresher clock can re-activate
/// it in place.
pub struct EntryTable {
    owner_id: RobotId,
    ticks_to_inactive: u32,
    entries: Vec<Entry>,
    id_to_index: HashMap<RobotId, usize>,

    num_active: u32,
    next_index: usize,

    highest_tti: u32,
    tti_sum: u64,
    num_updates: u32,

    census: SwarmCensus,
}

impl EntryTable {
    pub(crate) fn new(owner_id: RobotId, ticks_to_inactive: u32, census: SwarmCensus) -> Self {
        let mut table = Self {
            owner_id,
            ticks_to_inactive,
            entries: Vec::new(),
            id_to_index: HashMap::new(),
            num_active: 0,
            next_index: 0,
            highest_tti: 0,
            tti_sum: 0,
            num_updates: 0,
            census,
        };
        table.set(Entry::new(owner_id, 0, 0, ticks_to_inactive));
        table
    }

    pub fn owner_id(&self) -> RobotId {
        self.owner_id
    }

    /// Total number of entries, active or not.
    pub fn size(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Number of active entries. The owner always counts.
    pub fn num_active(&self) -> u32 {
        self.num_active
    }

    /// Looks an entry up by robot id.
    pub fn get(&self, robot_id: RobotId) -> Result<&Entry, TableError> {
        match self.index_of(robot_id) {
            Some(index) => Ok(&self.entries[index]),
            None => Err(TableError::NotFound { robot_id }),
        }
    }

    /// Entry by position, in insertion order. The encoder walks the table
    /// through this accessor; it sees snapshots, not internals.
    pub fn entry_at(&self, index: usize) -> &Entry {
        &self.entries[index]
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Highest timer value any entry held right before an update rewound it.
    pub fn highest_tti(&self) -> u32 {
        self.highest_tti
    }

    /// Mean timer value at the moment of update, over all updates so far.
    /// Zero while no update has been recorded.
    pub fn average_tti(&self) -> f64 {
        if self.num_updates == 0 {
            return 0.0;
        }
        self.tti_sum as f64 / f64::from(self.num_updates)
    }

    /// Adds a new entry or replaces an existing one wholesale, keeping the
    /// id map and the active count consistent.
    pub(crate) fn set(&mut self, entry: Entry) {
        let robot_id = entry.robot_id();
        let now_active = entry.is_active(self.owner_id);
        let was_active = match self.index_of(robot_id) {
            Some(index) => {
                let was = self.entries[index].is_active(self.owner_id);
                self.entries[index] = entry;
                was
            }
            None => {
                self.id_to_index.insert(robot_id, self.entries.len());
                self.entries.push(entry);
                false
            }
        };

        if now_active && !was_active {
            self.add_active(1);
        } else if was_active && !now_active {
            self.remove_active(1);
        }
    }

    /// Applies a fresher observation to an existing entry: snapshots the
    /// running timer into the statistics, stores the new payload and clock,
    /// and rewinds the timer. Re-activates the entry if it had gone
    /// inactive.
    pub(crate) fn update(&mut self, robot_id: RobotId, swarm_mask: SwarmMask, lamport: Lamport) {
        let Some(index) = self.index_of(robot_id) else {
            panic!("update for robot {robot_id} which has no entry");
        };

        if robot_id != self.owner_id {
            let tti = self.entries[index].time_to_inactive();
            self.highest_tti = self.highest_tti.max(tti);
            self.tti_sum += u64::from(tti);
            self.num_updates += 1;
        }

        let owner_id = self.owner_id;
        let ticks_to_inactive = self.ticks_to_inactive;
        let entry = &mut self.entries[index];
        let was_active = entry.is_active(owner_id);
        entry.set_swarm_mask(swarm_mask);
        entry.set_lamport(lamport);
        entry.reset_timer(ticks_to_inactive);
        if !was_active {
            self.add_active(1);
        }
    }

    /// One aging pass: every non-owner timer still running loses a tick;
    /// timers that run out demote their entry to inactive.
    pub(crate) fn age_entries(&mut self) {
        let owner_id = self.owner_id;
        let mut expired = 0;
        for entry in &mut self.entries {
            if entry.robot_id() == owner_id || entry.time_to_inactive() == 0 {
                continue;
            }
            entry.tick();
            if entry.time_to_inactive() == 0 {
                debug!("robot {} went inactive", entry.robot_id());
                expired += 1;
            }
        }
        if expired > 0 {
            self.remove_active(expired);
        }
    }

    /// Advances the owner's clock by one. Runs once per tick, so the clock
    /// doubles as a tick counter modulo its width.
    pub(crate) fn increment_owner_lamport(&mut self) {
        let index = self.owner_index();
        self.entries[index].increment_lamport();
    }

    pub(crate) fn set_owner_swarm_mask(&mut self, swarm_mask: SwarmMask) {
        let index = self.owner_index();
        self.entries[index].set_swarm_mask(swarm_mask);
    }

    /// Snapshot of the entry under the send cursor; advances the cursor,
    /// wrapping past the end of the table.
    pub(crate) fn next_to_send(&mut self) -> Entry {
        let entry = self.entries[self.next_index].clone();
        self.next_index += 1;
        if self.next_index >= self.entries.len() {
            self.next_index = 0;
        }
        entry
    }

    pub(crate) fn randomize_cursor(&mut self, rng: &mut impl Rng) {
        self.next_index = rng.gen_range(0..self.entries.len());
    }

    /// Ensures one entry per given robot, rewinds every timer to the
    /// maximum, and re-activates whatever had expired.
    pub(crate) fn force_consensus(&mut self, existing_robots: &[RobotId]) {
        for &robot_id in existing_robots {
            if self.index_of(robot_id).is_none() {
                self.set(Entry::new(robot_id, 0, 0, self.ticks_to_inactive));
            }
        }

        let ticks_to_inactive = self.ticks_to_inactive;
        let mut revived = 0;
        for entry in &mut self.entries {
            if entry.time_to_inactive() == 0 {
                revived += 1;
            }
            entry.reset_timer(ticks_to_inactive);
        }
        if revived > 0 {
            self.add_active(revived);
        }
    }

    /// Clears the table back to owner-only and zeroes the statistics.
    pub(crate) fn reset(&mut self) {
        self.census.sub(u64::from(self.num_active));
        self.entries.clear();
        self.id_to_index.clear();
        self.num_active = 0;
        self.next_index = 0;
        self.highest_tti = 0;
        self.tti_sum = 0;
        self.num_updates = 0;
        self.set(Entry::new(self.owner_id, 0, 0, self.ticks_to_inactive));
    }

    fn index_of(&self, robot_id: RobotId) -> Option<usize> {
        let index = *self.id_to_index.get(&robot_id)?;
        let stored = self.entries[index].robot_id();
        if stored != robot_id {
            panic!("swarmlist table corrupt: id map sends robot {robot_id} to an entry for robot {stored}");
        }
        Some(index)
    }

    fn owner_index(&self) -> usize {
        let Some(index) = self.index_of(self.owner_id) else {
            panic!("swarmlist table corrupt: owner entry missing");
        };
        index
    }

    fn add_active(&mut self, count: u32) {
        self.num_active += count;
        self.census.add(u64::from(count));
    }

    fn remove_active(&mut self, count: u32) {
        self.num_active -= count;
        self.census.sub(u64::from(count));
    }
}

impl Drop for EntryTable {
    fn drop(&mut self) {
        self.census.sub(u64::from(self.num_active));
    }
}
