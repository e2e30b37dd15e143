use crate::types::{Lamport, RobotId, SwarmMask};

/// One row of the swarmlist: what this robot currently knows about one
/// member of the swarm.
///
/// The timer (`time_to_inactive`) is purely local and never transmitted;
/// only the id, the payload mask and the Lamport clock cross the radio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    robot_id: RobotId,
    swarm_mask: SwarmMask,
    lamport: Lamport,
    time_to_inactive: u32,
}

impl Entry {
    /// Creates an entry with a freshly wound timer.
    pub fn new(
        robot_id: RobotId,
        swarm_mask: SwarmMask,
        lamport: Lamport,
        ticks_to_inactive: u32,
    ) -> Self {
        Self {
            robot_id,
            swarm_mask,
            lamport,
            time_to_inactive: ticks_to_inactive,
        }
    }

    pub fn robot_id(&self) -> RobotId {
        self.robot_id
    }

    pub fn swarm_mask(&self) -> SwarmMask {
        self.swarm_mask
    }

    pub fn lamport(&self) -> Lamport {
        self.lamport
    }

    pub fn time_to_inactive(&self) -> u32 {
        self.time_to_inactive
    }

    /// Whether the entry is active. The entry for the owning robot itself is
    /// always active, whatever its timer says.
    pub fn is_active(&self, owner_id: RobotId) -> bool {
        self.time_to_inactive != 0 || self.robot_id == owner_id
    }

    /// Removes one tick from the timer. Must not be called once the timer
    /// has run out.
    pub fn tick(&mut self) {
        debug_assert!(self.time_to_inactive != 0, "ticked an inactive entry");
        self.time_to_inactive -= 1;
    }

    /// Winds the timer back up to the configured maximum.
    pub fn reset_timer(&mut self, ticks_to_inactive: u32) {
        self.time_to_inactive = ticks_to_inactive;
    }

    pub fn set_swarm_mask(&mut self, swarm_mask: SwarmMask) {
        self.swarm_mask = swarm_mask;
    }

    pub fn set_lamport(&mut self, lamport: Lamport) {
        self.lamport = lamport;
    }

    /// Advances the entry's clock by one, wrapping at the width.
    pub fn increment_lamport(&mut self) {
        self.lamport = self.lamport.wrapping_add(1);
    }
}
