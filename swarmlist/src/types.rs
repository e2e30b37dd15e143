pub type RobotId = u32;
pub type SwarmMask = u8;
pub type Lamport = u8;
