use thiserror::Error;

use crate::types::{Lamport, RobotId, SwarmMask};

/// Size of one entry slot on the wire.
pub const ENTRY_SIZE: u16 = 6;
/// Offset of the robot id inside a slot (4 bytes, little-endian).
pub const ROBOT_ID_POS: usize = 0;
/// Offset of the swarm mask inside a slot.
pub const SWARM_MASK_POS: usize = 4;
/// Offset of the Lamport clock inside a slot.
pub const LAMPORT_POS: usize = 5;
/// Leading byte carrying the number of occupied slots. The count header is
/// what lets a decoder tell a real entry for robot 0 apart from padding.
pub const HEADER_SIZE: u16 = 1;

/// A received packet that cannot be parsed. Policy: drop it, count it,
/// carry on; the periodic broadcast is the retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("{len}-byte packet is too short for its count header")]
    MissingHeader { len: usize },

    #[error("{len}-byte packet cannot hold the {count} entries its header claims")]
    Truncated { len: usize, count: u8 },
}

/// One entry as it crosses the radio: the slice of an entry that peers care
/// about. Timers are local and never transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireEntry {
    pub robot_id: RobotId,
    pub swarm_mask: SwarmMask,
    pub lamport: Lamport,
}

/// Most entry slots a packet of the given size can carry. Capped at 255 by
/// the one-byte count header.
pub fn max_entries(packet_size: u16) -> u16 {
    (packet_size.saturating_sub(HEADER_SIZE) / ENTRY_SIZE).min(u8::MAX as u16)
}

/// Lays `entries` out at fixed offsets in a zero-filled buffer of exactly
/// `packet_size` bytes, count header first.
pub fn write_packet(entries: &[WireEntry], packet_size: u16) -> Vec<u8> {
    debug_assert!(
        entries.len() <= max_entries(packet_size) as usize,
        "{} entries do not fit a {}-byte packet",
        entries.len(),
        packet_size
    );

    let mut payload = vec![0u8; packet_size as usize];
    payload[0] = entries.len() as u8;
    for (slot, entry) in entries.iter().enumerate() {
        let base = HEADER_SIZE as usize + slot * ENTRY_SIZE as usize;
        payload[base + ROBOT_ID_POS..base + ROBOT_ID_POS + 4]
            .copy_from_slice(&entry.robot_id.to_le_bytes());
        payload[base + SWARM_MASK_POS] = entry.swarm_mask;
        payload[base + LAMPORT_POS] = entry.lamport;
    }
    payload
}

/// Parses the occupied slots of a received packet. Padding past the counted
/// slots is ignored.
pub fn read_packet(payload: &[u8]) -> Result<Vec<WireEntry>, PacketError> {
    let Some(&count) = payload.first() else {
        return Err(PacketError::MissingHeader { len: payload.len() });
    };

    let needed = HEADER_SIZE as usize + count as usize * ENTRY_SIZE as usize;
    if payload.len() < needed {
        return Err(PacketError::Truncated {
            len: payload.len(),
            count,
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    for slot in 0..count as usize {
        let base = HEADER_SIZE as usize + slot * ENTRY_SIZE as usize;
        let id_bytes = payload[base + ROBOT_ID_POS..base + ROBOT_ID_POS + 4]
            .try_into()
            .expect("slot bounds were checked against the payload length");
        entries.push(WireEntry {
            robot_id: RobotId::from_le_bytes(id_bytes),
            swarm_mask: payload[base + SWARM_MASK_POS],
            lamport: payload[base + LAMPORT_POS],
        });
    }
    Ok(entries)
}
