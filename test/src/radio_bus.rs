//! In-memory broadcast medium for multi-replica tests.
//! Routes every broadcast to every other participant without network I/O,
//! optionally dropping packets to simulate a lossy channel.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::Rng;
use swarmlist::{Transport, TransportError};

struct BusState {
    inboxes: Vec<VecDeque<Vec<u8>>>,
    drop_probability: f32,
}

/// A lossy broadcast bus connecting any number of replicas.
///
/// Clones share the same channel; call [`join`](RadioBus::join) once per
/// participant to get the [`Transport`] endpoint to hand its replica.
#[derive(Clone)]
pub struct RadioBus {
    state: Arc<Mutex<BusState>>,
    packet_size: u16,
}

impl RadioBus {
    pub fn new(packet_size: u16, drop_probability: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                inboxes: Vec::new(),
                drop_probability,
            })),
            packet_size,
        }
    }

    /// Attaches one more participant and returns its endpoint.
    pub fn join(&self) -> BusTransport {
        let mut state = self.state.lock().unwrap();
        state.inboxes.push(VecDeque::new());
        BusTransport {
            bus: self.clone(),
            slot: state.inboxes.len() - 1,
        }
    }
}

/// One participant's endpoint on a [`RadioBus`]. Broadcasts fan out to every
/// other inbox; a sender never hears its own packets.
pub struct BusTransport {
    bus: RadioBus,
    slot: usize,
}

impl Transport for BusTransport {
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let mut state = self.bus.state.lock().unwrap();
        let drop_probability = state.drop_probability;
        let slot = self.slot;
        let mut rng = rand::thread_rng();
        for (index, inbox) in state.inboxes.iter_mut().enumerate() {
            if index == slot {
                continue;
            }
            if drop_probability > 0.0 && rng.gen::<f32>() < drop_probability {
                continue;
            }
            inbox.push_back(payload.to_vec());
        }
        Ok(())
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        self.bus.state.lock().unwrap().inboxes[self.slot].pop_front()
    }

    fn packet_size(&self) -> u16 {
        self.bus.packet_size
    }

    fn drop_probability(&self) -> f32 {
        self.bus.state.lock().unwrap().drop_probability
    }
}

#[cfg(test)]
mod tests {
    use super::RadioBus;
    use swarmlist::Transport;

    #[test]
    fn broadcasts_reach_everyone_but_the_sender() {
        let bus = RadioBus::new(13, 0.0);
        let mut a = bus.join();
        let mut b = bus.join();
        let mut c = bus.join();

        a.broadcast(&[1, 2, 3]).unwrap();
        assert_eq!(a.receive(), None);
        assert_eq!(b.receive(), Some(vec![1, 2, 3]));
        assert_eq!(c.receive(), Some(vec![1, 2, 3]));
        assert_eq!(b.receive(), None);
    }

    #[test]
    fn a_fully_lossy_bus_delivers_nothing() {
        let bus = RadioBus::new(13, 1.0);
        let mut a = bus.join();
        let mut b = bus.join();

        a.broadcast(&[9]).unwrap();
        assert_eq!(b.receive(), None);
        assert_eq!(b.drop_probability(), 1.0);
    }
}
