use thiserror::Error;

/// Errors surfaced by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The payload could not be handed to the radio.
    #[error("failed to broadcast a {len}-byte packet: {reason}")]
    SendFailed { len: usize, reason: String },
}

/// The radio a replica gossips through.
///
/// Implementations frame and deliver fixed-size packets over a best-effort
/// broadcast medium. Received packets are polled from the replica's own
/// thread; there are no callbacks to register and no peer addressing.
pub trait Transport {
    /// Enqueues one packet for broadcast. `payload` is exactly
    /// [`packet_size`](Transport::packet_size) bytes.
    fn broadcast(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Next packet delivered to this participant, if any.
    fn receive(&mut self) -> Option<Vec<u8>>;

    /// Fixed radio frame payload size, in bytes.
    fn packet_size(&self) -> u16;

    /// Probability in `[0, 1]` that the medium drops a packet. Informational
    /// only; the transport applies the drops itself.
    fn drop_probability(&self) -> f32 {
        0.0
    }
}
