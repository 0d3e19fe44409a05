use super::{Family, Packet, HEADER_LEN};
use crate::error::PacketError;

/// Parameters of an echo request message
///
/// The identifier stays fixed for a session, the sequence number counts the probes. `length` is
/// the total length of the ICMP message including its header; everything beyond the first 8 bytes
/// is filler taken from `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest<'a> {
    pub identifier: u16,
    pub sequence: u16,
    pub length: usize,
    pub pattern: &'a [u8],
}

impl EchoRequest<'_> {
    /// Header, identifier and sequence number
    pub const MIN_LENGTH: usize = 8;

    /// Check the requested length without building anything
    ///
    /// # Errors
    ///
    /// Returns `PacketError::InvalidLength` if `length` is shorter than
    /// [`MIN_LENGTH`](#associatedconstant.MIN_LENGTH).
    pub fn validate(&self) -> Result<(), PacketError> {
        if self.length < Self::MIN_LENGTH {
            return Err(PacketError::InvalidLength {
                requested: self.length,
            });
        }
        Ok(())
    }

    /// Lay out the message body following the ICMP header
    ///
    /// Identifier and sequence number are written in network byte order. The filler repeats the
    /// pattern end-to-end and truncates the last repetition. An empty pattern leaves the filler
    /// zeroed.
    fn body(&self) -> Result<Vec<u8>, PacketError> {
        self.validate()?;

        let mut body = vec![0u8; self.length - HEADER_LEN];
        body[0..2].copy_from_slice(&self.identifier.to_be_bytes());
        body[2..4].copy_from_slice(&self.sequence.to_be_bytes());

        for (byte, fill) in body[4..].iter_mut().zip(self.pattern.iter().cycle()) {
            *byte = *fill;
        }
        Ok(body)
    }
}

impl<F: Family> Packet<F> {
    /// Create new echo request packet for family `F`
    ///
    /// The type field is set to the family's echo request code (8 for ICMP, 128 for ICMPv6), the
    /// code field is zeroed. The resulting message is exactly `request.length` bytes long.
    ///
    /// # Errors
    ///
    /// Fails with `PacketError::InvalidLength` if fewer than 8 bytes are requested. No packet is
    /// produced in that case.
    pub fn echo_request(request: &EchoRequest<'_>) -> Result<Self, PacketError> {
        let body = request.body()?;
        Self::new(F::ECHO_REQUEST, 0, &body)
    }
}
