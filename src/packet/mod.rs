use pnet::packet::icmp::{IcmpType, IcmpTypes};
use pnet::packet::icmpv6::{Icmpv6Type, Icmpv6Types};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use std::fmt;
use std::marker::PhantomData;

use crate::error::PacketError;

pub mod checksum;
mod request;

pub use request::EchoRequest;

/// Size of the ICMP header preceding the message body: type, code and checksum
pub const HEADER_LEN: usize = 4;

/// Address family descriptor for ICMP messages
///
/// ICMP and ICMPv6 share the same echo layout and only differ in their type codes and in the IP
/// protocol number they are carried with. The full tables of type codes are provided by pnet's
/// [`IcmpTypes`](icmpty) and [`Icmpv6Types`](icmpv6ty).
///
/// [icmpty]: https://docs.rs/pnet/0.28.0/pnet/packet/icmp/IcmpTypes/index.html
/// [icmpv6ty]: https://docs.rs/pnet/0.28.0/pnet/packet/icmpv6/Icmpv6Types/index.html
pub trait Family {
    /// Type-field representation of this family
    type MessageType: Copy + fmt::Debug + PartialEq + Eq;

    /// IP protocol number carrying this family's messages
    const PROTOCOL: IpNextHeaderProtocol;

    const ECHO_REQUEST: Self::MessageType;
    const ECHO_REPLY: Self::MessageType;

    /// Byte offset of the checksum field, right after type and code
    const CHECKSUM_OFFSET: usize = 2;

    /// Raw value for the type field
    fn type_code(ty: Self::MessageType) -> u8;

    /// Interpret a raw type field
    fn message_type(code: u8) -> Self::MessageType;
}

/// ICMP over IPv4
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Icmpv4;

impl Family for Icmpv4 {
    type MessageType = IcmpType;

    const PROTOCOL: IpNextHeaderProtocol = IpNextHeaderProtocols::Icmp;
    const ECHO_REQUEST: IcmpType = IcmpTypes::EchoRequest;
    const ECHO_REPLY: IcmpType = IcmpTypes::EchoReply;

    fn type_code(ty: IcmpType) -> u8 {
        ty.0
    }

    fn message_type(code: u8) -> IcmpType {
        IcmpType::new(code)
    }
}

/// ICMPv6 over IPv6
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Icmpv6;

impl Family for Icmpv6 {
    type MessageType = Icmpv6Type;

    const PROTOCOL: IpNextHeaderProtocol = IpNextHeaderProtocols::Icmpv6;
    const ECHO_REQUEST: Icmpv6Type = Icmpv6Types::EchoRequest;
    const ECHO_REPLY: Icmpv6Type = Icmpv6Types::EchoReply;

    fn type_code(ty: Icmpv6Type) -> u8 {
        ty.0
    }

    fn message_type(code: u8) -> Icmpv6Type {
        Icmpv6Type::new(code)
    }
}

/// An assembled ICMP message
///
/// The `Packet` owns its wire representation. Once built, the raw bytes carry a finalized checksum
/// and can no longer be modified; a new `Packet` is assembled for every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<F: Family> {
    message_type: F::MessageType,
    message_code: u8,
    checksum: u16,
    raw: Vec<u8>,
    family: PhantomData<F>,
}

impl<F: Family> Packet<F> {
    /// Assemble a generic ICMP message
    ///
    /// The 4-byte header is followed by `payload` as is. Nothing about the payload is validated
    /// here, that is left to the specialized constructors such as
    /// [`echo_request`](#method.echo_request).
    ///
    /// # Errors
    ///
    /// Propagates the checksum engine's error. With the header always present this cannot occur
    /// for any payload.
    pub fn new(
        message_type: F::MessageType,
        message_code: u8,
        payload: &[u8],
    ) -> Result<Self, PacketError> {
        let mut raw = Vec::with_capacity(HEADER_LEN + payload.len());
        raw.extend_from_slice(&[F::type_code(message_type), message_code, 0, 0]);
        raw.extend_from_slice(payload);

        let (raw, checksum) = checksum::compute_and_insert(raw, F::CHECKSUM_OFFSET)?;

        Ok(Self {
            message_type,
            message_code,
            checksum: u16::from_le_bytes(checksum),
            raw,
            family: PhantomData,
        })
    }

    pub fn get_type(&self) -> F::MessageType {
        self.message_type
    }

    pub fn get_code(&self) -> u8 {
        self.message_code
    }

    /// Checksum as stored in the packet, read little-endian
    pub fn get_checksum(&self) -> u16 {
        self.checksum
    }

    /// Message body following the 4-byte header
    pub fn payload(&self) -> &[u8] {
        &self.raw[HEADER_LEN..]
    }

    /// Bytes ready for transmission
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Total message length, never shorter than the 4-byte header
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Consume the packet and hand over its wire representation
    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }
}

/// A received ICMP message
///
/// The reply only retains the key information of the message. It is not matched against the
/// outgoing request, any datagram received after a send counts as the answer to that probe.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReplyPacket {
    message_type: u8,
    code: u8,
    id: u16,
    seq: u16,
}

impl ReplyPacket {
    /// Read header, identifier and sequence number from a raw ICMP message
    ///
    /// Returns `None` if the message is too short to carry an echo header.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < EchoRequest::MIN_LENGTH {
            return None;
        }

        Some(Self {
            message_type: bytes[0],
            code: bytes[1],
            id: u16::from_be_bytes([bytes[4], bytes[5]]),
            seq: u16::from_be_bytes([bytes[6], bytes[7]]),
        })
    }

    /// Get the value of the message's type field
    pub fn get_type(&self) -> u8 {
        self.message_type
    }

    pub fn get_code(&self) -> u8 {
        self.code
    }

    /// Get the identifier of the message
    pub fn get_id(&self) -> u16 {
        self.id
    }

    /// Get the sequence number of the message
    pub fn get_sequence(&self) -> u16 {
        self.seq
    }

    /// Return `true` if the type field announces an echo reply of family `F`
    pub fn is_echo_reply<F: Family>(&self) -> bool {
        F::message_type(self.message_type) == F::ECHO_REPLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_packet_layout() {
        let packet =
            Packet::<Icmpv4>::new(IcmpTypes::TimestampReply, 0, &[1, 2, 3, 4, 5]).unwrap();
        let raw = packet.raw();

        assert_eq!(raw[0], 14);
        assert_eq!(raw[1], 0);
        assert_eq!(&raw[4..], &[1, 2, 3, 4, 5]);
        assert_eq!(packet.len(), HEADER_LEN + 5);
        assert_eq!(packet.payload(), &[1, 2, 3, 4, 5]);
        assert_eq!(packet.get_type(), IcmpTypes::TimestampReply);
        assert!(checksum::verify(raw));
    }

    #[test]
    fn empty_payload_is_header_only() {
        let packet = Packet::<Icmpv6>::new(Icmpv6Types::RouterSolicit, 0, &[]).unwrap();

        assert_eq!(packet.len(), HEADER_LEN);
        assert!(packet.payload().is_empty());
        assert_eq!(packet.raw()[0], 133);
    }

    #[test]
    fn stored_checksum_matches_field() {
        let packet = Packet::<Icmpv6>::new(Icmpv6Types::EchoReply, 3, b"abc").unwrap();
        let raw = packet.raw();

        assert_eq!(packet.get_checksum().to_le_bytes(), [raw[2], raw[3]]);
        assert_eq!(packet.get_code(), 3);
    }

    #[test]
    fn family_constants() {
        assert_eq!(Icmpv4::type_code(Icmpv4::ECHO_REQUEST), 8);
        assert_eq!(Icmpv4::type_code(Icmpv4::ECHO_REPLY), 0);
        assert_eq!(Icmpv6::type_code(Icmpv6::ECHO_REQUEST), 128);
        assert_eq!(Icmpv6::type_code(Icmpv6::ECHO_REPLY), 129);
        assert_eq!(Icmpv4::PROTOCOL, IpNextHeaderProtocols::Icmp);
        assert_eq!(Icmpv6::PROTOCOL.0, 58);
        assert_eq!(Icmpv4::CHECKSUM_OFFSET, Icmpv6::CHECKSUM_OFFSET);
    }

    #[test]
    fn parse_reply() {
        let bytes = [0u8, 0, 0x12, 0x34, 0xbe, 0xef, 0x00, 0x2a, 9, 9, 9];
        let reply = ReplyPacket::parse(&bytes).expect("Failed parsing reply");

        assert_eq!(reply.get_type(), 0);
        assert_eq!(reply.get_code(), 0);
        assert_eq!(reply.get_id(), 0xbeef);
        assert_eq!(reply.get_sequence(), 42);
        assert!(reply.is_echo_reply::<Icmpv4>());
        assert!(!reply.is_echo_reply::<Icmpv6>());
    }

    #[test]
    fn parse_truncated_reply() {
        assert_eq!(ReplyPacket::parse(&[129, 0, 0, 0, 1, 2, 3]), None);
    }
}
