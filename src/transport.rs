use pnet::packet::Packet;
use pnet::transport::{TransportReceiver, TransportSender};
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use crate::packet::{Family, Icmpv4, Icmpv6};

/// Size of the buffer incoming datagrams are read into
pub const RECV_BUFFER_SIZE: usize = 4096;

/// Raw datagram transport used by a ping session
///
/// Both operations block. Implementations are handed to the `Session` by value, which keeps the
/// transport alive for exactly the duration of the session.
pub trait Transport {
    /// Send the bytes of one ICMP message to `dest`
    fn send_to(&mut self, bytes: &[u8], dest: IpAddr) -> io::Result<usize>;

    /// Wait for the next ICMP message of any kind
    ///
    /// Returns the message with its IP header stripped and the address it came from.
    fn recv_from(&mut self) -> io::Result<(Vec<u8>, IpAddr)>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_to(&mut self, bytes: &[u8], dest: IpAddr) -> io::Result<usize> {
        (**self).send_to(bytes, dest)
    }

    fn recv_from(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        (**self).recv_from()
    }
}

/// Pre-assembled bytes handed to pnet's `TransportSender`
struct Datagram<'a>(&'a [u8]);

impl Packet for Datagram<'_> {
    fn packet(&self) -> &[u8] {
        self.0
    }

    fn payload(&self) -> &[u8] {
        &self.0[crate::packet::HEADER_LEN.min(self.0.len())..]
    }
}

/// Raw ICMP socket backed by a pnet transport channel
///
/// Opening the raw socket requires elevated privileges on most systems.
pub struct IcmpTransport {
    tx: TransportSender,
    rx: TransportReceiver,
    ipv6: bool,
    timeout: Option<Duration>,
}

impl IcmpTransport {
    /// Open new channel for packet transmission
    ///
    /// The protocol is picked from the IP version of `dest`: ICMP (1) for IPv4, ICMPv6 (58) for
    /// IPv6. A `timeout` of `None` makes every receive block until a datagram arrives.
    ///
    /// # Errors
    ///
    /// Errors during the construction of the pnet [`transport_channel`](tc) are transparently
    /// propagated back to the caller.
    ///
    /// [tc]: https://docs.rs/pnet/0.28.0/pnet/transport/fn.transport_channel.html
    pub fn open(dest: &IpAddr, timeout: Option<Duration>) -> io::Result<Self> {
        use pnet::transport::{self, TransportChannelType::*, TransportProtocol::*};

        trace!("Opening transport channel to transmit network packets");

        let protocol = match dest {
            IpAddr::V4(_) => Layer4(Ipv4(Icmpv4::PROTOCOL)),
            IpAddr::V6(_) => Layer4(Ipv6(Icmpv6::PROTOCOL)),
        };
        let (tx, rx) = transport::transport_channel(RECV_BUFFER_SIZE, protocol)?;

        Ok(Self {
            tx,
            rx,
            ipv6: dest.is_ipv6(),
            timeout,
        })
    }

    fn recv_v4(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        use pnet::transport::icmp_packet_iter;

        let mut incoming = icmp_packet_iter(&mut self.rx);
        let received = match self.timeout {
            Some(timeout) => incoming
                .next_with_timeout(timeout)?
                .ok_or_else(timed_out)?,
            None => incoming.next()?,
        };
        let (packet, addr) = received;
        Ok((packet.packet().to_vec(), addr))
    }

    fn recv_v6(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        use pnet::transport::icmpv6_packet_iter;

        let mut incoming = icmpv6_packet_iter(&mut self.rx);
        let received = match self.timeout {
            Some(timeout) => incoming
                .next_with_timeout(timeout)?
                .ok_or_else(timed_out)?,
            None => incoming.next()?,
        };
        let (packet, addr) = received;
        Ok((packet.packet().to_vec(), addr))
    }
}

fn timed_out() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "no reply received before timeout")
}

impl Transport for IcmpTransport {
    fn send_to(&mut self, bytes: &[u8], dest: IpAddr) -> io::Result<usize> {
        self.tx.send_to(Datagram(bytes), dest)
    }

    fn recv_from(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        if self.ipv6 {
            self.recv_v6()
        } else {
            self.recv_v4()
        }
    }
}
