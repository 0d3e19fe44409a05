use pingo::packet::checksum;
use pingo::transport::Transport;
use pingo::{Error, Session, SessionConfig};
use std::collections::VecDeque;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Answers each request with a scripted datagram
struct Scripted {
    replies: VecDeque<io::Result<(Vec<u8>, IpAddr)>>,
    sent: Vec<Vec<u8>>,
}

impl Scripted {
    fn new(replies: Vec<io::Result<(Vec<u8>, IpAddr)>>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            sent: Vec::new(),
        }
    }
}

impl Transport for Scripted {
    fn send_to(&mut self, bytes: &[u8], _dest: IpAddr) -> io::Result<usize> {
        self.sent.push(bytes.to_vec());
        Ok(bytes.len())
    }

    fn recv_from(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::TimedOut, "script ended")))
    }
}

fn dest() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))
}

fn config(count: usize) -> SessionConfig {
    SessionConfig {
        count,
        interval: Duration::from_millis(0),
        ..SessionConfig::default()
    }
}

#[test]
fn every_sent_packet_is_a_valid_echo_request() {
    let reply = (vec![0u8; 64], dest());
    let mut transport = Scripted::new(vec![Ok(reply.clone()), Ok(reply.clone()), Ok(reply)]);

    let report = Session::with_identifier(&mut transport, dest(), config(3), 0x0102)
        .unwrap()
        .run(|_| ());

    assert!(report.is_complete());
    assert_eq!(transport.sent.len(), 3);
    for (seq, packet) in transport.sent.iter().enumerate() {
        assert_eq!(packet.len(), 56);
        assert_eq!(packet[0], 8);
        assert_eq!(packet[1], 0);
        assert_eq!(&packet[4..8], &[0x01, 0x02, 0x00, seq as u8]);
        assert_eq!(&packet[8..21], b"Hello, Papa! ");
        assert!(checksum::verify(packet));
    }
}

#[test]
fn stray_datagrams_are_recorded_as_replies() {
    // A destination unreachable message carries no echo fields of this session
    let stray = vec![3u8, 1, 0, 0, 0, 0, 0, 0, 0x45, 0];
    let source = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));
    let mut transport = Scripted::new(vec![Ok((stray, source))]);

    let report = Session::new(&mut transport, dest(), config(1))
        .unwrap()
        .run(|_| ());

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.bytes, 10);
    assert_eq!(result.source, source);
    assert_eq!(result.reply.map(|r| r.get_type()), Some(3));
}

#[test]
fn partial_results_survive_receive_failure() {
    let mut transport = Scripted::new(vec![
        Ok((vec![0u8; 56], dest())),
        Err(io::Error::new(io::ErrorKind::Other, "interface went away")),
    ]);

    let mut seen = 0;
    let report = Session::new(&mut transport, dest(), config(4))
        .unwrap()
        .run(|_| seen += 1);

    assert_eq!(seen, 1);
    assert_eq!(report.results.len(), 1);
    match report.error {
        Some(Error::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(transport.sent.len(), 2);
}

#[test]
fn iterating_yields_probes_lazily() {
    let mut transport = Scripted::new(vec![Ok((vec![0u8; 8], dest())), Ok((vec![0u8; 8], dest()))]);
    let mut session = Session::new(&mut transport, dest(), config(2)).unwrap();

    let first = session.next().unwrap().unwrap();
    assert_eq!(first.sequence, 0);
    assert_eq!(session.results().len(), 1);

    let rest: Vec<_> = session.by_ref().collect();
    assert_eq!(rest.len(), 1);
    assert!(session.next().is_none());
}
