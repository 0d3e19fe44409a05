use std::iter::FusedIterator;
use std::net::IpAddr;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::packet::{EchoRequest, Icmpv4, Icmpv6, Packet, ReplyPacket};
use crate::transport::Transport;

/// Filler content of outgoing echo requests
pub const DEFAULT_PATTERN: &[u8] = b"Hello, Papa! ";

/// Ping session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of echo requests to send
    pub count: usize,

    /// Total length of each ICMP message, header included
    pub length: usize,

    pub pattern: Vec<u8>,

    /// Pause between a recorded reply and the next request
    pub interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            count: 4,
            length: 56,
            pattern: DEFAULT_PATTERN.to_vec(),
            interval: Duration::from_secs(1),
        }
    }
}

/// Progress of a ping session
///
/// `Sending` and `AwaitingReply` only hold while a call to `next` is blocked inside the exchange.
/// Between calls a session is `Idle`, `Recorded` or `Terminated`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Sending,
    AwaitingReply,
    Recorded,
    Terminated,
}

/// One measured round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Sequence number of the request this result was recorded for
    pub sequence: u16,

    /// Size of the received ICMP message
    pub bytes: usize,

    pub source: IpAddr,

    /// Time from handing the request to the transport until a datagram came back
    pub elapsed: Duration,

    /// Send time relative to the first request of the session
    pub sent_at: Duration,

    /// Header fields of the received message, if it was long enough to carry them
    ///
    /// These are informational only. The received message is not checked against the request, so
    /// a stray ICMP message arriving in between is recorded as the reply.
    pub reply: Option<ReplyPacket>,
}

impl ProbeResult {
    /// Round-trip time in fractional milliseconds
    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000f64
    }
}

/// Outcome of a complete session
#[derive(Debug)]
pub struct Report {
    /// Results in the order the requests were sent
    pub results: Vec<ProbeResult>,

    /// The failure that ended the session early, if any
    pub error: Option<Error>,
}

impl Report {
    /// Return `true` if the session ran through all requested probes
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Echo exchange loop
///
/// A `Session` sends one echo request at a time, blocks until the transport hands back a datagram
/// and records the time in between. It is an iterator over the measured probes: each call to
/// `next` runs one full exchange, sleeping for the configured interval first if a probe has
/// already been recorded. The iterator ends after `count` probes or right after yielding the first
/// transport error. Nothing is retried.
///
/// # Limitations
///
/// Any datagram received after a send is taken as the reply, identifier and sequence number are
/// not compared. With a transport that never times out, a lost reply blocks the session forever.
pub struct Session<T: Transport> {
    transport: T,
    dest: IpAddr,
    config: SessionConfig,
    identifier: u16,
    sequence: u16,
    sent: usize,
    started: Option<Instant>,
    state: State,
    results: Vec<ProbeResult>,
}

impl<T: Transport> Session<T> {
    /// Set up a session with a random identifier
    ///
    /// # Errors
    ///
    /// Returns `Error::Packet` if the configured message length is below the 8-byte minimum. No
    /// I/O has happened at that point.
    pub fn new(transport: T, dest: IpAddr, config: SessionConfig) -> Result<Self, Error> {
        Self::with_identifier(transport, dest, config, rand::random::<u16>())
    }

    /// Set up a session with a fixed identifier
    pub fn with_identifier(
        transport: T,
        dest: IpAddr,
        config: SessionConfig,
        identifier: u16,
    ) -> Result<Self, Error> {
        EchoRequest {
            identifier,
            sequence: 0,
            length: config.length,
            pattern: &config.pattern,
        }
        .validate()?;

        info!(
            "New session to {} with identifier {:#06x}, {} probes of {} bytes",
            dest, identifier, config.count, config.length
        );

        Ok(Self {
            transport,
            dest,
            config,
            identifier,
            sequence: 0,
            sent: 0,
            started: None,
            state: State::Idle,
            results: Vec::with_capacity(4),
        })
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Probes recorded so far
    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    /// Run the session to its end
    ///
    /// `on_probe` is called with every result as soon as it is recorded. The returned `Report`
    /// holds all results, including those recorded before a transport failure.
    pub fn run<F>(mut self, mut on_probe: F) -> Report
    where
        F: FnMut(&ProbeResult),
    {
        let mut error = None;
        while let Some(outcome) = self.next() {
            match outcome {
                Ok(result) => on_probe(&result),
                Err(e) => error = Some(e),
            }
        }

        trace!("Session ended after {} probes", self.results.len());

        Report {
            results: self.results,
            error,
        }
    }

    /// Assemble the next echo request for the destination's address family
    fn build_request(&self) -> Result<Vec<u8>, Error> {
        let request = EchoRequest {
            identifier: self.identifier,
            sequence: self.sequence,
            length: self.config.length,
            pattern: &self.config.pattern,
        };

        let raw = match self.dest {
            IpAddr::V4(_) => Packet::<Icmpv4>::echo_request(&request)?.into_raw(),
            IpAddr::V6(_) => Packet::<Icmpv6>::echo_request(&request)?.into_raw(),
        };
        Ok(raw)
    }

    /// Send one request and wait for one datagram
    fn exchange(&mut self) -> Result<ProbeResult, Error> {
        let raw = self.build_request()?;

        self.state = State::Sending;
        self.sent += 1;

        // Stop time and send packet out into the aether
        let start = Instant::now();
        let sent_at = start.duration_since(*self.started.get_or_insert(start));
        if let Err(e) = self.transport.send_to(&raw, self.dest) {
            warn!("Error occurred during send of echo request {}: {}", self.sequence, e);
            return Err(e.into());
        }

        self.state = State::AwaitingReply;
        let (bytes, source) = match self.transport.recv_from() {
            Ok(received) => received,
            Err(e) => {
                warn!("Error occurred while waiting for reply {}: {}", self.sequence, e);
                return Err(e.into());
            }
        };
        let elapsed = start.elapsed();

        let result = ProbeResult {
            sequence: self.sequence,
            bytes: bytes.len(),
            source,
            elapsed,
            sent_at,
            reply: ReplyPacket::parse(&bytes),
        };
        debug!(
            "Recorded probe {} from {} after {:?}",
            result.sequence, source, elapsed
        );

        self.results.push(result.clone());
        self.sequence = self.sequence.wrapping_add(1);
        Ok(result)
    }
}

impl<T: Transport> Iterator for Session<T> {
    type Item = Result<ProbeResult, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Terminated {
            return None;
        }
        if self.sent >= self.config.count {
            self.state = State::Terminated;
            return None;
        }
        if self.state == State::Recorded && self.config.interval > Duration::from_secs(0) {
            thread::sleep(self.config.interval);
        }

        let outcome = self.exchange();
        self.state = match outcome {
            Ok(_) => State::Recorded,
            Err(_) => State::Terminated,
        };
        Some(outcome)
    }
}

impl<T: Transport> FusedIterator for Session<T> {}
