//! # PINGO ping application
//!
//! This crate provides the components of a UNIX ping application. Its core is the ICMP packet
//! model and the echo exchange loop:
//! - `packet` assembles ICMP and ICMPv6 messages and computes the Internet checksum
//! - `session` drives a ping session, one echo request at a time, and measures round-trip times
//! - `transport` abstracts the raw socket the session talks through
//!
//! Command line parsing, host name resolution and logging live in `cli`, `resolve` and `logger`.
//! Each packet is timestamped right before it is passed down to the transport and again right
//! after a datagram has been handed back.

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::net::IpAddr;
use std::time::Duration;

pub mod cli;
pub mod error;
pub mod logger;
pub mod packet;
pub mod resolve;
pub mod session;
pub mod transport;

pub use error::{Error, PacketError};
pub use session::{ProbeResult, Report, Session, SessionConfig};

/// Application configuration
///
/// The `Config` is produced by the command line interface and split into what resolution, the
/// transport and the session need.
#[derive(Debug)]
pub struct Config {
    pub dest: Dest,
    pub ipv6: bool,
    pub count: usize,
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub size: usize,
}

impl Config {
    /// Session parameters derived from this configuration
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            count: self.count,
            length: self.size,
            interval: self.interval,
            ..SessionConfig::default()
        }
    }
}

/// Destination for ping
///
/// The user can choose to either provide an IP-address or a host name as destination for the ping.
/// Host names are resolved before the session starts, IP addresses are used as they are.
#[derive(Debug, PartialEq, Eq)]
pub enum Dest {
    Ip(IpAddr),
    Host(String),
}
