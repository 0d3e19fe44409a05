//! Command line interface

use clap::{Arg, ArgMatches, ErrorKind};
use std::error::Error;
use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use super::{Config, Dest};
use crate::error::PacketError;
use crate::logger::StdLogger;
use crate::packet::EchoRequest;

/// Application initialization
pub struct App;

impl App {
    /// Define CLI interface here
    fn definition() -> clap::App<'static, 'static> {
        clap_app!(pingo =>
			(version: crate_version!())
			(author: "Michael Prantl <michael.prantl@hotmail.de")
			(about: "Send ICMP echo requests to a host or address")
			(@arg destination: +required "Host name or destination address")
			(@arg verbose: -v --verbose "Sets the level of verbosity")
			(@arg count: -c --count +takes_value "Number of echo requests to send (default 4)")
			(@arg interval: -i --interval +takes_value "Waits between sending packets (in ms)")
			(@arg timeout: -o --timeout +takes_value "Sets timeout for replies (in ms)")
			(@arg size: -s --size +takes_value "Sets ICMP message size (in Bytes)"))
        .arg(
            Arg::with_name("ipv6")
                .short("6")
                .long("ipv6")
                .help("Use IPv6"),
        )
    }

    /// Retrieve user input from command line
    ///
    /// The user can modify the following parameters of the application:
    /// - destination: Either as IP address or domain name (required)
    /// - count: The number of echo requests to send (default 4)
    /// - ipv6: Resolve host names to IPv6 addresses (implied by an IPv6 destination)
    /// - interval: The pause between a reply and the next request (default 1,000ms)
    /// - timeout: How long to wait for a reply (default None, waits forever)
    /// - size: The total ICMP message size per packet, at least 8 (default 56 bytes)
    ///
    /// # Errors
    ///
    /// Usage errors as well as help and version requests are returned as clap errors. Use
    /// [`exit_code`](#method.exit_code) to tell them apart.
    pub fn parse_args() -> Result<Config, Box<dyn Error>> {
        Self::from_matches(&Self::definition().get_matches_safe()?)
    }

    /// Process exit code for an error returned while parsing
    ///
    /// Help and version output is a successful run, everything else is a usage error (EX_USAGE).
    pub fn exit_code(e: &(dyn Error + 'static)) -> i32 {
        match e.downcast_ref::<clap::Error>() {
            Some(e) if matches!(e.kind, ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed) => 0,
            _ => 64,
        }
    }

    /// Parse configuration from the given arguments, the first being the binary name
    ///
    /// # Errors
    ///
    /// Returns an error for invalid arguments instead of exiting.
    pub fn parse_from<I, T>(args: I) -> Result<Config, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::definition().get_matches_from_safe(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches<'_>) -> Result<Config, Box<dyn Error>> {
        let verbose = matches.is_present("verbose");
        StdLogger::init(verbose);

        let count = matches.value_of("count").unwrap_or("4").parse::<usize>()?;

        // Default for interval is 1 sec
        let interval = matches
            .value_of("interval")
            .unwrap_or("1000")
            .parse::<u64>()
            .map(Duration::from_millis)?;

        // Default for timeout is None
        let timeout = match matches.value_of("timeout") {
            Some(val) => Some(Duration::from_millis(val.parse::<u64>()?)),
            None => None,
        };

        let dest = match matches.value_of("destination") {
            Some(val) => Self::parse_dest(val),
            None => return Err("missing destination".into()),
        };

        // An IPv6 literal switches to IPv6 without the flag
        let ipv6 = match dest {
            Dest::Ip(IpAddr::V6(_)) => true,
            Dest::Ip(IpAddr::V4(_)) => {
                if matches.is_present("ipv6") {
                    warn!("Destination is an IPv4 address, ignoring --ipv6");
                }
                false
            }
            Dest::Host(_) => matches.is_present("ipv6"),
        };

        // Default for message size is 56 Bytes
        let size = matches.value_of("size").unwrap_or("56").parse::<usize>()?;
        if size < EchoRequest::MIN_LENGTH {
            return Err(PacketError::InvalidLength { requested: size }.into());
        }
        if size > 1472 {
            warn!("Beware of the Maximum Transmission Unit supported by your network device");
            warn!("If you do not receive any responses, try a smaller packet size");
        }

        trace!("Parsed configuration.");

        Ok(Config {
            dest,
            ipv6,
            count,
            interval,
            timeout,
            size,
        })
    }

    /// If the input provided is not a valid IP address, it is taken as host name and will fail
    /// during dns resolution if it is unknown.
    fn parse_dest(val: &str) -> Dest {
        if let Ok(ip) = val.parse::<Ipv4Addr>() {
            return Dest::Ip(IpAddr::V4(ip));
        };
        if let Ok(ip) = val.parse::<Ipv6Addr>() {
            return Dest::Ip(IpAddr::V6(ip));
        };
        Dest::Host(val.to_string())
    }
}
