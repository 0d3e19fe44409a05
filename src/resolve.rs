use std::error;
use std::fmt;
use std::io;
use std::net::IpAddr;

use super::Dest;

/// Resolved ping destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name as given by the user, kept for display
    pub host: String,
    pub addr: IpAddr,
}

/// Failures while turning a `Dest` into an address
#[derive(Debug)]
pub enum ResolveError {
    /// The host name is unknown
    Lookup { host: String, source: io::Error },

    /// The host has addresses, but none of the requested family
    FamilyMismatch { ipv6: bool },
}

impl ResolveError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            // EX_NOHOST
            Self::Lookup { .. } => 68,
            Self::FamilyMismatch { .. } => 1,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { host, .. } => write!(f, "cannot resolve {}: Unknown host", host),
            Self::FamilyMismatch { ipv6: true } => {
                write!(f, "host is IPv4 only but mode was set to IPv6")
            }
            Self::FamilyMismatch { ipv6: false } => {
                write!(f, "host is IPv6 only but mode was set to IPv4")
            }
        }
    }
}

impl error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Lookup { source, .. } => Some(source),
            Self::FamilyMismatch { .. } => None,
        }
    }
}

/// Resolve the destination to a single address of the requested family
///
/// IP addresses are taken as they are, the command line has already switched to IPv6 for IPv6
/// literals. Host names are looked up and the first address of the wanted family is picked.
///
/// # Errors
///
/// Fails if the dns lookup fails, which would usually occur if the user provided an invalid
/// destination, or if the host has no address of the requested family.
pub fn resolve(dest: &Dest, ipv6: bool) -> Result<Target, ResolveError> {
    match dest {
        Dest::Ip(addr) => Ok(Target {
            host: addr.to_string(),
            addr: *addr,
        }),
        Dest::Host(host) => {
            let addrs = dns_lookup::lookup_host(host).map_err(|source| ResolveError::Lookup {
                host: host.clone(),
                source,
            })?;
            debug!("Host {} resolved to {:?}", host, addrs);

            let addr = select_address(&addrs, ipv6).ok_or(ResolveError::FamilyMismatch { ipv6 })?;
            info!("Resolved host {} to IP {}", host, addr);

            Ok(Target {
                host: host.clone(),
                addr,
            })
        }
    }
}

/// Pick the first address of the requested family
pub fn select_address(addrs: &[IpAddr], ipv6: bool) -> Option<IpAddr> {
    addrs.iter().copied().find(|addr| addr.is_ipv6() == ipv6)
}
