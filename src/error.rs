use std::error;
use std::fmt;
use std::io;

/// Failures while assembling an ICMP packet
///
/// Packet construction fails fast: if any of these is returned, no bytes have been produced that
/// could end up on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// The buffer cannot hold a 2-byte checksum field at the requested offset
    BufferTooShort { len: usize, offset: usize },

    /// An echo message needs at least 8 bytes: 4 header bytes plus identifier and sequence
    InvalidLength { requested: usize },
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooShort { len, offset } => write!(
                f,
                "buffer of {} bytes cannot hold a checksum field at offset {}",
                len, offset
            ),
            Self::InvalidLength { requested } => write!(
                f,
                "minimum message length is 8 bytes, {} bytes were requested",
                requested
            ),
        }
    }
}

impl error::Error for PacketError {}

/// Errors surfaced by a ping session
#[derive(Debug)]
pub enum Error {
    /// The echo request could not be built
    Packet(PacketError),

    /// Sending or receiving on the raw transport failed
    Transport(io::Error),
}

impl Error {
    /// Return `true` if this error originates from the transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packet(e) => write!(f, "packet construction failed: {}", e),
            Self::Transport(e) => write!(f, "transport failed: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Packet(e) => Some(e),
            Self::Transport(e) => Some(e),
        }
    }
}

impl From<PacketError> for Error {
    fn from(e: PacketError) -> Self {
        Self::Packet(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Transport(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_message() {
        let e = PacketError::InvalidLength { requested: 7 };
        assert_eq!(
            e.to_string(),
            "minimum message length is 8 bytes, 7 bytes were requested"
        );
    }

    #[test]
    fn transport_error_keeps_source() {
        use std::error::Error as _;

        let e = Error::from(io::Error::new(io::ErrorKind::Other, "unplugged"));
        assert!(e.is_transport());
        assert_eq!(e.source().unwrap().to_string(), "unplugged");
    }
}
