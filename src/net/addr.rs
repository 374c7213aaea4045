//! Module with [`SocketAddress`].

use std::fmt;
use std::net::{AddrParseError, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

/// An IPv4 socket address.
///
/// The address is stored in its binary form: a 4-byte IPv4 address followed by
/// a 2-byte port, both in network byte order. [`to_bytes`] and [`from_bytes`]
/// convert from and to this layout.
///
/// Equality compares the binary form, i.e. two addresses are equal if both the
/// IP address and the port are equal.
///
/// [`to_bytes`]: SocketAddress::to_bytes
/// [`from_bytes`]: SocketAddress::from_bytes
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
///
/// use fiberio::net::SocketAddress;
///
/// let address = SocketAddress::new(Ipv4Addr::new(10, 0, 0, 5), 8080);
/// let mask = SocketAddress::new(Ipv4Addr::new(255, 255, 255, 0), 0);
///
/// let broadcast = address.broadcast(&mask);
/// assert_eq!(broadcast.to_string(), "10.0.0.255:8080");
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SocketAddress {
    /// IP address in `[0..4]`, port in `[4..6]`.
    bytes: [u8; 6],
}

impl SocketAddress {
    /// Size of the binary form in bytes.
    pub const SIZE: usize = 6;

    /// Create a new `SocketAddress`.
    pub const fn new(ip: Ipv4Addr, port: u16) -> SocketAddress {
        let [a, b, c, d] = ip.octets();
        let [p1, p2] = port.to_be_bytes();
        SocketAddress {
            bytes: [a, b, c, d, p1, p2],
        }
    }

    /// Create a `SocketAddress` from its binary form.
    pub const fn from_bytes(bytes: [u8; SocketAddress::SIZE]) -> SocketAddress {
        SocketAddress { bytes }
    }

    /// Returns the binary form of the address.
    pub const fn to_bytes(&self) -> [u8; SocketAddress::SIZE] {
        self.bytes
    }

    /// Returns the IP address.
    pub const fn ip(&self) -> Ipv4Addr {
        let [a, b, c, d, _, _] = self.bytes;
        Ipv4Addr::new(a, b, c, d)
    }

    /// Returns the port.
    pub const fn port(&self) -> u16 {
        u16::from_be_bytes([self.bytes[4], self.bytes[5]])
    }

    /// Returns a copy of the address with the port set to `port`.
    pub const fn with_port(&self, port: u16) -> SocketAddress {
        SocketAddress::new(self.ip(), port)
    }

    /// Returns the broadcast address of the network described by this address
    /// and the network `mask`.
    ///
    /// All host bits, i.e. the bits not set in `mask`, are set in the returned
    /// address. The port of the mask is ignored, the port of `self` is kept.
    pub const fn broadcast(&self, mask: &SocketAddress) -> SocketAddress {
        let mut bytes = self.bytes;
        let mut i = 0;
        while i < 4 {
            bytes[i] |= !mask.bytes[i];
            i += 1;
        }
        SocketAddress { bytes }
    }
}

impl From<SocketAddrV4> for SocketAddress {
    fn from(address: SocketAddrV4) -> SocketAddress {
        SocketAddress::new(*address.ip(), address.port())
    }
}

impl From<SocketAddress> for SocketAddrV4 {
    fn from(address: SocketAddress) -> SocketAddrV4 {
        SocketAddrV4::new(address.ip(), address.port())
    }
}

impl From<SocketAddress> for SocketAddr {
    fn from(address: SocketAddress) -> SocketAddr {
        SocketAddr::V4(address.into())
    }
}

impl From<SocketAddress> for socket2::SockAddr {
    fn from(address: SocketAddress) -> socket2::SockAddr {
        socket2::SockAddr::from(SocketAddrV4::from(address))
    }
}

/// Parses the format used by the [`fmt::Display`] implementation, e.g.
/// `127.0.0.1:80`.
impl FromStr for SocketAddress {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<SocketAddress, AddrParseError> {
        s.parse::<SocketAddrV4>().map(SocketAddress::from)
    }
}

/// Formats the address as `a.b.c.d:port`, all in decimal without leading
/// zeros.
impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip(), self.port())
    }
}

impl fmt::Debug for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
