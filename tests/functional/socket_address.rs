//! Tests for `SocketAddress`.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use fiberio::net::SocketAddress;

#[test]
fn broadcast_address() {
    let address: SocketAddress = "10.0.0.5:0".parse().unwrap();
    let mask: SocketAddress = "255.255.255.0:0".parse().unwrap();
    assert_eq!(address.broadcast(&mask), "10.0.0.255:0".parse().unwrap());

    // Full mask means the address is its own broadcast address.
    let mask = SocketAddress::new(Ipv4Addr::BROADCAST, 0);
    assert_eq!(address.broadcast(&mask), address);

    // Empty mask sets all bits.
    let mask = SocketAddress::new(Ipv4Addr::UNSPECIFIED, 0);
    assert_eq!(address.broadcast(&mask).ip(), Ipv4Addr::BROADCAST);
}

#[test]
fn hash_follows_equality() {
    let mut set = HashSet::new();
    assert!(set.insert(SocketAddress::new(Ipv4Addr::LOCALHOST, 80)));
    assert!(!set.insert("127.0.0.1:80".parse().unwrap()));
    assert!(set.insert(SocketAddress::new(Ipv4Addr::LOCALHOST, 81)));
}

#[test]
fn text_format() {
    let address = SocketAddress::from_bytes([1, 2, 30, 255, 0xFF, 0xFF]);
    assert_eq!(address.to_string(), "1.2.30.255:65535");
    let address = SocketAddress::from_bytes([0, 0, 0, 0, 0, 7]);
    assert_eq!(address.to_string(), "0.0.0.0:7");
}
