//! Tests for `Resolver`.

use std::cell::Cell;
use std::rc::Rc;

use fiberio::net::{ResolveError, Resolver, SocketAddress};
use fiberio::offload::ThreadPool;
use fiberio::rt::Runtime;
use fiberio::test::InlineOffloader;

use crate::util::{assert_send, assert_sync, init_logging};

#[test]
fn resolve_error_is_send_and_sync() {
    assert_send::<ResolveError>();
    assert_sync::<ResolveError>();
}

#[test]
fn resolve_localhost() {
    init_logging();
    let pool = ThreadPool::setup().build().unwrap();
    let resolver = Resolver::new(pool);

    let address = Runtime::new()
        .block_on(async move { resolver.resolve("localhost", 8080).await })
        .unwrap();
    assert!(address.ip().is_loopback(), "{address}");
    assert_eq!(address.port(), 8080);
}

#[test]
fn resolve_ip_literal() {
    init_logging();
    let pool = ThreadPool::setup().build().unwrap();
    let resolver = Resolver::new(&pool);

    let mut runtime = Runtime::new();
    let address = runtime.block_on(resolver.resolve("10.0.0.5", 443)).unwrap();
    assert_eq!(address, "10.0.0.5:443".parse::<SocketAddress>().unwrap());
    assert_eq!(address.to_bytes(), [10, 0, 0, 5, 0x01, 0xBB]);
}

#[test]
fn resolve_unknown_host() {
    init_logging();
    let pool = ThreadPool::setup().build().unwrap();
    let resolver = Resolver::new(&pool);

    // The `.invalid` top-level domain is guaranteed to never resolve.
    let err = Runtime::new()
        .block_on(resolver.resolve("does-not-exist.invalid", 80))
        .unwrap_err();
    assert_eq!(err.host(), "does-not-exist.invalid");
    assert_eq!(err.port(), 80);
}

#[test]
fn concurrent_resolves() {
    init_logging();
    let pool = ThreadPool::setup().num_threads(2).build().unwrap();
    let resolver = Resolver::new(&pool);
    let done = Rc::new(Cell::new(0));

    let mut runtime = Runtime::new();
    for port in 1..=10 {
        let resolve = resolver.resolve("127.0.0.1", port);
        let done = done.clone();
        let _ = runtime.spawn(async move {
            let address = resolve.await.unwrap();
            assert_eq!(address.to_string(), format!("127.0.0.1:{port}"));
            done.set(done.get() + 1);
        });
    }
    runtime.run();
    assert_eq!(done.get(), 10);
}

#[test]
#[should_panic = "invalid port `65536`, must be within 0..=65535"]
fn port_too_large() {
    let resolver = Resolver::new(InlineOffloader::new());
    let _ = resolver.resolve("127.0.0.1", 65536);
}

#[test]
#[should_panic = "invalid port `-1`, must be within 0..=65535"]
fn negative_port() {
    let resolver = Resolver::new(InlineOffloader::new());
    let _ = resolver.resolve("127.0.0.1", -1);
}
