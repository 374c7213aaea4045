//! Tests for `BufferedWriter`.

use std::io::Read;
use std::os::unix::net::UnixStream;
use std::thread;

use fiberio::io::BufferedWriter;
use fiberio::test::{random_bytes, random_below, RecordingSink};

use crate::util::{init_logging, random_chunks};

#[test]
fn order_is_preserved() {
    init_logging();
    for capacity in 1..=33 {
        let data = random_bytes(1024);
        let limit = random_below(64) + 1;
        let sink = RecordingSink::new().with_limit(limit);
        let mut writer = BufferedWriter::with_capacity(capacity, sink);

        for chunk in random_chunks(&data, 3 * capacity) {
            writer.write(chunk).unwrap();
        }
        writer.flush().unwrap();

        let sink = writer.into_inner().unwrap();
        assert_eq!(
            sink.written(),
            data,
            "capacity: {capacity}, sink limit: {limit}"
        );
    }
}

#[test]
fn every_byte_written_once() {
    init_logging();
    let data: Vec<u8> = (0..=255).cycle().take(4096).collect();
    let sink = RecordingSink::new().with_limit(7);
    let mut writer = BufferedWriter::with_capacity(10, sink);
    for chunk in random_chunks(&data, 25) {
        writer.write(chunk).unwrap();
    }
    let sink = writer.into_inner().unwrap();

    let total: usize = sink.calls().iter().map(Vec::len).sum();
    assert_eq!(total, data.len());
    assert_eq!(sink.written(), data);
    assert!(sink.calls().iter().all(|call| !call.is_empty() && call.len() <= 7));
}

#[test]
fn bypass_same_as_byte_at_a_time() {
    init_logging();
    for capacity in 1..=16 {
        let data = random_bytes(capacity + random_below(4 * capacity + 1));

        let mut large = BufferedWriter::with_capacity(capacity, RecordingSink::new().with_limit(5));
        large.write(&data).unwrap();
        let large = large.into_inner().unwrap();

        let mut small = BufferedWriter::with_capacity(capacity, RecordingSink::new());
        for byte in &data {
            small.write(std::slice::from_ref(byte)).unwrap();
        }
        let small = small.into_inner().unwrap();

        assert_eq!(large.written(), small.written(), "capacity: {capacity}");
        assert_eq!(large.written(), data);
    }
}

#[test]
fn partial_write_tolerance() {
    let mut writer = BufferedWriter::with_capacity(8, RecordingSink::new().with_limit(3));
    writer.write(b"abcdefgh").unwrap();
    writer.flush().unwrap();

    let sink = writer.into_inner().unwrap();
    assert_eq!(sink.call_count(), 3);
    assert_eq!(sink.written(), b"abcdefgh");
}

#[test]
fn no_io_while_buffer_has_space() {
    let mut writer = BufferedWriter::with_capacity(16, RecordingSink::new().fail_after(0));
    for chunk in [&b"Hello"[..], b" ", b"world", b"!"] {
        writer.write(chunk).unwrap();
    }
    assert_eq!(writer.get_ref().failed_count(), 0);
    assert_eq!(writer.buffered(), b"Hello world!");
    writer.discard();
}

#[test]
fn unix_stream() {
    init_logging();
    let (stream, mut peer) = UnixStream::pair().unwrap();
    let data = random_bytes(64 * 1024);
    let expected = data.clone();

    let reader = thread::spawn(move || {
        let mut got = Vec::new();
        let _ = peer.read_to_end(&mut got).unwrap();
        got
    });

    let mut writer = BufferedWriter::with_capacity(1000, stream);
    for chunk in random_chunks(&data, 3000) {
        writer.write(chunk).unwrap();
    }
    let stream = writer.into_inner().unwrap();
    // Signals EOF to the reader.
    drop(stream);

    let got = reader.join().unwrap();
    assert_eq!(got, expected);
}
