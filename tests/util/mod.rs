#![allow(dead_code, unused_macros)] // Not all tests use all functions/types.

use std::sync::Once;

macro_rules! limited_loop {
    ($($arg: tt)*) => {{
        let mut range = (0..1_000);
        while range.next().is_some() {
            $($arg)*
        }

        if range.is_empty() {
            panic!("looped too many iterations");
        }
    }}
}

pub fn assert_send<T: Send>() {}

pub fn assert_sync<T: Sync>() {}

/// Enable logging, only once per test binary.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        std_logger::Config::logfmt().init();
    });
}

/// Split `data` in chunks of random size, at most `max` bytes per chunk.
pub fn random_chunks(data: &[u8], max: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut data = data;
    while !data.is_empty() {
        // Allow empty chunks.
        let n = fiberio::test::random_below(max + 1).min(data.len());
        let (chunk, rest) = data.split_at(n);
        chunks.push(chunk);
        data = rest;
    }
    chunks
}
