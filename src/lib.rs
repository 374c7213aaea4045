//! Fiberio is the I/O plumbing of a cooperative runtime: application code
//! issues what looks like blocking stream and name resolution operations,
//! while a scheduler multiplexes many such operations over a small number of
//! threads.
//!
//! ## About
//!
//! Two pieces make up the core of this crate:
//!
//!  * The [offload bridge], which runs a blocking call (such as resolving a
//!    host name) on a worker thread and lets the calling task `.await` the
//!    outcome. The scheduler thread is never blocked while the call is in
//!    progress.
//!  * The [`BufferedWriter`], which coalesces small writes in front of any
//!    [`ByteSink`] (socket, pipe, file) to minimise the number of underlying
//!    write calls, while preserving the exact byte order.
//!
//! [offload bridge]: crate::offload
//!
//! ## Resolving an address
//!
//! ```
//! use fiberio::net::Resolver;
//! use fiberio::offload::ThreadPool;
//! use fiberio::rt::Runtime;
//!
//! let pool = ThreadPool::setup().build()?;
//! let resolver = Resolver::new(pool);
//!
//! let mut runtime = Runtime::new();
//! let address = runtime.block_on(async move { resolver.resolve("127.0.0.1", 8080).await });
//! assert_eq!(address.unwrap().to_string(), "127.0.0.1:8080");
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Features
//!
//! This crate has one optional feature: `test`. The `test` feature will enable
//! the `test` module which contains testing facilities.

#![warn(
    anonymous_parameters,
    bare_trait_objects,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results,
    variant_size_differences
)]
// Disallow warnings in examples, we want to set a good example after all.
#![doc(test(attr(deny(warnings))))]

pub mod io;
pub mod log;
pub mod net;
pub mod offload;
pub mod rt;

#[doc(no_inline)]
pub use io::{BufferedWriter, ByteSink};
#[doc(no_inline)]
pub use net::{Resolver, SocketAddress};
#[doc(no_inline)]
pub use offload::{Offload, ThreadPool};
#[doc(no_inline)]
pub use rt::Runtime;

/// Attempts to extract a message from a panic, defaulting to `<unknown>`.
/// NOTE: be sure to dereference the `Box`!
pub(crate) fn panic_message<'a>(panic: &'a (dyn std::any::Any + Send + 'static)) -> &'a str {
    match panic.downcast_ref::<&'static str>() {
        Some(s) => s,
        None => match panic.downcast_ref::<String>() {
            Some(s) => s,
            None => "<unknown>",
        },
    }
}
