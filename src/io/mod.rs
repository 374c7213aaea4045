//! Module with I/O types and traits.
//!
//! The [`ByteSink`] trait is the capability to push bytes into a destination,
//! e.g. a socket, pipe or file. A single write may accept fewer bytes than
//! provided, but never blocks the calling thread indefinitely.
//!
//! The [`BufferedWriter`] sits in front of a `ByteSink`, coalescing small
//! writes into fewer, larger writes to the sink.

mod buffered;
mod sink;


pub use buffered::{BufferedWriter, IntoInnerError, DEFAULT_CAPACITY};
pub use sink::{ByteSink, WriteSink};
