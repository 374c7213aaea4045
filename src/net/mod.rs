//! Network related types.
//!
//! This module contains the IPv4 [`SocketAddress`] value and the [`Resolver`],
//! which turns a host name into such an address without blocking the thread
//! running the calling task.

mod addr;
mod resolve;


pub use addr::SocketAddress;
pub use resolve::{resolve_blocking, Resolve, ResolveError, Resolver};
