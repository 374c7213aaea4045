//! Logging related types.
//!
//! Logging in Fiberio is done via the [`log`] crate, much like the entire Rust
//! ecosystem does (or should). However the log crate doesn't provide an actual
//! logging implementation, it only defines macros for it. Those macros are
//! re-exported here, which means that the macros in the `log` crate can also be
//! used.
//!
//! Fiberio doesn't provide a logging implementation, but it recommends the
//! [`std-logger`] crate. What is logged:
//!  * name resolution failures at the debug level (including the resolver's
//!    error code, which is never part of the returned error),
//!  * failing sink writes in the buffered writer at the debug level,
//!  * panicking offloaded jobs at the error level,
//!  * task and worker thread life cycle at the trace level.
//!
//! [`log`]: https://crates.io/crates/log
//! [`std-logger`]: https://crates.io/crates/std_logger
//!
//! # Examples
//!
//! Enabling logging.
//!
//! ```
//! use fiberio::log::info;
//!
//! // Enable logging.
//! std_logger::Config::logfmt().init();
//!
//! info!("Hello world");
//! ```

#[doc(no_inline)]
pub use log::{debug, error, info, log, log_enabled, trace, warn};
