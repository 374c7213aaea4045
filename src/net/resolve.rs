//! Host name resolution, offloaded to a worker thread.

use std::ffi::{CStr, CString};
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::task::{self, Poll};
use std::{fmt, mem, ptr};

use log::{debug, trace};

use crate::net::SocketAddress;
use crate::offload::{offload, Offload, Offloaded};

/// Resolves host names into [`SocketAddress`]es.
///
/// The platform's name resolution facility can block for an unbounded amount
/// of time, so the actual lookup is submitted to an [`Offload`]er. The task
/// calling [`resolve`] is suspended until the lookup completes, but the thread
/// running it is free to run other tasks.
///
/// Only IPv4 addresses are resolved. Results are not cached and failed lookups
/// are not retried, every call to [`resolve`] is a single lookup.
///
/// [`resolve`]: Resolver::resolve
///
/// # Examples
///
/// ```
/// use fiberio::net::Resolver;
/// use fiberio::offload::ThreadPool;
/// use fiberio::rt::Runtime;
///
/// let pool = ThreadPool::setup().num_threads(2).build()?;
/// let resolver = Resolver::new(&pool);
///
/// let mut runtime = Runtime::new();
/// let result = runtime.block_on(resolver.resolve("localhost", 80));
/// # drop(result);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Resolver<O> {
    offloader: O,
}

impl<O: Offload> Resolver<O> {
    /// Create a new `Resolver` that executes lookups using `offloader`.
    pub const fn new(offloader: O) -> Resolver<O> {
        Resolver { offloader }
    }

    /// Returns a reference to the offloader used.
    pub const fn offloader(&self) -> &O {
        &self.offloader
    }

    /// Resolve `host` into a IPv4 address, using `port` as port.
    ///
    /// If the lookup returns multiple addresses the first one is used.
    ///
    /// The lookup is submitted when this is called, not when the returned
    /// future is first polled. Dropping the future doesn't stop the lookup.
    ///
    /// # Panics
    ///
    /// This will panic if `port` is not within `0..=65535`, before any lookup
    /// is attempted.
    pub fn resolve(&self, host: &str, port: i32) -> Resolve {
        let port = match u16::try_from(port) {
            Ok(port) => port,
            Err(_) => panic!("invalid port `{port}`, must be within 0..=65535"),
        };

        trace!(host = host, port = port; "submitting address resolution");
        let job_host = host.to_owned();
        let result = offload(&self.offloader, move || resolve_blocking(&job_host, port));
        Resolve {
            host: host.to_owned(),
            port,
            result,
        }
    }
}

/// [`Future`] behind [`Resolver::resolve`].
#[derive(Debug)]
#[must_use = "dropping `Resolve` discards the result, the lookup still runs"]
pub struct Resolve {
    host: String,
    port: u16,
    result: Offloaded<Result<SocketAddress, ResolveError>>,
}

impl Future for Resolve {
    type Output = Result<SocketAddress, ResolveError>;

    fn poll(mut self: Pin<&mut Self>, ctx: &mut task::Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.result).poll(ctx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) => {
                debug!(
                    host = self.host.as_str(), port = self.port;
                    "address resolution job did not complete: {err}"
                );
                let host = mem::take(&mut self.host);
                Poll::Ready(Err(ResolveError::new(host, self.port)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Resolve `host` on the calling thread, blocking it until the platform's
/// resolver returns.
///
/// This is the lookup [`Resolver::resolve`] runs on a worker thread. Calling
/// it directly from a task blocks the scheduler thread.
pub fn resolve_blocking(host: &str, port: u16) -> Result<SocketAddress, ResolveError> {
    let c_host = match CString::new(host) {
        Ok(c_host) => c_host,
        Err(_) => {
            debug!(host = host, port = port; "can't resolve host containing a NUL byte");
            return Err(ResolveError::new(host.to_owned(), port));
        }
    };

    // SAFETY: all zero is a valid `addrinfo`, and the expected state for the
    // unused hint fields.
    let mut hints: libc::addrinfo = unsafe { mem::zeroed() };
    hints.ai_family = libc::AF_INET;
    let mut list: *mut libc::addrinfo = ptr::null_mut();
    // SAFETY: `c_host` and `hints` outlive the call, `list` is only read
    // after a successful call.
    let res = unsafe { libc::getaddrinfo(c_host.as_ptr(), ptr::null(), &hints, &mut list) };
    if res != 0 {
        // SAFETY: `gai_strerror` returns a pointer to a static string.
        let msg = unsafe { CStr::from_ptr(libc::gai_strerror(res)) };
        debug!(
            host = host, port = port, code = res;
            "failed to resolve host: {}", msg.to_string_lossy()
        );
        return Err(ResolveError::new(host.to_owned(), port));
    }

    // SAFETY: `list` was returned by a successful `getaddrinfo` call and is
    // freed only after we're done with it.
    let ip = unsafe { first_ipv4(list) };
    unsafe { libc::freeaddrinfo(list) };
    match ip {
        Some(ip) => {
            let address = SocketAddress::new(ip, port);
            trace!(host = host; "resolved host to {address}");
            Ok(address)
        }
        None => {
            debug!(host = host, port = port; "resolver returned no IPv4 address");
            Err(ResolveError::new(host.to_owned(), port))
        }
    }
}

/// Returns the first IPv4 address in the `list` returned by `getaddrinfo`.
///
/// # Safety
///
/// `list` must be null or point to a valid `addrinfo` list.
unsafe fn first_ipv4(mut list: *const libc::addrinfo) -> Option<Ipv4Addr> {
    while let Some(info) = list.as_ref() {
        if info.ai_family == libc::AF_INET
            && !info.ai_addr.is_null()
            && info.ai_addrlen as usize >= mem::size_of::<libc::sockaddr_in>()
        {
            let address = &*info.ai_addr.cast::<libc::sockaddr_in>();
            // `s_addr` is in network byte order.
            return Some(Ipv4Addr::from(u32::from_be(address.sin_addr.s_addr)));
        }
        list = info.ai_next;
    }
    None
}

/// Error returned when a host can't be resolved.
///
/// This doesn't contain the reason why the lookup failed, that is logged (at
/// the debug level) instead.
#[derive(Clone, Eq, PartialEq)]
pub struct ResolveError {
    host: String,
    port: u16,
}

impl ResolveError {
    const DESC: &'static str = "failed to resolve address";

    pub(crate) const fn new(host: String, port: u16) -> ResolveError {
        ResolveError { host, port }
    }

    /// Returns the host that couldn't be resolved.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port of the failed request.
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// We implement [`Debug`] by using [`Display`] implementation.
///
/// [`Debug`]: std::fmt::Debug
/// [`Display`]: std::fmt::Display
impl fmt::Debug for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: host unresolvable: `{}` (port {})",
            Self::DESC,
            self.host,
            self.port
        )
    }
}

impl std::error::Error for ResolveError {}
