//! Offloading blocking calls.
//!
//! Some operations, for example name resolution, can only be done using a
//! blocking call. Making such a call from a task would block the scheduler
//! thread, and with it all other tasks on that thread. Instead the call is
//! wrapped in a [`Job`] and submitted to an [`Offload`]er, e.g. a
//! [`ThreadPool`], which runs it on another thread.
//!
//! [`offload`] returns an [`Offloaded`] [`Future`] that completes once the job
//! has run. When the job completes the task that polled the future is woken,
//! which makes it runnable again on its scheduler.
//!
//! Offloaded jobs can't be canceled, dropping the [`Offloaded`] future only
//! means the result is thrown away. If the job itself can't run, because the
//! offloader rejected it or it panicked, the future returns
//! [`Error::Canceled`].
//!
//! # Examples
//!
//! ```
//! use fiberio::offload::{offload, ThreadPool};
//! use fiberio::rt::Runtime;
//!
//! let pool = ThreadPool::setup().num_threads(1).build()?;
//! let result = Runtime::new().block_on(offload(&pool, || 1 + 2));
//! assert_eq!(result, Ok(3));
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{self, Poll};

use heph_inbox::oneshot::{new_oneshot, Receiver};

mod pool;


pub use pool::{Setup, ThreadPool};

/// Job to run on an [`Offload`]er.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a [`Job`] without blocking the caller.
pub trait Offload {
    /// Submit `job` to be run.
    ///
    /// If the job can't be accepted it must be returned as error.
    fn submit(&self, job: Job) -> Result<(), Job>;
}

impl<O: Offload + ?Sized> Offload for &O {
    fn submit(&self, job: Job) -> Result<(), Job> {
        (**self).submit(job)
    }
}

impl<O: Offload + ?Sized> Offload for Box<O> {
    fn submit(&self, job: Job) -> Result<(), Job> {
        (**self).submit(job)
    }
}

impl<O: Offload + ?Sized> Offload for Arc<O> {
    fn submit(&self, job: Job) -> Result<(), Job> {
        (**self).submit(job)
    }
}

/// Run `f` on `offloader`, returning a [`Future`] for its result.
///
/// Exactly one job is submitted for each call, at the time of the call. The
/// job runs even if the returned future is never polled.
pub fn offload<O, F, T>(offloader: &O, f: F) -> Offloaded<T>
where
    O: Offload + ?Sized,
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (sender, receiver) = new_oneshot();
    // If `f` panics the sender is dropped without sending, which disconnects
    // the channel.
    let job: Job = Box::new(move || {
        // Only fails if the `Offloaded` future is dropped.
        let _ = sender.try_send(f());
    });
    if let Err(job) = offloader.submit(job) {
        // Dropping the job drops the sender, which cancels the result.
        drop(job);
    }
    Offloaded {
        receiver: Some(receiver),
    }
}

/// [`Future`] behind [`offload`].
///
/// The job is already submitted when this is created, dropping it only
/// discards the result.
#[must_use = "dropping `Offloaded` discards the result, the job still runs"]
pub struct Offloaded<T> {
    /// `None` once the result is returned.
    receiver: Option<Receiver<T>>,
}

impl<T> Offloaded<T> {
    /// Returns `true` if the job completed, or will never complete.
    pub fn is_done(&self) -> bool {
        // The sender is dropped once the job ran (or was dropped).
        self.receiver
            .as_ref()
            .map_or(true, |receiver| !receiver.is_connected())
    }
}

impl<T> Future for Offloaded<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, ctx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let receiver = match self.receiver.as_mut() {
            Some(receiver) => receiver,
            None => panic!("polled `Offloaded` after completion"),
        };
        let poll = Pin::new(&mut receiver.recv()).poll(ctx);
        match poll {
            Poll::Ready(result) => {
                self.receiver = None;
                Poll::Ready(result.ok_or(Error::Canceled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Unpin for Offloaded<T> {}

impl<T> fmt::Debug for Offloaded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Offloaded")
            .field("done", &self.is_done())
            .finish()
    }
}

/// Error returned by [`Offloaded`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The job was never run to completion, either because the offloader
    /// rejected it or because it panicked.
    Canceled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Canceled => f.write_str("offloaded job canceled"),
        }
    }
}

impl std::error::Error for Error {}
