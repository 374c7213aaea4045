//! Module containing the [`ThreadPool`] and its [`Setup`].

use std::panic::{self, AssertUnwindSafe};
use std::{fmt, io, thread};

use crossbeam_channel::{self as channel, Receiver, Sender};
use log::{error, trace};

use crate::offload::{Job, Offload};
use crate::panic_message;

/// Pool of worker threads running offloaded [`Job`]s.
///
/// Jobs are run in the order they're submitted, by whichever worker thread is
/// free first. A job that panics is logged and its result canceled, the worker
/// thread continues with the next job.
///
/// Dropping the pool (or calling [`shutdown`]) waits until all submitted jobs
/// have been run.
///
/// [`shutdown`]: ThreadPool::shutdown
///
/// # Examples
///
/// ```
/// use fiberio::offload::ThreadPool;
///
/// let pool = ThreadPool::setup()
///     .num_threads(2)
///     .with_name("resolver".to_owned())
///     .build()?;
/// assert_eq!(pool.num_threads(), 2);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ThreadPool {
    /// `None` once the pool is stopped.
    sender: Option<Sender<Job>>,
    workers: Vec<Worker>,
}

impl ThreadPool {
    /// Setup a new thread pool.
    pub const fn setup() -> Setup {
        Setup {
            threads: 1,
            name: None,
            stack_size: None,
        }
    }

    /// Returns the number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of jobs waiting to be run.
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Stop accepting jobs and wait for all submitted jobs to be run.
    ///
    /// Returns an error if any of the worker threads panicked.
    pub fn shutdown(mut self) -> thread::Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> thread::Result<()> {
        // Dropping the sender disconnects the channel, which stops the workers
        // once all jobs are done.
        drop(self.sender.take());
        let current = thread::current().id();
        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            // Can't join the thread we're running on, which happens if the
            // pool is dropped from one of its own jobs.
            if worker.handle.thread().id() == current {
                continue;
            }
            let id = worker.id;
            if let Err(err) = worker.handle.join() {
                result = Err(err);
            }
            trace!(worker_id = id; "worker thread stopped");
        }
        result
    }
}

impl Offload for ThreadPool {
    fn submit(&self, job: Job) -> Result<(), Job> {
        match &self.sender {
            Some(sender) => sender.send(job).map_err(|channel::SendError(job)| job),
            None => Err(job),
        }
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads", &self.workers.len())
            .field("queued", &self.queued())
            .finish()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            let msg = panic_message(&*err);
            error!("worker thread panicked: {msg}");
        }
    }
}

/// Setup for a [`ThreadPool`].
///
/// See [`ThreadPool::setup`].
#[derive(Debug)]
#[must_use = "`fiberio::offload::Setup` doesn't do anything until its `build`"]
pub struct Setup {
    threads: usize,
    name: Option<String>,
    stack_size: Option<usize>,
}

impl Setup {
    const DEFAULT_NAME: &'static str = "fiberio_worker";

    /// Set the number of worker threads to use, defaults to one.
    ///
    /// # Panics
    ///
    /// This will panic if `n` is zero.
    pub fn num_threads(mut self, n: usize) -> Self {
        assert!(n != 0, "Can't create zero worker threads, 1 is the minimum");
        self.threads = n;
        self
    }

    /// Returns the number of worker threads to use.
    pub const fn get_threads(&self) -> usize {
        self.threads
    }

    /// Set the name of the worker threads, the id of the worker (starting at
    /// one) is appended to it.
    ///
    /// Defaults to `fiberio_worker`.
    ///
    /// # Panics
    ///
    /// This will panic if `name` is empty.
    pub fn with_name(mut self, name: String) -> Self {
        assert!(!name.is_empty(), "Can't use an empty thread name");
        self.name = Some(name);
        self
    }

    /// Returns the name of the worker threads.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::DEFAULT_NAME)
    }

    /// Set the stack size of the worker threads.
    pub const fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Start the worker threads.
    pub fn build(self) -> io::Result<ThreadPool> {
        let (sender, receiver) = channel::unbounded();
        let name = self.name();
        let workers = (1..=self.threads)
            .map(|id| Worker::start(id, name, self.stack_size, receiver.clone()))
            .collect::<io::Result<Vec<_>>>()?;
        trace!(threads = self.threads; "started thread pool");
        Ok(ThreadPool {
            sender: Some(sender),
            workers,
        })
    }
}

/// Handle to a worker thread.
struct Worker {
    id: usize,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    fn start(
        id: usize,
        name: &str,
        stack_size: Option<usize>,
        jobs: Receiver<Job>,
    ) -> io::Result<Worker> {
        let mut builder = thread::Builder::new().name(format!("{name}{id}"));
        if let Some(stack_size) = stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder
            .spawn(move || main(id, jobs))
            .map(|handle| Worker { id, handle })
    }
}

/// Run all jobs received on `jobs`, until the channel is disconnected.
fn main(id: usize, jobs: Receiver<Job>) {
    trace!(worker_id = id; "running worker thread");
    for job in jobs.iter() {
        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
            let msg = panic_message(&*panic);
            error!(worker_id = id; "offloaded job panicked: {msg}");
        }
    }
    trace!(worker_id = id; "worker thread done");
}
