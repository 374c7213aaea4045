//! Minimal single threaded runtime.
//!
//! The [`Runtime`] runs tasks, i.e. [`Future`]s, cooperatively on the calling
//! thread. A task runs until it returns [`Poll::Pending`], after which it's not
//! polled again until it's woken. Waking a task, which can be done from any
//! thread, adds it to the runtime's ready queue.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use fiberio::rt::Runtime;
//!
//! let counter = Rc::new(Cell::new(0));
//! let mut runtime = Runtime::new();
//! for _ in 0..3 {
//!     let counter = counter.clone();
//!     let _ = runtime.spawn(async move { counter.set(counter.get() + 1) });
//! }
//! runtime.run();
//! assert_eq!(counter.get(), 3);
//! ```

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{self, Poll};

use crossbeam_channel::{self as channel, Receiver, Sender};
use log::trace;

mod waker;


/// Single threaded runtime.
///
/// See the [module documentation](crate::rt) for more information.
pub struct Runtime {
    tasks: HashMap<TaskId, Task>,
    next_id: usize,
    /// Receiving side of the ready queue, wakers send to `wake`.
    ready: Receiver<TaskId>,
    wake: Sender<TaskId>,
}

/// A spawned task.
struct Task {
    future: Pin<Box<dyn Future<Output = ()>>>,
    waker: task::Waker,
}

/// Identifier of a task spawned on a [`Runtime`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskId(pub(crate) usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Runtime {
    /// Create a new runtime without any tasks.
    pub fn new() -> Runtime {
        let (wake, ready) = channel::unbounded();
        Runtime {
            tasks: HashMap::new(),
            next_id: 0,
            ready,
            wake,
        }
    }

    /// Spawn a new task.
    ///
    /// The task is polled for the first time by [`Runtime::run`].
    pub fn spawn<Fut>(&mut self, future: Fut) -> TaskId
    where
        Fut: Future<Output = ()> + 'static,
    {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let waker = waker::new(id, self.wake.clone());
        let task = Task {
            future: Box::pin(future),
            waker,
        };
        let _ = self.tasks.insert(id, task);
        trace!(task_id = id.0; "spawning task");
        // Can't fail as we hold the receiving side.
        let _ = self.wake.send(id);
        id
    }

    /// Returns the number of tasks that haven't completed yet.
    pub fn tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Run all tasks until completion.
    ///
    /// The calling thread is blocked while all tasks are waiting to be woken.
    pub fn run(&mut self) {
        while !self.tasks.is_empty() {
            let Ok(id) = self.ready.recv() else { break };
            self.run_task(id);
        }
    }

    /// Run `future` and all other spawned tasks until completion, returning
    /// the output of `future`.
    pub fn block_on<Fut>(&mut self, future: Fut) -> Fut::Output
    where
        Fut: Future + 'static,
        Fut::Output: 'static,
    {
        let output = Rc::new(Cell::new(None));
        let out = output.clone();
        let _ = self.spawn(async move { out.set(Some(future.await)) });
        self.run();
        match output.take() {
            Some(output) => output,
            None => unreachable!("`Runtime::run` returned before all tasks completed"),
        }
    }

    fn run_task(&mut self, id: TaskId) {
        // A task can be woken after it completed.
        let Some(Task { future, waker }) = self.tasks.get_mut(&id) else {
            return;
        };
        let mut ctx = task::Context::from_waker(waker);
        trace!(task_id = id.0; "polling task");
        if let Poll::Ready(()) = future.as_mut().poll(&mut ctx) {
            trace!(task_id = id.0; "task completed");
            drop(self.tasks.remove(&id));
        }
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("tasks", &self.tasks.len())
            .field("ready", &self.ready.len())
            .finish()
    }
}
