//! Module containing the `task::Waker` implementation for the runtime.

use std::sync::Arc;
use std::task::{self, Wake};

use crossbeam_channel::Sender;
use log::trace;

use crate::rt::TaskId;

/// Create a new `task::Waker` that adds task `id` to the `ready` queue.
pub(crate) fn new(id: TaskId, ready: Sender<TaskId>) -> task::Waker {
    task::Waker::from(Arc::new(TaskWaker { id, ready }))
}

struct TaskWaker {
    id: TaskId,
    ready: Sender<TaskId>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        trace!(task_id = self.id.0; "waking task");
        if self.ready.send(self.id).is_err() {
            trace!(task_id = self.id.0; "runtime dropped before task was woken");
        }
    }
}
