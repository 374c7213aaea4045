//! Tests for the offload bridge and the runtime.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use fiberio::offload::{offload, Offload, Offloaded, ThreadPool};
use fiberio::rt::Runtime;

use crate::util::{assert_send, assert_sync, init_logging};

#[test]
fn thread_pool_is_send_and_sync() {
    assert_send::<ThreadPool>();
    assert_sync::<ThreadPool>();
    assert_send::<Offloaded<()>>();
}

#[test]
fn scheduler_runs_other_tasks_while_job_blocks() {
    init_logging();
    let pool = Arc::new(ThreadPool::setup().build().unwrap());
    let (unblock, blocked) = mpsc::channel::<&'static str>();
    let events = Rc::new(RefCell::new(Vec::new()));

    let mut runtime = Runtime::new();

    let task_events = events.clone();
    let task_pool = pool.clone();
    let _ = runtime.spawn(async move {
        task_events.borrow_mut().push("offloading");
        // Blocks the worker thread until the other task runs.
        let msg = offload(&task_pool, move || blocked.recv().unwrap())
            .await
            .unwrap();
        task_events.borrow_mut().push(msg);
    });

    let task_events = events.clone();
    let _ = runtime.spawn(async move {
        task_events.borrow_mut().push("unblocking");
        unblock.send("resumed").unwrap();
    });

    runtime.run();
    assert_eq!(*events.borrow(), ["offloading", "unblocking", "resumed"]);
}

#[test]
fn one_job_per_call() {
    init_logging();
    let pool = ThreadPool::setup().num_threads(4).build().unwrap();
    let (sender, receiver) = mpsc::channel();

    let mut runtime = Runtime::new();
    for n in 0..20 {
        let sender = sender.clone();
        let result = offload(&pool, move || {
            sender.send(thread::current().id()).unwrap();
            n * 2
        });
        let _ = runtime.spawn(async move {
            assert_eq!(result.await, Ok(n * 2));
        });
    }
    drop(sender);
    runtime.run();

    assert_eq!(receiver.iter().count(), 20);
}

#[test]
fn drop_pool_from_its_worker() {
    init_logging();
    let pool = Arc::new(ThreadPool::setup().build().unwrap());
    let (sender, receiver) = mpsc::channel::<()>();
    let job_pool = pool.clone();
    let result = offload(&pool, move || {
        receiver.recv().unwrap();
        // Last reference to the pool, dropping it must not deadlock.
        drop(job_pool);
    });
    drop(pool);
    sender.send(()).unwrap();
    assert_eq!(Runtime::new().block_on(result), Ok(()));
}

#[test]
fn submit_through_references() {
    let pool = ThreadPool::setup().build().unwrap();
    let (sender, receiver) = mpsc::channel();

    let by_ref = sender.clone();
    assert!((&pool).submit(Box::new(move || by_ref.send(1).unwrap())).is_ok());
    let arc_pool = Arc::new(pool);
    assert!(arc_pool.submit(Box::new(move || sender.send(2).unwrap())).is_ok());
    drop(arc_pool);

    let mut got: Vec<i32> = receiver.iter().collect();
    got.sort_unstable();
    assert_eq!(got, [1, 2]);
}
