use leptos::logging::warn;
use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Where the driver puts its delayed callbacks and loader futures.
pub trait Scheduler: 'static {
    /// Pending delayed task. Dropping it cancels the task.
    type Timer: 'static;

    /// Runs `task` after `delay_ms`. `None` means the host could not schedule it.
    fn delay(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<Self::Timer>;

    fn spawn(&self, task: LocalTask);
}

/// `setTimeout` plus the Leptos local executor.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

pub struct BrowserTimer(TimeoutHandle);

impl Drop for BrowserTimer {
    fn drop(&mut self) {
        // Clearing an already fired timeout is a no-op.
        self.0.clear();
    }
}

impl Scheduler for BrowserScheduler {
    type Timer = BrowserTimer;

    fn delay(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<BrowserTimer> {
        match set_timeout_with_handle(task, Duration::from_millis(delay_ms.into())) {
            Ok(handle) => Some(BrowserTimer(handle)),
            Err(e) => {
                warn!("scroll-list: setTimeout failed: {e:?}");
                None
            }
        }
    }

    fn spawn(&self, task: LocalTask) {
        leptos::task::spawn_local(task);
    }
}

/// Deterministic scheduler for tests: time only moves on `advance`, futures
/// only make progress on `run_until_stalled`.
#[cfg(test)]
pub(crate) mod manual {
    use super::{LocalTask, Scheduler};
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use std::task::{Context, Poll, Waker};

    struct PendingTimer {
        id: u64,
        due_ms: u64,
        task: Box<dyn FnOnce()>,
    }

    #[derive(Default)]
    struct Queue {
        now_ms: u64,
        next_id: u64,
        timers: Vec<PendingTimer>,
        tasks: Vec<LocalTask>,
    }

    #[derive(Clone, Default)]
    pub(crate) struct ManualScheduler {
        queue: Rc<RefCell<Queue>>,
    }

    pub(crate) struct ManualTimer {
        id: u64,
        queue: Weak<RefCell<Queue>>,
    }

    impl Drop for ManualTimer {
        fn drop(&mut self) {
            if let Some(queue) = self.queue.upgrade() {
                queue.borrow_mut().timers.retain(|t| t.id != self.id);
            }
        }
    }

    impl ManualScheduler {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn now_ms(&self) -> u64 {
            self.queue.borrow().now_ms
        }

        pub(crate) fn pending_timers(&self) -> usize {
            self.queue.borrow().timers.len()
        }

        /// Moves the clock forward, firing due timers in order and letting
        /// spawned futures run after each one.
        pub(crate) fn advance(&self, ms: u64) {
            let target = self.now_ms() + ms;
            loop {
                let next = {
                    let mut q = self.queue.borrow_mut();
                    let idx = q
                        .timers
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.due_ms <= target)
                        .min_by_key(|(_, t)| (t.due_ms, t.id))
                        .map(|(i, _)| i);
                    idx.map(|i| {
                        let timer = q.timers.remove(i);
                        q.now_ms = timer.due_ms;
                        timer.task
                    })
                };
                match next {
                    Some(task) => {
                        task();
                        self.run_until_stalled();
                    }
                    None => break,
                }
            }
            self.queue.borrow_mut().now_ms = target;
        }

        pub(crate) fn run_until_stalled(&self) {
            let mut cx = Context::from_waker(Waker::noop());
            loop {
                let tasks = std::mem::take(&mut self.queue.borrow_mut().tasks);
                if tasks.is_empty() {
                    return;
                }
                let before = tasks.len();
                let mut still_pending = Vec::new();
                for mut task in tasks {
                    if let Poll::Pending = task.as_mut().poll(&mut cx) {
                        still_pending.push(task);
                    }
                }
                let progressed = still_pending.len() < before;
                let mut q = self.queue.borrow_mut();
                let spawned_meanwhile = !q.tasks.is_empty();
                still_pending.append(&mut q.tasks);
                q.tasks = still_pending;
                if !progressed && !spawned_meanwhile {
                    return;
                }
            }
        }
    }

    impl Scheduler for ManualScheduler {
        type Timer = ManualTimer;

        fn delay(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Option<ManualTimer> {
            let mut q = self.queue.borrow_mut();
            let id = q.next_id;
            q.next_id += 1;
            let due_ms = q.now_ms + u64::from(delay_ms);
            q.timers.push(PendingTimer { id, due_ms, task });
            Some(ManualTimer {
                id,
                queue: Rc::downgrade(&self.queue),
            })
        }

        fn spawn(&self, task: LocalTask) {
            self.queue.borrow_mut().tasks.push(task);
        }
    }
}
