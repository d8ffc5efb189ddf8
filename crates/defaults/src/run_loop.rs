use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Task = Box<dyn FnOnce() + Send>;

/// A single-threaded queue of deferred work.
///
/// Tasks run in the order they were scheduled when the owner drains the queue with
/// [`RunLoop::run_until_idle`], which marks the end of a processing cycle. Cloning is
/// cheap and every clone shares the same queue.
#[derive(Clone, Default)]
pub struct RunLoop {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl RunLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        self.queue.lock().push_back(Box::new(task));
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs queued tasks until none are left, including tasks scheduled while draining.
    /// Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(task) = self.queue.lock().pop_front() else {
                break;
            };
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "Run loop drained");
        }
        ran
    }
}

impl fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLoop").field("pending", &self.pending()).finish()
    }
}
