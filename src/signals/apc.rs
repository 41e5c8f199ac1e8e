/*!
 * Asynchronous Procedure Calls
 *
 * Main-thread work queue. Foreign threads only enqueue; the main thread
 * drains the queue inside the alertable wait, so everything an APC does
 * happens on the main thread without locks around signal state.
 */

use super::core::types::Signal;
use crate::core::sync::Parker;
use crossbeam_queue::SegQueue;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Unit of work marshaled onto the main thread
pub enum Apc {
    /// Add a signal to the pending set
    Raise(Signal),
    /// Completion routine of an operation finished elsewhere
    Completion(Box<dyn FnOnce() + Send>),
}

impl fmt::Debug for Apc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Apc::Raise(signal) => write!(f, "Raise({})", signal),
            Apc::Completion(_) => f.write_str("Completion"),
        }
    }
}

/// Lock-free APC queue owned by the main thread
#[derive(Debug, Default)]
pub struct ApcQueue {
    queue: SegQueue<Apc>,
    parker: Arc<Parker>,
}

impl ApcQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake token of the main thread, unparked on every enqueue
    pub(crate) fn parker(&self) -> &Arc<Parker> {
        &self.parker
    }

    fn push(&self, apc: Apc) {
        trace!(apc = ?apc, "Queuing APC");
        self.queue.push(apc);
        self.parker.unpark();
    }

    pub(crate) fn pop(&self) -> Option<Apc> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Cloneable, `Send` producer side of the APC queue
#[derive(Debug, Clone)]
pub struct ApcSender {
    queue: Arc<ApcQueue>,
}

impl ApcSender {
    pub(crate) fn new(queue: Arc<ApcQueue>) -> Self {
        Self { queue }
    }

    /// Queue a signal for the main thread's pending set
    pub fn queue_signal(&self, signal: Signal) {
        self.queue.push(Apc::Raise(signal));
    }

    /// Queue a completion routine to run on the main thread
    pub fn queue_completion<F>(&self, routine: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Apc::Completion(Box::new(routine)));
    }

    pub fn queue(&self, apc: Apc) {
        self.queue.push(apc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_across_threads() {
        let queue = Arc::new(ApcQueue::new());
        let sender = ApcSender::new(queue.clone());

        thread::spawn(move || {
            sender.queue_signal(Signal::SIGINT);
            sender.queue_signal(Signal::SIGTERM);
        })
        .join()
        .unwrap();

        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(Apc::Raise(Signal::SIGINT))));
        assert!(matches!(queue.pop(), Some(Apc::Raise(Signal::SIGTERM))));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_enqueue_unparks_main_thread() {
        let queue = Arc::new(ApcQueue::new());
        ApcSender::new(queue.clone()).queue_completion(|| {});
        assert!(queue.parker().park_until(Some(std::time::Instant::now())));
    }
}
