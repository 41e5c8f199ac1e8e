/*!
 * Wait Handles
 *
 * Event objects that can be waited on individually or as part of a
 * multi-object wait. A handle is signaled by any thread; waiters register a
 * [`Parker`] on every handle they watch and are unparked when one of them is
 * set.
 *
 * # Reset Modes
 *
 * - **Manual**: stays signaled until [`WaitHandle::reset`] (process handles,
 *   termination handles)
 * - **Auto**: a successful wait consumes the signal (one-shot wakeups)
 */

use super::parker::{deadline_after, Parker};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a signaled handle behaves after a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    Manual,
    Auto,
}

/// Observed state of a handle during a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Signaled,
    Pending,
    Closed,
}

#[derive(Default)]
struct EventState {
    signaled: bool,
    closed: bool,
    watchers: Vec<Arc<Parker>>,
}

struct EventInner {
    mode: ResetMode,
    state: Mutex<EventState>,
}

/// Cloneable reference to an event object
///
/// Clones refer to the same object; equality is identity.
#[derive(Clone)]
pub struct WaitHandle {
    inner: Arc<EventInner>,
}

impl WaitHandle {
    pub fn new(mode: ResetMode) -> Self {
        Self {
            inner: Arc::new(EventInner {
                mode,
                state: Mutex::new(EventState::default()),
            }),
        }
    }

    /// Handle that stays signaled once set
    pub fn manual() -> Self {
        Self::new(ResetMode::Manual)
    }

    /// Handle consumed by the first successful wait
    pub fn auto() -> Self {
        Self::new(ResetMode::Auto)
    }

    pub fn mode(&self) -> ResetMode {
        self.inner.mode
    }

    /// Signal the handle and wake every registered watcher
    pub fn set(&self) {
        let mut state = self.inner.state.lock();
        if state.closed {
            return;
        }
        state.signaled = true;
        for watcher in &state.watchers {
            watcher.unpark();
        }
    }

    pub fn reset(&self) {
        self.inner.state.lock().signaled = false;
    }

    pub fn is_set(&self) -> bool {
        self.inner.state.lock().signaled
    }

    /// Invalidate the handle; waits that include it fail
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        state.signaled = false;
        for watcher in state.watchers.drain(..) {
            watcher.unpark();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Check the handle, consuming the signal if auto-reset
    pub fn poll_acquire(&self) -> HandleState {
        let mut state = self.inner.state.lock();
        if state.closed {
            HandleState::Closed
        } else if state.signaled {
            if self.inner.mode == ResetMode::Auto {
                state.signaled = false;
            }
            HandleState::Signaled
        } else {
            HandleState::Pending
        }
    }

    pub(crate) fn watch(&self, parker: &Arc<Parker>) {
        let mut state = self.inner.state.lock();
        if !state.closed {
            state.watchers.push(parker.clone());
        }
    }

    pub(crate) fn unwatch(&self, parker: &Arc<Parker>) {
        let mut state = self.inner.state.lock();
        if let Some(pos) = state.watchers.iter().position(|w| Arc::ptr_eq(w, parker)) {
            state.watchers.swap_remove(pos);
        }
    }

    /// Block until this handle is signaled
    ///
    /// Returns `true` if signaled, `false` on timeout or if the handle is closed.
    /// Does not service queued APCs; use the signal context's wait for that.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = deadline_after(timeout);
        let parker = Arc::new(Parker::new());
        self.watch(&parker);

        let signaled = loop {
            match self.poll_acquire() {
                HandleState::Signaled => break true,
                HandleState::Closed => break false,
                HandleState::Pending => {}
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break false;
            }
            parker.park_until(deadline);
        };

        self.unwatch(&parker);
        signaled
    }

    /// Identity comparison
    pub fn same_object(&self, other: &WaitHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for WaitHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl Eq for WaitHandle {}

impl fmt::Debug for WaitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WaitHandle")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("mode", &self.inner.mode)
            .field("signaled", &state.signaled)
            .field("closed", &state.closed)
            .finish()
    }
}

/// Unregisters a parker from a set of handles when dropped
pub(crate) struct WatchGuard<'a> {
    handles: &'a [WaitHandle],
    parker: &'a Arc<Parker>,
}

impl<'a> WatchGuard<'a> {
    pub(crate) fn new(handles: &'a [WaitHandle], parker: &'a Arc<Parker>) -> Self {
        for handle in handles {
            handle.watch(parker);
        }
        Self { handles, parker }
    }
}

impl Drop for WatchGuard<'_> {
    fn drop(&mut self) {
        for handle in self.handles {
            handle.unwatch(self.parker);
        }
    }
}
