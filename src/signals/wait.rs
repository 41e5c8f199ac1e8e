/*!
 * Unified Wait Multiplexer
 *
 * The one blocking primitive of the process. Every blocking operation waits
 * here instead of on a native primitive, which is what makes emulated
 * signals observable to blocking calls at all.
 *
 * # Wake Sources
 *
 * - a live child handle (becomes SIGCHLD)
 * - a caller handle (reported by index)
 * - a serviced APC (signal notification or I/O completion)
 * - the timeout
 */

use super::apc::{Apc, ApcQueue};
use super::context::{SignalContext, StatsCounters};
use super::core::types::Signal;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::sync::{deadline_after, HandleState, WaitHandle, WatchGuard};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

/// Successful result of [`SignalContext::wait_for_any`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitOutcome {
    /// Caller handle at this index became ready
    Ready(usize),
    /// A live child terminated and SIGCHLD was dispatched without interrupting
    ChildExited,
    /// Woken to service queued APCs
    Completion,
    /// Timeout elapsed with nothing ready
    TimedOut,
}

/// Raw result of the alertable host wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostWake {
    /// Object at this index of the combined list is signaled
    Object(usize),
    /// One or more APCs ran
    IoCompletion,
    Timeout,
    /// The wait could not proceed (closed handle at this index)
    Failed(String),
}

/// Block until an object is signaled, APCs were serviced, or the deadline
/// passes
///
/// Objects are checked before queued APCs; `service` runs each APC on the
/// calling thread.
pub(crate) fn wait_alertable<F>(
    apcs: &ApcQueue,
    handles: &[WaitHandle],
    timeout: Option<Duration>,
    mut service: F,
) -> HostWake
where
    F: FnMut(Apc),
{
    let deadline = deadline_after(timeout);
    let parker = apcs.parker();
    let _watch = WatchGuard::new(handles, parker);

    loop {
        for (index, handle) in handles.iter().enumerate() {
            match handle.poll_acquire() {
                HandleState::Signaled => return HostWake::Object(index),
                HandleState::Closed => {
                    return HostWake::Failed(format!("handle {} is closed", index))
                }
                HandleState::Pending => {}
            }
        }

        let mut serviced = 0usize;
        while let Some(apc) = apcs.pop() {
            service(apc);
            serviced += 1;
        }
        if serviced > 0 {
            trace!(serviced, "APCs serviced");
            return HostWake::IoCompletion;
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            return HostWake::Timeout;
        }
        parker.park_until(deadline);
    }
}

impl SignalContext {
    /// Wait for any handle, a serviced APC, or the timeout
    ///
    /// Live child handles are watched alongside `handles`; a child wake marks
    /// the child zombie and queues SIGCHLD. Pending signals are dispatched
    /// before returning, so `Err(Interrupted)` means a handler ran.
    /// `Some(Duration::ZERO)` polls; `None` waits forever.
    pub fn wait_for_any(
        &self,
        handles: &[WaitHandle],
        timeout: Option<Duration>,
    ) -> SignalResult<WaitOutcome> {
        StatsCounters::bump(&self.stats.waits);

        let live_count = self
            .children
            .num_children()
            .saturating_sub(self.children.num_zombies());
        let requested = live_count + handles.len();
        let limit = self.config.max_wait_objects;
        if requested > limit {
            debug!(requested, limit, "wait() - max events reached");
            return Err(SignalError::CapacityExceeded { requested, limit });
        }

        let mut combined = self.children.live_handles();
        combined.truncate(live_count);
        let live_count = combined.len();
        combined.extend_from_slice(handles);

        trace!(
            events = handles.len(),
            children = live_count,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "wait() on events and children"
        );

        let wake = wait_alertable(&self.apcs, &combined, timeout, |apc| self.service_apc(apc));

        let outcome = match wake {
            HostWake::Object(index) if index < live_count => {
                debug!(index, "Child handle signaled");
                StatsCounters::bump(&self.stats.child_exits);
                self.mark_pending(Signal::SIGCHLD);
                self.children.child_to_zombie(index);
                WaitOutcome::ChildExited
            }
            HostWake::Object(index) => WaitOutcome::Ready(index - live_count),
            HostWake::IoCompletion => WaitOutcome::Completion,
            HostWake::Timeout => {
                StatsCounters::bump(&self.stats.timeouts);
                return Ok(WaitOutcome::TimedOut);
            }
            HostWake::Failed(reason) => {
                error!(reason = %reason, "Unexpected wait end");
                return Err(SignalError::HostError(reason));
            }
        };

        if !self.pending().is_empty() {
            self.process_pending()?;
        }
        Ok(outcome)
    }

    /// Service already-queued APCs and dispatch pending signals without
    /// blocking
    pub fn poll(&self) -> SignalResult<WaitOutcome> {
        self.wait_for_any(&[], Some(Duration::ZERO))
    }

    fn service_apc(&self, apc: Apc) {
        match apc {
            Apc::Raise(signal) => {
                trace!(signal = %signal, "APC: signal pending");
                StatsCounters::bump(&self.stats.notifications_serviced);
                self.mark_pending(signal);
            }
            Apc::Completion(routine) => routine(),
        }
    }
}
