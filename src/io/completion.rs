/*!
 * Completion Workers
 *
 * Runs a blocking operation on a worker thread and delivers its result as a
 * completion APC. The result is published only when the main thread services
 * that APC inside a wait, the way alertable overlapped I/O behaves, so a
 * signal arriving first interrupts the waiter with EINTR semantics.
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::core::sync::deadline_after;
use crate::signals::{ApcSender, SignalContext, WaitOutcome};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

type Slot<T> = Arc<Mutex<Option<io::Result<T>>>>;

/// Result of an operation started with [`spawn_io`]
pub struct PendingIo<T> {
    ready: Slot<T>,
}

impl<T> PendingIo<T> {
    /// Take the result if its completion routine already ran
    pub fn try_take(&self) -> Option<io::Result<T>> {
        self.ready.lock().take()
    }

    pub fn is_complete(&self) -> bool {
        self.ready.lock().is_some()
    }

    /// Wait on `ctx` until the operation completes
    ///
    /// `Ok(None)` on timeout. A dispatched signal surfaces as
    /// `Err(Interrupted)` and leaves the operation pending, so the call can be
    /// retried.
    pub fn wait(&self, ctx: &SignalContext, timeout: Option<Duration>) -> SignalResult<Option<io::Result<T>>> {
        let deadline = deadline_after(timeout);
        loop {
            if let Some(result) = self.try_take() {
                return Ok(Some(result));
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            match ctx.wait_for_any(&[], remaining)? {
                WaitOutcome::TimedOut => return Ok(self.try_take()),
                outcome => trace!(outcome = ?outcome, "I/O wait woke"),
            }
        }
    }
}

impl<T> fmt::Debug for PendingIo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingIo")
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Run `op` on a worker thread, completing through `sender`'s APC queue
pub fn spawn_io<T, F>(sender: &ApcSender, op: F) -> SignalResult<PendingIo<T>>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let ready: Slot<T> = Arc::new(Mutex::new(None));
    let slot = ready.clone();
    let sender = sender.clone();

    thread::Builder::new()
        .name("io-worker".into())
        .spawn(move || {
            let result = op();
            debug!(ok = result.is_ok(), "I/O operation finished");
            sender.queue_completion(move || {
                *slot.lock() = Some(result);
            });
        })
        .map_err(|e| SignalError::HostError(e.to_string()))?;

    Ok(PendingIo { ready })
}
