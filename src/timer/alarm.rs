/*!
 * Interval Timer
 *
 * `alarm`/`setitimer`-style timer. A background worker sleeps until the
 * armed deadline and marshals SIGALRM onto the main thread through the APC
 * queue; the signal context dispatches it at its next wait.
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::core::limits::MIN_TIMER_INTERVAL;
use crate::signals::{AlarmTimer, ApcSender, Signal};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct TimerState {
    sink: Option<ApcSender>,
    deadline: Option<Instant>,
    interval: Option<Duration>,
    fired: u64,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct TimerShared {
    state: Mutex<TimerState>,
    condvar: Condvar,
}

/// Default [`AlarmTimer`] implementation
#[derive(Debug, Default)]
pub struct IntervalTimer {
    shared: Arc<TimerShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot alarm after `after`; `Duration::ZERO` cancels
    ///
    /// Returns the time that was left on the previous alarm.
    pub fn alarm(&self, after: Duration) -> Option<Duration> {
        let initial = (!after.is_zero()).then_some(after);
        self.arm(initial, None)
    }

    /// Arm with an initial expiry and optional reload interval
    ///
    /// `initial = None` disarms. Returns the time left on the previous setting.
    pub fn arm(&self, initial: Option<Duration>, interval: Option<Duration>) -> Option<Duration> {
        let now = Instant::now();
        let mut state = self.shared.state.lock();
        let previous = state.deadline.map(|d| d.saturating_duration_since(now));

        // Expiries beyond the representable range never fire
        state.deadline = initial.and_then(|d| now.checked_add(d));
        state.interval = interval.map(|i| i.max(MIN_TIMER_INTERVAL));
        debug!(
            initial_ms = initial.map(|d| d.as_millis() as u64),
            interval_ms = state.interval.map(|i| i.as_millis() as u64),
            "Timer armed"
        );
        self.shared.condvar.notify_one();
        previous
    }

    /// Time until the next expiry, if armed
    pub fn remaining(&self) -> Option<Duration> {
        let state = self.shared.state.lock();
        state
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Number of expirations delivered so far
    pub fn fired(&self) -> u64 {
        self.shared.state.lock().fired
    }

    fn run(shared: Arc<TimerShared>) {
        let mut state = shared.state.lock();
        loop {
            if state.shutdown {
                break;
            }
            match state.deadline {
                None => shared.condvar.wait(&mut state),
                Some(deadline) if Instant::now() >= deadline => {
                    state.deadline = state.interval.and_then(|i| deadline.checked_add(i));
                    state.fired += 1;
                    if let Some(sink) = &state.sink {
                        trace!(fired = state.fired, "Timer expired");
                        sink.queue_signal(Signal::SIGALRM);
                    }
                }
                Some(deadline) => {
                    shared.condvar.wait_until(&mut state, deadline);
                }
            }
        }
    }
}

impl AlarmTimer for IntervalTimer {
    fn init(&self, sender: ApcSender) -> SignalResult<()> {
        self.shared.state.lock().sink = Some(sender);

        let mut worker = self.worker.lock();
        if worker.is_none() {
            let shared = self.shared.clone();
            let handle = thread::Builder::new()
                .name("sigalrm-timer".into())
                .spawn(move || IntervalTimer::run(shared))
                .map_err(|e| SignalError::TimerInit(e.to_string()))?;
            *worker = Some(handle);
            debug!("Timer worker started");
        }
        Ok(())
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.condvar.notify_all();
        if let Some(worker) = self.worker.get_mut().take() {
            let _ = worker.join();
        }
    }
}
