/*!
 * Deferred Dispatcher
 * Executes dispositions and drains the pending set in priority order
 */

use super::context::{SignalContext, StatsCounters};
use super::core::sigset::SigSet;
use super::core::types::{Disposition, Signal};
use crate::core::errors::{SignalError, SignalResult};
use tracing::{debug, error, info, warn};

/// Signals allowed in the pending set, in dispatch order
///
/// SIGCHLD goes first so interrupt and terminate handlers observe a child
/// table that already reflects reaped children.
pub const DISPATCH_ORDER: [Signal; 5] = [
    Signal::SIGCHLD,
    Signal::SIGINT,
    Signal::SIGALRM,
    Signal::SIGTERM,
    Signal::SIGTSTP,
];

/// [`DISPATCH_ORDER`] as a set
pub const EXPECTED_PENDING: SigSet = SigSet::of(&DISPATCH_ORDER);

impl SignalContext {
    /// Execute the disposition of a raw signal number now, on this thread
    pub fn raise(&self, signum: u32) -> SignalResult<()> {
        let signal = Signal::from_number(signum)?;
        self.raise_signal(signal);
        Ok(())
    }

    /// Execute the disposition of `signal` now, on this thread
    ///
    /// SIGSEGV bypasses the table and goes to the native fault mechanism.
    /// The default action is zombie cleanup for SIGCHLD and main-thread
    /// termination for everything else.
    pub fn raise_signal(&self, signal: Signal) {
        debug!(signal = %signal, "raise");
        if signal == Signal::SIGSEGV {
            self.host.raise_native_fault();
        }

        // Clone out of the table so the handler may re-enter the registry
        let disposition = self.signal_disposition(signal);
        match disposition {
            Disposition::Handler(handler) => handler(self, signal),
            Disposition::Ignore => {}
            Disposition::Default => match signal {
                Signal::SIGCHLD => self.children.cleanup_zombies(),
                _ => {
                    info!(signal = %signal, "Default action terminates main thread");
                    self.host.exit_main_thread(self.config.default_exit_code);
                }
            },
        }
    }

    /// Dispatch every pending signal
    ///
    /// Returns `Err(Interrupted)` if any signal other than SIGALRM had a
    /// non-ignore disposition. A pending signal outside [`DISPATCH_ORDER`]
    /// is an integrity violation and never returns.
    pub fn process_pending(&self) -> SignalResult<()> {
        let pending = self.pending.get();
        let unexpected = pending.difference(EXPECTED_PENDING);
        if !unexpected.is_empty() {
            error!(
                unexpected = %unexpected,
                pending = %pending,
                "Unexpected signals in pending queue"
            );
            self.host.integrity_violation(unexpected);
        }

        // Take the set so nested waits inside handlers start from empty
        let snapshot = self.pending.replace(SigSet::empty());
        let mut interrupted = false;

        for signal in DISPATCH_ORDER {
            if !snapshot.contains(signal) {
                continue;
            }
            if self.signal_disposition(signal).is_ignore() {
                debug!(signal = %signal, "Ignored pending signal");
                continue;
            }

            self.raise_signal(signal);
            StatsCounters::bump(&self.stats.signals_dispatched);

            // Timed callers must not see EINTR from their own alarm
            if signal == Signal::SIGALRM {
                StatsCounters::bump(&self.stats.alarms);
            } else {
                interrupted = true;
            }
        }

        if interrupted {
            warn!("A signal has interrupted and was processed");
            StatsCounters::bump(&self.stats.interruptions);
            return Err(SignalError::Interrupted);
        }
        Ok(())
    }
}
