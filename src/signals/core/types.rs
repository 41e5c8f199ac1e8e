/*!
 * Signal Types
 * Emulated signal numbers, dispositions, and statistics
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::core::limits::SIGNAL_COUNT;
use crate::signals::context::SignalContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Emulated signal numbers
///
/// The emulator uses its own compact numbering so the disposition table is a
/// dense array. Raw numbers outside `0..SIGNAL_COUNT` never become a `Signal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum Signal {
    /// Interrupt from keyboard (Ctrl+C)
    SIGINT = 0,
    /// Invalid memory reference
    SIGSEGV = 1,
    /// Broken pipe
    SIGPIPE = 2,
    /// Child process terminated
    SIGCHLD = 3,
    /// Timer signal
    SIGALRM = 4,
    /// Stop typed at terminal (Ctrl+Break)
    SIGTSTP = 5,
    /// Hangup detected on controlling terminal
    SIGHUP = 6,
    /// Quit from keyboard
    SIGQUIT = 7,
    /// Termination signal (console close, logoff, shutdown)
    SIGTERM = 8,
    /// Terminal input for background process
    SIGTTIN = 9,
    /// Terminal output for background process
    SIGTTOU = 10,
}

impl Signal {
    /// Every emulated signal, in numeric order
    pub const ALL: [Signal; SIGNAL_COUNT] = [
        Signal::SIGINT,
        Signal::SIGSEGV,
        Signal::SIGPIPE,
        Signal::SIGCHLD,
        Signal::SIGALRM,
        Signal::SIGTSTP,
        Signal::SIGHUP,
        Signal::SIGQUIT,
        Signal::SIGTERM,
        Signal::SIGTTIN,
        Signal::SIGTTOU,
    ];

    /// Convert from signal number
    pub fn from_number(n: u32) -> SignalResult<Self> {
        Self::ALL
            .get(n as usize)
            .copied()
            .ok_or(SignalError::InvalidSignal(n))
    }

    /// Get signal number
    #[inline]
    pub fn number(&self) -> u32 {
        *self as u32
    }

    /// Index into per-signal tables
    #[inline]
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Signal::SIGINT => "Interrupt",
            Signal::SIGSEGV => "Segmentation fault",
            Signal::SIGPIPE => "Broken pipe",
            Signal::SIGCHLD => "Child status changed",
            Signal::SIGALRM => "Alarm clock",
            Signal::SIGTSTP => "Stopped",
            Signal::SIGHUP => "Hangup",
            Signal::SIGQUIT => "Quit",
            Signal::SIGTERM => "Terminated",
            Signal::SIGTTIN => "Stopped (tty input)",
            Signal::SIGTTOU => "Stopped (tty output)",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.number())
    }
}

impl TryFrom<u32> for Signal {
    type Error = SignalError;

    fn try_from(n: u32) -> SignalResult<Self> {
        Signal::from_number(n)
    }
}

/// Signal handler callback
///
/// Runs on the main thread with the owning context, so a handler may change
/// dispositions or block in [`SignalContext::wait_for_any`] itself.
pub type HandlerFn = Rc<dyn Fn(&SignalContext, Signal)>;

/// Configured response to a signal
#[derive(Clone, Default)]
pub enum Disposition {
    /// Built-in action for the signal
    #[default]
    Default,
    /// Drop the signal silently
    Ignore,
    /// Invoke an application handler
    Handler(HandlerFn),
}

impl Disposition {
    /// Wrap a closure as a handler disposition
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&SignalContext, Signal) + 'static,
    {
        Disposition::Handler(Rc::new(f))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Disposition::Default)
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Disposition::Ignore)
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, Disposition::Handler(_))
    }
}

/// Handlers compare by identity
impl PartialEq for Disposition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Disposition::Default, Disposition::Default) => true,
            (Disposition::Ignore, Disposition::Ignore) => true,
            (Disposition::Handler(a), Disposition::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Default => f.write_str("Default"),
            Disposition::Ignore => f.write_str("Ignore"),
            Disposition::Handler(h) => write!(f, "Handler({:p})", Rc::as_ptr(h) as *const ()),
        }
    }
}

/// Dispatch statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Marshaled signal notifications serviced on the main thread
    pub notifications_serviced: u64,
    /// Dispositions executed by the dispatcher
    pub signals_dispatched: u64,
    /// Dispatch passes that returned `Interrupted`, including direct
    /// `process_pending` calls
    pub interruptions: u64,
    /// SIGALRM dispatches (never interrupting)
    pub alarms: u64,
    /// Child handles observed ready
    pub child_exits: u64,
    /// Calls into the wait multiplexer
    pub waits: u64,
    /// Waits that ended by timeout
    pub timeouts: u64,
}
