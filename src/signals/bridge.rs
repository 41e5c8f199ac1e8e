/*!
 * Notification Bridge
 *
 * Entry point for native control notifications. Runs on whatever thread the
 * host chooses, so it never touches signal state directly: it queues an APC
 * and the main thread records the pending signal when it next waits.
 */

use super::apc::ApcSender;
use super::core::types::Signal;
use crate::core::sync::WaitHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Native control notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostEvent {
    /// Ctrl+C
    CtrlC,
    /// Ctrl+Break
    CtrlBreak,
    /// Console window closed
    Close,
    /// User logging off
    Logoff,
    /// System shutting down
    Shutdown,
    /// Any notification code the bridge does not recognize
    Other(u32),
}

impl HostEvent {
    /// Decode a native console control code
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => HostEvent::CtrlC,
            1 => HostEvent::CtrlBreak,
            2 => HostEvent::Close,
            5 => HostEvent::Logoff,
            6 => HostEvent::Shutdown,
            other => HostEvent::Other(other),
        }
    }

    /// Signal this notification turns into, if any
    pub fn signal(&self) -> Option<Signal> {
        match self {
            HostEvent::CtrlC => Some(Signal::SIGINT),
            HostEvent::CtrlBreak => Some(Signal::SIGTSTP),
            HostEvent::Close | HostEvent::Logoff | HostEvent::Shutdown => Some(Signal::SIGTERM),
            HostEvent::Other(_) => None,
        }
    }

    /// Close-class notifications hold the host until the main thread ends
    pub fn waits_for_exit(&self) -> bool {
        matches!(
            self,
            HostEvent::Close | HostEvent::Logoff | HostEvent::Shutdown
        )
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Other(code) => write!(f, "Other({})", code),
            event => write!(f, "{:?}", event),
        }
    }
}

/// Host-facing half of the signal context
///
/// `Send + Sync + Clone`: hand it to whatever native callback mechanism the
/// host provides.
#[derive(Debug, Clone)]
pub struct NotificationBridge {
    sender: ApcSender,
    main_thread: WaitHandle,
}

impl NotificationBridge {
    pub(crate) fn new(sender: ApcSender, main_thread: WaitHandle) -> Self {
        Self {
            sender,
            main_thread,
        }
    }

    /// Native control handler
    ///
    /// Returns `true` if the notification was handled, `false` to let the host
    /// fall through to its next handler. Close-class notifications block until
    /// the main thread has terminated.
    pub fn notify(&self, event: HostEvent) -> bool {
        debug!(event = %event, "Native control handler");

        let Some(signal) = event.signal() else {
            return false;
        };
        self.sender.queue_signal(signal);

        if event.waits_for_exit() {
            info!(event = %event, "Waiting for main thread to terminate");
            self.main_thread.wait(None);
        }
        true
    }

    /// Manual-reset handle set once the main thread has terminated
    pub fn main_thread_handle(&self) -> &WaitHandle {
        &self.main_thread
    }
}
