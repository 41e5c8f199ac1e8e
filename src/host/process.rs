/*!
 * Process Host
 *
 * [`Host`] implementations. [`ProcessHost`] turns the native termination
 * signals into control notifications through a dedicated listener thread;
 * [`PanickingHost`] unwinds instead of ending the process, for tests and
 * embedding.
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::signals::{Host, HostEvent, NotificationBridge, SigSet};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

#[cfg(unix)]
use nix::sys::signal::{raise, SigSet as NativeSigSet, Signal as NativeSignal};

/// Map a native termination signal to the control notification it stands for
#[cfg(unix)]
fn host_event(native: NativeSignal) -> HostEvent {
    match native {
        NativeSignal::SIGINT => HostEvent::CtrlC,
        NativeSignal::SIGQUIT => HostEvent::CtrlBreak,
        NativeSignal::SIGHUP => HostEvent::Close,
        NativeSignal::SIGTERM => HostEvent::Shutdown,
        other => HostEvent::Other(other as u32),
    }
}

/// Production host: ends the process on fatal paths
#[derive(Debug, Default)]
pub struct ProcessHost {
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the termination signals on the calling thread (and every thread
    /// it spawns from now on) and consume them on a listener thread
    #[cfg(unix)]
    fn spawn_listener(bridge: NotificationBridge) -> SignalResult<JoinHandle<()>> {
        let mut set = NativeSigSet::empty();
        for native in [
            NativeSignal::SIGINT,
            NativeSignal::SIGQUIT,
            NativeSignal::SIGHUP,
            NativeSignal::SIGTERM,
        ] {
            set.add(native);
        }
        set.thread_block()
            .map_err(|e| SignalError::BridgeInstall(e.to_string()))?;

        thread::Builder::new()
            .name("ctrl-handler".into())
            .spawn(move || loop {
                match set.wait() {
                    Ok(native) => {
                        let event = host_event(native);
                        if !bridge.notify(event) {
                            warn!(event = %event, "Control notification declined");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "sigwait failed, control listener exiting");
                        break;
                    }
                }
            })
            .map_err(|e| SignalError::BridgeInstall(e.to_string()))
    }
}

impl Host for ProcessHost {
    fn install_notification_bridge(&self, bridge: NotificationBridge) -> SignalResult<()> {
        let mut listener = self.listener.lock();
        if listener.is_some() {
            warn!("Notification bridge already installed");
            return Ok(());
        }

        #[cfg(unix)]
        {
            *listener = Some(Self::spawn_listener(bridge)?);
            info!("Control notification listener installed");
        }

        #[cfg(not(unix))]
        {
            let _ = bridge;
            warn!("No native control notifications on this platform");
        }

        Ok(())
    }

    fn exit_main_thread(&self, code: i32) -> ! {
        info!(code, "Main thread exiting");
        std::process::exit(code)
    }

    fn raise_native_fault(&self) -> ! {
        error!("SIGSEGV raised, reporting native fault");
        #[cfg(unix)]
        {
            let _ = raise(NativeSignal::SIGSEGV);
        }
        std::process::abort()
    }

    fn integrity_violation(&self, unexpected: SigSet) -> ! {
        error!(unexpected = %unexpected, "Signal state integrity violation");
        std::process::abort()
    }
}

/// Host whose fatal paths panic
///
/// Notifications are never installed; drive the bridge by hand through
/// [`SignalContext::bridge`](crate::signals::SignalContext::bridge).
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingHost;

impl Host for PanickingHost {
    fn install_notification_bridge(&self, _bridge: NotificationBridge) -> SignalResult<()> {
        Ok(())
    }

    fn exit_main_thread(&self, code: i32) -> ! {
        panic!("main thread exited with code {}", code)
    }

    fn raise_native_fault(&self) -> ! {
        panic!("native fault raised")
    }

    fn integrity_violation(&self, unexpected: SigSet) -> ! {
        panic!("integrity violation: {}", unexpected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_native_signal_mapping() {
        assert_eq!(host_event(NativeSignal::SIGINT), HostEvent::CtrlC);
        assert_eq!(host_event(NativeSignal::SIGQUIT), HostEvent::CtrlBreak);
        assert_eq!(host_event(NativeSignal::SIGHUP), HostEvent::Close);
        assert_eq!(host_event(NativeSignal::SIGTERM), HostEvent::Shutdown);
        assert!(matches!(host_event(NativeSignal::SIGUSR1), HostEvent::Other(_)));
    }

    #[test]
    #[should_panic(expected = "main thread exited with code 3")]
    fn test_panicking_host_exit() {
        PanickingHost.exit_main_thread(3);
    }

    #[test]
    #[should_panic(expected = "integrity violation")]
    fn test_panicking_host_integrity() {
        PanickingHost.integrity_violation(SigSet::empty());
    }
}
