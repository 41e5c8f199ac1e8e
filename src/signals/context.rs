/*!
 * Signal Context
 *
 * The process-wide signal state: disposition registry, pending set, APC
 * queue, and collaborator handles. Built once by the entry point through
 * [`SignalContextBuilder::initialize`] and passed to whatever needs it.
 *
 * # Threading
 *
 * The context is `!Send` and `!Sync`: the thread that initializes it is the
 * logical main thread and the only mutator of registry and pending set.
 * Other threads reach it exclusively through [`ApcSender`] and
 * [`NotificationBridge`].
 */

use super::apc::{ApcQueue, ApcSender};
use super::bridge::NotificationBridge;
use super::core::sigset::SigSet;
use super::core::traits::{AlarmTimer, ChildTable, Host};
use super::core::types::{Disposition, DispatchStats, Signal};
use super::registry::Registry;
use crate::core::config::EmulatorConfig;
use crate::core::errors::{SignalError, SignalResult};
use crate::core::sync::WaitHandle;
use crate::host::ProcessHost;
use crate::process::ChildRegistry;
use crate::timer::IntervalTimer;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::{debug, info};

/// Per-context dispatch counters (main thread only)
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub notifications_serviced: Cell<u64>,
    pub signals_dispatched: Cell<u64>,
    pub interruptions: Cell<u64>,
    pub alarms: Cell<u64>,
    pub child_exits: Cell<u64>,
    pub waits: Cell<u64>,
    pub timeouts: Cell<u64>,
}

impl StatsCounters {
    #[inline]
    pub fn bump(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            notifications_serviced: self.notifications_serviced.get(),
            signals_dispatched: self.signals_dispatched.get(),
            interruptions: self.interruptions.get(),
            alarms: self.alarms.get(),
            child_exits: self.child_exits.get(),
            waits: self.waits.get(),
            timeouts: self.timeouts.get(),
        }
    }
}

/// Process-wide signal emulation state
pub struct SignalContext {
    pub(crate) config: EmulatorConfig,
    pub(crate) registry: RefCell<Registry>,
    pub(crate) pending: Cell<SigSet>,
    pub(crate) apcs: Arc<ApcQueue>,
    pub(crate) children: Arc<dyn ChildTable>,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) stats: StatsCounters,
    // Held so the timer lives as long as the context
    _timer: Arc<dyn AlarmTimer>,
    bridge: NotificationBridge,
    main_thread: WaitHandle,
}

impl SignalContext {
    pub fn builder() -> SignalContextBuilder {
        SignalContextBuilder::new()
    }

    /// Install a disposition for a raw signal number
    ///
    /// Returns the disposition it replaces. Out-of-range numbers fail with
    /// `InvalidSignal` and leave the registry untouched.
    pub fn set_disposition(&self, signum: u32, disposition: Disposition) -> SignalResult<Disposition> {
        let signal = Signal::from_number(signum)?;
        Ok(self.set_signal_disposition(signal, disposition))
    }

    /// Look up the disposition for a raw signal number
    pub fn get_disposition(&self, signum: u32) -> SignalResult<Disposition> {
        let signal = Signal::from_number(signum)?;
        Ok(self.signal_disposition(signal))
    }

    /// Typed variant of [`set_disposition`](Self::set_disposition); cannot fail
    pub fn set_signal_disposition(&self, signal: Signal, disposition: Disposition) -> Disposition {
        self.registry.borrow_mut().set(signal, disposition)
    }

    pub fn signal_disposition(&self, signal: Signal) -> Disposition {
        self.registry.borrow().get(signal).clone()
    }

    /// Snapshot of signals recorded but not yet dispatched
    pub fn pending(&self) -> SigSet {
        self.pending.get()
    }

    pub(crate) fn mark_pending(&self, signal: Signal) {
        let mut pending = self.pending.get();
        pending.insert(signal);
        self.pending.set(pending);
    }

    /// Producer handle for marshaling work onto this thread
    pub fn apc_sender(&self) -> ApcSender {
        ApcSender::new(self.apcs.clone())
    }

    /// Host-facing notification entry point
    pub fn bridge(&self) -> NotificationBridge {
        self.bridge.clone()
    }

    /// Manual-reset handle set when this context (the main thread) ends
    pub fn main_thread_handle(&self) -> WaitHandle {
        self.main_thread.clone()
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats.snapshot()
    }
}

impl Drop for SignalContext {
    fn drop(&mut self) {
        debug!("Main thread terminating, releasing blocked control handlers");
        self.main_thread.set();
    }
}

/// Builder for [`SignalContext`]
///
/// Collaborators default to the production implementations: [`ProcessHost`],
/// [`ChildRegistry`], and [`IntervalTimer`].
pub struct SignalContextBuilder {
    config: EmulatorConfig,
    host: Option<Arc<dyn Host>>,
    children: Option<Arc<dyn ChildTable>>,
    timer: Option<Arc<dyn AlarmTimer>>,
}

impl SignalContextBuilder {
    pub fn new() -> Self {
        Self {
            config: EmulatorConfig::default(),
            host: None,
            children: None,
            timer: None,
        }
    }

    pub fn with_config(mut self, config: EmulatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_children(mut self, children: Arc<dyn ChildTable>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_timer(mut self, timer: Arc<dyn AlarmTimer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Reset the child table, set up an all-default registry with an empty
    /// pending set, register the notification bridge with the host, and
    /// initialize the timer
    pub fn initialize(self) -> SignalResult<SignalContext> {
        let host = self.host.unwrap_or_else(|| Arc::new(ProcessHost::new()));
        let children = self
            .children
            .unwrap_or_else(|| Arc::new(ChildRegistry::new()));
        let timer = self
            .timer
            .unwrap_or_else(|| Arc::new(IntervalTimer::new()));

        children.reset();

        let apcs = Arc::new(ApcQueue::new());
        let main_thread = WaitHandle::manual();
        let bridge = NotificationBridge::new(ApcSender::new(apcs.clone()), main_thread.clone());

        host.install_notification_bridge(bridge.clone())?;
        if let Err(e) = timer.init(ApcSender::new(apcs.clone())) {
            // No main thread will ever run; release close handlers already parked
            main_thread.set();
            return Err(match e {
                SignalError::TimerInit(_) => e,
                other => SignalError::TimerInit(other.to_string()),
            });
        }

        info!(
            max_wait_objects = self.config.max_wait_objects,
            "Signal context initialized"
        );

        Ok(SignalContext {
            config: self.config,
            registry: RefCell::new(Registry::new()),
            pending: Cell::new(SigSet::empty()),
            apcs,
            children,
            host,
            stats: StatsCounters::default(),
            _timer: timer,
            bridge,
            main_thread,
        })
    }
}

impl Default for SignalContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
