/*!
 * sigemu
 * POSIX signal emulation and unified event waiting for hosts without native
 * signals
 */

pub mod core;
pub mod host;
pub mod io;
pub mod monitoring;
pub mod process;
pub mod signals;
pub mod timer;

// Re-exports
pub use self::core::{EmulatorConfig, ResetMode, SignalError, SignalResult, WaitHandle};
pub use host::{PanickingHost, ProcessHost};
pub use io::{spawn_io, PendingIo};
pub use monitoring::init_tracing;
pub use process::{ChildExit, ChildRecord, ChildRegistry};
pub use signals::{
    ApcSender, Disposition, DispatchStats, HostEvent, NotificationBridge, SigSet, Signal,
    SignalContext, SignalContextBuilder, WaitOutcome,
};
pub use timer::IntervalTimer;
