/*!
 * Signals Module
 * POSIX-style deferred signal delivery on a callback-based host
 */

pub mod apc;
pub mod bridge;
pub mod context;
pub mod core;
mod dispatcher;
pub mod registry;
pub mod wait;

// Re-export public API
pub use apc::{Apc, ApcSender};
pub use bridge::{HostEvent, NotificationBridge};
pub use context::{SignalContext, SignalContextBuilder};
pub use self::core::*;
pub use dispatcher::{DISPATCH_ORDER, EXPECTED_PENDING};
pub use registry::Registry;
pub use wait::WaitOutcome;
