/*!
 * Signal Traits
 * Collaborator seams of the signal context: child table, alarm timer, host
 */

use super::sigset::SigSet;
use crate::core::errors::SignalResult;
use crate::core::sync::WaitHandle;
use crate::signals::apc::ApcSender;
use crate::signals::bridge::NotificationBridge;

#[cfg(test)]
use mockall::automock;

/// Child process table
///
/// Live children occupy the first `num_children() - num_zombies()` slots;
/// indices passed to [`child_to_zombie`](Self::child_to_zombie) refer to that
/// live range.
#[cfg_attr(test, automock)]
pub trait ChildTable {
    /// Forget every tracked child
    fn reset(&self);

    /// Total tracked children, live and zombie
    fn num_children(&self) -> usize;

    /// Children that terminated but are not reaped yet
    fn num_zombies(&self) -> usize;

    /// Wait handles of live children, in slot order
    fn live_handles(&self) -> Vec<WaitHandle>;

    /// Move the live child at `index` to the zombie state
    fn child_to_zombie(&self, index: usize);

    /// Default action for SIGCHLD: drop every zombie
    fn cleanup_zombies(&self);
}

/// Alarm timer collaborator
///
/// The timer raises SIGALRM by queuing work through the given sender; how and
/// when it does so is its own business.
pub trait AlarmTimer {
    fn init(&self, sender: ApcSender) -> SignalResult<()>;
}

/// Native host services
///
/// The fatal methods never return. Production hosts end the process;
/// test hosts unwind.
pub trait Host: Send + Sync {
    /// Route native control notifications into the bridge
    fn install_notification_bridge(&self, bridge: NotificationBridge) -> SignalResult<()>;

    /// Default action of a fatal signal: end the logical main thread
    fn exit_main_thread(&self, code: i32) -> !;

    /// Hand a SIGSEGV to the native fault reporting mechanism
    fn raise_native_fault(&self) -> !;

    /// An unexpected signal reached the pending set
    fn integrity_violation(&self, unexpected: SigSet) -> !;
}
