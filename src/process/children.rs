/*!
 * Child Registry
 * Tracks spawned children and their wait handles for the signal context
 *
 * Slot layout: live children first, zombies packed at the tail. Moving a
 * child to zombie swaps it with the last live slot, so the first
 * `num_children - num_zombies` handles are always the live set.
 */

use crate::core::errors::{SignalError, SignalResult};
use crate::core::limits::MAX_CHILDREN;
use crate::core::sync::WaitHandle;
use crate::core::types::{ExitCode, Pid};
use crate::signals::ChildTable;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io;
use std::process::Command;
use std::sync::{Arc, OnceLock};
use std::thread;
use tracing::{debug, info, warn};

/// A tracked child process
#[derive(Debug, Clone)]
pub struct ChildRecord {
    pub pid: Pid,
    /// Manual-reset handle, set when the child terminates
    pub handle: WaitHandle,
    status: Arc<OnceLock<ExitCode>>,
}

impl ChildRecord {
    /// Exit status, once the child has terminated and it was observed
    pub fn exit_code(&self) -> Option<ExitCode> {
        self.status.get().copied()
    }
}

/// Reaped child, as returned by [`ChildRegistry::reap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildExit {
    pub pid: Pid,
    pub exit_code: Option<ExitCode>,
}

#[derive(Debug, Default)]
struct ChildSlots {
    children: Vec<ChildRecord>,
    zombies: usize,
}

impl ChildSlots {
    fn live(&self) -> usize {
        self.children.len() - self.zombies
    }
}

/// Default [`ChildTable`] implementation
#[derive(Debug)]
pub struct ChildRegistry {
    slots: Mutex<ChildSlots>,
    capacity: usize,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CHILDREN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(ChildSlots::default()),
            capacity,
        }
    }

    /// Track a child whose termination sets `handle`
    pub fn add_child(&self, pid: Pid, handle: WaitHandle) -> SignalResult<()> {
        self.insert(ChildRecord {
            pid,
            handle,
            status: Arc::new(OnceLock::new()),
        })
    }

    fn insert(&self, record: ChildRecord) -> SignalResult<()> {
        let mut slots = self.slots.lock();
        if slots.children.len() >= self.capacity {
            warn!(pid = record.pid, "Child table full");
            return Err(SignalError::ChildLimit(slots.children.len()));
        }

        // New children go to the end of the live range
        let live = slots.live();
        debug!(pid = record.pid, slot = live, "Tracking child");
        slots.children.insert(live, record);
        Ok(())
    }

    /// Spawn `command` and track it
    ///
    /// A watcher thread waits for the child, records its exit status, and
    /// sets its handle.
    pub fn spawn(&self, command: &mut Command) -> io::Result<Pid> {
        let mut child = command.spawn()?;
        let pid = child.id();
        let handle = WaitHandle::manual();
        let status = Arc::new(OnceLock::new());

        let record = ChildRecord {
            pid,
            handle: handle.clone(),
            status: status.clone(),
        };
        if let Err(e) = self.insert(record) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }

        thread::Builder::new()
            .name(format!("child-watch-{}", pid))
            .spawn(move || {
                let code = match child.wait() {
                    Ok(exit) => exit.code().unwrap_or(-1),
                    Err(e) => {
                        warn!(pid, error = %e, "Waiting on child failed");
                        -1
                    }
                };
                let _ = status.set(code);
                handle.set();
            })?;

        info!(pid, "Spawned child");
        Ok(pid)
    }

    /// Stop tracking a child regardless of state
    pub fn remove_child(&self, pid: Pid) -> bool {
        let mut slots = self.slots.lock();
        let Some(index) = slots.children.iter().position(|c| c.pid == pid) else {
            return false;
        };
        if index >= slots.live() {
            slots.zombies -= 1;
        }
        slots.children.remove(index);
        true
    }

    /// Non-blocking reap of a zombie (`None` matches any zombie)
    pub fn reap(&self, pid: Option<Pid>) -> Option<ChildExit> {
        let mut slots = self.slots.lock();
        let live = slots.live();
        let offset = slots.children[live..]
            .iter()
            .position(|c| pid.map_or(true, |p| c.pid == p))?;

        let record = slots.children.remove(live + offset);
        slots.zombies -= 1;
        debug!(pid = record.pid, "Reaped zombie");
        Some(ChildExit {
            pid: record.pid,
            exit_code: record.exit_code(),
        })
    }

    /// Snapshot of every tracked child, live first
    pub fn children(&self) -> Vec<ChildRecord> {
        self.slots.lock().children.clone()
    }

    pub fn is_zombie(&self, pid: Pid) -> bool {
        let slots = self.slots.lock();
        let live = slots.live();
        slots.children[live..].iter().any(|c| c.pid == pid)
    }
}

impl Default for ChildRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildTable for ChildRegistry {
    fn reset(&self) {
        let mut slots = self.slots.lock();
        slots.children.clear();
        slots.zombies = 0;
    }

    fn num_children(&self) -> usize {
        self.slots.lock().children.len()
    }

    fn num_zombies(&self) -> usize {
        self.slots.lock().zombies
    }

    fn live_handles(&self) -> Vec<WaitHandle> {
        let slots = self.slots.lock();
        slots.children[..slots.live()]
            .iter()
            .map(|c| c.handle.clone())
            .collect()
    }

    fn child_to_zombie(&self, index: usize) {
        let mut slots = self.slots.lock();
        let live = slots.live();
        if index >= live {
            warn!(index, live, "child_to_zombie on a non-live slot");
            return;
        }
        slots.children.swap(index, live - 1);
        slots.zombies += 1;
        debug!(pid = slots.children[live - 1].pid, "Child is now a zombie");
    }

    fn cleanup_zombies(&self) {
        let mut slots = self.slots.lock();
        let live = slots.live();
        let reaped = slots.zombies;
        slots.children.truncate(live);
        slots.zombies = 0;
        if reaped > 0 {
            debug!(reaped, "Cleaned up zombie children");
        }
    }
}
