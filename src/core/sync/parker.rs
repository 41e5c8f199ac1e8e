/*!
 * Parker
 *
 * Single-consumer wake token built on parking_lot::Condvar.
 *
 * One thread parks; any number of threads unpark. A notification delivered
 * while nobody is parked is remembered, so the next park returns immediately
 * and no wakeup is lost between "check for work" and "go to sleep".
 */

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Absolute deadline for a relative timeout
///
/// `None` waits forever, including timeouts too large to represent as an
/// `Instant`.
#[inline]
pub fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

/// Wake token for the thread that owns it
#[repr(C, align(64))] // Cache-line aligned, unparked from foreign threads
#[derive(Debug, Default)]
pub struct Parker {
    notified: Mutex<bool>,
    condvar: Condvar,
}

impl Parker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the parked thread, or pre-arm the next park
    pub fn unpark(&self) {
        let mut notified = self.notified.lock();
        *notified = true;
        self.condvar.notify_one();
    }

    /// Park until unparked or the deadline passes
    ///
    /// Returns `true` if woken by [`unpark`](Self::unpark), `false` on deadline.
    /// Consumes the notification either way.
    pub fn park_until(&self, deadline: Option<Instant>) -> bool {
        let mut notified = self.notified.lock();
        while !*notified {
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut notified, deadline).timed_out() {
                        break;
                    }
                }
                None => self.condvar.wait(&mut notified),
            }
        }
        std::mem::replace(&mut *notified, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_unpark_before_park_is_remembered() {
        let parker = Parker::new();
        parker.unpark();

        let start = Instant::now();
        assert!(parker.park_until(Some(Instant::now() + Duration::from_secs(1))));
        assert!(start.elapsed() < Duration::from_millis(500));

        // Token consumed
        assert!(!parker.park_until(Some(Instant::now())));
    }

    #[test]
    fn test_park_times_out() {
        let parker = Parker::new();
        let start = Instant::now();
        assert!(!parker.park_until(Some(Instant::now() + Duration::from_millis(50))));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_unpark_from_other_thread() {
        let parker = Arc::new(Parker::new());
        let remote = parker.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.unpark();
        });

        assert!(parker.park_until(None));
        handle.join().unwrap();
    }

    #[test]
    fn test_deadline_after_saturates_to_forever() {
        assert_eq!(deadline_after(None), None);
        assert_eq!(deadline_after(Some(Duration::MAX)), None);
        assert!(deadline_after(Some(Duration::from_secs(1))).is_some());
    }
}
