/*!
 * Wait Multiplexer Tests
 * Timeouts, capacity, handle readiness, and child wakes
 */

mod common;

use common::{context, context_with_children};
use sigemu::signals::ChildTable;
use sigemu::{Disposition, EmulatorConfig, Signal, SignalError, WaitHandle, WaitOutcome};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_timeout_elapses() {
    let ctx = context();
    let start = Instant::now();
    let outcome = ctx
        .wait_for_any(&[], Some(Duration::from_millis(50)))
        .unwrap();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(ctx.stats().timeouts, 1);
}

#[test]
fn test_huge_timeout_is_infinite() {
    let ctx = context();
    let handle = WaitHandle::manual();
    handle.set();

    assert_eq!(
        ctx.wait_for_any(&[handle], Some(Duration::MAX)),
        Ok(WaitOutcome::Ready(0))
    );
}

#[test]
fn test_poll_with_nothing_ready() {
    let ctx = context();
    assert_eq!(ctx.poll(), Ok(WaitOutcome::TimedOut));
}

#[test]
fn test_capacity_counts_live_children() {
    let (ctx, children) = context_with_children(EmulatorConfig::default());
    let handles: Vec<_> = (0..64).map(|_| WaitHandle::manual()).collect();
    assert_eq!(ctx.wait_for_any(&handles, Some(Duration::ZERO)), Ok(WaitOutcome::TimedOut));

    children.add_child(1, WaitHandle::manual()).unwrap();
    assert_eq!(
        ctx.wait_for_any(&handles, Some(Duration::ZERO)),
        Err(SignalError::CapacityExceeded {
            requested: 65,
            limit: 64
        })
    );

    // Zombies no longer occupy a wait slot
    children.child_to_zombie(0);
    assert_eq!(ctx.wait_for_any(&handles, Some(Duration::ZERO)), Ok(WaitOutcome::TimedOut));
}

#[test]
fn test_configured_capacity() {
    let config = EmulatorConfig::default().with_max_wait_objects(2);
    let (ctx, _) = context_with_children(config);
    let handles: Vec<_> = (0..3).map(|_| WaitHandle::auto()).collect();

    let err = ctx.wait_for_any(&handles, None).unwrap_err();
    assert_eq!(err.errno(), 95);
}

#[test]
fn test_ready_handle_index() {
    let ctx = context();
    let first = WaitHandle::auto();
    let second = WaitHandle::auto();
    second.set();

    let handles = [first, second];
    assert_eq!(ctx.wait_for_any(&handles, None), Ok(WaitOutcome::Ready(1)));
    // Auto-reset handle was consumed by the wait
    assert_eq!(ctx.wait_for_any(&handles, Some(Duration::ZERO)), Ok(WaitOutcome::TimedOut));
}

#[test]
fn test_manual_handle_stays_signaled() {
    let ctx = context();
    let handle = WaitHandle::manual();
    handle.set();

    let handles = [handle];
    assert_eq!(ctx.wait_for_any(&handles, Some(Duration::ZERO)), Ok(WaitOutcome::Ready(0)));
    assert_eq!(ctx.wait_for_any(&handles, Some(Duration::ZERO)), Ok(WaitOutcome::Ready(0)));
}

#[test]
fn test_handle_set_from_other_thread() {
    let ctx = context();
    let handle = WaitHandle::auto();
    let remote = handle.clone();

    let setter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.set();
    });

    let outcome = ctx.wait_for_any(&[handle], Some(Duration::from_secs(5)));
    setter.join().unwrap();
    assert_eq!(outcome, Ok(WaitOutcome::Ready(0)));
}

#[test]
fn test_closed_handle_is_host_error() {
    let ctx = context();
    let handle = WaitHandle::manual();
    handle.close();

    let err = ctx.wait_for_any(&[handle], None).unwrap_err();
    assert!(matches!(err, SignalError::HostError(_)));
    assert_eq!(err.errno(), 5);
}

#[test]
fn test_child_wake_with_ignored_sigchld() {
    let (ctx, children) = context_with_children(EmulatorConfig::default());
    ctx.set_signal_disposition(Signal::SIGCHLD, Disposition::Ignore);

    let child = WaitHandle::manual();
    children.add_child(42, child.clone()).unwrap();
    let own = WaitHandle::manual();
    child.set();

    assert_eq!(
        ctx.wait_for_any(&[own], Some(Duration::from_secs(1))),
        Ok(WaitOutcome::ChildExited)
    );
    assert!(children.is_zombie(42));
    assert_eq!(ctx.stats().child_exits, 1);
}

#[test]
fn test_child_wake_default_reaps_and_interrupts() {
    let (ctx, children) = context_with_children(EmulatorConfig::default());
    let child = WaitHandle::manual();
    children.add_child(42, child.clone()).unwrap();
    child.set();

    assert_eq!(
        ctx.wait_for_any(&[], Some(Duration::from_secs(1))),
        Err(SignalError::Interrupted)
    );
    assert_eq!(children.num_children(), 0);
}

#[test]
fn test_caller_index_skips_children() {
    let (ctx, children) = context_with_children(EmulatorConfig::default());
    children.add_child(1, WaitHandle::manual()).unwrap();
    children.add_child(2, WaitHandle::manual()).unwrap();

    let own = WaitHandle::manual();
    own.set();
    assert_eq!(
        ctx.wait_for_any(&[WaitHandle::manual(), own], None),
        Ok(WaitOutcome::Ready(1))
    );
}

#[cfg(unix)]
#[test]
fn test_spawned_child_raises_sigchld() {
    use std::cell::RefCell;
    use std::process::Command;
    use std::rc::Rc;

    let (ctx, children) = context_with_children(EmulatorConfig::default());
    let reaped = Rc::new(RefCell::new(Vec::new()));
    let sink = reaped.clone();
    let registry = children.clone();
    ctx.set_signal_disposition(
        Signal::SIGCHLD,
        Disposition::handler(move |_, _| {
            while let Some(exit) = registry.reap(None) {
                sink.borrow_mut().push(exit);
            }
        }),
    );

    let pid = children.spawn(&mut Command::new("true")).unwrap();
    let deadline = Instant::now() + Duration::from_secs(10);
    while reaped.borrow().is_empty() && Instant::now() < deadline {
        let _ = ctx.wait_for_any(&[], Some(Duration::from_millis(100)));
    }

    let reaped = reaped.borrow();
    assert_eq!(reaped.len(), 1);
    assert_eq!(reaped[0].pid, pid);
    assert_eq!(reaped[0].exit_code, Some(0));
}
