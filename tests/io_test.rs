/*!
 * Completion Worker Tests
 * Blocking operations completed through the APC queue
 */

mod common;

use common::{context, recording_handler};
use sigemu::{spawn_io, Signal, SignalError};
use std::io;
use std::thread;
use std::time::Duration;

#[test]
fn test_completion_delivers_result() {
    let ctx = context();
    let pending = spawn_io(&ctx.apc_sender(), || Ok(42u64)).unwrap();

    let result = pending.wait(&ctx, Some(Duration::from_secs(5))).unwrap();
    assert_eq!(result.unwrap().unwrap(), 42);
    assert_eq!(ctx.stats().signals_dispatched, 0);
}

#[test]
fn test_operation_error_is_returned() {
    let ctx = context();
    let pending = spawn_io::<(), _>(&ctx.apc_sender(), || {
        Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
    })
    .unwrap();

    let err = pending.wait(&ctx, None).unwrap().unwrap().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn test_wait_times_out_then_completes() {
    let ctx = context();
    let pending = spawn_io(&ctx.apc_sender(), || {
        thread::sleep(Duration::from_millis(300));
        Ok("done")
    })
    .unwrap();

    assert!(pending
        .wait(&ctx, Some(Duration::from_millis(20)))
        .unwrap()
        .is_none());
    let result = pending.wait(&ctx, Some(Duration::from_secs(5))).unwrap();
    assert_eq!(result.unwrap().unwrap(), "done");
}

#[test]
fn test_signal_interrupts_pending_io() {
    let ctx = context();
    let (log, handler) = recording_handler();
    ctx.set_signal_disposition(Signal::SIGINT, handler);

    let pending = spawn_io(&ctx.apc_sender(), || {
        thread::sleep(Duration::from_millis(200));
        Ok(1u8)
    })
    .unwrap();
    ctx.apc_sender().queue_signal(Signal::SIGINT);

    assert_eq!(
        pending.wait(&ctx, None).unwrap_err(),
        SignalError::Interrupted
    );
    assert_eq!(*log.borrow(), vec![Signal::SIGINT]);

    // The operation is still in flight and can be waited on again
    let result = pending.wait(&ctx, Some(Duration::from_secs(5))).unwrap();
    assert_eq!(result.unwrap().unwrap(), 1);

#[test]
fn test_huge_timeout_waits_for_completion() {
    let ctx = context();
    let pending = spawn_io(&ctx.apc_sender(), || Ok(5i32)).unwrap();

    let result = pending.wait(&ctx, Some(Duration::MAX)).unwrap();
    assert_eq!(result.unwrap().unwrap(), 5);
}
}
