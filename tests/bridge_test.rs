/*!
 * Notification Bridge Tests
 * Control notifications delivered from foreign threads
 */

mod common;

use common::{context, recording_handler};
use sigemu::{HostEvent, Signal, SignalError};
use std::thread;
use std::time::Duration;

#[test]
fn test_ctrl_c_interrupts_blocked_wait() {
    let ctx = context();
    let (log, handler) = recording_handler();
    ctx.set_signal_disposition(Signal::SIGINT, handler);

    let bridge = ctx.bridge();
    let foreign = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        bridge.notify(HostEvent::CtrlC)
    });

    let outcome = ctx.wait_for_any(&[], Some(Duration::from_secs(5)));
    assert!(foreign.join().unwrap());
    assert_eq!(outcome, Err(SignalError::Interrupted));
    assert_eq!(*log.borrow(), vec![Signal::SIGINT]);
}

#[test]
fn test_ctrl_break_maps_to_sigtstp() {
    let ctx = context();
    let (log, handler) = recording_handler();
    ctx.set_signal_disposition(Signal::SIGTSTP, handler);

    assert!(ctx.bridge().notify(HostEvent::from_code(1)));
    assert!(ctx.poll().unwrap_err().is_interrupted());
    assert_eq!(*log.borrow(), vec![Signal::SIGTSTP]);
}

#[test]
fn test_unknown_notification_declined() {
    let ctx = context();
    assert!(!ctx.bridge().notify(HostEvent::Other(7)));
    assert!(ctx.poll().is_ok());
    assert_eq!(ctx.stats().notifications_serviced, 0);
}

#[test]
fn test_close_blocks_until_context_dropped() {
    let ctx = context();
    let (log, handler) = recording_handler();
    ctx.set_signal_disposition(Signal::SIGTERM, handler);

    let bridge = ctx.bridge();
    let foreign = thread::spawn(move || bridge.notify(HostEvent::Close));

    assert_eq!(
        ctx.wait_for_any(&[], Some(Duration::from_secs(5))),
        Err(SignalError::Interrupted)
    );
    assert_eq!(*log.borrow(), vec![Signal::SIGTERM]);

    thread::sleep(Duration::from_millis(50));
    assert!(!foreign.is_finished());

    let main_thread = ctx.main_thread_handle();
    drop(ctx);
    assert!(main_thread.is_set());
    assert!(foreign.join().unwrap());
}

#[test]
fn test_shutdown_and_logoff_raise_sigterm() {
    let ctx = context();
    let (log, handler) = recording_handler();
    ctx.set_signal_disposition(Signal::SIGTERM, handler);

    let bridge = ctx.bridge();
    let foreign = thread::spawn(move || {
        bridge.notify(HostEvent::Logoff) && bridge.notify(HostEvent::Shutdown)
    });

    // Logoff parks its thread, so only one SIGTERM arrives before the drop
    assert!(ctx
        .wait_for_any(&[], Some(Duration::from_secs(5)))
        .unwrap_err()
        .is_interrupted());
    assert_eq!(*log.borrow(), vec![Signal::SIGTERM]);

    drop(ctx);
    assert!(foreign.join().unwrap());
}
