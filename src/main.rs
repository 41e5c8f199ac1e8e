/*!
 * sigemu - Demo Host
 *
 * Runs a signal-aware main loop:
 * - SIGINT (Ctrl+C) and SIGTERM handlers stop the loop
 * - a periodic SIGALRM ticks without interrupting waits
 * - an optional child command raises SIGCHLD when it exits
 *
 * Usage: sigemu [--ticks N] [-- COMMAND ARGS...]
 */

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sigemu::{
    init_tracing, ChildRegistry, Disposition, EmulatorConfig, IntervalTimer, Signal,
    SignalContext, WaitOutcome,
};
use std::cell::Cell;
use std::process::Command;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TICK: Duration = Duration::from_millis(500);

/// Signal-aware demo loop
#[derive(Debug, Parser)]
#[command(name = "sigemu", version)]
struct Args {
    /// Stop after this many SIGALRM ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Child command to spawn and watch for SIGCHLD
    #[arg(last = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let children = Arc::new(ChildRegistry::new());
    let timer = Arc::new(IntervalTimer::new());
    let ctx = SignalContext::builder()
        .with_config(EmulatorConfig::from_env())
        .with_children(children.clone())
        .with_timer(timer.clone())
        .initialize()?;

    let running = Rc::new(Cell::new(true));
    let ticks = Rc::new(Cell::new(0u64));

    let stop = running.clone();
    ctx.set_signal_disposition(
        Signal::SIGINT,
        Disposition::handler(move |_, signal| {
            info!(signal = %signal, "Interrupt received, stopping");
            stop.set(false);
        }),
    );
    let stop = running.clone();
    ctx.set_signal_disposition(
        Signal::SIGTERM,
        Disposition::handler(move |_, signal| {
            info!(signal = %signal, "Termination requested, stopping");
            stop.set(false);
        }),
    );

    let counter = ticks.clone();
    let stop = running.clone();
    let limit = args.ticks;
    ctx.set_signal_disposition(
        Signal::SIGALRM,
        Disposition::handler(move |_, _| {
            counter.set(counter.get() + 1);
            if limit.is_some_and(|l| counter.get() >= l) {
                stop.set(false);
            }
        }),
    );

    let reaper = children.clone();
    ctx.set_signal_disposition(
        Signal::SIGCHLD,
        Disposition::handler(move |_, _| {
            while let Some(exit) = reaper.reap(None) {
                info!(pid = exit.pid, exit_code = ?exit.exit_code, "Child exited");
            }
        }),
    );

    if let Some((program, rest)) = args.command.split_first() {
        let pid = children
            .spawn(Command::new(program).args(rest))
            .into_diagnostic()?;
        info!(pid, program = %program, "Watching child");
    }

    timer.arm(Some(TICK), Some(TICK));
    info!("Entering main loop, press Ctrl+C to exit");

    while running.get() {
        match ctx.wait_for_any(&[], None) {
            Ok(WaitOutcome::ChildExited) | Ok(WaitOutcome::Completion) => {}
            Ok(outcome) => warn!(outcome = ?outcome, "Unexpected wake"),
            Err(e) if e.is_interrupted() => {}
            Err(e) => return Err(e.into()),
        }
    }
    timer.arm(None, None);

    let stats = serde_json::to_string_pretty(&ctx.stats()).into_diagnostic()?;
    println!("{}", stats);
    info!(ticks = ticks.get(), "Shutdown complete");
    Ok(())
}
