/*!
 * Shared test fixtures
 */

#![allow(dead_code)]

use sigemu::signals::{AlarmTimer, ApcSender, Disposition, Signal, SignalContext};
use sigemu::{ChildRegistry, EmulatorConfig, PanickingHost, SignalResult};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Timer that never fires
pub struct NoopTimer;

impl AlarmTimer for NoopTimer {
    fn init(&self, _sender: ApcSender) -> SignalResult<()> {
        Ok(())
    }
}

/// Context on a panicking host with a fresh child registry
pub fn context_with_children(config: EmulatorConfig) -> (SignalContext, Arc<ChildRegistry>) {
    let children = Arc::new(ChildRegistry::new());
    let ctx = SignalContext::builder()
        .with_config(config)
        .with_host(Arc::new(PanickingHost))
        .with_children(children.clone())
        .with_timer(Arc::new(NoopTimer))
        .initialize()
        .expect("context initializes");
    (ctx, children)
}

pub fn context() -> SignalContext {
    context_with_children(EmulatorConfig::default()).0
}

/// Handler that appends every delivered signal to a shared log
pub fn recording_handler() -> (Rc<RefCell<Vec<Signal>>>, Disposition) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let disposition = Disposition::handler(move |_, signal| sink.borrow_mut().push(signal));
    (log, disposition)
}
