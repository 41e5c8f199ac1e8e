/*!
 * Synchronization Primitives
 *
 * Wait/notify building blocks for the signal context:
 * - `Parker`: lost-wakeup-free park/unpark token for the main thread
 * - `WaitHandle`: manual- or auto-reset event objects, waitable alone or as
 *   part of a multi-object wait
 *
 * # Architecture
 *
 * A multi-object wait registers one `Parker` on every handle it watches and
 * on the APC queue. Whichever source fires first unparks the waiter, which
 * then re-checks all sources in a fixed order.
 */

mod event;
mod parker;

pub use event::{HandleState, ResetMode, WaitHandle};
pub use parker::{deadline_after, Parker};

pub(crate) use event::WatchGuard;
