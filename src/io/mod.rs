/*!
 * I/O Module
 * Blocking operations offloaded to workers and completed on the main thread
 */

mod completion;

pub use completion::{spawn_io, PendingIo};
