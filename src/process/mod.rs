/*!
 * Process Module
 * Child process tracking for the wait multiplexer
 */

mod children;

pub use children::{ChildExit, ChildRecord, ChildRegistry};
