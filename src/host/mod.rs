/*!
 * Host Module
 * Native services behind the signal context: control notification delivery,
 * main-thread exit, fault reporting
 */

mod process;

pub use process::{PanickingHost, ProcessHost};
