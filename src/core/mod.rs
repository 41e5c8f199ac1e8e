/*!
 * Core Module
 * Fundamental types, limits, configuration, and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use config::EmulatorConfig;
pub use errors::*;
pub use sync::{HandleState, Parker, ResetMode, WaitHandle};
pub use types::*;
