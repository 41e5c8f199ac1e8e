/*!
 * Signal Core - Types and Traits
 * Fundamental types and collaborator traits for signal emulation
 */

pub mod sigset;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use sigset::SigSet;
pub use traits::*;
pub use types::*;
