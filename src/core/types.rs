/*!
 * Core Types
 * Common type definitions used across the crate
 */

/// Process ID type
pub type Pid = u32;

/// Native exit status of a terminated child
pub type ExitCode = i32;
