/*!
 * System Limits and Constants
 *
 * Host ceilings, capacities, and errno values.
 *
 * ## Conventions
 * - Host-imposed ceilings are marked with [HOST]
 * - POSIX-compatible values are marked with [POSIX-COMPAT]
 */

use std::time::Duration;

// =============================================================================
// WAIT MULTIPLEXER LIMITS
// =============================================================================

/// Maximum number of objects a single host wait may watch (64)
/// Live child handles and caller handles share this budget
/// [HOST] Mirrors the native multi-object wait ceiling
pub const MAXIMUM_WAIT_OBJECTS: usize = 64;

// =============================================================================
// CHILD TABLE LIMITS
// =============================================================================

/// Maximum number of tracked child processes (live + zombie)
/// Below MAXIMUM_WAIT_OBJECTS, leaving room for caller handles
pub const MAX_CHILDREN: usize = 50;

// =============================================================================
// SIGNAL LIMITS
// =============================================================================

/// Size of the emulated signal-number space
pub const SIGNAL_COUNT: usize = 11;

/// Exit code used when a signal's default action ends the main thread
pub const DEFAULT_SIGNAL_EXIT_CODE: i32 = 1;

// =============================================================================
// TIMER LIMITS
// =============================================================================

/// Smallest interval accepted by the alarm timer (1ms)
/// Wait timeouts have millisecond granularity, so shorter periods only spin
pub const MIN_TIMER_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// ERRNO VALUES
// =============================================================================

/// Interrupted system call [POSIX-COMPAT]
pub const EINTR: i32 = 4;

/// I/O error, used for opaque host failures [POSIX-COMPAT]
pub const EIO: i32 = 5;

/// Resource temporarily unavailable [POSIX-COMPAT]
pub const EAGAIN: i32 = 11;

/// Invalid argument [POSIX-COMPAT]
pub const EINVAL: i32 = 22;

/// Operation not supported [POSIX-COMPAT]
pub const ENOTSUP: i32 = 95;
