/*!
 * System Limits and Constants
 *
 * Centralized location for system-wide limits and defaults.
 * Organized by domain so every tunable lives in one place.
 */

use std::time::Duration;

// =============================================================================
// INTERSECTION LIMITS
// =============================================================================

/// Default number of vehicles that may be inside the intersection at once
/// Matches the number of concurrent simulation threads
pub const DEFAULT_INTERSECTION_CAPACITY: usize = 10;

/// Hard upper bound on configurable intersection capacity
/// The admission check is pairwise, so capacity stays small
pub const MAX_INTERSECTION_CAPACITY: usize = 64;

// =============================================================================
// PROCESS ID LIMITS
// =============================================================================

/// PID reserved for the kernel process
pub const KERNEL_PID: u32 = 1;

/// Smallest PID handed out to user processes
pub const PID_MIN: u32 = KERNEL_PID + 1;

/// Largest PID handed out by default
pub const DEFAULT_PID_MAX: u32 = 32_767;

// =============================================================================
// TRAFFIC SIMULATION DEFAULTS
// =============================================================================

/// Number of concurrent vehicle-generating threads
pub const DEFAULT_SIMULATION_THREADS: usize = 10;

/// Vehicles generated by each simulation thread
pub const DEFAULT_VEHICLES_PER_THREAD: usize = 20;

/// Upper bound on the random delay before a vehicle arrives
pub const DEFAULT_MAX_ARRIVAL_DELAY: Duration = Duration::from_millis(2);

/// Time a vehicle spends inside the intersection
pub const DEFAULT_CROSSING_TIME: Duration = Duration::from_micros(500);

/// Seed used when none is configured, for reproducible runs
pub const DEFAULT_SIMULATION_SEED: u64 = 0x5eed_0161;
