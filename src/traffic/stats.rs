/*!
 * Intersection Statistics
 */

use serde::{Deserialize, Serialize};

/// Counters maintained by the admission controller under its lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionStats {
    /// Vehicles admitted by `enter`
    pub admitted: u64,
    /// Vehicles removed by `exit`
    pub exited: u64,
    /// Times an entrant parked on the condvar
    pub blocked_waits: u64,
    /// Largest occupancy observed
    pub peak_occupancy: usize,
}

impl IntersectionStats {
    /// Vehicles admitted but not yet exited
    #[inline]
    pub fn in_flight(&self) -> u64 {
        self.admitted - self.exited
    }
}
