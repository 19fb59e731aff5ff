/*!
 * Intersection Admission Controller
 *
 * Tracks the vehicles currently inside the intersection and blocks entrants
 * until they can be admitted without a collision.
 *
 * # Protocol
 *
 * - `enter`: lock, park on the condvar while the intersection is full or the
 *   candidate conflicts with any resident, then take a free slot
 * - `exit`: lock, release the matching slot, broadcast
 *
 * Exit broadcasts rather than signalling one waiter: each waiter is blocked
 * by a different subset of residents, so after any exit every waiter has to
 * re-evaluate its own predicate.
 */

use super::direction::{compatible, Direction, Vehicle};
use super::stats::IntersectionStats;
use crate::core::limits::{DEFAULT_INTERSECTION_CAPACITY, MAX_INTERSECTION_CAPACITY};
use crate::core::sync::Monitor;
use crate::core::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Admission controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    /// Maximum number of vehicles resident at once
    pub capacity: usize,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_INTERSECTION_CAPACITY,
        }
    }
}

impl IntersectionConfig {
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_INTERSECTION_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "intersection capacity must be between 1 and {}, got {}",
                MAX_INTERSECTION_CAPACITY, self.capacity
            )));
        }
        Ok(())
    }
}

/// State protected by the controller's lock
#[derive(Debug)]
struct IntersectionState {
    /// Fixed-capacity slot arena, `None` marks a free slot
    slots: Box<[Option<Vehicle>]>,
    occupancy: usize,
    waiting: usize,
    open: bool,
    stats: IntersectionStats,
}

impl IntersectionState {
    fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            occupancy: 0,
            waiting: 0,
            open: true,
            stats: IntersectionStats::default(),
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.occupancy == self.slots.len()
    }

    fn residents(&self) -> impl Iterator<Item = &Vehicle> {
        self.slots.iter().flatten()
    }

    fn conflicts_with(&self, candidate: &Vehicle) -> bool {
        self.residents().any(|resident| !compatible(resident, candidate))
    }

    #[inline]
    fn admits(&self, candidate: &Vehicle) -> bool {
        !self.is_full() && !self.conflicts_with(candidate)
    }

    fn insert(&mut self, vehicle: Vehicle) -> usize {
        if let Some(resident) = self.residents().find(|r| !compatible(r, &vehicle)) {
            panic!("collision: admitting {vehicle} while {resident} is in the intersection");
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            panic!(
                "intersection over capacity: no free slot for {vehicle} ({} resident)",
                self.occupancy
            );
        };

        self.slots[slot] = Some(vehicle);
        self.occupancy += 1;
        self.stats.admitted += 1;
        self.stats.peak_occupancy = self.stats.peak_occupancy.max(self.occupancy);
        slot
    }

    /// Free one slot holding `vehicle`, matched by value
    fn remove(&mut self, vehicle: &Vehicle) -> Option<usize> {
        let slot = self
            .slots
            .iter()
            .position(|resident| resident.as_ref() == Some(vehicle))?;

        self.slots[slot] = None;
        self.occupancy -= 1;
        self.stats.exited += 1;
        Some(slot)
    }
}

/// Intersection admission controller
///
/// Shared between vehicle threads behind an `Arc`.
pub struct Intersection {
    monitor: Monitor<IntersectionState>,
    capacity: usize,
}

impl Intersection {
    /// Create an empty intersection with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INTERSECTION_CAPACITY)
    }

    /// Create an empty intersection holding at most `capacity` vehicles
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "intersection capacity must be non-zero");
        Self {
            monitor: Monitor::new(IntersectionState::new(capacity)),
            capacity,
        }
    }

    /// Set up the controller before the simulation starts
    pub fn init(config: &IntersectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(capacity = config.capacity, "Intersection controller initialized");
        Ok(Self::with_capacity(config.capacity))
    }

    /// Block until a vehicle travelling `origin -> destination` can safely
    /// enter, then record it as resident
    pub fn enter(&self, origin: Direction, destination: Direction) {
        let vehicle = Vehicle::new(origin, destination);
        let mut state = self.monitor.lock();
        assert!(state.open, "enter called on a cleaned-up intersection");

        state.waiting += 1;
        let parked = self
            .monitor
            .wait_while(&mut state, |s| !s.admits(&vehicle));
        state.waiting -= 1;
        state.stats.blocked_waits += parked as u64;

        let slot = state.insert(vehicle);
        debug!(
            vehicle = %vehicle,
            slot,
            occupancy = state.occupancy,
            parked,
            "Vehicle entered intersection"
        );
    }

    /// Remove one resident vehicle travelling `origin -> destination` and
    /// wake every blocked entrant
    ///
    /// # Panics
    ///
    /// If no such vehicle is resident.
    pub fn exit(&self, origin: Direction, destination: Direction) {
        let vehicle = Vehicle::new(origin, destination);
        let mut state = self.monitor.lock();
        assert!(state.open, "exit called on a cleaned-up intersection");

        let Some(slot) = state.remove(&vehicle) else {
            panic!("exit of {vehicle}, which is not in the intersection");
        };
        let occupancy = state.occupancy;
        let waiting = state.waiting;

        self.monitor.notify_all();
        drop(state);

        trace!(vehicle = %vehicle, slot, occupancy, waiting, "Vehicle left intersection");
    }

    /// Tear the controller down after the simulation finishes
    ///
    /// # Panics
    ///
    /// If vehicles are still resident or entrants are still blocked.
    pub fn cleanup(&self) {
        let mut state = self.monitor.lock();
        assert!(state.open, "intersection cleaned up twice");
        assert_eq!(
            state.occupancy, 0,
            "intersection cleaned up with vehicles still inside"
        );
        assert_eq!(
            state.waiting, 0,
            "intersection cleaned up with blocked entrants"
        );
        state.open = false;
        info!(
            admitted = state.stats.admitted,
            blocked_waits = state.stats.blocked_waits,
            peak_occupancy = state.stats.peak_occupancy,
            "Intersection controller cleaned up"
        );
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vehicles currently inside
    #[inline]
    pub fn occupancy(&self) -> usize {
        self.monitor.lock().occupancy
    }

    /// Entrants currently blocked in `enter`
    #[inline]
    pub fn waiting(&self) -> usize {
        self.monitor.lock().waiting
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.monitor.lock().open
    }

    /// Snapshot of resident vehicles
    pub fn residents(&self) -> Vec<Vehicle> {
        self.monitor.lock().residents().copied().collect()
    }

    pub fn stats(&self) -> IntersectionStats {
        self.monitor.lock().stats
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new()
    }
}
