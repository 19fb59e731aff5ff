/*!
 * Intersection Auditor
 *
 * Independent record of which vehicles are inside the intersection, kept by
 * the simulation driver rather than the controller. Every admission is
 * checked against it, so a faulty controller is caught at the moment it lets
 * a conflicting vehicle in.
 */

use super::direction::{compatible, Vehicle};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct AuditState {
    inside: Vec<Vehicle>,
    peak: usize,
    checks: u64,
}

/// Collision checker shared by all simulation threads
#[derive(Debug)]
pub struct Auditor {
    state: Mutex<AuditState>,
    capacity: usize,
}

impl Auditor {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(AuditState::default()),
            capacity,
        }
    }

    /// Record an admitted vehicle
    ///
    /// # Panics
    ///
    /// If it conflicts with a vehicle already inside, or capacity is exceeded.
    pub fn record_entry(&self, vehicle: Vehicle) {
        let mut state = self.state.lock();
        if let Some(other) = state.inside.iter().find(|o| !compatible(o, &vehicle)) {
            panic!("collision detected: {vehicle} entered while {other} was inside");
        }
        assert!(
            state.inside.len() < self.capacity,
            "capacity exceeded: {vehicle} entered with {} vehicles inside",
            state.inside.len()
        );

        state.inside.push(vehicle);
        state.peak = state.peak.max(state.inside.len());
        state.checks += 1;
    }

    /// Record a vehicle leaving
    ///
    /// # Panics
    ///
    /// If the vehicle was never recorded as inside.
    pub fn record_exit(&self, vehicle: Vehicle) {
        let mut state = self.state.lock();
        let Some(index) = state.inside.iter().position(|v| *v == vehicle) else {
            panic!("{vehicle} left without being recorded inside");
        };
        state.inside.swap_remove(index);
    }

    pub fn inside(&self) -> usize {
        self.state.lock().inside.len()
    }

    pub fn peak(&self) -> usize {
        self.state.lock().peak
    }

    /// Number of admissions checked
    pub fn checks(&self) -> u64 {
        self.state.lock().checks
    }
}
