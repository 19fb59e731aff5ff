/*!
 * Traffic Module
 *
 * Intersection admission control and the simulation that drives it:
 * - `direction`: directions, vehicles and the conflict predicate
 * - `intersection`: the admission controller
 * - `audit`: independent collision checking
 * - `simulation`: concurrent vehicle driver
 */

pub mod audit;
pub mod direction;
pub mod intersection;
pub mod simulation;
pub mod stats;

pub use audit::Auditor;
pub use direction::{compatible, right_turn, Direction, Vehicle};
pub use intersection::{Intersection, IntersectionConfig};
pub use simulation::{Simulation, SimulationConfig, SimulationReport};
pub use stats::IntersectionStats;
