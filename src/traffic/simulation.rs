/*!
 * Traffic Simulation Driver
 *
 * Spawns vehicle-generating threads against an [`Intersection`]. Each thread
 * produces a stream of random vehicles that arrive, enter, cross and exit.
 * Every admission is checked by an independent [`Auditor`].
 */

use super::audit::Auditor;
use super::direction::{Direction, Vehicle};
use super::intersection::{Intersection, IntersectionConfig};
use super::stats::IntersectionStats;
use crate::core::limits::{
    DEFAULT_CROSSING_TIME, DEFAULT_MAX_ARRIVAL_DELAY, DEFAULT_SIMULATION_SEED,
    DEFAULT_SIMULATION_THREADS, DEFAULT_VEHICLES_PER_THREAD,
};
use crate::core::ConfigError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Concurrent vehicle-generating threads
    pub threads: usize,
    /// Vehicles produced by each thread
    pub vehicles_per_thread: usize,
    /// Upper bound on the random pause before each arrival
    pub max_arrival_delay_us: u64,
    /// Time each vehicle spends inside the intersection
    pub crossing_time_us: u64,
    /// Base RNG seed; thread `i` uses `seed + i`
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_SIMULATION_THREADS,
            vehicles_per_thread: DEFAULT_VEHICLES_PER_THREAD,
            max_arrival_delay_us: DEFAULT_MAX_ARRIVAL_DELAY.as_micros() as u64,
            crossing_time_us: DEFAULT_CROSSING_TIME.as_micros() as u64,
            seed: DEFAULT_SIMULATION_SEED,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::Invalid(
                "simulation needs at least one thread".into(),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn max_arrival_delay(&self) -> Duration {
        Duration::from_micros(self.max_arrival_delay_us)
    }

    #[inline]
    pub fn crossing_time(&self) -> Duration {
        Duration::from_micros(self.crossing_time_us)
    }

    #[inline]
    pub fn total_vehicles(&self) -> usize {
        self.threads * self.vehicles_per_thread
    }
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub vehicles: u64,
    /// Vehicles per origin, indexed by [`Direction::index`]
    pub by_origin: [u64; 4],
    pub right_turns: u64,
    pub max_wait_us: u64,
    pub mean_wait_us: f64,
    pub elapsed_ms: u64,
    pub audited_peak_occupancy: usize,
    pub intersection: IntersectionStats,
}

#[derive(Debug, Default)]
struct ThreadTally {
    vehicles: u64,
    by_origin: [u64; 4],
    right_turns: u64,
    total_wait: Duration,
    max_wait: Duration,
}

impl ThreadTally {
    fn merge(&mut self, other: ThreadTally) {
        self.vehicles += other.vehicles;
        for (total, n) in self.by_origin.iter_mut().zip(other.by_origin) {
            *total += n;
        }
        self.right_turns += other.right_turns;
        self.total_wait += other.total_wait;
        self.max_wait = self.max_wait.max(other.max_wait);
    }
}

/// Traffic simulation driver
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Initialize an intersection, run the simulation against it and clean
    /// it up afterwards
    pub fn execute(
        config: SimulationConfig,
        intersection: &IntersectionConfig,
    ) -> Result<SimulationReport, ConfigError> {
        config.validate()?;
        let controller = Intersection::init(intersection)?;
        let report = Simulation::new(config).run(&controller);
        controller.cleanup();
        Ok(report)
    }

    /// Drive all vehicle threads to completion against `intersection`
    pub fn run(&self, intersection: &Intersection) -> SimulationReport {
        let auditor = Auditor::new(intersection.capacity());
        let started = Instant::now();

        info!(
            threads = self.config.threads,
            vehicles_per_thread = self.config.vehicles_per_thread,
            capacity = intersection.capacity(),
            "Starting traffic simulation"
        );

        let mut tally = ThreadTally::default();
        thread::scope(|scope| {
            let workers: Vec<_> = (0..self.config.threads)
                .map(|index| {
                    let auditor = &auditor;
                    thread::Builder::new()
                        .name(format!("vehicle-{index}"))
                        .spawn_scoped(scope, move || {
                            self.drive(index, intersection, auditor)
                        })
                })
                .collect();

            for worker in workers {
                match worker.map(|handle| handle.join()) {
                    Ok(Ok(result)) => tally.merge(result),
                    // Collisions surface as panics in a vehicle thread
                    Ok(Err(panic)) => std::panic::resume_unwind(panic),
                    Err(e) => panic!("failed to spawn simulation thread: {e}"),
                }
            }
        });

        let elapsed = started.elapsed();
        let mean_wait_us = if tally.vehicles == 0 {
            0.0
        } else {
            tally.total_wait.as_micros() as f64 / tally.vehicles as f64
        };

        let report = SimulationReport {
            vehicles: tally.vehicles,
            by_origin: tally.by_origin,
            right_turns: tally.right_turns,
            max_wait_us: tally.max_wait.as_micros() as u64,
            mean_wait_us,
            elapsed_ms: elapsed.as_millis() as u64,
            audited_peak_occupancy: auditor.peak(),
            intersection: intersection.stats(),
        };

        info!(
            vehicles = report.vehicles,
            max_wait_us = report.max_wait_us,
            mean_wait_us = report.mean_wait_us,
            elapsed_ms = report.elapsed_ms,
            "Traffic simulation finished"
        );
        report
    }

    fn drive(&self, index: usize, intersection: &Intersection, auditor: &Auditor) -> ThreadTally {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(index as u64));
        let mut tally = ThreadTally::default();
        let max_delay = self.config.max_arrival_delay_us;
        let crossing = self.config.crossing_time();

        for _ in 0..self.config.vehicles_per_thread {
            let vehicle = random_vehicle(&mut rng);

            if max_delay > 0 {
                thread::sleep(Duration::from_micros(rng.gen_range(0..=max_delay)));
            }

            let arrived = Instant::now();
            intersection.enter(vehicle.origin, vehicle.destination);
            let waited = arrived.elapsed();
            auditor.record_entry(vehicle);

            if !crossing.is_zero() {
                thread::sleep(crossing);
            }

            // Audit record leaves before the controller slot is released
            auditor.record_exit(vehicle);
            intersection.exit(vehicle.origin, vehicle.destination);

            tally.vehicles += 1;
            tally.by_origin[vehicle.origin.index()] += 1;
            if vehicle.is_right_turn() {
                tally.right_turns += 1;
            }
            tally.total_wait += waited;
            tally.max_wait = tally.max_wait.max(waited);
        }

        debug!(thread = index, vehicles = tally.vehicles, "Simulation thread done");
        tally
    }
}

/// Pick a random origin and a different random destination
pub fn random_vehicle<R: Rng + ?Sized>(rng: &mut R) -> Vehicle {
    let origin = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
    let others: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| *d != origin)
        .collect();
    let destination = others[rng.gen_range(0..others.len())];
    Vehicle::new(origin, destination)
}
