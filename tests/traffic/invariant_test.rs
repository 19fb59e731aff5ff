/*!
 * Intersection Invariant Properties
 *
 * Random admit/exit sequences checked against a reference model, plus a
 * concurrent run that snapshots residents from every vehicle thread.
 */

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use traffic_kernel::traffic::compatible;
use traffic_kernel::{Intersection, Vehicle};

#[derive(Debug, Clone)]
enum Op {
    Enter(Vehicle),
    /// Exit the resident at this index, modulo occupancy
    Exit(usize),
}

fn vehicle() -> impl Strategy<Value = Vehicle> {
    let paths: Vec<Vehicle> = Vehicle::all().collect();
    proptest::sample::select(paths)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => vehicle().prop_map(Op::Enter),
        2 => any::<usize>().prop_map(Op::Exit),
    ]
}

fn sorted(mut vehicles: Vec<Vehicle>) -> Vec<Vehicle> {
    vehicles.sort_by_key(|v| (v.origin.index(), v.destination.index()));
    vehicles
}

fn assert_safe(residents: &[Vehicle], capacity: usize) {
    assert!(
        residents.len() <= capacity,
        "{} residents with capacity {capacity}",
        residents.len()
    );
    for (i, a) in residents.iter().enumerate() {
        for b in &residents[i + 1..] {
            assert!(compatible(a, b), "{a} and {b} inside together");
        }
    }
}

proptest! {
    #[test]
    fn prop_sequential_admission_matches_model(
        capacity in 1usize..=6,
        ops in proptest::collection::vec(op(), 0..64),
    ) {
        let intersection = Intersection::with_capacity(capacity);
        let mut model: Vec<Vehicle> = Vec::new();

        for op in ops {
            match op {
                Op::Enter(vehicle) => {
                    // Only issue entries that must not block
                    let admissible = model.len() < capacity
                        && model.iter().all(|r| compatible(r, &vehicle));
                    if admissible {
                        intersection.enter(vehicle.origin, vehicle.destination);
                        model.push(vehicle);
                    }
                }
                Op::Exit(index) if !model.is_empty() => {
                    let vehicle = model.swap_remove(index % model.len());
                    intersection.exit(vehicle.origin, vehicle.destination);
                }
                Op::Exit(_) => {}
            }

            let residents = intersection.residents();
            assert_safe(&residents, capacity);
            prop_assert_eq!(sorted(residents), sorted(model.clone()));
            prop_assert_eq!(intersection.occupancy(), model.len());
        }

        for vehicle in model.drain(..) {
            intersection.exit(vehicle.origin, vehicle.destination);
        }
        prop_assert_eq!(intersection.occupancy(), 0);
        intersection.cleanup();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_concurrent_snapshots_stay_safe(
        capacity in 1usize..=4,
        vehicles in proptest::collection::vec(vehicle(), 1..24),
    ) {
        let intersection = Arc::new(Intersection::with_capacity(capacity));

        let handles: Vec<_> = vehicles
            .into_iter()
            .map(|vehicle| {
                let intersection = intersection.clone();
                thread::spawn(move || {
                    intersection.enter(vehicle.origin, vehicle.destination);
                    let residents = intersection.residents();
                    assert!(residents.contains(&vehicle));
                    assert_safe(&residents, capacity);
                    thread::yield_now();
                    intersection.exit(vehicle.origin, vehicle.destination);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        prop_assert_eq!(intersection.occupancy(), 0);
        prop_assert_eq!(intersection.waiting(), 0);
        let stats = intersection.stats();
        prop_assert!(stats.peak_occupancy <= capacity);
        prop_assert_eq!(stats.admitted, stats.exited);
        intersection.cleanup();
    }
}
