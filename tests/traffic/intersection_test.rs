/*!
 * Intersection Controller Tests
 * Admission, blocking and release behaviour across threads
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use traffic_kernel::traffic::compatible;
use traffic_kernel::{Direction, Intersection, IntersectionConfig, Vehicle};

use Direction::{East, North, South, West};

/// Spin until `cond` holds or fail after a generous deadline
fn eventually(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_conflicting_entrant_blocks_until_exit() {
    let intersection = Arc::new(Intersection::with_capacity(10));
    intersection.enter(West, South);

    let admitted = Arc::new(AtomicBool::new(false));
    let handle = {
        let intersection = intersection.clone();
        let admitted = admitted.clone();
        thread::spawn(move || {
            intersection.enter(North, South);
            admitted.store(true, Ordering::SeqCst);
        })
    };

    eventually("north->south to block", || intersection.waiting() == 1);
    thread::sleep(Duration::from_millis(20));
    assert!(!admitted.load(Ordering::SeqCst));
    assert_eq!(intersection.residents(), vec![Vehicle::new(West, South)]);

    intersection.exit(West, South);
    handle.join().unwrap();

    assert!(admitted.load(Ordering::SeqCst));
    assert_eq!(intersection.residents(), vec![Vehicle::new(North, South)]);
    assert!(intersection.stats().blocked_waits >= 1);

    intersection.exit(North, South);
    intersection.cleanup();
}

#[test]
fn test_same_origin_vehicles_enter_together() {
    let intersection = Intersection::with_capacity(10);
    intersection.enter(North, South);
    intersection.enter(North, East);

    assert_eq!(intersection.occupancy(), 2);
    assert_eq!(intersection.waiting(), 0);

    intersection.exit(North, East);
    intersection.exit(North, South);
    intersection.cleanup();
}

#[test]
fn test_opposite_straight_through_enter_together() {
    let intersection = Intersection::with_capacity(10);
    intersection.enter(North, South);
    intersection.enter(South, North);
    assert_eq!(intersection.waiting(), 0);
    assert_eq!(intersection.occupancy(), 2);
}

#[test]
fn test_right_turns_share_with_different_exits() {
    let intersection = Intersection::with_capacity(10);
    // Every clockwise quarter turn leaves toward a different exit
    intersection.enter(North, West);
    intersection.enter(West, South);
    intersection.enter(South, East);
    intersection.enter(East, North);
    assert_eq!(intersection.occupancy(), 4);
}

#[test]
fn test_enter_then_exit_restores_empty_state() {
    let intersection = Intersection::init(&IntersectionConfig::with_capacity(4)).unwrap();
    for vehicle in [Vehicle::new(North, South), Vehicle::new(North, West)] {
        intersection.enter(vehicle.origin, vehicle.destination);
    }
    intersection.exit(North, South);
    intersection.exit(North, West);

    assert_eq!(intersection.occupancy(), 0);
    assert!(intersection.residents().is_empty());

    let stats = intersection.stats();
    assert_eq!(stats.admitted, 2);
    assert_eq!(stats.exited, 2);
    assert_eq!(stats.in_flight(), 0);

    intersection.cleanup();
    assert!(!intersection.is_open());
}

#[test]
fn test_full_intersection_blocks_compatible_entrant() {
    let intersection = Arc::new(Intersection::with_capacity(2));
    intersection.enter(North, South);
    intersection.enter(North, East);

    let handle = {
        let intersection = intersection.clone();
        thread::spawn(move || intersection.enter(North, West))
    };

    eventually("third vehicle to block", || intersection.waiting() == 1);
    assert_eq!(intersection.occupancy(), 2);

    intersection.exit(North, South);
    handle.join().unwrap();

    let mut residents = intersection.residents();
    residents.sort_by_key(|v| v.destination.index());
    assert_eq!(
        residents,
        vec![Vehicle::new(North, East), Vehicle::new(North, West)]
    );
}

#[test]
fn test_exit_wakes_every_compatible_waiter() {
    let intersection = Arc::new(Intersection::with_capacity(10));
    intersection.enter(East, West);

    // Both conflict with east->west but not with each other
    let handles: Vec<_> = [(North, South), (South, North)]
        .into_iter()
        .map(|(origin, destination)| {
            let intersection = intersection.clone();
            thread::spawn(move || intersection.enter(origin, destination))
        })
        .collect();

    eventually("both entrants to block", || intersection.waiting() == 2);
    intersection.exit(East, West);
    for handle in handles {
        handle.join().unwrap();
    }

    let residents = intersection.residents();
    assert_eq!(residents.len(), 2);
    assert!(compatible(&residents[0], &residents[1]));
}

#[test]
fn test_duplicate_paths_are_tracked_separately() {
    let intersection = Intersection::with_capacity(3);
    intersection.enter(South, North);
    intersection.enter(South, North);
    assert_eq!(intersection.occupancy(), 2);

    intersection.exit(South, North);
    assert_eq!(intersection.residents(), vec![Vehicle::new(South, North)]);
}

#[test]
#[should_panic(expected = "not in the intersection")]
fn test_exit_of_absent_vehicle_panics() {
    let intersection = Intersection::with_capacity(2);
    intersection.enter(North, South);
    intersection.exit(South, North);
}

#[test]
#[should_panic(expected = "vehicles still inside")]
fn test_cleanup_with_resident_panics() {
    let intersection = Intersection::with_capacity(2);
    intersection.enter(West, East);
    intersection.cleanup();
}

#[test]
fn test_init_rejects_zero_capacity() {
    assert!(Intersection::init(&IntersectionConfig::with_capacity(0)).is_err());
}
