/*!
 * Directions and Vehicles
 *
 * Compass directions, the vehicle record and the pure conflict predicate
 * used by the admission controller.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compass direction a vehicle arrives from or leaves toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// A vehicle's path through the intersection
///
/// `origin != destination` is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    pub origin: Direction,
    pub destination: Direction,
}

impl Vehicle {
    #[inline]
    pub const fn new(origin: Direction, destination: Direction) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// True for the four clockwise quarter turns
    ///
    /// Matched on direction names, not on the enum's discriminants.
    #[inline]
    pub fn is_right_turn(&self) -> bool {
        right_turn(self)
    }

    /// True if this vehicle may share the intersection with `other`
    #[inline]
    pub fn is_compatible_with(&self, other: &Vehicle) -> bool {
        compatible(self, other)
    }

    /// Every vehicle with `origin != destination`
    pub fn all() -> impl Iterator<Item = Vehicle> {
        Direction::ALL.into_iter().flat_map(|origin| {
            Direction::ALL
                .into_iter()
                .filter(move |destination| *destination != origin)
                .map(move |destination| Vehicle::new(origin, destination))
        })
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// True if `v` turns right: west→south, south→east, east→north, north→west
pub fn right_turn(v: &Vehicle) -> bool {
    use Direction::*;
    matches!(
        (v.origin, v.destination),
        (West, South) | (South, East) | (East, North) | (North, West)
    )
}

/// True if `a` and `b` can be inside the intersection together
///
/// Holds when the vehicles entered from the same side, when they travel
/// exactly opposite paths, or when one of them turns right and they leave
/// toward different exits.
pub fn compatible(a: &Vehicle, b: &Vehicle) -> bool {
    if a.origin == b.origin {
        return true;
    }
    if a.origin == b.destination && a.destination == b.origin {
        return true;
    }
    (right_turn(a) || right_turn(b)) && a.destination != b.destination
}
