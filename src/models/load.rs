//! Two-dimensional load (weight and volume).

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A weight/volume pair used both for order demand and vehicle capacity.
///
/// Weight is in kilograms and volume in cubic centimetres, but the optimizer
/// only relies on both sides of a comparison sharing units.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Load;
///
/// let capacity = Load::new(50.0, 1000.0);
/// let demand = Load::new(10.0, 200.0) + Load::new(30.0, 300.0);
/// assert!(demand.fits_within(&capacity));
/// assert!(!Load::weight(60.0).fits_within(&capacity));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Load {
    /// Weight component.
    pub weight: f64,
    /// Volume component.
    pub volume: f64,
}

impl Load {
    /// Creates a load from both components.
    pub const fn new(weight: f64, volume: f64) -> Self {
        Self { weight, volume }
    }

    /// Creates a weight-only load (volume 0).
    pub const fn weight(weight: f64) -> Self {
        Self::new(weight, 0.0)
    }

    /// The empty load.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Returns `true` if neither component exceeds `capacity`.
    pub fn fits_within(&self, capacity: &Load) -> bool {
        self.weight <= capacity.weight && self.volume <= capacity.volume
    }

    /// Weight and volume utilization of `capacity` as fractions.
    ///
    /// A zero-capacity dimension reports 0 utilization when unused and
    /// infinity when any load is placed on it.
    pub fn utilization_of(&self, capacity: &Load) -> (f64, f64) {
        (
            ratio(self.weight, capacity.weight),
            ratio(self.volume, capacity.volume),
        )
    }

    /// Weight plus volume scaled to litres (cm³ / 1000).
    ///
    /// Used as the single "bulk" measure when ordering loads heaviest first.
    pub fn bulk(&self) -> f64 {
        self.weight + self.volume / 1000.0
    }
}

fn ratio(used: f64, available: f64) -> f64 {
    if available > 0.0 {
        used / available
    } else if used > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

impl Add for Load {
    type Output = Load;

    fn add(self, rhs: Load) -> Load {
        Load::new(self.weight + rhs.weight, self.volume + rhs.volume)
    }
}

impl AddAssign for Load {
    fn add_assign(&mut self, rhs: Load) {
        self.weight += rhs.weight;
        self.volume += rhs.volume;
    }
}

impl std::iter::Sum for Load {
    fn sum<I: Iterator<Item = Load>>(iter: I) -> Load {
        iter.fold(Load::zero(), |acc, l| acc + l)
    }
}
